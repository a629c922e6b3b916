// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::{
    process::{Child, Command},
    thread,
    time::Duration,
};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

/// A robotd process started through `cargo run`. Terminated on drop.
pub struct RobotdGuard {
    child: Child,
    port: u16,
}

impl RobotdGuard {
    pub fn start(port: u16) -> Self {
        println!("Executing robotd located via cargo run");
        let port_arg = port.to_string();
        let child = Command::new("cargo")
            .args([
                "run",
                "-p",
                "robotd",
                "--",
                "--bind",
                "127.0.0.1",
                "--port",
                &port_arg,
                "--work-min-ms",
                "10",
                "--work-max-ms",
                "50",
            ])
            .spawn()
            .expect("failed to start robotd");

        let guard = Self { child, port };
        guard.wait_for_listener(Duration::from_secs(120));
        guard
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the exit status if robotd has exited on its own.
    pub fn wait_for_exit(&mut self, timeout: Duration) -> Option<std::process::ExitStatus> {
        let deadline = std::time::Instant::now() + timeout;
        while std::time::Instant::now() < deadline {
            if let Ok(Some(status)) = self.child.try_wait() {
                return Some(status);
            }
            thread::sleep(Duration::from_millis(50));
        }
        None
    }

    // cargo may need to build first
    fn wait_for_listener(&self, timeout: Duration) {
        let deadline = std::time::Instant::now() + timeout;
        while std::time::Instant::now() < deadline {
            if std::net::TcpStream::connect(("127.0.0.1", self.port)).is_ok() {
                return;
            }
            thread::sleep(Duration::from_millis(100));
        }
        panic!("robotd did not start listening on port {}", self.port);
    }
}

impl Drop for RobotdGuard {
    fn drop(&mut self) {
        if let Ok(Some(_)) = self.child.try_wait() {
            return;
        }
        let pid = Pid::from_raw(self.child.id() as i32);

        // First: SIGTERM
        let _ = signal::kill(pid, Signal::SIGTERM);

        for _ in 0..10 {
            if let Ok(Some(_)) = self.child.try_wait() {
                return;
            }
            thread::sleep(Duration::from_millis(100));
        }

        // Still alive, SIGKILL
        let _ = signal::kill(pid, Signal::SIGKILL);
        let _ = self.child.wait();
    }
}
