// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::{
    net::SocketAddr,
    thread::{self, JoinHandle},
    time::Duration,
};

use robotd::{
    intake::{Server, ShutdownTrigger},
    mailbox::Mailbox,
    robots::{RobotPool, RobotReport},
};

/// A complete hub (mailbox, robots, listener) inside the test process,
/// listening on an ephemeral localhost port.
pub struct InProcessHub {
    addr: SocketAddr,
    mailbox: Mailbox,
    trigger: ShutdownTrigger,
    robots: RobotPool,
    server: JoinHandle<()>,
}

impl InProcessHub {
    pub fn start(robots: u32, work_time: Duration) -> anyhow::Result<Self> {
        let mailbox = Mailbox::new();
        let robots = RobotPool::spawn(robots, &mailbox, work_time..=work_time)?;
        let server = Server::bind(
            "127.0.0.1:0".parse::<SocketAddr>()?,
            mailbox.clone(),
            Duration::from_secs(1),
        )?;
        let addr = server.local_addr()?;
        let trigger = server.shutdown_trigger();
        let server = thread::Builder::new()
            .name("robotd-listener".into())
            .spawn(move || server.run())?;

        Ok(Self {
            addr,
            mailbox,
            trigger,
            robots,
            server,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    pub fn robots(&self) -> &RobotPool {
        &self.robots
    }

    /// Waits for the listener and every robot to stop. Someone has to
    /// trigger the shutdown, either a client or [`InProcessHub::shutdown`].
    pub fn join(self) -> Vec<RobotReport> {
        self.server.join().expect("listener thread panicked");
        self.robots.wait_until_finished()
    }

    pub fn shutdown(self) -> Vec<RobotReport> {
        self.trigger.trigger();
        self.join()
    }
}
