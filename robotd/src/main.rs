// SPDX-License-Identifier: MIT
// robotd: dispatch hub for robot instructions
//
// - Accepts `ID|COMMAND|PARAMS` lines over TCP.
// - Hands each instruction to the robot thread with that id.
// - `0|SHUTDOWN` stops every robot and the listener.
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use clap::Parser;
use log::{info, warn};

use robotd::config::{Args, Config};
use robotd::intake::Server;
use robotd::mailbox::Mailbox;
use robotd::robots::{RobotExit, RobotPool};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let args = Args::parse();
    let config = match Config::try_from(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    info!("Starting robotd with {} robot(s)", config.robots);

    let mailbox = Mailbox::new();
    let robots = RobotPool::spawn(config.robots, &mailbox, config.work_time.clone())?;

    let server = match Server::bind(config.listen_addr, mailbox.clone(), config.drain_timeout) {
        Ok(server) => server,
        Err(e) => {
            // release the robots before bailing out
            mailbox.shutdown();
            robots.wait_until_finished();
            return Err(e);
        }
    };
    server.run();

    // no-op unless the server stopped without a SHUTDOWN line
    mailbox.shutdown();
    for report in robots.wait_until_finished() {
        if report.exit != RobotExit::Shutdown {
            warn!("Robot {} ended abnormally: {:?}", report.id, report.exit);
        }
    }

    info!("Stopping robotd");
    Ok(())
}
