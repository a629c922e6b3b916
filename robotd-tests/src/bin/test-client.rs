// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! Scripted client that plays the part of an external control panel:
//! two valid orders, one invalid order and finally a global shutdown.

use std::time::Duration;

use clap::Parser;
use robotd_tests::client::RobotClient;

const SCRIPT: [&str; 4] = ["1|MOVE|10", "2|TURN|LEFT", "99|FLY|ALTO", "0|SHUTDOWN|"];

#[derive(Debug, Parser)]
#[command(about = "Sends a fixed set of orders to robotd and prints the replies")]
struct Args {
    /// Address of robotd
    #[arg(long, default_value = "127.0.0.1:9000")]
    addr: String,

    /// Print the transcript as JSON instead of plain text
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut client = RobotClient::connect(&args.addr, Some(Duration::from_secs(5)))?;

    if !args.json {
        println!("Connected to {}. Sending orders...", args.addr);
    }
    for line in SCRIPT {
        let reply = client.send(line)?;
        if !args.json {
            println!("{line:<14} -> {reply}");
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(client.transcript())?);
    }
    Ok(())
}
