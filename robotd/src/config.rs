// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::net::{IpAddr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// TCP port for client connections
    #[arg(long, default_value_t = 9000)]
    pub port: u16,

    /// Number of robots, they get the ids 1..=N
    #[arg(long, default_value_t = 3)]
    pub robots: u32,

    /// Shortest simulated execution time per instruction
    #[arg(long = "work-min-ms", value_name = "MS", default_value_t = 500)]
    pub work_min_ms: u64,

    /// Longest simulated execution time per instruction
    #[arg(long = "work-max-ms", value_name = "MS", default_value_t = 1500)]
    pub work_max_ms: u64,

    #[arg(
        long = "drain-timeout-ms",
        value_name = "MS",
        default_value_t = 2000,
        help = "How long open connections may linger after shutdown before they are dropped"
    )]
    pub drain_timeout_ms: u64,
}

pub fn validate_args(args: &Args) -> Result<(), String> {
    if args.robots == 0 {
        return Err("--robots must be at least 1".into());
    }
    if i32::try_from(args.robots).is_err() {
        return Err(format!("--robots must not exceed {}", i32::MAX));
    }
    if args.work_min_ms > args.work_max_ms {
        return Err(format!(
            "--work-min-ms ({}) must not be greater than --work-max-ms ({})",
            args.work_min_ms, args.work_max_ms
        ));
    }
    Ok(())
}

/// Validated settings handed to the components at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub robots: u32,
    pub work_time: RangeInclusive<Duration>,
    pub drain_timeout: Duration,
}

impl TryFrom<&Args> for Config {
    type Error = String;

    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        validate_args(args)?;
        Ok(Config {
            listen_addr: SocketAddr::new(args.bind, args.port),
            robots: args.robots,
            work_time: Duration::from_millis(args.work_min_ms)
                ..=Duration::from_millis(args.work_max_ms),
            drain_timeout: Duration::from_millis(args.drain_timeout_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("robotd").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::try_from(&parse(&[])).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.robots, 3);
        assert_eq!(
            config.work_time,
            Duration::from_millis(500)..=Duration::from_millis(1500)
        );
        assert_eq!(config.drain_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_overrides() {
        let args = parse(&[
            "--bind",
            "127.0.0.1",
            "--port",
            "0",
            "--robots",
            "5",
            "--work-min-ms",
            "0",
            "--work-max-ms",
            "0",
        ]);
        let config = Config::try_from(&args).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:0".parse::<SocketAddr>().unwrap());
        assert_eq!(config.robots, 5);
        assert_eq!(config.work_time, Duration::ZERO..=Duration::ZERO);
    }

    #[test]
    fn test_rejects_zero_robots() {
        assert!(validate_args(&parse(&["--robots", "0"])).is_err());
    }

    #[test]
    fn test_rejects_inverted_work_range() {
        let args = parse(&["--work-min-ms", "10", "--work-max-ms", "5"]);
        assert!(Config::try_from(&args).is_err());
    }
}
