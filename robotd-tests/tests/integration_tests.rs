// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::{thread, time::Duration};

use robot_protocol::Reply;
use robotd::robots::RobotExit;
use robotd_tests::client::RobotClient;
use robotd_tests::in_process::InProcessHub;
use robotd_tests::transcript::Transcript;

const TIMEOUT: Option<Duration> = Some(Duration::from_secs(5));

fn wait_until_drained(hub: &InProcessHub) {
    for _ in 0..500 {
        if hub.mailbox().pending_count() == 0 {
            return;
        }
        thread::sleep(Duration::from_millis(10));
    }
    panic!("robots did not pick up their instructions");
}

#[test]
fn test_network_round_trip() {
    let hub = InProcessHub::start(3, Duration::ZERO).unwrap();
    let mut client = RobotClient::connect(hub.addr(), TIMEOUT).unwrap();

    let reply = client.send("1|MOVE|50").unwrap();
    assert!(reply.is_ok(), "robotd must acknowledge the instruction: {reply}");
    assert_eq!(reply.message(), "instruction accepted for robot 1");

    drop(client);
    let reports = hub.shutdown();
    assert!(reports.iter().all(|r| r.exit == RobotExit::Shutdown));
}

#[test]
fn test_instructions_reach_their_robots() {
    let hub = InProcessHub::start(3, Duration::ZERO).unwrap();
    let mut client = RobotClient::connect(hub.addr(), TIMEOUT).unwrap();

    for line in ["1|MOVE|10", "2|TURN|LEFT", "3|PICK|box", "1|STATUS"] {
        assert!(client.send(line).unwrap().is_ok());
    }
    wait_until_drained(&hub);

    assert_eq!(
        client.send("0|SHUTDOWN|").unwrap(),
        Reply::ok("shutting down server")
    );
    let mut reports = hub.join();
    reports.sort_by_key(|r| r.id);

    let executed: Vec<_> = reports.iter().map(|r| (r.id, r.executed)).collect();
    assert_eq!(executed, vec![(1, 2), (2, 1), (3, 1)]);
    assert!(reports.iter().all(|r| r.exit == RobotExit::Shutdown));
}

#[test]
fn test_scripted_session_transcript() {
    let hub = InProcessHub::start(2, Duration::ZERO).unwrap();
    let mut client = RobotClient::connect(hub.addr(), TIMEOUT).unwrap();

    for line in ["1|MOVE|10", "2|TURN|LEFT", "99|FLY|ALTO", "INVALID_DATA", "0|SHUTDOWN|"] {
        client.send(line).unwrap();
    }

    let replies: Vec<_> = client
        .transcript()
        .exchanges
        .iter()
        .map(|e| e.reply.as_str())
        .collect();
    assert_eq!(
        replies,
        vec![
            "OK|instruction accepted for robot 1",
            "OK|instruction accepted for robot 2",
            "ERROR|unknown command 'FLY'",
            "ERROR|invalid format, expected ID|COMMAND|PARAMS",
            "OK|shutting down server",
        ]
    );

    // the transcript survives a JSON round trip as the test-client prints it
    let json = serde_json::to_string(client.transcript()).unwrap();
    let parsed: Transcript = serde_json::from_str(&json).unwrap();
    assert_eq!(&parsed, client.transcript());

    assert!(client.is_closed_by_server().unwrap());
    hub.join();
}

#[test]
fn test_shutdown_releases_idle_robots() {
    let hub = InProcessHub::start(4, Duration::ZERO).unwrap();
    thread::sleep(Duration::from_millis(100));

    let mut client = RobotClient::connect(hub.addr(), TIMEOUT).unwrap();
    assert!(client.send("0|shutdown").unwrap().is_ok());

    let reports = hub.join();
    assert_eq!(reports.len(), 4);
    assert!(reports
        .iter()
        .all(|r| r.exit == RobotExit::Shutdown && r.executed == 0));
}

#[test]
fn test_instructions_for_unknown_robots_are_discarded_on_shutdown() {
    let hub = InProcessHub::start(1, Duration::ZERO).unwrap();
    let mut client = RobotClient::connect(hub.addr(), TIMEOUT).unwrap();

    // nobody takes robot 7's orders, they stay buffered
    assert!(client.send("7|MOVE|1").unwrap().is_ok());
    assert!(client.send("7|MOVE|2").unwrap().is_ok());
    assert_eq!(hub.mailbox().pending_count(), 2);

    assert!(client.send("0|SHUTDOWN").unwrap().is_ok());
    assert_eq!(hub.mailbox().pending_count(), 0);
    assert!(!hub.mailbox().is_active());
    hub.join();
}

#[test]
fn test_concurrent_clients() {
    let hub = InProcessHub::start(3, Duration::ZERO).unwrap();
    let addr = hub.addr();

    let clients: Vec<_> = (1..=3)
        .map(|id| {
            thread::spawn(move || {
                let mut client = RobotClient::connect(addr, TIMEOUT).unwrap();
                for step in 0..20 {
                    let reply = client.send(&format!("{id}|MOVE|{step}")).unwrap();
                    assert_eq!(reply, Reply::ok(format!("instruction accepted for robot {id}")));
                }
            })
        })
        .collect();
    for client in clients {
        client.join().unwrap();
    }
    wait_until_drained(&hub);

    let mut reports = hub.shutdown();
    reports.sort_by_key(|r| r.id);
    assert!(reports.iter().all(|r| r.executed == 20));
}

#[test]
fn test_cancelled_robot_is_reported_separately() {
    let hub = InProcessHub::start(2, Duration::ZERO).unwrap();
    assert!(hub.robots().cancel(2));
    thread::sleep(Duration::from_millis(100));

    let mut reports = hub.shutdown();
    reports.sort_by_key(|r| r.id);
    assert_eq!(reports[0].exit, RobotExit::Shutdown);
    assert_eq!(reports[1].exit, RobotExit::Cancelled);
}
