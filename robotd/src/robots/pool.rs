// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Context;
use log::{debug, error};
use robot_protocol::RobotId;

use crate::mailbox::{CancelToken, Mailbox};
use crate::robots::robot::{Robot, RobotExit, RobotReport};

struct RobotThread {
    handle: JoinHandle<RobotReport>,
    cancel: CancelToken,
}

/// Owns the robot threads, one per id.
pub struct RobotPool {
    robots: BTreeMap<RobotId, RobotThread>,
}

impl RobotPool {
    /// Starts robots with the ids `1..=count`.
    pub fn spawn(
        count: u32,
        mailbox: &Mailbox,
        work_time: RangeInclusive<Duration>,
    ) -> anyhow::Result<Self> {
        let ids = (1..=count)
            .map(RobotId::try_from)
            .collect::<Result<Vec<_>, _>>()
            .context("robot count out of range")?;
        Self::spawn_ids(ids, mailbox, work_time)
    }

    fn spawn_ids(
        ids: impl IntoIterator<Item = RobotId>,
        mailbox: &Mailbox,
        work_time: RangeInclusive<Duration>,
    ) -> anyhow::Result<Self> {
        let mut robots = BTreeMap::new();
        for id in ids {
            let cancel = mailbox.cancel_token();
            let robot = Robot::new(id, mailbox.clone(), cancel.clone(), work_time.clone());
            let handle = thread::Builder::new()
                .name(format!("robot-{id}"))
                .spawn(move || robot.run())
                .with_context(|| format!("failed to spawn thread for robot {id}"))?;
            robots.insert(id, RobotThread { handle, cancel });
        }
        Ok(Self { robots })
    }

    pub fn ids(&self) -> impl Iterator<Item = RobotId> + '_ {
        self.robots.keys().copied()
    }

    /// Interrupts one robot. Returns `false` if there is no such robot.
    pub fn cancel(&self, id: RobotId) -> bool {
        match self.robots.get(&id) {
            Some(robot) => {
                robot.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for robot in self.robots.values() {
            robot.cancel.cancel();
        }
    }

    /// Joins every robot thread. Blocks until the mailbox shuts down or all
    /// robots have been cancelled.
    pub fn wait_until_finished(self) -> Vec<RobotReport> {
        debug!("Waiting for {} robot(s) to finish", self.robots.len());
        self.robots
            .into_iter()
            .map(|(id, robot)| {
                robot.handle.join().unwrap_or_else(|_| {
                    error!("Robot {id} panicked");
                    RobotReport {
                        id,
                        executed: 0,
                        exit: RobotExit::Panicked,
                    }
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_protocol::{CommandType, Instruction};

    #[test]
    fn test_pool_assigns_ids_from_one() {
        let mailbox = Mailbox::new();
        let pool = RobotPool::spawn(3, &mailbox, Duration::ZERO..=Duration::ZERO).unwrap();
        assert_eq!(pool.ids().collect::<Vec<_>>(), vec![1, 2, 3]);
        mailbox.shutdown();
        pool.wait_until_finished();
    }

    #[test]
    fn test_shutdown_stops_every_robot() {
        let mailbox = Mailbox::new();
        let pool = RobotPool::spawn(3, &mailbox, Duration::ZERO..=Duration::ZERO).unwrap();

        for id in 1..=3 {
            mailbox.put(Instruction::new(id, CommandType::Status, "")).unwrap();
        }
        while mailbox.pending_count() > 0 {
            thread::sleep(Duration::from_millis(10));
        }
        mailbox.shutdown();

        let reports = pool.wait_until_finished();
        assert_eq!(reports.len(), 3);
        for report in reports {
            assert_eq!(report.exit, RobotExit::Shutdown);
            assert_eq!(report.executed, 1);
        }
    }

    #[test]
    fn test_cancel_single_robot() {
        let mailbox = Mailbox::new();
        let pool = RobotPool::spawn(2, &mailbox, Duration::ZERO..=Duration::ZERO).unwrap();

        assert!(pool.cancel(2));
        assert!(!pool.cancel(42));
        thread::sleep(Duration::from_millis(50));
        mailbox.shutdown();

        let reports = pool.wait_until_finished();
        assert_eq!(reports[0].exit, RobotExit::Shutdown);
        assert_eq!(reports[1].exit, RobotExit::Cancelled);
    }

    #[test]
    fn test_cancel_all_without_shutdown() {
        let mailbox = Mailbox::new();
        let pool = RobotPool::spawn(2, &mailbox, Duration::ZERO..=Duration::ZERO).unwrap();
        pool.cancel_all();

        let reports = pool.wait_until_finished();
        assert!(reports.iter().all(|r| r.exit == RobotExit::Cancelled));
        assert!(mailbox.is_active());
    }
}
