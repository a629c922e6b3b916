// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::ops::RangeInclusive;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;
use robot_protocol::{Instruction, RobotId};

use crate::mailbox::{CancelToken, Delivery, Mailbox};

/// How a robot thread ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotExit {
    /// The mailbox shut down; the normal way out.
    Shutdown,
    /// The robot was cancelled while waiting for work.
    Cancelled,
    /// The robot thread panicked.
    Panicked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotReport {
    pub id: RobotId,
    pub executed: u64,
    pub exit: RobotExit,
}

/// A single robot. It only ever takes from the mailbox.
pub struct Robot {
    id: RobotId,
    mailbox: Mailbox,
    cancel: CancelToken,
    work_time: RangeInclusive<Duration>,
    executed: u64,
}

impl Robot {
    pub fn new(
        id: RobotId,
        mailbox: Mailbox,
        cancel: CancelToken,
        work_time: RangeInclusive<Duration>,
    ) -> Self {
        Self {
            id,
            mailbox,
            cancel,
            work_time,
            executed: 0,
        }
    }

    /// Takes and executes instructions until the mailbox shuts down or the
    /// robot is cancelled.
    pub fn run(mut self) -> RobotReport {
        info!("Robot {} ONLINE and waiting for orders", self.id);

        let exit = loop {
            match self.mailbox.take_for_or_cancel(self.id, &self.cancel) {
                Delivery::Delivered(instruction) => self.execute(instruction),
                Delivery::ShuttingDown => break RobotExit::Shutdown,
                Delivery::Cancelled => break RobotExit::Cancelled,
            }
        };

        match exit {
            RobotExit::Cancelled => warn!(
                "Robot {} interrupted while waiting, {} instruction(s) executed",
                self.id, self.executed
            ),
            _ => info!(
                "Robot {} OFFLINE, {} instruction(s) executed",
                self.id, self.executed
            ),
        }

        RobotReport {
            id: self.id,
            executed: self.executed,
            exit,
        }
    }

    /// Simulates the physical work. Runs outside the mailbox lock.
    fn execute(&mut self, instruction: Instruction) {
        info!(
            "Robot {} PROCESSING: {} [{}]",
            self.id,
            instruction.command(),
            instruction.params()
        );

        let work_time = self.pick_work_time();
        debug!("Robot {} busy for {:?}", self.id, work_time);
        thread::sleep(work_time);

        self.executed += 1;
        info!("Robot {} TASK DONE: {}", self.id, instruction.command());
    }

    fn pick_work_time(&self) -> Duration {
        let (min, max) = (*self.work_time.start(), *self.work_time.end());
        if min >= max {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }
}
