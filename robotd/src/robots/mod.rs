// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! Robot workers: one thread per robot id, each looping on
//! `Mailbox::take_for_or_cancel` until the mailbox shuts down.

pub mod pool;
pub mod robot;

pub use pool::RobotPool;
pub use robot::{Robot, RobotExit, RobotReport};
