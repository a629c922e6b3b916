// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>
//! # Design: Shared Instruction Mailbox
//!
//! ## Overview
//! One buffer of pending instructions shared by every producer (client
//! connections) and every consumer (robot threads).
//!
//! - Producers append with `put`; it never blocks.
//! - A robot asks for *its* next instruction with `take_for(id)` and sleeps on a
//!   condition variable until one shows up or the mailbox shuts down.
//! - Every `put`, `shutdown` and cancellation wakes *all* sleepers. Each one
//!   re-scans the buffer for its own id and goes back to sleep if nothing matches.
//!   There are no per-robot queues.
//! - `shutdown` is one-way: the buffer is cleared, later puts are rejected and
//!   every `take_for` returns `Delivery::ShuttingDown`.
//!
//! ```text
//!         +-----------+   +-----------+   +-----------+
//!         | client A  |   | client B  |   | client C  |
//!         +-----+-----+   +-----+-----+   +-----+-----+
//!               |  put          |  put          |  shutdown
//!               v               v               v
//!         +-----+---------------+---------------+-----+
//!         |   Mutex { pending: [..], active }          |
//!         |   Condvar (notify_all)                     |
//!         +-----+---------------+---------------+-----+
//!               |  take_for(1)  |  take_for(2)  |  take_for(3)
//!         +-----v-----+   +-----v-----+   +-----v-----+
//!         |  robot 1  |   |  robot 2  |   |  robot 3  |
//!         +-----------+   +-----------+   +-----------+
//! ```

pub mod cancel;
pub mod instruction_box;

pub use cancel::CancelToken;
pub use instruction_box::{Delivery, Mailbox, Rejected};
