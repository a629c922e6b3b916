// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use robot_protocol::{Instruction, RobotId};
use thiserror::Error;

use crate::mailbox::cancel::CancelToken;

/// Outcome of waiting for work.
#[derive(Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The earliest pending instruction addressed to the caller.
    Delivered(Instruction),
    /// The mailbox has shut down; the caller must stop asking.
    ShuttingDown,
    /// The caller's cancel token fired while it was waiting. Nothing was removed.
    Cancelled,
}

/// A `put` after shutdown. The instruction is handed back untouched.
#[derive(Debug, PartialEq, Eq, Error)]
#[error("mailbox is shut down, instruction for robot {} rejected", .0.target_id())]
pub struct Rejected(pub Instruction);

#[derive(Debug)]
pub(super) struct State {
    pending: VecDeque<Instruction>,
    active: bool,
}

#[derive(Debug)]
pub(super) struct Shared {
    state: Mutex<State>,
    changed: Condvar,
}

impl Shared {
    // The critical sections below never panic halfway through a mutation,
    // so a poisoned lock still guards consistent state.
    pub(super) fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wakes every waiter. Taking the lock first orders the wake-up after any
    /// waiter that is between checking its predicate and going to sleep.
    pub(super) fn wake_all(&self) {
        drop(self.lock());
        self.changed.notify_all();
    }
}

/// Handle to the shared instruction buffer. Cloning is cheap and every clone
/// refers to the same buffer.
#[derive(Debug, Clone)]
pub struct Mailbox {
    shared: Arc<Shared>,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    pending: VecDeque::new(),
                    active: true,
                }),
                changed: Condvar::new(),
            }),
        }
    }

    /// Appends an instruction and wakes all waiting robots.
    pub fn put(&self, instruction: Instruction) -> Result<(), Rejected> {
        let target_id = instruction.target_id();
        {
            let mut state = self.shared.lock();
            if !state.active {
                return Err(Rejected(instruction));
            }
            state.pending.push_back(instruction);
        }
        self.shared.changed.notify_all();
        debug!("Mailbox: instruction queued for robot {target_id}");
        Ok(())
    }

    /// Blocks until an instruction for `id` is pending or the mailbox shuts down.
    pub fn take_for(&self, id: RobotId) -> Delivery {
        self.take(id, None)
    }

    /// Like [`Mailbox::take_for`], but gives up with [`Delivery::Cancelled`] as
    /// soon as `cancel` fires. `cancel` must come from [`Mailbox::cancel_token`]
    /// on this mailbox, otherwise firing it does not wake the waiter.
    pub fn take_for_or_cancel(&self, id: RobotId, cancel: &CancelToken) -> Delivery {
        debug_assert!(cancel.belongs_to(&self.shared));
        self.take(id, Some(cancel))
    }

    fn take(&self, id: RobotId, cancel: Option<&CancelToken>) -> Delivery {
        let mut state = self.shared.lock();
        loop {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Delivery::Cancelled;
            }
            if !state.active {
                return Delivery::ShuttingDown;
            }
            let position = state
                .pending
                .iter()
                .position(|instruction| instruction.target_id() == id);
            if let Some(instruction) = position.and_then(|i| state.pending.remove(i)) {
                return Delivery::Delivered(instruction);
            }
            state = self
                .shared
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Deactivates the mailbox for good, discards everything pending and
    /// releases all waiters. Calling it again does nothing.
    pub fn shutdown(&self) {
        let (was_active, discarded) = {
            let mut state = self.shared.lock();
            let was_active = std::mem::replace(&mut state.active, false);
            let discarded = state.pending.len();
            state.pending.clear();
            (was_active, discarded)
        };
        self.shared.changed.notify_all();
        if was_active {
            warn!("Mailbox: shutdown received, discarded {discarded} pending instruction(s)");
        }
    }

    pub fn is_active(&self) -> bool {
        self.shared.lock().active
    }

    pub fn pending_count(&self) -> usize {
        self.shared.lock().pending.len()
    }

    /// Creates a token that can interrupt `take_for_or_cancel` on this mailbox.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken::new(self.shared.clone())
    }
}
