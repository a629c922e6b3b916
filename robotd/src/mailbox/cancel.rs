// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::mailbox::instruction_box::Shared;

/// Interrupts a robot blocked in [`Mailbox::take_for_or_cancel`].
///
/// Clones share the same flag. Once cancelled, a token stays cancelled.
///
/// [`Mailbox::take_for_or_cancel`]: crate::mailbox::Mailbox::take_for_or_cancel
#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    mailbox: Arc<Shared>,
}

impl CancelToken {
    pub(super) fn new(mailbox: Arc<Shared>) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            mailbox,
        }
    }

    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            self.mailbox.wake_all();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(super) fn belongs_to(&self, mailbox: &Arc<Shared>) -> bool {
        Arc::ptr_eq(&self.mailbox, mailbox)
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
