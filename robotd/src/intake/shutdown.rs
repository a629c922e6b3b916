// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use async_channel::{Receiver, Sender};

use crate::mailbox::Mailbox;

/// Starts the system-wide shutdown: the mailbox stops and releases every robot,
/// and the listener stops accepting.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    mailbox: Mailbox,
    stop: Sender<()>,
}

impl ShutdownTrigger {
    /// Returns the trigger and the receiver the listener waits on. The receiver
    /// errors out once the trigger fired.
    pub fn new(mailbox: Mailbox) -> (Self, Receiver<()>) {
        let (stop, stopped) = async_channel::bounded(1);
        (Self { mailbox, stop }, stopped)
    }

    pub fn trigger(&self) {
        self.mailbox.shutdown();
        self.stop.close();
    }

    pub fn is_triggered(&self) -> bool {
        self.stop.is_closed()
    }
}
