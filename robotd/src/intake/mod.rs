// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! Network intake: accepts clients, turns request lines into instructions and
//! pushes them into the mailbox. A SHUTDOWN line stops the whole hub.

pub mod connection;
pub mod server;
pub mod shutdown;

pub use connection::{handle_line, Flow};
pub use server::Server;
pub use shutdown::ShutdownTrigger;
