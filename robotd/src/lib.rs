// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

pub mod config;
pub mod intake;
pub mod mailbox;
pub mod robots;
