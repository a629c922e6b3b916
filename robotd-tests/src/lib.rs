// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

pub mod client;
pub mod in_process;
pub mod run_robotd;
pub mod transcript;
