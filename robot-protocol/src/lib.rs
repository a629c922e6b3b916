// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! Wire-level vocabulary shared by `robotd` and its clients.
//!
//! A request is a single text line `ID|COMMAND|PARAMS` (the trailing `|PARAMS`
//! is optional); every request line is answered by exactly one [`Reply`] line.

pub mod instruction;
pub mod parser;
pub mod reply;

pub use instruction::{CommandType, Instruction, RobotId};
pub use parser::{parse_instruction, ParseError};
pub use reply::{Reply, ReplyParseError};
