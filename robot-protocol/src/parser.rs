// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use log::warn;
use thiserror::Error;

use crate::instruction::{CommandType, Instruction, RobotId};

pub const FIELD_SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty message")]
    Empty,
    #[error("invalid format, expected ID|COMMAND|PARAMS")]
    MissingCommand,
    #[error("robot id must be an integer, got '{0}'")]
    InvalidId(String),
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
}

/// Parses one request line of the form `ID|COMMAND|PARAMS`.
///
/// Every field is trimmed. `PARAMS` is the whole remainder after the second
/// separator and may itself contain `|`; it is empty when omitted.
pub fn parse_instruction(line: &str) -> Result<Instruction, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut fields = line.splitn(3, FIELD_SEPARATOR);
    let raw_id = fields.next().unwrap_or_default().trim();
    let raw_command = match fields.next() {
        Some(raw_command) => raw_command.trim(),
        None => return Err(ParseError::MissingCommand),
    };
    let params = fields.next().map(str::trim).unwrap_or_default();

    let target_id: RobotId = raw_id.parse().map_err(|_| {
        warn!("Failed to parse robot id: {raw_id:?}");
        ParseError::InvalidId(raw_id.to_string())
    })?;

    let command = CommandType::from_wire(raw_command).ok_or_else(|| {
        warn!("Unknown command: {raw_command:?}");
        ParseError::UnknownCommand(raw_command.to_string())
    })?;

    Ok(Instruction::new(target_id, command, params))
}
