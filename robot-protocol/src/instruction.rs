// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::fmt;

/// Numeric identifier of the robot an instruction is addressed to.
pub type RobotId = i32;

/// The closed set of command kinds a robot understands.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CommandType {
    /// Travel a given distance.
    Move,
    /// Pick up the object at the current position.
    Pick,
    /// Rotate, e.g. `LEFT` or `RIGHT`.
    Turn,
    /// Report battery, position and the like.
    Status,
    /// Stop the whole hub. Never delivered to a robot by the intake path.
    Shutdown,
    /// Placeholder for unrecognised commands. The parser never produces it.
    Unknown,
}

impl CommandType {
    /// Commands that may appear on the wire.
    pub const ACCEPTED: [CommandType; 5] = [
        CommandType::Move,
        CommandType::Pick,
        CommandType::Turn,
        CommandType::Status,
        CommandType::Shutdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Move => "MOVE",
            CommandType::Pick => "PICK",
            CommandType::Turn => "TURN",
            CommandType::Status => "STATUS",
            CommandType::Shutdown => "SHUTDOWN",
            CommandType::Unknown => "UNKNOWN",
        }
    }

    /// Case-insensitive lookup of a wire command. `UNKNOWN` is not a wire command.
    pub fn from_wire(raw: &str) -> Option<CommandType> {
        Self::ACCEPTED
            .into_iter()
            .find(|command| command.as_str().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated instruction. Immutable once built; it is moved, never shared,
/// from the parser into the mailbox and from there to exactly one robot.
#[derive(Debug, PartialEq, Eq)]
pub struct Instruction {
    target_id: RobotId,
    command: CommandType,
    params: String,
}

impl Instruction {
    pub fn new(target_id: RobotId, command: CommandType, params: impl Into<String>) -> Self {
        Self {
            target_id,
            command,
            params: params.into(),
        }
    }

    pub fn target_id(&self) -> RobotId {
        self.target_id
    }

    pub fn command(&self) -> CommandType {
        self.command
    }

    pub fn params(&self) -> &str {
        &self.params
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}|{}", self.target_id, self.command)
        } else {
            write!(f, "{}|{}|{}", self.target_id, self.command, self.params)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire_ignores_case() {
        assert_eq!(CommandType::from_wire("move"), Some(CommandType::Move));
        assert_eq!(CommandType::from_wire("Turn"), Some(CommandType::Turn));
        assert_eq!(CommandType::from_wire("SHUTDOWN"), Some(CommandType::Shutdown));
    }

    #[test]
    fn test_unknown_is_not_a_wire_command() {
        assert_eq!(CommandType::from_wire("UNKNOWN"), None);
        assert_eq!(CommandType::from_wire("FLY"), None);
        assert_eq!(CommandType::from_wire(""), None);
    }

    #[test]
    fn test_display_matches_wire_format() {
        assert_eq!(
            Instruction::new(5, CommandType::Turn, "RIGHT").to_string(),
            "5|TURN|RIGHT"
        );
        assert_eq!(
            Instruction::new(0, CommandType::Shutdown, "").to_string(),
            "0|SHUTDOWN"
        );
    }
}
