// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::parser::FIELD_SEPARATOR;

/// The single line sent back for every request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok(String),
    Error(String),
}

impl Reply {
    pub fn ok(message: impl Into<String>) -> Self {
        Reply::Ok(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Reply::Error(message.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Reply::Ok(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Reply::Ok(message) | Reply::Error(message) => message,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok(message) => write!(f, "OK{FIELD_SEPARATOR}{message}"),
            Reply::Error(message) => write!(f, "ERROR{FIELD_SEPARATOR}{message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed reply line '{0}'")]
pub struct ReplyParseError(pub String);

impl FromStr for Reply {
    type Err = ReplyParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        match line.split_once(FIELD_SEPARATOR) {
            Some(("OK", message)) => Ok(Reply::ok(message)),
            Some(("ERROR", message)) => Ok(Reply::error(message)),
            _ => Err(ReplyParseError(line.to_string())),
        }
    }
}
