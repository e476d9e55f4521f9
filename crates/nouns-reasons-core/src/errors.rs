// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Process exit statuses, following the BSD `sysexits` numbering.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ExitCode {
    Ok = 0,
    Unavailable = 69,
    Software = 70,
    OsError = 71,
    Config = 78,
}

impl ExitCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Unavailable => "unavailable",
            Self::Software => "software",
            Self::OsError => "os_error",
            Self::Config => "config",
        }
    }

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Domain input that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { kind, .. } => *kind,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIdentifier {
                kind,
                value,
                reason,
            } => write!(f, "invalid {kind} `{value}`: {reason}"),
        }
    }
}

impl std::error::Error for Error {}

/// One-line JSON report emitted when the service cannot start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineError {
    pub exit: ExitCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl MachineError {
    #[must_use]
    pub fn new(exit: ExitCode, message: impl Into<String>) -> Self {
        Self {
            exit,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }

    /// JSON form, falling back to the plain message.
    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.exit.as_str(), self.exit.as_i32(), self.message)
    }
}

impl std::error::Error for MachineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_identifier_display_names_kind_and_reason() {
        let err = Error::InvalidIdentifier {
            kind: "address",
            value: "0xzz".to_string(),
            reason: "must be 40 hex digits",
        };
        assert_eq!(err.kind(), "address");
        assert_eq!(
            err.to_string(),
            "invalid address `0xzz`: must be 40 hex digits"
        );
    }

    #[test]
    fn exit_codes_follow_sysexits() {
        assert_eq!(ExitCode::Config.as_i32(), 78);
        assert_eq!(ExitCode::Unavailable.as_i32(), 69);
        assert_eq!(ExitCode::Ok.as_i32(), 0);
    }

    #[test]
    fn machine_error_json_line() {
        let err = MachineError::new(ExitCode::Config, "page_size must be > 0")
            .with_detail("var", "REASONS_PAGE_SIZE")
            .with_detail("value", 0);
        assert_eq!(
            err.to_json_line(),
            r#"{"exit":"config","message":"page_size must be > 0","details":{"value":"0","var":"REASONS_PAGE_SIZE"}}"#
        );
        let bare = MachineError::new(ExitCode::OsError, "bind failed");
        assert_eq!(bare.to_json_line(), r#"{"exit":"os_error","message":"bind failed"}"#);
    }
}
