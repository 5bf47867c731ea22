//! Whitelisted string options for rebuild statements.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `DATA_COMPRESSION` applied when rebuilding an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DataCompression {
    /// Keep the compression the index already has.
    #[default]
    #[serde(rename = "DEFAULT")]
    Default,
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "ROW")]
    Row,
    #[serde(rename = "PAGE")]
    Page,
}

impl DataCompression {
    /// The literal used in `WITH (DATA_COMPRESSION = ...)`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::None => "NONE",
            Self::Row => "ROW",
            Self::Page => "PAGE",
        }
    }
}

impl FromStr for DataCompression {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEFAULT" => Ok(Self::Default),
            "NONE" => Ok(Self::None),
            "ROW" => Ok(Self::Row),
            "PAGE" => Ok(Self::Page),
            _ => Err(UnknownMode),
        }
    }
}

impl fmt::Display for DataCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `ABORT_AFTER_WAIT` action for `WAIT_AT_LOW_PRIORITY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AbortAfterWait {
    /// Keep waiting with normal priority.
    #[default]
    #[serde(rename = "NONE")]
    None,
    /// Abort the maintenance statement itself.
    #[serde(rename = "SELF")]
    SelfSession,
    /// Kill the sessions blocking the maintenance statement.
    #[serde(rename = "BLOCKERS")]
    Blockers,
}

impl AbortAfterWait {
    /// The literal used in `ABORT_AFTER_WAIT = ...`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::SelfSession => "SELF",
            Self::Blockers => "BLOCKERS",
        }
    }
}

impl FromStr for AbortAfterWait {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(Self::None),
            "SELF" => Ok(Self::SelfSession),
            "BLOCKERS" => Ok(Self::Blockers),
            _ => Err(UnknownMode),
        }
    }
}

impl fmt::Display for AbortAfterWait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that is not one of the declared mode literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMode;

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown mode literal")
    }
}

impl std::error::Error for UnknownMode {}
