//! Shared domain enumerations aligned with persisted host columns.

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Outcome of evaluating a submitted comment against the moderation policy.
///
/// Decided exactly once at intake; a persisted comment never transitions
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationState {
    PendingModeration,
    Published,
    Error,
}

impl ModerationState {
    pub fn as_str(self) -> &'static str {
        match self {
            ModerationState::PendingModeration => "pending_moderation",
            ModerationState::Published => "published",
            ModerationState::Error => "error",
        }
    }

    /// Column discriminant used by the host comment table.
    pub fn as_i16(self) -> i16 {
        match self {
            ModerationState::PendingModeration => 0,
            ModerationState::Published => 1,
            ModerationState::Error => 2,
        }
    }

    pub fn from_i16(value: i16) -> Result<Self, DomainError> {
        match value {
            0 => Ok(ModerationState::PendingModeration),
            1 => Ok(ModerationState::Published),
            2 => Ok(ModerationState::Error),
            other => Err(DomainError::invariant(format!(
                "unknown moderation state discriminant `{other}`"
            ))),
        }
    }
}

/// Severity of a queued user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Info,
    Ok,
}
