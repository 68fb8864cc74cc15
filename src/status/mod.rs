//! Review status model: the API envelope, its records, and the three verdicts.

pub mod validate;
pub mod verdict;

use thiserror::Error;

pub use validate::{validate, validate_bytes};
pub use verdict::interpret;

/// Shape violations found in a decoded API response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("response is not a mapping (got {found})")]
    NotAMapping { found: &'static str },

    #[error("response has no \"{0}\" key")]
    MissingField(&'static str),

    #[error("response field \"{field}\" has the wrong type (got {found})")]
    WrongType {
        field: &'static str,
        found: &'static str,
    },
}

/// Problems turning a single record into a notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpretError {
    #[error("record has no \"{0}\" key")]
    MissingField(&'static str),

    #[error("review status \"{0}\" is not documented")]
    UnknownStatus(String),
}

/// Review state reported by the API for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "approved" => Some(Self::Approved),
            "reviewing" => Some(Self::Reviewing),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Fixed human-readable text bound to the status.
    pub fn verdict(self) -> &'static str {
        match self {
            Self::Approved => "The work has been reviewed, no issues found. Hooray!",
            Self::Reviewing => "The work has been taken for review.",
            Self::Rejected => "The work has been reviewed, the reviewer found issues.",
        }
    }
}

impl std::fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HomeworkStatus::Approved => write!(f, "approved"),
            HomeworkStatus::Reviewing => write!(f, "reviewing"),
            HomeworkStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A validated response. Records stay as raw JSON until the head one is
/// interpreted; older entries in the batch are never looked at.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub homeworks: Vec<serde_json::Value>,
    pub current_date: i64,
}

impl Envelope {
    /// Most recent record, if the batch is non-empty.
    pub fn latest(&self) -> Option<&serde_json::Value> {
        self.homeworks.first()
    }
}

/// One interpreted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRecord {
    pub name: String,
    pub status: HomeworkStatus,
}

impl TrackedRecord {
    /// Notification sentence announcing this record's state.
    pub fn message(&self) -> String {
        format!(
            "Review status changed for \"{}\". {}",
            self.name,
            self.status.verdict()
        )
    }
}

/// JSON type name for log and error output.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        serde_json::Value::Number(_) => "float",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "mapping",
    }
}
