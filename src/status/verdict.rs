//! Turns the newest record of a batch into a notification sentence.

use serde_json::Value;
use tracing::error;

use super::{HomeworkStatus, InterpretError, TrackedRecord};

/// Parse one raw record into a [`TrackedRecord`].
pub fn parse_record(record: &Value) -> Result<TrackedRecord, InterpretError> {
    let Some(name) = record.get("homework_name") else {
        error!("record has no \"homework_name\" key");
        return Err(InterpretError::MissingField("homework_name"));
    };

    let Some(status) = record.get("status") else {
        error!("record has no \"status\" key");
        return Err(InterpretError::MissingField("status"));
    };

    let name = match name {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let raw_status = match status {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let status = HomeworkStatus::parse(&raw_status).ok_or_else(|| {
        error!(status = %raw_status, "undocumented review status");
        InterpretError::UnknownStatus(raw_status.clone())
    })?;

    Ok(TrackedRecord { name, status })
}

/// Interpret one record as a notification sentence.
pub fn interpret(record: &Value) -> Result<String, InterpretError> {
    parse_record(record).map(|r| r.message())
}
