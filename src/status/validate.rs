//! Shape checks for the status API response.

use serde_json::Value;
use tracing::error;

use super::{json_kind, Envelope, ValidationError};

/// Decode a raw body and validate it. A body that is not JSON at all is
/// reported the same way as any other non-mapping.
pub fn validate_bytes(body: &[u8]) -> Result<Envelope, ValidationError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => validate(&value),
        Err(e) => {
            error!(error = %e, "response body is not valid JSON");
            Err(ValidationError::NotAMapping {
                found: "undecodable body",
            })
        }
    }
}

/// Validate a decoded response.
///
/// Checks run in a fixed order so the first violation decides the error:
/// mapping, `homeworks` present, `current_date` present, `current_date`
/// integer, `homeworks` list.
pub fn validate(raw: &Value) -> Result<Envelope, ValidationError> {
    let Some(map) = raw.as_object() else {
        let found = json_kind(raw);
        error!(%found, "response is not a mapping");
        return Err(ValidationError::NotAMapping { found });
    };

    let Some(homeworks) = map.get("homeworks") else {
        error!("response has no \"homeworks\" key");
        return Err(ValidationError::MissingField("homeworks"));
    };

    let Some(current_date) = map.get("current_date") else {
        error!("response has no \"current_date\" key");
        return Err(ValidationError::MissingField("current_date"));
    };

    let Some(current_date) = current_date.as_i64() else {
        let found = json_kind(current_date);
        error!(%found, "\"current_date\" is not an integer");
        return Err(ValidationError::WrongType {
            field: "current_date",
            found,
        });
    };

    let Some(homeworks) = homeworks.as_array() else {
        let found = json_kind(homeworks);
        error!(%found, "\"homeworks\" is not a list");
        return Err(ValidationError::WrongType {
            field: "homeworks",
            found,
        });
    };

    Ok(Envelope {
        homeworks: homeworks.clone(),
        current_date,
    })
}
