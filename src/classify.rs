//! Error taxonomy for a polling cycle.
//!
//! Every failure a cycle can hit lands in exactly one [`ErrorKind`]. The
//! rendered message is what gets deduplicated and forwarded to the operator,
//! so it must be stable for repeated occurrences of the same condition.

use thiserror::Error;

use crate::status::{InterpretError, ValidationError};
use crate::transport::FetchError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("connection problem while reaching the status API")]
    ConnectionFailure,

    #[error("status API request timed out")]
    TimeoutFailure,

    #[error("unexpected error while querying the status API")]
    UnexpectedTransportFailure,

    #[error("status API answered {0} instead of 200")]
    BadStatusCode(u16),

    #[error("malformed API response: {0}")]
    ValidationFailure(#[from] ValidationError),

    #[error("cannot interpret review record: {0}")]
    InterpretFailure(#[from] InterpretError),
}

impl ErrorKind {
    /// Text forwarded to the operator and compared against the last error.
    pub fn render(&self) -> String {
        format!("Program failure: {self}")
    }
}

/// Map a transport failure onto the taxonomy.
///
/// The transport's own detail text is deliberately not part of the kind:
/// it tends to vary between attempts and would defeat deduplication.
pub fn classify(err: &FetchError) -> ErrorKind {
    match err {
        FetchError::Connect(_) => ErrorKind::ConnectionFailure,
        FetchError::Timeout(_) => ErrorKind::TimeoutFailure,
        FetchError::Other(_) => ErrorKind::UnexpectedTransportFailure,
    }
}

/// Map an HTTP status code; `None` means the response may proceed.
pub fn classify_status(code: u16) -> Option<ErrorKind> {
    (code != 200).then_some(ErrorKind::BadStatusCode(code))
}

impl From<FetchError> for ErrorKind {
    fn from(err: FetchError) -> Self {
        classify(&err)
    }
}
