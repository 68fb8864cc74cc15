//! One-shot precondition checks run before the polling loop starts.

use thiserror::Error;
use tracing::{error, info};

use crate::config::Credentials;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartupError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    CredentialMissing(Vec<&'static str>),
}

/// Verify every credential is non-empty.
///
/// Each one is checked and logged individually so a single run reports all
/// of the gaps, not just the first.
pub fn check_credentials(creds: &Credentials) -> Result<(), StartupError> {
    let mut missing = Vec::new();

    for (name, value) in creds.entries() {
        if value.trim().is_empty() {
            error!(variable = name, "Required environment variable is missing");
            missing.push(name);
        } else {
            info!(variable = name, "Environment variable loaded");
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(StartupError::CredentialMissing(missing))
    }
}
