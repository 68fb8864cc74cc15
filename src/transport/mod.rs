//! Outbound seams: the status API and the messaging channel.

pub mod http;
pub mod telegram;

use thiserror::Error;

pub use http::HttpStatusSource;
pub use telegram::TelegramNotifier;

/// Failures raised while talking to the status API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not connect to the status API: {0}")]
    Connect(String),

    #[error("status API request timed out: {0}")]
    Timeout(String),

    #[error("unexpected error while querying the status API: {0}")]
    Other(String),
}

/// Failures raised while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("messaging transport error: {0}")]
    Transport(String),

    #[error("messaging API rejected the message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Whatever the status API answered, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Source of review status snapshots.
#[async_trait::async_trait]
pub trait StatusSource: Send + Sync {
    /// Query for updates since `from_date` (epoch seconds).
    async fn fetch(&self, from_date: i64) -> Result<RawResponse, FetchError>;
}

/// Destination for plain-text notifications.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

#[async_trait::async_trait]
impl<T: StatusSource + ?Sized> StatusSource for std::sync::Arc<T> {
    async fn fetch(&self, from_date: i64) -> Result<RawResponse, FetchError> {
        (**self).fetch(from_date).await
    }
}

#[async_trait::async_trait]
impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        (**self).send(text).await
    }
}
