//! The polling loop: fetch, validate, interpret, notify, sleep.
//!
//! One cycle runs to completion before the next starts. Every failure inside
//! a cycle is classified and absorbed here; nothing escapes to the caller.
//! The cursor advances as soon as a response validates, before the newest
//! record is interpreted, so a record that cannot be interpreted is reported
//! once and then left behind.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::classify::{classify, classify_status, ErrorKind};
use crate::config::PollingConfig;
use crate::status::{self, Envelope};
use crate::transport::{Notifier, StatusSource};

/// Lower bound (epoch seconds) of the next query window. Never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor(i64);

impl Cursor {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Wall-clock now, pushed back by `lookback_secs`.
    pub fn starting_now(lookback_secs: u64) -> Self {
        let lookback = i64::try_from(lookback_secs).unwrap_or(i64::MAX);
        Self(chrono::Utc::now().timestamp().saturating_sub(lookback))
    }

    pub fn value(self) -> i64 {
        self.0
    }

    /// Move forward to `next`. Returns false (and stays put) if that would
    /// move the cursor backwards.
    fn advance_to(&mut self, next: i64) -> bool {
        if next < self.0 {
            return false;
        }
        self.0 = next;
        true
    }
}

/// What a single cycle ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new status message was delivered.
    Notified(String),
    /// The status message matched the last one delivered.
    Unchanged,
    /// The response carried no records.
    NoUpdates,
    /// A new status message was produced but could not be delivered.
    DeliveryFailed,
    /// The cycle failed. `suppressed` is set when the error repeated the
    /// previous one and no notification was attempted.
    Failed { kind: ErrorKind, suppressed: bool },
}

pub struct PollingEngine<S, N> {
    source: S,
    notifier: N,
    cursor: Cursor,
    last_notified: Option<String>,
    last_error: Option<String>,
    retry_period: Duration,
}

impl<S: StatusSource, N: Notifier> PollingEngine<S, N> {
    pub fn new(source: S, notifier: N, polling: &PollingConfig, cursor: Cursor) -> Self {
        Self {
            source,
            notifier,
            cursor,
            last_notified: None,
            last_error: None,
            retry_period: polling.retry_period(),
        }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor.value()
    }

    pub fn last_notified(&self) -> Option<&str> {
        self.last_notified.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Poll until `shutdown` is cancelled. Cancellation is observed during
    /// the sleep between cycles, never in the middle of one.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!(
            cursor = self.cursor(),
            retry_period_secs = self.retry_period.as_secs(),
            "Polling engine started"
        );

        loop {
            let outcome = self.run_cycle().await;
            debug!(?outcome, cursor = self.cursor(), "Cycle finished");

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested, polling engine stopping");
                    break;
                }
                _ = tokio::time::sleep(self.retry_period) => {}
            }
        }
    }

    /// Run exactly one fetch → validate → interpret → notify pass.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.poll().await {
            Ok(Some(message)) => self.deliver(message).await,
            Ok(None) => CycleOutcome::NoUpdates,
            Err(kind) => self.report_error(kind).await,
        }
    }

    async fn poll(&mut self) -> Result<Option<String>, ErrorKind> {
        let envelope = self.fetch().await?;
        self.advance_cursor(envelope.current_date);

        let Some(latest) = envelope.latest() else {
            debug!("No new submissions in this window");
            return Ok(None);
        };
        Ok(Some(status::interpret(latest)?))
    }

    async fn fetch(&self) -> Result<Envelope, ErrorKind> {
        let raw = self.source.fetch(self.cursor()).await.map_err(|e| {
            error!(error = %e, "Status API request failed");
            classify(&e)
        })?;

        if let Some(kind) = classify_status(raw.status) {
            error!(status = raw.status, "Status API returned a non-200 response");
            return Err(kind);
        }

        Ok(status::validate_bytes(&raw.body)?)
    }

    fn advance_cursor(&mut self, current_date: i64) {
        let previous = self.cursor();
        if self.cursor.advance_to(current_date) {
            debug!(from = previous, to = current_date, "Cursor advanced");
        } else {
            warn!(
                cursor = previous,
                current_date, "Response moved current_date backwards, keeping cursor"
            );
        }
    }

    async fn deliver(&mut self, message: String) -> CycleOutcome {
        if self.last_notified.as_deref() == Some(message.as_str()) {
            debug!(%message, "Status unchanged since last notification");
            return CycleOutcome::Unchanged;
        }

        info!(%message, "Sending status notification");
        match self.notifier.send(&message).await {
            Ok(()) => {
                debug!("Notification delivered");
                self.last_notified = Some(message.clone());
                CycleOutcome::Notified(message)
            }
            Err(e) => {
                error!(error = %e, "Failed to deliver notification");
                CycleOutcome::DeliveryFailed
            }
        }
    }

    async fn report_error(&mut self, kind: ErrorKind) -> CycleOutcome {
        let message = kind.render();
        error!(%message, "Polling cycle failed");

        if self.last_error.as_deref() == Some(message.as_str()) {
            debug!("Same error as last reported, not notifying");
            return CycleOutcome::Failed {
                kind,
                suppressed: true,
            };
        }

        if let Err(e) = self.notifier.send(&message).await {
            error!(error = %e, "Failed to deliver error notification");
        }
        self.last_error = Some(message);
        CycleOutcome::Failed {
            kind,
            suppressed: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
