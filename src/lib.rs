//! verdictbot -- relays homework review status changes to Telegram.
//!
//! This crate provides the polling engine, response validation, status
//! interpretation and error classification, plus the HTTP transports used
//! by the `verdictbot` binary.

pub mod classify;
pub mod config;
pub mod engine;
pub mod startup;
pub mod status;
pub mod transport;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::config::BotConfig;
use crate::engine::{Cursor, PollingEngine};
use crate::transport::{HttpStatusSource, TelegramNotifier};

/// Start the bot: credential gate, transports, then the polling loop.
///
/// With `once` set, a single cycle runs and the function returns; otherwise
/// it polls until `shutdown` is cancelled.
pub async fn run(config: &BotConfig, once: bool, shutdown: CancellationToken) -> Result<()> {
    // 1. Preconditions
    startup::check_credentials(&config.credentials)?;

    // 2. Transports
    let creds = &config.credentials;
    let timeout = config.api.request_timeout();
    let source = HttpStatusSource::new(&config.api.endpoint, &creds.practicum_token, timeout)?;
    let notifier = TelegramNotifier::new(
        &config.telegram.api_base,
        &creds.telegram_token,
        &creds.telegram_chat_id,
        timeout,
    )?;

    // 3. Engine
    let cursor = Cursor::starting_now(config.polling.lookback_secs);
    let mut engine = PollingEngine::new(source, notifier, &config.polling, cursor);

    if once {
        let outcome = engine.run_cycle().await;
        tracing::info!(?outcome, cursor = engine.cursor(), "Single cycle complete");
    } else {
        engine.run(shutdown).await;
    }

    Ok(())
}
