use super::{FetchError, RawResponse, StatusSource};
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Status API client over HTTPS with OAuth token auth.
pub struct HttpStatusSource {
    client: Client,
    endpoint: String,
    token: String,
}

impl HttpStatusSource {
    pub fn new(endpoint: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        })
    }
}

/// Sort a reqwest failure into the transport taxonomy.
fn fetch_error(e: reqwest::Error) -> FetchError {
    if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else if e.is_timeout() {
        FetchError::Timeout(e.to_string())
    } else {
        FetchError::Other(e.to_string())
    }
}

#[async_trait::async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch(&self, from_date: i64) -> Result<RawResponse, FetchError> {
        debug!(endpoint = %self.endpoint, from_date, "Querying status API");

        let resp = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(fetch_error)?;

        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(fetch_error)?;

        debug!(status, bytes = body.len(), "Status API answered");
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
