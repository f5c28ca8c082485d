//! Jikan API client and the rate-limit retry loop.

use super::retry::RetryPolicy;
use super::types::{JikanError, MangaEntry, PaginatedResponse};
use crate::error::FetchError;
use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can issue a GET against the catalog.
///
/// Implemented by [`JikanClient`] for real traffic and by scripted
/// transports in tests.
pub trait CatalogTransport: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<RawResponse, FetchError>> + Send;
}

/// Jikan API v4 HTTP client
pub struct JikanClient {
    client: Client,
}

impl JikanClient {
    /// Create a new Jikan client
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

impl CatalogTransport for JikanClient {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(RawResponse { status, body })
    }
}

/// Fetch one result page, retrying the identical request while the API
/// answers 429 and the policy allows another attempt.
pub async fn get_page<T: CatalogTransport>(
    transport: &T,
    url: &str,
    policy: &RetryPolicy,
) -> Result<PaginatedResponse<MangaEntry>, FetchError> {
    let mut attempt = 1;

    loop {
        debug!(url = %url, attempt, "Making API request");
        let response = transport.get(url).await?;

        if response.status == StatusCode::TOO_MANY_REQUESTS.as_u16() {
            match policy.delay_after(attempt) {
                Some(delay) => {
                    warn!(
                        url = %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }
                None => return Err(FetchError::RateLimited { attempts: attempt }),
            }
        }

        if !response.is_success() {
            let message = serde_json::from_str::<JikanError>(&response.body)
                .ok()
                .map(|e| e.message);
            return Err(FetchError::Status {
                status: response.status,
                message,
            });
        }

        let page: PaginatedResponse<MangaEntry> = serde_json::from_str(&response.body)?;
        debug!(
            url = %url,
            items = page.data.len(),
            has_next_page = page.pagination.has_next_page,
            "Request successful"
        );
        return Ok(page);
    }
}
