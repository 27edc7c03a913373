//! External AI enrichment: the analyze and generate-image capabilities,
//! bounded retries, and the degradation-aware enrichment orchestration.
//!
//! Providers are black boxes behind [`GenerativeClient`]: Anthropic's
//! messages API for analysis, Replicate predictions for image synthesis.
//! Clients are constructed once at startup and injected; nothing here is
//! lazily-initialized global state.

pub mod anthropic;
pub mod client;
pub mod enricher;
pub mod parse;
pub mod prompts;
pub mod replicate;
pub mod retry;

use thiserror::Error;

pub use anthropic::AnthropicAnalyzer;
pub use client::{AspectRatio, GenerativeClient, LiveClient};
pub use enricher::{ComicPages, Enricher, COMIC_PAGE_COUNT};
pub use replicate::ReplicateImageGenerator;
pub use retry::{with_retry, RetryPolicy};

/// Enrichment call errors, classified for the retry loop.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Provider signalled a request-rate limit.
    #[error("Provider rate limited the request")]
    RateLimited,

    /// Provider transiently unavailable (5xx, overload, network failure).
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// Permission/authorization failure; never retried.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The response could not be interpreted.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A retryable error survived the whole retry budget.
    #[error("Retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<EnrichError>,
    },
}

impl EnrichError {
    /// Whether the retry loop should try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EnrichError::RateLimited | EnrichError::Unavailable(_))
    }

    /// Classify an HTTP status from a provider.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            429 => EnrichError::RateLimited,
            401 | 403 => EnrichError::Unauthorized(body),
            500..=599 => EnrichError::Unavailable(format!("{}: {}", status, body)),
            _ => EnrichError::InvalidResponse(format!("{}: {}", status, body)),
        }
    }
}

impl From<reqwest::Error> for EnrichError {
    fn from(e: reqwest::Error) -> Self {
        // Transport failures look like provider unavailability to the
        // retry loop; decode failures do not.
        if e.is_decode() {
            EnrichError::InvalidResponse(e.to_string())
        } else {
            EnrichError::Unavailable(e.to_string())
        }
    }
}
