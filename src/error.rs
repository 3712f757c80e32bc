//! Error taxonomy for fetching and extraction.
//!
//! Fetch failures are split into transient (server-side 5xx or a timed-out
//! attempt, eligible for retry) and permanent (everything else). Structural
//! mismatches are raised by the extractors when a page no longer has the
//! shape they expect; callers log them and skip the affected unit.

use thiserror::Error;

/// Errors surfaced while scraping FAQ pages.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Server-side failure (5xx) or a timed-out attempt.
    #[error("transient fetch failure for {url} after {attempts} attempt(s): {reason}")]
    TransientFetch {
        url: String,
        status: Option<u16>,
        attempts: usize,
        reason: String,
    },

    /// Client error, connection refused, bad body, ... Never retried.
    #[error("fetch failed for {url}: {reason}")]
    PermanentFetch {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// The page does not have the structure the extractor expects.
    #[error("structural mismatch on {url}: {detail}")]
    StructuralMismatch { url: String, detail: String },

    #[error("invalid url {input}: {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid sites config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Whether the retry loop may try again after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, ScrapeError::TransientFetch { .. })
    }

    /// HTTP status attached to a fetch failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ScrapeError::TransientFetch { status, .. }
            | ScrapeError::PermanentFetch { status, .. } => *status,
            _ => None,
        }
    }

    pub(crate) fn mismatch(url: &str, detail: impl Into<String>) -> Self {
        ScrapeError::StructuralMismatch {
            url: url.to_string(),
            detail: detail.into(),
        }
    }
}
