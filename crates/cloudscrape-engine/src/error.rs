//! Scrape error types.

use thiserror::Error;

/// Errors that fail a scrape.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A CloudWatch call failed. The scrape is not retried.
    #[error("{operation} failed: {message}")]
    Upstream {
        operation: &'static str,
        message: String,
    },

    #[error("request pool closed")]
    PoolClosed,
}

impl ScrapeError {
    pub fn upstream(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            operation,
            message: message.into(),
        }
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
