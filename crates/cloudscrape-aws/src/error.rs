use aws_sdk_cloudwatch::error::DisplayErrorContext;
use cloudscrape_engine::ScrapeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Request(String),

    #[error("invalid request: {0}")]
    Build(String),

    #[error("period of {0}s is out of range")]
    InvalidPeriod(u32),
}

impl ClientError {
    /// Flatten an SDK error, keeping its full source chain in the message.
    pub fn request<E: std::error::Error + 'static>(err: E) -> Self {
        Self::Request(DisplayErrorContext(err).to_string())
    }

    pub fn build(err: impl std::fmt::Display) -> Self {
        Self::Build(err.to_string())
    }

    /// Surface this error to the engine as a failed upstream call.
    pub fn into_scrape(self, operation: &'static str) -> ScrapeError {
        ScrapeError::upstream(operation, self.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
