use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-2xx status.
    #[error("store rejected write ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("store is not configured: {0} is not set")]
    NotConfigured(&'static str),

    #[error("invalid store URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
