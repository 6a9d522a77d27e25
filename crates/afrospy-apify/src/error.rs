use thiserror::Error;

/// Longest slice of an upstream error body kept in [`ApifyError::Launch`].
pub const MAX_ERROR_BODY_CHARS: usize = 200;

/// Errors returned by the Apify REST client.
#[derive(Debug, Error)]
pub enum ApifyError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The actor refused to start a run.
    #[error("Apify start error {status}: {body}")]
    Launch { status: u16, body: String },

    /// Any other non-2xx answer (run status, dataset items).
    #[error("unexpected HTTP status {status} from {context}")]
    UnexpectedStatus { status: u16, context: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid Apify base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Cuts `body` down to [`MAX_ERROR_BODY_CHARS`] characters on a char
/// boundary.
#[must_use]
pub fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("actor not found"), "actor not found");
    }

    #[test]
    fn truncate_body_caps_length() {
        let long = "x".repeat(1_000);
        assert_eq!(truncate_body(&long).len(), MAX_ERROR_BODY_CHARS);
    }

    #[test]
    fn truncate_body_respects_multibyte_chars() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert_eq!(cut.chars().count(), MAX_ERROR_BODY_CHARS);
    }

    #[test]
    fn launch_error_message_includes_status() {
        let err = ApifyError::Launch {
            status: 402,
            body: "not enough credits".to_string(),
        };
        assert_eq!(err.to_string(), "Apify start error 402: not enough credits");
    }
}
