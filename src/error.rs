// Error types for ghstats.
// Separates upstream failures, malformed payloads, and local storage errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("'{0}' not found on GitHub")]
    NotFound(String),

    #[error("API rate limit exceeded, resets at {reset_at}. Try again later or use a personal access token")]
    RateLimited { reset_at: String },

    #[error("GitHub returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Malformed response from GitHub: {0}")]
    MalformedResponse(String),

    #[error("History storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl StatsError {
    /// Whether a later retry could succeed without any local change.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StatsError::Http(_) | StatsError::RateLimited { .. } | StatsError::Upstream { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_includes_status_and_body() {
        let err = StatsError::Upstream {
            status: 502,
            body: "bad gateway".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("502"));
        assert!(message.contains("bad gateway"));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(
            StatsError::RateLimited {
                reset_at: "12:00:00".to_string()
            }
            .is_retryable()
        );
        assert!(!StatsError::NotFound("octocat".to_string()).is_retryable());
        assert!(!StatsError::MalformedResponse("missing field".to_string()).is_retryable());
    }

    #[test]
    fn test_json_error_converts() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let mapped: StatsError = err.into();
        assert!(matches!(mapped, StatsError::Json(_)));
    }
}
