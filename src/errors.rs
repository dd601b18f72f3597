//!
//! src/errors.rs  Andrew Belles  Oct 17th, 2026
//!
//! Defines enums and methods of error conversion
//! for errors the metadata clients use
//!
//!

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("config error: {0}")]
    Config(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status: {0}")]
    Status(u16),
    #[error("malformed document: {0}")]
    Malformed(String),
    #[error("no data available, fetch has not succeeded yet")]
    NoData
}

impl ApiError {
    /// True when retrying the same request later could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Status(code) => *code == 429 || *code >= 500,
            _ => false
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self { ApiError::Transport(e.to_string()) }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self { ApiError::Malformed(e.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(ApiError::Transport("reset".to_string()).is_transient());
        assert!(ApiError::Status(503).is_transient());
        assert!(ApiError::Status(429).is_transient());
        assert!(!ApiError::Status(404).is_transient());
        assert!(!ApiError::Malformed("eof".to_string()).is_transient());
        assert!(!ApiError::NoData.is_transient());
    }

    #[test]
    fn json_errors_are_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("{\"a\":").unwrap_err();
        assert!(matches!(ApiError::from(err), ApiError::Malformed(_)));
    }
}
