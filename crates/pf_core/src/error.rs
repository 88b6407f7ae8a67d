use std::time::Duration;
use thiserror::Error;

use crate::types::ClassificationOutcome;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Discovery failed for {url}: {source}")]
    Discovery {
        url: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The batch commit failed. `outcomes` is what the scan computed before the
    /// write was rolled back; none of it is durable.
    #[error("Persistence error: {message}")]
    Persistence {
        message: String,
        outcomes: Vec<ClassificationOutcome>,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    pub fn discovery(url: impl Into<String>, source: Error) -> Self {
        Error::Discovery {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// Outcomes attached to a failed commit, if this is one.
    pub fn outcomes(&self) -> Option<&[ClassificationOutcome]> {
        match self {
            Error::Persistence { outcomes, .. } => Some(outcomes),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_error_keeps_its_cause() {
        let err = Error::discovery(
            "https://blog.example",
            Error::Inference("connection reset".to_string()),
        );
        assert!(err.to_string().contains("https://blog.example"));
        assert!(err.to_string().contains("connection reset"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.outcomes().is_none());
    }

    #[test]
    fn persistence_error_carries_outcomes() {
        let err = Error::Persistence {
            message: "disk full".to_string(),
            outcomes: vec![ClassificationOutcome::skipped("http://a/1")],
        };
        assert_eq!(err.outcomes().map(|o| o.len()), Some(1));
    }
}
