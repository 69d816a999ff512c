//! Error types for atcs-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid lane count: expected {expected}, got {actual}")]
    InvalidLaneCount { expected: usize, actual: usize },

    #[error("Negative demand on lane {lane}: {value}")]
    NegativeDemand { lane: usize, value: i64 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Cannot balance allocation: {remaining}s left over with no eligible lane")]
    Unbalanced { remaining: i64 },
}

impl Error {
    /// True for errors caused by a malformed demand snapshot
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidLaneCount { .. } | Error::NegativeDemand { .. }
        )
    }
}
