//! Error types for session validation, dispatch and export.

use crate::essence::EssenceType;
use thiserror::Error;

/// Result type for simulator operations
pub type SimResult<T> = Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    /// A scalar session parameter is out of range
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A price or weight table has no entry for an essence type
    #[error("{table} table has no entry for {essence}")]
    MissingTableEntry {
        table: &'static str,
        essence: EssenceType,
    },

    #[error("{table} table has invalid weight {weight} for {essence}")]
    InvalidWeight {
        table: &'static str,
        essence: EssenceType,
        weight: f64,
    },

    /// Every weight in the table is zero, so nothing can be drawn
    #[error("{table} table has no positive weight")]
    EmptyDistribution { table: &'static str },

    #[error("unknown essence type: {0}")]
    UnknownEssence(String),

    /// The worker pool could not be created
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
