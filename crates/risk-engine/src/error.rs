//! Error Types for the Risk Engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RiskError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Invalid price {price} for {ticker} at {timestamp}")]
    InvalidPrice {
        ticker: String,
        timestamp: DateTime<Utc>,
        price: f64,
    },

    #[error("Insufficient data: need at least {required} points, have {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Degenerate series: {0}")]
    DegenerateSeries(String),

    #[error("Timestamps not strictly increasing: {current} follows {previous}")]
    UnorderedSeries {
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RiskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RiskError::InvalidPrice { .. } => ErrorKind::InvalidPrice,
            RiskError::InsufficientData { .. } => ErrorKind::InsufficientData,
            RiskError::DegenerateSeries(_) => ErrorKind::DegenerateSeries,
            RiskError::UnorderedSeries { .. } => ErrorKind::InvalidSeries,
            RiskError::Config(_) => ErrorKind::Configuration,
        }
    }
}

/// Serializable failure category carried by undefined metrics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    InvalidPrice,
    InsufficientData,
    DegenerateSeries,
    InvalidSeries,
    Configuration,
}
