//! # risk-engine
//!
//! Turns per-asset price history and fundamentals into normalized risk
//! metrics: volatility, downside deviation, max drawdown, Sharpe ratio, and a
//! beta-based risk category.
//!
//! ## Data Flow
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌──────────────┐   ┌─────────────┐
//! │ PriceTable   │──▶│ normalizer │──▶│   metrics    │──▶│             │
//! │ ticker→series│   │  (returns) │   │ vol/semi/dd/ │   │ RiskAnalyzer│──▶ RiskDataset
//! └──────────────┘   └────────────┘   │    sharpe    │   │   (merge)   │
//! ┌──────────────┐   ┌────────────┐   └──────────────┘   │             │
//! │ Fundamentals │──▶│ classifier │─────────────────────▶│             │
//! └──────────────┘   └────────────┘                      └─────────────┘
//! ```
//!
//! Nothing is fetched, cached or persisted here. Every numeric field of the
//! output is either a finite number or an explicit `undefined` marker with a
//! reason; one ticker's bad data never fails the batch.
//!
//! ## Example
//!
//! ```
//! use std::collections::HashMap;
//! use chrono::{DateTime, Utc};
//! use risk_engine::{PriceSeries, PriceTable, RiskAnalyzer};
//!
//! let mut prices = PriceTable::new();
//! prices.insert(
//!     "TSLA",
//!     PriceSeries::from_daily_closes(DateTime::<Utc>::UNIX_EPOCH, &[100.0, 110.0, 99.0, 121.0]),
//! );
//!
//! let dataset = RiskAnalyzer::default().analyze(&prices, &HashMap::new());
//! let tsla = dataset.get("TSLA").unwrap();
//! assert!((tsla.max_drawdown().value().unwrap() + 0.1).abs() < 1e-12);
//! ```

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod normalizer;
pub mod ticker_map;

pub use aggregator::RiskAnalyzer;
pub use classifier::classify;
pub use config::RiskConfig;
pub use error::{ErrorKind, Result, RiskError};
pub use model::{
    FundamentalsRecord, Metric, PricePoint, PriceSeries, PriceTable, ReturnSeries, RiskComment,
    RiskDataset, RiskMetrics,
};
pub use normalizer::normalize;
pub use ticker_map::TickerMap;
