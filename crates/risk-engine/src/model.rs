//! Domain Models
//!
//! Price history, fundamentals, and the per-asset risk record handed to the
//! report side. Prices and statistics are `f64`: the engine works on ratios,
//! and non-finite input has to be detectable.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ErrorKind, Result, RiskError};
use crate::ticker_map::TickerMap;

/// A single closing price observation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    /// A missing or `null` close is read as NaN and rejected by the normalizer
    #[serde(default = "missing_close", deserialize_with = "close_or_nan")]
    pub close: f64,
}

const fn missing_close() -> f64 {
    f64::NAN
}

fn close_or_nan<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }
}

/// Closing prices for one asset, expected in strictly increasing time order.
///
/// Neither ordering nor prices are validated here; the normalizer does both, so
/// a malformed history is reported against its ticker instead of failing
/// deserialization of the whole request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    /// One close per day starting at `start`
    pub fn from_daily_closes(start: DateTime<Utc>, closes: &[f64]) -> Self {
        let points = closes
            .iter()
            .zip(0_i64..)
            .map(|(&close, day)| PricePoint::new(start + Duration::days(day), close))
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Simple period-over-period returns derived from a `PriceSeries`.
///
/// Only the normalizer builds these; there are no mutators.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnSeries {
    values: Vec<f64>,
}

impl ReturnSeries {
    pub(crate) fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Fundamental attributes for one asset. `None` means unknown, never zero.
///
/// Accepts the camelCase keys the research side emits (`peRatio`,
/// `forwardPE`, ...) as well as snake_case.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalsRecord {
    #[serde(alias = "marketCap")]
    pub market_cap: Option<f64>,

    /// Trailing P/E
    #[serde(alias = "peRatio")]
    pub pe_ratio: Option<f64>,

    #[serde(alias = "forwardPE")]
    pub forward_pe: Option<f64>,

    /// Trailing EPS
    pub eps: Option<f64>,

    #[serde(alias = "dividendYield")]
    pub dividend_yield: Option<f64>,

    pub beta: Option<f64>,

    pub sector: Option<String>,

    pub industry: Option<String>,

    /// Free-text business summary
    pub summary: Option<String>,
}

/// A numeric metric that is either computed (always finite) or explicitly undefined
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Metric {
    Computed { value: f64 },
    Undefined { kind: ErrorKind, reason: String },
}

impl Metric {
    pub fn undefined(err: &RiskError) -> Self {
        Self::Undefined {
            kind: err.kind(),
            reason: err.to_string(),
        }
    }

    /// Convert a calculator result; a non-finite value never becomes `Computed`
    pub fn from_result(result: Result<f64>) -> Self {
        match result {
            Ok(value) if value.is_finite() => Self::Computed { value },
            Ok(value) => Self::undefined(&RiskError::DegenerateSeries(format!(
                "calculation produced non-finite value {value}"
            ))),
            Err(err) => Self::undefined(&err),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Computed { value } => Some(*value),
            Self::Undefined { .. } => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed { .. })
    }

    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Computed { .. } => None,
            Self::Undefined { kind, .. } => Some(*kind),
        }
    }

    pub fn rounded(&self, places: u32) -> Self {
        match self {
            Self::Computed { value } => Self::Computed {
                value: round_to(*value, places),
            },
            undefined => undefined.clone(),
        }
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10_f64.powi(i32::try_from(places).unwrap_or(i32::MAX));
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() { rounded } else { value }
}

/// Qualitative risk category derived from fundamentals
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskComment {
    BetaUnknown,
    HighMarketRisk,
    ModerateCyclicalRisk,
    StableDefensive,
    FundamentalsMissing,
}

impl RiskComment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BetaUnknown => "beta-unknown",
            Self::HighMarketRisk => "high-market-risk",
            Self::ModerateCyclicalRisk => "moderate-cyclical-risk",
            Self::StableDefensive => "stable-defensive",
            Self::FundamentalsMissing => "fundamentals-missing",
        }
    }

    /// Human-readable wording for report assembly
    pub fn description(self) -> &'static str {
        match self {
            Self::BetaUnknown => "Beta unavailable, market risk cannot be assessed",
            Self::HighMarketRisk => "High market risk",
            Self::ModerateCyclicalRisk => "Moderate risk, cyclical exposure to the economy",
            Self::StableDefensive => "Asset is either stable or defensive",
            Self::FundamentalsMissing => "Fundamental data missing",
        }
    }
}

impl fmt::Display for RiskComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk record for one asset. Built once by the analyzer and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    ticker: String,
    volatility: Metric,
    semi_deviation: Metric,
    sharpe_ratio: Metric,
    max_drawdown: Metric,
    beta: Option<f64>,
    pe_ratio: Option<f64>,
    forward_pe: Option<f64>,
    dividend_yield: Option<f64>,
    sector: Option<String>,
    industry: Option<String>,
    risk_comment: RiskComment,
    risk_comment_description: String,
}

/// Price-derived half of a `RiskMetrics`
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PriceMetrics {
    pub volatility: Metric,
    pub semi_deviation: Metric,
    pub sharpe_ratio: Metric,
    pub max_drawdown: Metric,
}

impl PriceMetrics {
    /// Every metric undefined for the same reason (normalization failed)
    pub fn failed(err: &RiskError) -> Self {
        let metric = Metric::undefined(err);
        Self {
            volatility: metric.clone(),
            semi_deviation: metric.clone(),
            sharpe_ratio: metric.clone(),
            max_drawdown: metric,
        }
    }
}

impl RiskMetrics {
    pub(crate) fn merge(
        ticker: impl Into<String>,
        prices: PriceMetrics,
        fundamentals: Option<&FundamentalsRecord>,
        risk_comment: RiskComment,
    ) -> Self {
        let fundamentals = fundamentals.cloned().unwrap_or_default();
        Self {
            ticker: ticker.into(),
            volatility: prices.volatility,
            semi_deviation: prices.semi_deviation,
            sharpe_ratio: prices.sharpe_ratio,
            max_drawdown: prices.max_drawdown,
            beta: finite_or_unknown(fundamentals.beta),
            pe_ratio: finite_or_unknown(fundamentals.pe_ratio),
            forward_pe: finite_or_unknown(fundamentals.forward_pe),
            dividend_yield: finite_or_unknown(fundamentals.dividend_yield),
            sector: fundamentals.sector,
            industry: fundamentals.industry,
            risk_comment,
            risk_comment_description: risk_comment.description().to_string(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Annualized volatility
    pub fn volatility(&self) -> &Metric {
        &self.volatility
    }

    /// Annualized downside deviation
    pub fn semi_deviation(&self) -> &Metric {
        &self.semi_deviation
    }

    pub fn sharpe_ratio(&self) -> &Metric {
        &self.sharpe_ratio
    }

    /// Worst peak-to-trough decline, in [-1, 0]
    pub fn max_drawdown(&self) -> &Metric {
        &self.max_drawdown
    }

    pub fn beta(&self) -> Option<f64> {
        self.beta
    }

    pub fn pe_ratio(&self) -> Option<f64> {
        self.pe_ratio
    }

    pub fn forward_pe(&self) -> Option<f64> {
        self.forward_pe
    }

    pub fn dividend_yield(&self) -> Option<f64> {
        self.dividend_yield
    }

    pub fn sector(&self) -> Option<&str> {
        self.sector.as_deref()
    }

    pub fn industry(&self) -> Option<&str> {
        self.industry.as_deref()
    }

    pub fn risk_comment(&self) -> RiskComment {
        self.risk_comment
    }

    pub fn risk_comment_description(&self) -> &str {
        &self.risk_comment_description
    }

    /// Whether every price-derived metric was computed
    pub fn is_complete(&self) -> bool {
        [
            &self.volatility,
            &self.semi_deviation,
            &self.sharpe_ratio,
            &self.max_drawdown,
        ]
        .iter()
        .all(|m| m.is_computed())
    }

    /// Copy with computed metrics rounded for presentation
    #[must_use]
    pub fn rounded(&self, places: u32) -> Self {
        Self {
            volatility: self.volatility.rounded(places),
            semi_deviation: self.semi_deviation.rounded(places),
            sharpe_ratio: self.sharpe_ratio.rounded(places),
            max_drawdown: self.max_drawdown.rounded(places),
            ..self.clone()
        }
    }
}

fn finite_or_unknown(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Prices keyed by ticker, in request order
pub type PriceTable = TickerMap<PriceSeries>;

/// Risk records keyed by ticker, in request order
pub type RiskDataset = TickerMap<RiskMetrics>;
