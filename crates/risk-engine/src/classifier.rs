//! Fundamentals Risk Classifier

use crate::model::{FundamentalsRecord, RiskComment};

/// Beta above this is high market risk
pub const HIGH_BETA: f64 = 1.5;

/// Beta above this (up to `HIGH_BETA`) is cyclical
pub const MARKET_BETA: f64 = 1.0;

/// Classify by beta. `pe_ratio` is accepted but does not affect the category yet.
///
/// Total over `Option<f64>`; a non-finite beta counts as unknown.
pub fn classify(beta: Option<f64>, _pe_ratio: Option<f64>) -> RiskComment {
    match beta.filter(|b| b.is_finite()) {
        None => RiskComment::BetaUnknown,
        Some(b) if b > HIGH_BETA => RiskComment::HighMarketRisk,
        Some(b) if b > MARKET_BETA => RiskComment::ModerateCyclicalRisk,
        Some(_) => RiskComment::StableDefensive,
    }
}

/// Classify a ticker's fundamentals, if the research side supplied any
pub fn classify_record(record: Option<&FundamentalsRecord>) -> RiskComment {
    record.map_or(RiskComment::FundamentalsMissing, |r| {
        classify(r.beta, r.pe_ratio)
    })
}
