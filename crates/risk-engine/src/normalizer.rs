//! Price Normalizer
//!
//! Validates a price history and turns it into simple returns.

use crate::error::{Result, RiskError};
use crate::model::{PriceSeries, ReturnSeries};

/// Fewest price points that yield a return
pub const MIN_PRICE_POINTS: usize = 2;

/// Derive `r_i = (p_i - p_{i-1}) / p_{i-1}` for every consecutive pair.
///
/// Nothing is dropped, sorted or patched. Timestamps must be strictly
/// increasing, and a non-finite or non-positive close fails the whole series
/// with the timestamp of the first offending point.
pub fn normalize(ticker: &str, series: &PriceSeries) -> Result<ReturnSeries> {
    let points = series.points();

    if points.len() < MIN_PRICE_POINTS {
        return Err(RiskError::InsufficientData {
            required: MIN_PRICE_POINTS,
            actual: points.len(),
        });
    }

    if let Some(pair) = points.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
        return Err(RiskError::UnorderedSeries {
            previous: pair[0].timestamp,
            current: pair[1].timestamp,
        });
    }

    if let Some(bad) = points.iter().find(|p| !p.close.is_finite() || p.close <= 0.0) {
        return Err(RiskError::InvalidPrice {
            ticker: ticker.to_string(),
            timestamp: bad.timestamp,
            price: bad.close,
        });
    }

    let mut returns = Vec::with_capacity(points.len() - 1);
    for pair in points.windows(2) {
        let r = (pair[1].close - pair[0].close) / pair[0].close;
        if !r.is_finite() {
            return Err(RiskError::DegenerateSeries(format!(
                "return for {ticker} at {} overflows",
                pair[1].timestamp
            )));
        }
        returns.push(r);
    }

    Ok(ReturnSeries::new(returns))
}
