//! Risk Metric Calculators
//!
//! Pure functions over an already-derived return series. Each one either
//! returns a finite value or an error explaining why it could not.

use statrs::statistics::Statistics;

use crate::error::{Result, RiskError};

/// Trading days per year, for daily data
pub const DEFAULT_PERIODS_PER_YEAR: u32 = 252;

fn annualization(periods_per_year: u32) -> Result<f64> {
    if periods_per_year == 0 {
        return Err(RiskError::Config(
            "periods per year must be positive".into(),
        ));
    }
    Ok(f64::from(periods_per_year).sqrt())
}

fn require(returns: &[f64], required: usize) -> Result<()> {
    if returns.len() < required {
        return Err(RiskError::InsufficientData {
            required,
            actual: returns.len(),
        });
    }
    Ok(())
}

fn finite(value: f64, metric: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RiskError::DegenerateSeries(format!(
            "{metric} is not finite"
        )))
    }
}

/// Annualized sample standard deviation of returns
pub fn volatility(returns: &[f64], periods_per_year: u32) -> Result<f64> {
    let scale = annualization(periods_per_year)?;
    require(returns, 2)?;
    finite(returns.std_dev() * scale, "volatility")
}

/// Annualized sample standard deviation of the strictly negative returns.
///
/// No negative returns means no downside: the result is exactly 0.
pub fn semi_deviation(returns: &[f64], periods_per_year: u32) -> Result<f64> {
    let scale = annualization(periods_per_year)?;
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();

    if downside.is_empty() {
        return Ok(0.0);
    }
    require(&downside, 2)?;
    finite(downside.iter().std_dev() * scale, "semi-deviation")
}

/// Deepest decline of the cumulative growth path from its running peak.
///
/// The path starts at `1 + r_0`; the result is in [-1, 0], 0 meaning the path
/// never fell below an earlier high.
pub fn max_drawdown(returns: &[f64]) -> Result<f64> {
    require(returns, 1)?;

    let mut cumulative = 1.0_f64;
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for r in returns {
        cumulative *= 1.0 + r;
        peak = peak.max(cumulative);
        if peak <= 0.0 || !peak.is_finite() {
            return Err(RiskError::DegenerateSeries(
                "cumulative growth path left the positive finite range".into(),
            ));
        }
        worst = worst.min((cumulative - peak) / peak);
    }

    finite(worst, "max drawdown")
}

/// Mean excess return over its standard deviation (per period, not annualized).
///
/// Constant excess returns have zero spread and fail with `DegenerateSeries`.
pub fn sharpe_ratio(
    returns: &[f64],
    annual_risk_free_rate: f64,
    periods_per_year: u32,
) -> Result<f64> {
    annualization(periods_per_year)?;
    if !annual_risk_free_rate.is_finite() {
        return Err(RiskError::Config(format!(
            "risk-free rate {annual_risk_free_rate} is not finite"
        )));
    }
    require(returns, 2)?;

    let period_rate = annual_risk_free_rate / f64::from(periods_per_year);
    let excess: Vec<f64> = returns.iter().map(|r| r - period_rate).collect();

    // Summation error can leave a tiny spread on identical values; compare directly.
    if excess.windows(2).all(|w| w[0] == w[1]) {
        return Err(RiskError::DegenerateSeries(
            "excess returns have zero standard deviation".into(),
        ));
    }

    let spread = excess.iter().std_dev();
    if spread == 0.0 {
        return Err(RiskError::DegenerateSeries(
            "excess returns have zero standard deviation".into(),
        ));
    }

    finite(excess.iter().mean() / spread, "sharpe ratio")
}
