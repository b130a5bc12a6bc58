//! Engine Configuration

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};
use crate::metrics::DEFAULT_PERIODS_PER_YEAR;

/// Annual risk-free rate used when none is configured
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.05;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Annual risk-free rate, as a fraction (0.05 = 5%)
    pub annual_risk_free_rate: f64,

    /// Return periods per year (252 for daily data)
    pub periods_per_year: u32,

    /// Evaluate tickers on the rayon pool
    pub parallel: bool,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            annual_risk_free_rate: DEFAULT_RISK_FREE_RATE,
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            parallel: true,
        }
    }
}

impl RiskConfig {
    /// Read `RISK_FREE_RATE`, `PERIODS_PER_YEAR` and `RISK_PARALLEL`, keeping
    /// defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            annual_risk_free_rate: env_var("RISK_FREE_RATE")?
                .unwrap_or(defaults.annual_risk_free_rate),
            periods_per_year: env_var("PERIODS_PER_YEAR")?.unwrap_or(defaults.periods_per_year),
            parallel: env_var("RISK_PARALLEL")?.unwrap_or(defaults.parallel),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.periods_per_year == 0 {
            return Err(RiskError::Config("periods_per_year must be positive".into()));
        }
        if !self.annual_risk_free_rate.is_finite() {
            return Err(RiskError::Config(format!(
                "annual_risk_free_rate must be finite, got {}",
                self.annual_risk_free_rate
            )));
        }
        Ok(())
    }

    /// Copy with per-request overrides applied and validated
    pub fn with_overrides(
        &self,
        annual_risk_free_rate: Option<f64>,
        periods_per_year: Option<u32>,
    ) -> Result<Self> {
        let config = Self {
            annual_risk_free_rate: annual_risk_free_rate.unwrap_or(self.annual_risk_free_rate),
            periods_per_year: periods_per_year.unwrap_or(self.periods_per_year),
            parallel: self.parallel,
        };
        config.validate()?;
        Ok(config)
    }
}

fn env_var<T: FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| RiskError::Config(format!("{key}={raw} is not a valid value"))),
        Err(_) => Ok(None),
    }
}
