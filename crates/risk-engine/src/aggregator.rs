//! Risk Aggregator
//!
//! Runs the normalizer, calculators and classifier for every requested ticker
//! and merges the results into one `RiskDataset`.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::classifier::classify_record;
use crate::config::RiskConfig;
use crate::error::Result;
use crate::metrics;
use crate::model::{
    FundamentalsRecord, Metric, PriceMetrics, PriceSeries, PriceTable, RiskDataset, RiskMetrics,
};
use crate::normalizer::normalize;

/// Stateless analyzer holding only a validated config; cheap to clone and
/// safe to share across threads.
#[derive(Clone, Debug)]
pub struct RiskAnalyzer {
    config: RiskConfig,
}

impl Default for RiskAnalyzer {
    fn default() -> Self {
        Self {
            config: RiskConfig::default(),
        }
    }
}

impl RiskAnalyzer {
    pub fn new(config: RiskConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Analyzer for one request, with rate and period overrides applied on
    /// top of this analyzer's config
    pub fn with_overrides(
        &self,
        annual_risk_free_rate: Option<f64>,
        periods_per_year: Option<u32>,
    ) -> Result<Self> {
        let config = self
            .config
            .with_overrides(annual_risk_free_rate, periods_per_year)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// One `RiskMetrics` per ticker in `prices`, in the same order.
    ///
    /// Tickers that only appear in `fundamentals` are ignored. Failures stay
    /// inside the affected ticker's record; the batch always completes.
    pub fn analyze(
        &self,
        prices: &PriceTable,
        fundamentals: &HashMap<String, FundamentalsRecord>,
    ) -> RiskDataset {
        let assess = |(ticker, series): &(String, PriceSeries)| {
            self.analyze_asset(ticker, series, fundamentals.get(ticker))
        };

        let records: Vec<RiskMetrics> = if self.config.parallel {
            prices.entries().par_iter().map(assess).collect()
        } else {
            prices.entries().iter().map(assess).collect()
        };

        let dataset: RiskDataset = records
            .into_iter()
            .map(|record| (record.ticker().to_string(), record))
            .collect();

        tracing::debug!(
            tickers = dataset.len(),
            complete = dataset.values().filter(|m| m.is_complete()).count(),
            "risk analysis finished"
        );

        dataset
    }

    /// Analyze a single ticker
    pub fn analyze_asset(
        &self,
        ticker: &str,
        series: &PriceSeries,
        fundamentals: Option<&FundamentalsRecord>,
    ) -> RiskMetrics {
        tracing::debug!(ticker, points = series.len(), "analyzing asset");

        let prices = match normalize(ticker, series) {
            Ok(returns) => self.price_metrics(ticker, returns.as_slice()),
            Err(err) => {
                tracing::warn!(ticker, error = %err, "price series rejected");
                PriceMetrics::failed(&err)
            }
        };

        let comment = classify_record(fundamentals);
        RiskMetrics::merge(ticker, prices, fundamentals, comment)
    }

    fn price_metrics(&self, ticker: &str, returns: &[f64]) -> PriceMetrics {
        let periods = self.config.periods_per_year;

        PriceMetrics {
            volatility: record(ticker, "volatility", metrics::volatility(returns, periods)),
            semi_deviation: record(
                ticker,
                "semi_deviation",
                metrics::semi_deviation(returns, periods),
            ),
            sharpe_ratio: record(
                ticker,
                "sharpe_ratio",
                metrics::sharpe_ratio(returns, self.config.annual_risk_free_rate, periods),
            ),
            max_drawdown: record(ticker, "max_drawdown", metrics::max_drawdown(returns)),
        }
    }
}

fn record(ticker: &str, metric: &str, result: Result<f64>) -> Metric {
    let value = Metric::from_result(result);
    if let Metric::Undefined { reason, .. } = &value {
        tracing::warn!(ticker, metric, error = %reason, "metric undefined");
    }
    value
}
