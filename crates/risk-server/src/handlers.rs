//! HTTP Handlers

use std::collections::HashMap;

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use risk_engine::{FundamentalsRecord, PriceTable, RiskConfig, RiskDataset};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Research payload: prices and fundamentals per ticker
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub prices: PriceTable,
    #[serde(default)]
    pub fundamentals: HashMap<String, FundamentalsRecord>,
    #[serde(default)]
    pub annual_risk_free_rate: Option<f64>,
    #[serde(default)]
    pub periods_per_year: Option<u32>,
    /// Round computed metrics to this many decimal places
    #[serde(default)]
    pub round_to: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub config: RiskConfig,
    pub dataset: RiskDataset,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Effective engine configuration
pub async fn risk_config(State(state): State<AppState>) -> Json<RiskConfig> {
    Json(state.analyzer.config().clone())
}

/// Run the risk engine over a research payload.
///
/// Per-ticker failures come back as markers inside the dataset; only an
/// invalid configuration override fails the request.
pub async fn analyze_handler(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let request_id = Uuid::new_v4();

    let analyzer = state
        .analyzer
        .with_overrides(payload.annual_risk_free_rate, payload.periods_per_year)
        .map_err(|e| {
            tracing::warn!(%request_id, error = %e, "rejected configuration override");
            api_error(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_CONFIG", e.to_string())
        })?;
    let config = analyzer.config().clone();

    tracing::info!(%request_id, tickers = payload.prices.len(), "risk analysis requested");

    let AnalyzeRequest {
        prices,
        fundamentals,
        round_to,
        ..
    } = payload;

    // CPU-bound; keep it off the async workers
    let dataset = tokio::task::spawn_blocking(move || analyzer.analyze(&prices, &fundamentals))
        .await
        .map_err(|e| {
            tracing::error!(%request_id, error = %e, "analysis task failed");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "ANALYSIS_FAILED",
                "Risk analysis did not complete",
            )
        })?;

    let dataset = match round_to {
        Some(places) => dataset
            .into_iter()
            .map(|(ticker, metrics)| {
                let rounded = metrics.rounded(places);
                (ticker, rounded)
            })
            .collect(),
        None => dataset,
    };

    Ok(Json(AnalyzeResponse {
        request_id,
        generated_at: Utc::now(),
        config,
        dataset,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_engine::{ErrorKind, Metric, RiskAnalyzer, RiskComment};
    use serde_json::json;

    fn state() -> AppState {
        AppState::new(RiskAnalyzer::default())
    }

    fn request(value: serde_json::Value) -> AnalyzeRequest {
        serde_json::from_value(value).unwrap()
    }

    fn prices(closes: &[f64]) -> serde_json::Value {
        let points: Vec<_> = closes
            .iter()
            .enumerate()
            .map(|(day, close)| {
                json!({"timestamp": format!("2024-03-{:02}T00:00:00Z", day + 1), "close": close})
            })
            .collect();
        json!(points)
    }

    #[tokio::test]
    async fn test_analyze_keeps_order_and_markers() {
        let payload = request(json!({
            "prices": {
                "TSLA": prices(&[100.0, 110.0, 99.0, 121.0]),
                "SPY": prices(&[500.0]),
            },
            "fundamentals": {
                "TSLA": {"beta": 2.3, "pe_ratio": 60.0},
                "AAPL": {"beta": 1.2},
            },
        }));

        let Json(response) = analyze_handler(State(state()), Json(payload)).await.unwrap();

        let tickers: Vec<_> = response.dataset.tickers().collect();
        assert_eq!(tickers, vec!["TSLA", "SPY"]);

        let tsla = response.dataset.get("TSLA").unwrap();
        assert!((tsla.max_drawdown().value().unwrap() + 0.1).abs() < 1e-12);
        assert_eq!(tsla.risk_comment(), RiskComment::HighMarketRisk);

        let spy = response.dataset.get("SPY").unwrap();
        assert_eq!(spy.volatility().failure_kind(), Some(ErrorKind::InsufficientData));
        assert_eq!(spy.risk_comment(), RiskComment::FundamentalsMissing);
    }

    #[tokio::test]
    async fn test_null_close_is_marked_on_its_ticker() {
        let payload = request(json!({
            "prices": {
                "GOOD": prices(&[100.0, 110.0, 99.0, 121.0, 118.0]),
                "GAP": [
                    {"timestamp": "2024-03-01T00:00:00Z", "close": 50.0},
                    {"timestamp": "2024-03-02T00:00:00Z", "close": null},
                    {"timestamp": "2024-03-03T00:00:00Z", "close": 51.0},
                ],
            },
        }));

        let Json(response) = analyze_handler(State(state()), Json(payload)).await.unwrap();

        assert!(response.dataset.get("GOOD").unwrap().is_complete());
        let gap = response.dataset.get("GAP").unwrap();
        assert_eq!(gap.volatility().failure_kind(), Some(ErrorKind::InvalidPrice));
        match gap.max_drawdown() {
            Metric::Undefined { reason, .. } => assert!(reason.contains("2024-03-02")),
            computed => panic!("expected a marker, got {computed:?}"),
        }
    }

    #[tokio::test]
    async fn test_overrides_apply() {
        let payload = request(json!({
            "prices": {"KO": prices(&[60.0, 61.0, 60.5, 62.0])},
            "annual_risk_free_rate": 0.02,
            "periods_per_year": 52,
            "round_to": 4,
        }));

        let Json(response) = analyze_handler(State(state()), Json(payload)).await.unwrap();

        assert_eq!(response.config.periods_per_year, 52);
        let vol = response.dataset.get("KO").unwrap().volatility().value().unwrap();
        assert!((vol * 1e4 - (vol * 1e4).round()).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_invalid_override_is_rejected() {
        let payload = request(json!({
            "prices": {"KO": prices(&[60.0, 61.0])},
            "periods_per_year": 0,
        }));

        let (status, Json(body)) = analyze_handler(State(state()), Json(payload))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.code, "INVALID_CONFIG");
    }

    #[tokio::test]
    async fn test_config_endpoint() {
        let Json(config) = risk_config(State(state())).await;
        assert_eq!(config, RiskConfig::default());
    }
}
