//! risk-server
//!
//! Axum server that accepts research payloads (prices and fundamentals per
//! ticker) and returns the computed risk dataset for report assembly.

mod handlers;
mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use risk_engine::{RiskAnalyzer, RiskConfig};

use crate::handlers::{analyze_handler, health_check, risk_config};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment first so RUST_LOG from .env applies
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RiskConfig::from_env()?;
    tracing::info!(
        annual_risk_free_rate = config.annual_risk_free_rate,
        periods_per_year = config.periods_per_year,
        parallel = config.parallel,
        "risk engine configured"
    );

    let state = AppState::new(RiskAnalyzer::new(config)?);
    let app = router(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("risk-server listening on http://{}", addr);
    tracing::info!("  GET  /health            - Health check");
    tracing::info!("  GET  /api/risk/config   - Effective engine configuration");
    tracing::info!("  POST /api/risk/analyze  - Compute risk dataset");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/risk/config", get(risk_config))
        .route("/api/risk/analyze", post(analyze_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/risk/analyze")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_analyze_route_returns_ordered_dataset() {
        let app = router(AppState::new(RiskAnalyzer::default()));
        let body = r#"{
            "prices": {
                "TSLA": [
                    {"timestamp": "2024-01-02T00:00:00Z", "close": 100.0},
                    {"timestamp": "2024-01-03T00:00:00Z", "close": 110.0},
                    {"timestamp": "2024-01-04T00:00:00Z", "close": 99.0}
                ],
                "AAPL": [
                    {"timestamp": "2024-01-02T00:00:00Z", "close": 180.0},
                    {"timestamp": "2024-01-03T00:00:00Z", "close": -1.0}
                ]
            },
            "fundamentals": {"AAPL": {"beta": 1.3}}
        }"#;

        let response = app.oneshot(post_json(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let dataset = json["dataset"].as_object().unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(
            json["dataset"]["AAPL"]["risk_comment_description"],
            "Moderate risk, cyclical exposure to the economy"
        );
        assert_eq!(json["dataset"]["AAPL"]["volatility"]["kind"], "invalid-price");
        assert_eq!(json["dataset"]["AAPL"]["risk_comment"], "moderate-cyclical-risk");
        assert_eq!(json["dataset"]["TSLA"]["max_drawdown"]["status"], "computed");
        assert_eq!(json["dataset"]["TSLA"]["risk_comment"], "fundamentals-missing");
    }

    #[tokio::test]
    async fn test_malformed_series_fails_only_its_ticker() {
        let app = router(AppState::new(RiskAnalyzer::default()));
        let body = r#"{
            "prices": {
                "GOOD": [
                    {"timestamp": "2024-01-02T00:00:00Z", "close": 100.0},
                    {"timestamp": "2024-01-03T00:00:00Z", "close": 110.0},
                    {"timestamp": "2024-01-04T00:00:00Z", "close": 99.0},
                    {"timestamp": "2024-01-05T00:00:00Z", "close": 121.0},
                    {"timestamp": "2024-01-08T00:00:00Z", "close": 118.0}
                ],
                "BAD": [
                    {"timestamp": "2024-01-03T00:00:00Z", "close": 100.0},
                    {"timestamp": "2024-01-02T00:00:00Z", "close": 110.0}
                ],
                "HOLE": [
                    {"timestamp": "2024-01-02T00:00:00Z", "close": 100.0},
                    {"timestamp": "2024-01-03T00:00:00Z", "close": null}
                ]
            }
        }"#;

        let response = app.oneshot(post_json(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let dataset = &json["dataset"];

        for metric in ["volatility", "semi_deviation", "sharpe_ratio", "max_drawdown"] {
            assert_eq!(dataset["GOOD"][metric]["status"], "computed");
            assert_eq!(dataset["BAD"][metric]["kind"], "invalid-series");
            assert_eq!(dataset["HOLE"][metric]["kind"], "invalid-price");
        }
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(AppState::new(RiskAnalyzer::default()));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
