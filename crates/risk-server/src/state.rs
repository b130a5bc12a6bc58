//! Application State

use std::sync::Arc;

use risk_engine::RiskAnalyzer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Analyzer built from the server's validated configuration
    pub analyzer: Arc<RiskAnalyzer>,
}

impl AppState {
    pub fn new(analyzer: RiskAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}
