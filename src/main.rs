//! Survey Intake Server
//!
//! Accepts organization survey submissions over HTTP and serves the raw list
//! plus aggregate statistics:
//! - `GET  /api/surveys` - all surveys, newest first
//! - `POST /api/surveys` - submit a survey
//! - `GET  /api/stats`   - totals and per-field breakdowns

use anyhow::Result;
use std::sync::Arc;

use survey_intake::config::ServiceConfig;
use survey_intake::server::{run_server, AppState};
use survey_intake::survey::InMemorySurveyStore;
use survey_intake::utils::otel::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = ServiceConfig::from_env()?;

    // Telemetry is resolved once; without a collector this is a no-op observer
    let (otel_guard, observer) = init_telemetry(&config);

    let store = Arc::new(InMemorySurveyStore::new());
    let state = AppState::new(store, observer);

    let result = run_server(state, config.listen).await;

    // Flush spans and metrics before exit
    drop(otel_guard);
    result
}
