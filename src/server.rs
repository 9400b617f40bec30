//! HTTP Surface
//!
//! Routes, request tracing and the server loop for the survey API.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, MatchedPath, Request, State},
    response::Response,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Span};

use crate::error::{Result, SurveyError};
use crate::observer::{NoopObserver, SurveyObserver};
use crate::survey::{
    InMemorySurveyStore, StatsAggregator, Survey, SurveyService, SurveyStats, SurveyStore,
    SurveySubmission,
};

#[derive(Clone)]
pub struct AppState {
    pub surveys: Arc<SurveyService>,
    pub stats: Arc<StatsAggregator>,
}

impl AppState {
    /// Wire the service and aggregator over one shared store
    pub fn new(store: Arc<dyn SurveyStore>, observer: Arc<dyn SurveyObserver>) -> Self {
        Self {
            surveys: Arc::new(SurveyService::new(store.clone()).with_observer(observer.clone())),
            stats: Arc::new(StatsAggregator::new(store).with_observer(observer)),
        }
    }

    /// Fresh in-memory store, no telemetry
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemorySurveyStore::new()), Arc::new(NoopObserver))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/surveys",
            get(list_surveys).post(submit_survey).fallback(not_found),
        )
        .route("/api/stats", get(get_stats).fallback(not_found))
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    let route = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or_else(|| request.uri().path());
                    info_span!(
                        "request",
                        http.method = %request.method(),
                        http.route = %route,
                    )
                })
                .on_response(|response: &Response, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis() as u64,
                        "request handled"
                    );
                }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("survey intake listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

async fn list_surveys(State(state): State<AppState>) -> Result<Json<Vec<Survey>>> {
    Ok(Json(state.surveys.list()?))
}

async fn submit_survey(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<Survey>> {
    let submission = SurveySubmission::from_json(&body?)?;
    Ok(Json(state.surveys.submit(submission)?))
}

async fn get_stats(State(state): State<AppState>) -> Result<Json<SurveyStats>> {
    Ok(Json(state.stats.stats()?))
}

async fn not_found() -> SurveyError {
    SurveyError::NotFound
}
