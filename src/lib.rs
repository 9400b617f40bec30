//! Survey Intake Service
//!
//! Collects short survey submissions from organizations and serves:
//! - the raw list of submissions, newest first
//! - grouped counts and percentages by organization size, industry and
//!   OpenTelemetry adoption
//!
//! All state lives in an injected [`survey::SurveyStore`]; telemetry is an
//! optional [`observer::SurveyObserver`] that never changes results.

pub mod config;
pub mod error;
pub mod observer;
pub mod server;
pub mod survey;
pub mod utils;

// Re-exports for convenience
pub use error::{Result, SurveyError};
pub use server::{build_router, AppState};
pub use survey::{InMemorySurveyStore, StatsAggregator, SurveyService};
