//! Survey Intake Core
//!
//! Store, service and statistics for organization survey submissions.

pub mod entry;
pub mod service;
pub mod stats;
pub mod store;

pub use entry::{NewSurvey, Survey, SurveyField, SurveySubmission};
pub use service::SurveyService;
pub use stats::{BreakdownRow, StatsAggregator, SurveyStats};
pub use store::{InMemorySurveyStore, SurveyStore};
