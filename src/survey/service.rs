//! Survey Service
//!
//! Validates submissions before they reach the store and serves the list
//! read path.

use std::sync::Arc;

use tracing::{info, warn};

use super::entry::{NewSurvey, Survey, SurveyField, SurveySubmission};
use super::store::SurveyStore;
use crate::error::{Result, SurveyError};
use crate::observer::{NoopObserver, Operation, SurveyObserver};

pub struct SurveyService {
    store: Arc<dyn SurveyStore>,
    observer: Arc<dyn SurveyObserver>,
}

impl SurveyService {
    pub fn new(store: Arc<dyn SurveyStore>) -> Self {
        Self {
            store,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SurveyObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Validate and store a submission
    pub fn submit(&self, submission: SurveySubmission) -> Result<Survey> {
        let candidate = validate(&submission)?;
        let survey = self.store.insert(candidate)?;
        info!(id = survey.id, org = %survey.org_name, "survey submitted");

        for field in SurveyField::ALL {
            let value = survey.value_of(field);
            if !field.is_known(value) {
                warn!(id = survey.id, field = field.as_str(), value, "value outside the offered choices");
            }
        }

        self.observer.operation_succeeded(Operation::Submit);
        Ok(survey)
    }

    /// All surveys, newest first
    pub fn list(&self) -> Result<Vec<Survey>> {
        let surveys = self.store.list_all()?;
        self.observer.operation_succeeded(Operation::List);
        Ok(surveys)
    }
}

/// Check that every required field is present and non-blank.
///
/// Reports all failing fields at once and trims accepted values.
pub fn validate(submission: &SurveySubmission) -> Result<NewSurvey> {
    let missing: Vec<&'static str> = submission
        .fields()
        .into_iter()
        .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect();

    if !missing.is_empty() {
        return Err(SurveyError::Validation { fields: missing });
    }

    let trimmed = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();

    Ok(NewSurvey {
        org_name: trimmed(&submission.org_name),
        org_size: trimmed(&submission.org_size),
        industry: trimmed(&submission.industry),
        has_otel: trimmed(&submission.has_otel),
        email: trimmed(&submission.email),
    })
}
