//! In-memory survey store
//!
//! Owns every record and the id counter. One `RwLock` guards both, so an
//! insert is never partially visible to readers.

use std::sync::RwLock;

use chrono::Utc;
use tracing::debug;

use super::entry::{NewSurvey, Survey, SurveyField};
use crate::error::{Result, SurveyError};

/// Trait for anything that can hold survey records
pub trait SurveyStore: Send + Sync {
    /// Assign the next id and creation time, then append the record
    fn insert(&self, candidate: NewSurvey) -> Result<Survey>;

    /// All records, newest first
    fn list_all(&self) -> Result<Vec<Survey>>;

    /// All records in insertion order, read in one pass
    fn snapshot(&self) -> Result<Vec<Survey>>;

    /// Number of stored records
    fn count(&self) -> Result<usize>;

    /// Raw values of one field, aligned with insertion order
    fn values_of(&self, field: SurveyField) -> Result<Vec<String>> {
        Ok(self
            .snapshot()?
            .iter()
            .map(|s| s.value_of(field).to_string())
            .collect())
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    records: Vec<Survey>,
    last_id: u64,
}

/// Process-lifetime store. Contents do not survive a restart.
#[derive(Debug, Default)]
pub struct InMemorySurveyStore {
    inner: RwLock<StoreInner>,
}

impl InMemorySurveyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SurveyStore for InMemorySurveyStore {
    fn insert(&self, candidate: NewSurvey) -> Result<Survey> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| SurveyError::store("survey store lock poisoned"))?;

        let id = inner.last_id + 1;
        let survey = candidate.into_survey(id, Utc::now());
        inner.records.push(survey.clone());
        inner.last_id = id;

        debug!(id, "survey stored");
        Ok(survey)
    }

    fn list_all(&self) -> Result<Vec<Survey>> {
        let mut records = self.snapshot()?;
        // Appends happen in id order
        records.reverse();
        Ok(records)
    }

    fn snapshot(&self) -> Result<Vec<Survey>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| SurveyError::store("survey store lock poisoned"))?;
        Ok(inner.records.clone())
    }

    fn count(&self) -> Result<usize> {
        let inner = self
            .inner
            .read()
            .map_err(|_| SurveyError::store("survey store lock poisoned"))?;
        Ok(inner.records.len())
    }
}
