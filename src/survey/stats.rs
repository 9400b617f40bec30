//! Statistics Aggregator
//!
//! Grouped counts and percentages over the categorical survey fields.
//! Read-only with respect to the store.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::entry::SurveyField;
use super::store::SurveyStore;
use crate::error::Result;
use crate::observer::{NoopObserver, Operation, SurveyObserver};

/// One distinct value of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub value: String,
    pub count: u64,
    pub percent: u64,
}

/// Aggregate view served by the stats endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyStats {
    pub total: u64,
    pub by_size: Vec<BreakdownRow>,
    pub by_industry: Vec<BreakdownRow>,
    pub by_otel: Vec<BreakdownRow>,
}

pub struct StatsAggregator {
    store: Arc<dyn SurveyStore>,
    observer: Arc<dyn SurveyObserver>,
}

impl StatsAggregator {
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

    /// Breakdown of a single field over the current store contents
    pub fn breakdown(&self, field: SurveyField) -> Result<Vec<BreakdownRow>> {
        let values = self.store.values_of(field)?;
        Ok(tally(values.iter().map(String::as_str)))
    }

    /// Total plus all three breakdowns, computed from one snapshot
    pub fn stats(&self) -> Result<SurveyStats> {
        let records = self.store.snapshot()?;
        let column = |field: SurveyField| tally(records.iter().map(|s| s.value_of(field)));

        let stats = SurveyStats {
            total: records.len() as u64,
            by_size: column(SurveyField::OrgSize),
            by_industry: column(SurveyField::Industry),
            by_otel: column(SurveyField::HasOtel),
        };

        self.observer.operation_succeeded(Operation::Stats);
        Ok(stats)
    }
}

/// Group equal values in order of first appearance.
///
/// Counts always sum to the number of values. Percentages are rounded
/// independently and may not sum to exactly 100.
pub fn tally<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<BreakdownRow> {
    let mut rows: Vec<BreakdownRow> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut total = 0u64;

    for value in values {
        total += 1;
        match index.get(value) {
            Some(&i) => rows[i].count += 1,
            None => {
                index.insert(value, rows.len());
                rows.push(BreakdownRow {
                    value: value.to_string(),
                    count: 1,
                    percent: 0,
                });
            }
        }
    }

    for row in &mut rows {
        row.percent = percent_of(row.count, total);
    }
    rows
}

/// `count / total * 100`, rounded half up. Zero when `total` is zero.
pub fn percent_of(count: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    // floor(100c/t + 1/2) without floating point
    (200 * count + total) / (2 * total)
}
