use crate::models::WorkoutRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Completion state per calendar date. The single authority the renderer
/// and the chart read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutStore {
    records: BTreeMap<NaiveDate, WorkoutRecord>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_workouts(records: BTreeMap<NaiveDate, WorkoutRecord>) -> Self {
        Self { records }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&WorkoutRecord> {
        self.records.get(&date)
    }

    pub fn set(&mut self, date: NaiveDate, record: WorkoutRecord) {
        self.records.insert(date, record);
    }

    /// Flips `completed` and replaces the message, creating the record when
    /// absent. Returns the record as it was before the flip.
    pub fn toggle_completed(&mut self, date: NaiveDate, message: &str) -> Option<WorkoutRecord> {
        let previous = self.records.get(&date).cloned();
        let entry = self.records.entry(date).or_default();
        entry.completed = !entry.completed;
        entry.message = message.to_string();
        previous
    }

    /// Puts back a record captured before a toggle.
    pub fn restore(&mut self, date: NaiveDate, previous: Option<WorkoutRecord>) {
        match previous {
            Some(record) => {
                self.records.insert(date, record);
            }
            None => {
                self.records.remove(&date);
            }
        }
    }

    pub fn count_completed(&self, range: &[NaiveDate]) -> usize {
        range
            .iter()
            .filter(|date| self.records.get(*date).is_some_and(|record| record.completed))
            .count()
    }

    /// Every date in `range` paired with its record, unrecorded dates
    /// reading as not completed.
    pub fn snapshot(&self, range: &[NaiveDate]) -> BTreeMap<NaiveDate, WorkoutRecord> {
        range
            .iter()
            .map(|date| (*date, self.records.get(date).cloned().unwrap_or_default()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
