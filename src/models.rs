use crate::widget::store::WorkoutStore;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WorkoutRecord {
    pub completed: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

impl WorkoutRecord {
    pub fn has_message(&self) -> bool {
        !self.message.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub workouts: WorkoutStore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorkoutsResponse {
    #[serde(default)]
    pub dates: Vec<NaiveDate>,
    pub workouts: BTreeMap<NaiveDate, WorkoutRecord>,
}

#[derive(Debug, Deserialize)]
pub struct WorkoutsQuery {
    pub week: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMessageRequest {
    pub date: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeDetails {
    pub image: String,
    pub name: String,
    pub description: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
