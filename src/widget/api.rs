use crate::calendar::date_key;
use crate::errors::ClientError;
use crate::models::{PrizeDetails, SaveMessageRequest, ToggleRequest, WorkoutsResponse};
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;

/// Remote calls the widget depends on.
pub trait WorkoutApi {
    fn load(&self) -> impl Future<Output = Result<WorkoutsResponse, ClientError>> + Send;

    fn toggle(
        &self,
        date: NaiveDate,
        message: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn save_message(
        &self,
        date: NaiveDate,
        message: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn prize(&self) -> impl Future<Output = Result<PrizeDetails, ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpWorkoutApi {
    client: Client,
    base_url: String,
}

impl HttpWorkoutApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Records for one ISO week (`YYYY-WW`) instead of the server's default
    /// window.
    pub async fn load_week(&self, week: &str) -> Result<WorkoutsResponse, ClientError> {
        let response = self
            .client
            .get(format!("{}/workouts", self.base_url))
            .query(&[("week", week)])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

impl WorkoutApi for HttpWorkoutApi {
    async fn load(&self) -> Result<WorkoutsResponse, ClientError> {
        self.get_json("/workouts").await
    }

    async fn toggle(&self, date: NaiveDate, message: &str) -> Result<(), ClientError> {
        let body = ToggleRequest {
            date: date_key(date),
            message: message.to_string(),
        };
        self.client
            .post(format!("{}/toggle_workout", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn save_message(&self, date: NaiveDate, message: &str) -> Result<(), ClientError> {
        let body = SaveMessageRequest {
            date: date_key(date),
            message: message.to_string(),
        };
        self.client
            .post(format!("{}/save_message", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn prize(&self) -> Result<PrizeDetails, ClientError> {
        self.get_json("/prize").await
    }
}
