use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::log::store::PerMeal;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned {0}")]
    Status(StatusCode),
}

/// Destination for a finished day's log. Receives item names only;
/// quantities and macros never leave the process.
#[async_trait]
pub trait MealLogSink: Send + Sync {
    async fn store_meal_log(
        &self,
        names: &PerMeal<Vec<String>>,
    ) -> Result<serde_json::Value, UpstreamError>;

    /// Chained after a successful store; the insights contract is opaque to
    /// us and its outcome is only logged.
    async fn request_insights(&self) -> Result<(), UpstreamError>;
}

#[derive(Serialize)]
struct StoreMealLogBody<'a> {
    #[serde(rename = "mealLog")]
    meal_log: &'a PerMeal<Vec<String>>,
}

#[derive(Clone)]
pub struct HttpSink {
    http: reqwest::Client,
    meal_log_base: String,
    insights_url: String,
}

impl HttpSink {
    pub fn new(http: reqwest::Client, meal_log_base: &str, insights_url: &str) -> Self {
        Self {
            http,
            meal_log_base: meal_log_base.trim_end_matches('/').to_string(),
            insights_url: insights_url.to_string(),
        }
    }
}

#[async_trait]
impl MealLogSink for HttpSink {
    async fn store_meal_log(
        &self,
        names: &PerMeal<Vec<String>>,
    ) -> Result<serde_json::Value, UpstreamError> {
        let url = format!("{}/store_meal_log", self.meal_log_base);
        let resp = self
            .http
            .post(&url)
            .json(&StoreMealLogBody { meal_log: names })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(UpstreamError::Status(resp.status()));
        }
        let ack = resp.json::<serde_json::Value>().await?;
        debug!(%url, "meal log stored");
        Ok(ack)
    }

    async fn request_insights(&self) -> Result<(), UpstreamError> {
        let resp = self
            .http
            .post(&self.insights_url)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(UpstreamError::Status(resp.status()));
        }
        Ok(())
    }
}
