use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::log::store::{FoodItem, MealBucket, MealType, PerMeal};

#[derive(Debug, Deserialize)]
pub struct CreateLogRequest {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedLogResponse {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub id: Uuid,
    pub date: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub meals: PerMeal<MealBucket>,
    pub progress: f64,
}

#[derive(Debug, Deserialize)]
pub struct QuantityStep {
    pub delta: f64,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub progress: f64,
}

/// Returned by every single-bucket mutation. `added` is the stored entry for
/// add paths, `None` for steps, deletes and no-ops.
#[derive(Debug, Serialize)]
pub struct BucketResponse {
    pub meal: MealType,
    pub added: Option<FoodItem>,
    pub bucket: MealBucket,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub ack: serde_json::Value,
}
