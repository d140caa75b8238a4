use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::log::store::MealType;
use crate::state::{AppState, LogSession};

use super::dto::{
    BucketResponse, CreateLogRequest, CreatedLogResponse, LogResponse, ProgressResponse,
    QuantityStep, SubmitResponse,
};

pub(crate) fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Log not found".to_string())
}

#[instrument(skip(state))]
pub async fn create_log(
    State(state): State<AppState>,
    body: Option<Json<CreateLogRequest>>,
) -> (StatusCode, Json<CreatedLogResponse>) {
    let date = body.and_then(|Json(b)| b.date);
    let id = Uuid::new_v4();
    let session = LogSession::new(date);
    let created_at = session.log.created_at;
    state.sessions().insert(id, session);
    (StatusCode::CREATED, Json(CreatedLogResponse { id, created_at }))
}

#[instrument(skip(state))]
pub async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LogResponse>, (StatusCode, String)> {
    let sessions = state.sessions();
    let session = sessions.get(&id).ok_or_else(not_found)?;
    Ok(Json(LogResponse {
        id,
        date: session.log.date.clone(),
        created_at: session.log.created_at,
        meals: session.log.meals.clone(),
        progress: session.log.progress(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_log(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.sessions().remove(&id).is_some() {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

#[instrument(skip(state))]
pub async fn clear_log(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LogResponse>, (StatusCode, String)> {
    let mut sessions = state.sessions();
    let session = sessions.get_mut(&id).ok_or_else(not_found)?;
    session.log.clear_all();
    Ok(Json(LogResponse {
        id,
        date: session.log.date.clone(),
        created_at: session.log.created_at,
        meals: session.log.meals.clone(),
        progress: 0.0,
    }))
}

#[instrument(skip(state))]
pub async fn get_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProgressResponse>, (StatusCode, String)> {
    let sessions = state.sessions();
    let session = sessions.get(&id).ok_or_else(not_found)?;
    Ok(Json(ProgressResponse {
        progress: session.log.progress(),
    }))
}

#[instrument(skip(state))]
pub async fn update_quantity(
    State(state): State<AppState>,
    Path((id, meal, index)): Path<(Uuid, MealType, usize)>,
    Json(step): Json<QuantityStep>,
) -> Result<Json<BucketResponse>, (StatusCode, String)> {
    let mut sessions = state.sessions();
    let session = sessions.get_mut(&id).ok_or_else(not_found)?;
    let bucket = session.log.bucket_mut(meal);
    if !bucket.update_quantity(index, step.delta) {
        warn!(%id, meal = meal.as_str(), index, "quantity step for missing index ignored");
    }
    Ok(Json(BucketResponse {
        meal,
        added: None,
        bucket: bucket.clone(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    Path((id, meal, index)): Path<(Uuid, MealType, usize)>,
) -> Result<Json<BucketResponse>, (StatusCode, String)> {
    let mut sessions = state.sessions();
    let session = sessions.get_mut(&id).ok_or_else(not_found)?;
    let bucket = session.log.bucket_mut(meal);
    if !bucket.delete_item(index) {
        warn!(%id, meal = meal.as_str(), index, "delete for missing index ignored");
    }
    Ok(Json(BucketResponse {
        meal,
        added: None,
        bucket: bucket.clone(),
    }))
}

/// Sends the day's item names upstream. A failure is surfaced to the caller
/// and not retried; on success the insights request is chained off-path.
#[instrument(skip(state))]
pub async fn submit_log(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmitResponse>, (StatusCode, String)> {
    let names = {
        let sessions = state.sessions();
        let session = sessions.get(&id).ok_or_else(not_found)?;
        session.log.names()
    };

    let ack = state.sink.store_meal_log(&names).await.map_err(|e| {
        error!(error = %e, %id, "store_meal_log failed");
        (
            StatusCode::BAD_GATEWAY,
            "Failed to store meal log".to_string(),
        )
    })?;

    let sink = state.sink.clone();
    tokio::spawn(async move {
        if let Err(e) = sink.request_insights().await {
            warn!(error = %e, "insights request failed");
        }
    });

    Ok(Json(SubmitResponse { ack }))
}
