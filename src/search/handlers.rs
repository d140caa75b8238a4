use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::log::dto::BucketResponse;
use crate::log::handlers::not_found;
use crate::log::store::{FoodItem, MealType};
use crate::search::catalog::{Matches, Source};
use crate::search::debounce::SearchPhase;
use crate::state::AppState;

use super::dto::{QueryRequest, SearchResponse, SelectRequest};

fn superseded(phase: SearchPhase) -> SearchResponse {
    SearchResponse {
        phase,
        matches: vec![],
        source: None,
        superseded: true,
    }
}

/// One keystroke of the search box. Debounces for the configured window,
/// then resolves the query against the catalog and stores the result, unless
/// a newer keystroke for the same bucket arrived in the meantime. Other
/// buckets are never blocked; the session lock is not held while waiting.
#[instrument(skip(state))]
pub async fn query(
    State(state): State<AppState>,
    Path((id, meal)): Path<(Uuid, MealType)>,
    Json(body): Json<QueryRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let ticket = {
        let mut sessions = state.sessions();
        let session = sessions.get_mut(&id).ok_or_else(not_found)?;
        session.search.get_mut(meal).begin(&body.query)
    };

    // empty query: back to idle, suggestions hidden
    let Some(ticket) = ticket else {
        return Ok(Json(SearchResponse {
            phase: SearchPhase::Idle,
            matches: vec![],
            source: None,
            superseded: false,
        }));
    };

    tokio::time::sleep(Duration::from_millis(state.config.debounce_ms)).await;

    {
        let mut sessions = state.sessions();
        let session = sessions.get_mut(&id).ok_or_else(not_found)?;
        let search = session.search.get_mut(meal);
        if !search.is_current(ticket) {
            return Ok(Json(superseded(search.phase())));
        }
    }

    let matches = match state
        .catalog
        .search(&body.query, state.config.search_limit)
        .await
    {
        Ok(m) => m,
        Err(e) => {
            // the fallback combinator recovers remote failures before this
            // point, so reaching here means even the fallback failed
            warn!(error = %e, query = %body.query, "catalog search failed");
            Matches {
                foods: vec![],
                source: Source::Local,
            }
        }
    };

    let mut sessions = state.sessions();
    let session = sessions.get_mut(&id).ok_or_else(not_found)?;
    let search = session.search.get_mut(meal);
    if !search.apply(ticket, matches) {
        return Ok(Json(superseded(search.phase())));
    }
    Ok(Json(SearchResponse {
        phase: search.phase(),
        matches: search.matches().to_vec(),
        source: search.source(),
        superseded: false,
    }))
}

/// Adds the chosen suggestion to the bucket (quantity 1) and returns the
/// search box to idle. An invalid index changes nothing.
#[instrument(skip(state))]
pub async fn select(
    State(state): State<AppState>,
    Path((id, meal)): Path<(Uuid, MealType)>,
    Json(body): Json<SelectRequest>,
) -> Result<Json<BucketResponse>, (StatusCode, String)> {
    let mut sessions = state.sessions();
    let session = sessions.get_mut(&id).ok_or_else(not_found)?;

    let Some(food) = session.search.get_mut(meal).select(body.index) else {
        return Ok(Json(BucketResponse {
            meal,
            added: None,
            bucket: session.log.bucket(meal).clone(),
        }));
    };

    session.log.bucket_mut(meal).add_item(food.into_item());
    let added = session.log.bucket(meal).items.last().cloned();
    let bucket = session.log.bucket(meal).clone();
    drop(sessions);

    if let Some(item) = &added {
        state.notify_added(id, meal, &item.name);
    }
    Ok(Json(BucketResponse {
        meal,
        added,
        bucket,
    }))
}

/// Enter with no suggestion taken: logs the trimmed query as an ad-hoc entry
/// with zero nutrition data. A blank query is silently ignored.
#[instrument(skip(state))]
pub async fn commit(
    State(state): State<AppState>,
    Path((id, meal)): Path<(Uuid, MealType)>,
) -> Result<Json<BucketResponse>, (StatusCode, String)> {
    let mut sessions = state.sessions();
    let session = sessions.get_mut(&id).ok_or_else(not_found)?;

    let Some(name) = session.search.get_mut(meal).commit() else {
        return Ok(Json(BucketResponse {
            meal,
            added: None,
            bucket: session.log.bucket(meal).clone(),
        }));
    };

    session.log.bucket_mut(meal).add_item(FoodItem::custom(name.clone()));
    let added = session.log.bucket(meal).items.last().cloned();
    let bucket = session.log.bucket(meal).clone();
    drop(sessions);

    state.notify_added(id, meal, &name);
    Ok(Json(BucketResponse {
        meal,
        added,
        bucket,
    }))
}
