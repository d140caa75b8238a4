use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use nutrilog::app::build_app;
use nutrilog::config::AppConfig;
use nutrilog::log::store::PerMeal;
use nutrilog::search::catalog::{FoodCatalog, LocalCatalog};
use nutrilog::state::AppState;
use nutrilog::upstream::{MealLogSink, UpstreamError};

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

async fn create_log(app: &axum::Router) -> String {
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/logs", json!({})))
        .await
        .expect("create log");
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["id"].as_str().expect("id").to_string()
}

#[tokio::test]
async fn full_logging_flow() {
    let app = build_app(AppState::fake());
    let id = create_log(&app).await;

    // debounced search resolves against the catalog
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/logs/{id}/meals/breakfast/query"),
            json!({"query": "app"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let search = body_json(resp).await;
    assert_eq!(search["phase"], "suggesting");
    assert_eq!(search["superseded"], false);
    assert_eq!(search["matches"][0]["name"], "Apple");

    // selecting the suggestion logs one unit and bumps the totals by the
    // per-unit values
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/logs/{id}/meals/breakfast/select"),
            json!({"index": 0}),
        ))
        .await
        .unwrap();
    let bucket = body_json(resp).await;
    assert_eq!(bucket["added"]["name"], "Apple");
    assert_eq!(bucket["added"]["quantity"], 1.0);
    assert_eq!(bucket["bucket"]["total_calories"], 95.0);

    // quantity stepping scales the totals
    let resp = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v1/logs/{id}/meals/breakfast/items/0"),
            json!({"delta": 0.5}),
        ))
        .await
        .unwrap();
    let bucket = body_json(resp).await;
    assert_eq!(bucket["bucket"]["items"][0]["quantity"], 1.5);
    assert_eq!(bucket["bucket"]["total_calories"], 142.5);

    // unmatched query falls through to a custom zero-nutrition entry
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/logs/{id}/meals/lunch/query"),
            json!({"query": "Mystery Snack"}),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["phase"], "no_matches");

    let resp = app
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/logs/{id}/meals/lunch/commit"),
        ))
        .await
        .unwrap();
    let bucket = body_json(resp).await;
    assert_eq!(bucket["added"]["name"], "Mystery Snack");
    assert_eq!(bucket["added"]["calories"], 0.0);
    assert_eq!(bucket["added"]["unit"], "pieces");
    assert_eq!(bucket["bucket"]["total_calories"], 0.0);

    // two of four buckets logged
    let resp = app
        .clone()
        .oneshot(empty_request("GET", &format!("/api/v1/logs/{id}")))
        .await
        .unwrap();
    let log = body_json(resp).await;
    assert_eq!(log["progress"], 0.5);
    assert_eq!(log["meals"]["breakfast"]["items"][0]["name"], "Apple");

    // submission acknowledges via the sink
    let resp = app
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/logs/{id}/submit"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["ack"]["status"], "stored");

    // clear empties every bucket
    let resp = app
        .clone()
        .oneshot(empty_request("POST", &format!("/api/v1/logs/{id}/clear")))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["progress"], 0.0);

    let resp = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/v1/logs/{id}"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn empty_query_returns_to_idle() {
    let app = build_app(AppState::fake());
    let id = create_log(&app).await;

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/logs/{id}/meals/dinner/query"),
            json!({"query": ""}),
        ))
        .await
        .unwrap();
    let search = body_json(resp).await;
    assert_eq!(search["phase"], "idle");
    assert_eq!(search["matches"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn blank_commit_adds_nothing() {
    let app = build_app(AppState::fake());
    let id = create_log(&app).await;

    let resp = app
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/logs/{id}/meals/snacks/commit"),
        ))
        .await
        .unwrap();
    let bucket = body_json(resp).await;
    assert!(bucket["added"].is_null());
    assert_eq!(bucket["bucket"]["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn newer_keystroke_supersedes_older_one() {
    // long debounce so the second keystroke lands inside the first's window
    let config = Arc::new(AppConfig {
        food_search_url: "http://fake.local".into(),
        meal_log_url: "http://fake.local".into(),
        insights_url: "http://fake.local/generate_insights".into(),
        search_limit: 5,
        debounce_ms: 80,
    });
    let state = AppState::from_parts(
        config,
        Arc::new(LocalCatalog) as Arc<dyn FoodCatalog>,
        Arc::new(OkSink) as Arc<dyn MealLogSink>,
    );
    let app = build_app(state);
    let id = create_log(&app).await;

    let first = {
        let app = app.clone();
        let uri = format!("/api/v1/logs/{id}/meals/lunch/query");
        tokio::spawn(async move {
            app.oneshot(json_request("POST", &uri, json!({"query": "ap"})))
                .await
                .unwrap()
        })
    };
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let second = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/logs/{id}/meals/lunch/query"),
            json!({"query": "app"}),
        ))
        .await
        .unwrap();

    let first = body_json(first.await.unwrap()).await;
    assert_eq!(first["superseded"], true);
    assert_eq!(first["matches"].as_array().unwrap().len(), 0);

    let second = body_json(second).await;
    assert_eq!(second["superseded"], false);
    assert_eq!(second["matches"][0]["name"], "Apple");
}

#[tokio::test]
async fn unknown_log_and_meal_are_rejected() {
    let app = build_app(AppState::fake());

    let resp = app
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("/api/v1/logs/{}", uuid::Uuid::new_v4()),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let id = create_log(&app).await;
    let resp = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v1/logs/{id}/meals/brunch/items/0"),
            json!({"delta": 0.5}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

struct OkSink;

#[async_trait]
impl MealLogSink for OkSink {
    async fn store_meal_log(
        &self,
        _names: &PerMeal<Vec<String>>,
    ) -> Result<Value, UpstreamError> {
        Ok(json!({"status": "stored"}))
    }

    async fn request_insights(&self) -> Result<(), UpstreamError> {
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl MealLogSink for FailingSink {
    async fn store_meal_log(
        &self,
        _names: &PerMeal<Vec<String>>,
    ) -> Result<Value, UpstreamError> {
        Err(UpstreamError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
    }

    async fn request_insights(&self) -> Result<(), UpstreamError> {
        Ok(())
    }
}

#[tokio::test]
async fn submit_failure_is_surfaced() {
    let config = Arc::new(AppConfig {
        food_search_url: "http://fake.local".into(),
        meal_log_url: "http://fake.local".into(),
        insights_url: "http://fake.local/generate_insights".into(),
        search_limit: 5,
        debounce_ms: 5,
    });
    let state = AppState::from_parts(
        config,
        Arc::new(LocalCatalog) as Arc<dyn FoodCatalog>,
        Arc::new(FailingSink) as Arc<dyn MealLogSink>,
    );
    let app = build_app(state);
    let id = create_log(&app).await;

    let resp = app
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/logs/{id}/submit"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}
