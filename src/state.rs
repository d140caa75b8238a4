use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::log::store::{DailyLog, MealType, PerMeal};
use crate::search::catalog::{FallbackCatalog, FoodCatalog, LocalCatalog, RemoteCatalog};
use crate::search::debounce::BucketSearch;
use crate::upstream::{HttpSink, MealLogSink};

/// One mounted logging screen: the day's buckets plus independent per-bucket
/// search state. Lives only as long as the session.
pub struct LogSession {
    pub log: DailyLog,
    pub search: PerMeal<BucketSearch>,
}

impl LogSession {
    pub fn new(date: Option<String>) -> Self {
        Self {
            log: DailyLog::new(date),
            search: PerMeal::default(),
        }
    }
}

/// Abstract "mutation succeeded" signal; the client surfaces it as a haptic
/// or notification.
#[derive(Debug, Clone)]
pub enum MutationEvent {
    ItemAdded {
        log_id: Uuid,
        meal: MealType,
        name: String,
    },
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<dyn FoodCatalog>,
    pub sink: Arc<dyn MealLogSink>,
    sessions: Arc<Mutex<HashMap<Uuid, LogSession>>>,
    events: broadcast::Sender<MutationEvent>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        let catalog = Arc::new(FallbackCatalog::new(
            RemoteCatalog::new(http.clone(), &config.food_search_url),
            LocalCatalog,
        )) as Arc<dyn FoodCatalog>;

        let sink = Arc::new(HttpSink::new(
            http,
            &config.meal_log_url,
            &config.insights_url,
        )) as Arc<dyn MealLogSink>;

        Ok(Self::from_parts(config, catalog, sink))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        catalog: Arc<dyn FoodCatalog>,
        sink: Arc<dyn MealLogSink>,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            config,
            catalog,
            sink,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    /// Serializes all mutations to the session map and the logs inside it.
    /// Never hold the guard across an await.
    pub fn sessions(&self) -> MutexGuard<'_, HashMap<Uuid, LogSession>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MutationEvent> {
        self.events.subscribe()
    }

    pub fn notify_added(&self, log_id: Uuid, meal: MealType, name: &str) {
        // nobody listening is fine
        let _ = self.events.send(MutationEvent::ItemAdded {
            log_id,
            meal,
            name: name.to_string(),
        });
    }

    pub fn fake() -> Self {
        use crate::upstream::UpstreamError;
        use async_trait::async_trait;

        struct FakeSink;

        #[async_trait]
        impl MealLogSink for FakeSink {
            async fn store_meal_log(
                &self,
                _names: &PerMeal<Vec<String>>,
            ) -> Result<serde_json::Value, UpstreamError> {
                Ok(serde_json::json!({ "status": "stored" }))
            }

            async fn request_insights(&self) -> Result<(), UpstreamError> {
                Ok(())
            }
        }

        let config = Arc::new(AppConfig {
            food_search_url: "http://fake.local".into(),
            meal_log_url: "http://fake.local".into(),
            insights_url: "http://fake.local/generate_insights".into(),
            search_limit: 5,
            debounce_ms: 5,
        });

        Self::from_parts(
            config,
            Arc::new(LocalCatalog) as Arc<dyn FoodCatalog>,
            Arc::new(FakeSink) as Arc<dyn MealLogSink>,
        )
    }
}
