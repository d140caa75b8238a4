use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub food_search_url: String,
    pub meal_log_url: String,
    pub insights_url: String,
    pub search_limit: usize,
    pub debounce_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let food_search_url = std::env::var("FOOD_SEARCH_URL")?;
        let meal_log_url = std::env::var("MEAL_LOG_URL")?;
        let insights_url = std::env::var("INSIGHTS_URL").unwrap_or_else(|_| {
            format!("{}/generate_insights", meal_log_url.trim_end_matches('/'))
        });
        let search_limit = std::env::var("SEARCH_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(5);
        let debounce_ms = std::env::var("SEARCH_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(300);
        Ok(Self {
            food_search_url,
            meal_log_url,
            insights_url,
            search_limit,
            debounce_ms,
        })
    }
}
