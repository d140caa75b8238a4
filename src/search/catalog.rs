use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::log::store::FoodItem;
use crate::upstream::UpstreamError;

/// One catalog hit: nutrition per single `unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogFood {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

impl CatalogFood {
    pub fn into_item(self) -> FoodItem {
        FoodItem {
            name: self.name,
            quantity: 1.0,
            unit: self.unit.unwrap_or_else(|| "pieces".to_string()),
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Remote,
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matches {
    pub foods: Vec<CatalogFood>,
    pub source: Source,
}

#[async_trait]
pub trait FoodCatalog: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Matches, UpstreamError>;
}

/// Remote food database: `GET {base}/search_foods?query=..&limit=..`.
#[derive(Clone)]
pub struct RemoteCatalog {
    http: reqwest::Client,
    base: String,
}

impl RemoteCatalog {
    pub fn new(http: reqwest::Client, base: &str) -> Self {
        Self {
            http,
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl FoodCatalog for RemoteCatalog {
    async fn search(&self, query: &str, limit: usize) -> Result<Matches, UpstreamError> {
        let limit_param = limit.to_string();
        let resp = self
            .http
            .get(format!("{}/search_foods", self.base))
            .query(&[("query", query), ("limit", limit_param.as_str())])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(UpstreamError::Status(resp.status()));
        }
        let foods = resp.json::<Vec<CatalogFood>>().await?;
        debug!(query, hits = foods.len(), "remote catalog search");
        Ok(Matches {
            foods,
            source: Source::Remote,
        })
    }
}

// Per-unit staples for offline resolution. Order matters: matches are served
// in table order, capped at the limit.
const LOCAL_FOODS: &[(&str, f64, f64, f64, f64, &str)] = &[
    ("Apple", 95.0, 0.5, 25.0, 0.3, "pieces"),
    ("Banana", 105.0, 1.3, 27.0, 0.4, "pieces"),
    ("Orange", 62.0, 1.2, 15.4, 0.2, "pieces"),
    ("Egg", 78.0, 6.3, 0.6, 5.3, "pieces"),
    ("White Bread", 79.0, 2.7, 14.7, 1.0, "slice"),
    ("Whole Wheat Bread", 81.0, 3.9, 13.8, 1.1, "slice"),
    ("Rice", 206.0, 4.3, 45.0, 0.4, "cup"),
    ("Pasta", 221.0, 8.1, 43.2, 1.3, "cup"),
    ("Chicken Breast", 165.0, 31.0, 0.0, 3.6, "100g"),
    ("Salmon", 208.0, 20.0, 0.0, 13.0, "100g"),
    ("Ground Beef", 250.0, 26.0, 0.0, 15.0, "100g"),
    ("Milk", 103.0, 8.0, 12.0, 2.4, "cup"),
    ("Greek Yogurt", 100.0, 17.0, 6.0, 0.7, "cup"),
    ("Cheddar Cheese", 113.0, 7.0, 0.4, 9.3, "slice"),
    ("Oatmeal", 158.0, 5.9, 27.0, 3.2, "cup"),
    ("Peanut Butter", 94.0, 4.0, 3.2, 8.1, "tbsp"),
    ("Almonds", 164.0, 6.0, 6.1, 14.2, "handful"),
    ("Avocado", 234.0, 2.9, 12.0, 21.0, "pieces"),
    ("Potato", 161.0, 4.3, 36.6, 0.2, "pieces"),
    ("Broccoli", 55.0, 3.7, 11.2, 0.6, "cup"),
    ("Carrot", 25.0, 0.6, 6.0, 0.1, "pieces"),
    ("Tomato", 22.0, 1.1, 4.8, 0.2, "pieces"),
    ("Orange Juice", 112.0, 1.7, 25.8, 0.5, "cup"),
    ("Dark Chocolate", 170.0, 2.2, 13.0, 12.0, "30g"),
];

/// Static in-process catalog used when the remote one is unreachable.
/// Case-insensitive substring match on the name, table order, no ranking.
#[derive(Clone, Default)]
pub struct LocalCatalog;

#[async_trait]
impl FoodCatalog for LocalCatalog {
    async fn search(&self, query: &str, limit: usize) -> Result<Matches, UpstreamError> {
        let needle = query.to_lowercase();
        let foods = LOCAL_FOODS
            .iter()
            .filter(|(name, ..)| name.to_lowercase().contains(&needle))
            .take(limit)
            .map(|&(name, calories, protein, carbs, fat, unit)| CatalogFood {
                name: name.to_string(),
                calories,
                protein,
                carbs,
                fat,
                unit: Some(unit.to_string()),
            })
            .collect();
        Ok(Matches {
            foods,
            source: Source::Local,
        })
    }
}

/// Try the primary catalog; on any error serve the fallback instead. Search
/// failures are recovered here and never reach the caller as errors.
pub struct FallbackCatalog<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackCatalog<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P: FoodCatalog, F: FoodCatalog> FoodCatalog for FallbackCatalog<P, F> {
    async fn search(&self, query: &str, limit: usize) -> Result<Matches, UpstreamError> {
        match self.primary.search(query, limit).await {
            Ok(matches) => Ok(matches),
            Err(e) => {
                warn!(error = %e, query, "primary catalog failed, using fallback");
                self.fallback.search(query, limit).await
            }
        }
    }
}
