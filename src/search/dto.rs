use serde::{Deserialize, Serialize};

use crate::search::catalog::{CatalogFood, Source};
use crate::search::debounce::SearchPhase;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub phase: SearchPhase,
    pub matches: Vec<CatalogFood>,
    pub source: Option<Source>,
    /// True when a newer keystroke for this bucket overtook the request;
    /// nothing was applied and `matches` is empty.
    pub superseded: bool,
}
