//! Query parameter types shared by handlers.

use serde::Deserialize;

/// `?q=` name filter for the student directory.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// `?limit=` for the completed-pickup history. Clamped by the queue engine.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
}
