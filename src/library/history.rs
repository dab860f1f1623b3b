//! Search history.

use std::sync::Arc;

use tracing::warn;

use crate::error::{AppError, Result};
use crate::library::SEARCH_HISTORY_LIMIT;
use crate::storage::{load_json, save_json, KeyValueStore, SEARCH_HISTORY_KEY};

// == Search History ==
/// Newest-first list of committed searches, unique ignoring case and
/// surrounding whitespace, capped at [`SEARCH_HISTORY_LIMIT`].
pub struct SearchHistory {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<String>,
}

impl SearchHistory {
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let mut entries: Vec<String> = load_json(store.as_ref(), SEARCH_HISTORY_KEY)
            .await
            .unwrap_or_default();
        entries.truncate(SEARCH_HISTORY_LIMIT);
        Self { store, entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    // == Record ==
    /// Puts a query at the front, replacing any earlier equivalent one.
    ///
    /// The stored text is the trimmed query as typed most recently.
    pub async fn record(&mut self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidRequest(
                "Search query cannot be empty".to_string(),
            ));
        }

        let normalized = normalize(query);
        self.entries.retain(|e| normalize(e) != normalized);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(SEARCH_HISTORY_LIMIT);
        self.persist().await
    }

    /// Removes a query. Returns `Ok(false)` if it was not present.
    pub async fn remove(&mut self, query: &str) -> Result<bool> {
        let normalized = normalize(query);
        let before = self.entries.len();
        self.entries.retain(|e| normalize(e) != normalized);
        if self.entries.len() == before {
            return Ok(false);
        }
        self.persist().await?;
        Ok(true)
    }

    pub async fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.persist().await
    }

    async fn persist(&self) -> Result<()> {
        save_json(self.store.as_ref(), SEARCH_HISTORY_KEY, &self.entries)
            .await
            .map_err(|e| {
                warn!(error = %e, "search history kept in memory only");
                AppError::NotPersisted(e)
            })
    }
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}
