//! In-memory preference store backed by `DashMap`.
//!
//! Each upsert goes through the map's entry API, which locks the shard for
//! the key being updated. Concurrent deltas to the same (user, key) pair
//! therefore serialize per key and always sum exactly; the read-modify-write
//! lost-update window of a naive read-then-write store does not exist here.

use crate::config::SignalConfig;
use crate::error::Result;
use crate::models::{PreferenceEntry, UserPreferences};
use crate::ports::PreferenceRepository;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::VecDeque;
use uuid::Uuid;

pub struct InMemoryPreferenceStore {
    ingredients: DashMap<(Uuid, String), PreferenceEntry>,
    categories: DashMap<(Uuid, Uuid), PreferenceEntry>,
    searches: DashMap<Uuid, VecDeque<(String, u32)>>,
    item_views: DashMap<(Uuid, Uuid), u32>,
    audit_capacity: usize,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::with_audit_capacity(SignalConfig::default().search_history_limit)
    }

    /// The search audit ring keeps this many entries per user; wire it to
    /// `SignalConfig::search_history_limit` so a raised limit is honored.
    pub fn with_audit_capacity(capacity: usize) -> Self {
        Self {
            ingredients: DashMap::new(),
            categories: DashMap::new(),
            searches: DashMap::new(),
            item_views: DashMap::new(),
            audit_capacity: capacity,
        }
    }

    /// Recorded `(query, result_count)` pairs, most recent first.
    pub fn search_audit(&self, user_id: Uuid) -> Vec<(String, u32)> {
        self.searches
            .get(&user_id)
            .map(|history| history.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for InMemoryPreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreferenceRepository for InMemoryPreferenceStore {
    async fn get(&self, user_id: Uuid) -> Result<UserPreferences> {
        let mut prefs = UserPreferences::default();
        for entry in self.ingredients.iter() {
            let (owner, name) = entry.key();
            if *owner == user_id {
                prefs.ingredients.insert(name.clone(), entry.value().clone());
            }
        }
        for entry in self.categories.iter() {
            let (owner, category_id) = entry.key();
            if *owner == user_id {
                prefs.categories.insert(*category_id, entry.value().clone());
            }
        }
        Ok(prefs)
    }

    async fn upsert_ingredient(&self, user_id: Uuid, name: &str, delta: f64) -> Result<()> {
        self.ingredients
            .entry((user_id, name.to_lowercase()))
            .or_insert_with(PreferenceEntry::zero)
            .apply(delta);
        Ok(())
    }

    async fn upsert_category(&self, user_id: Uuid, category_id: Uuid, delta: f64) -> Result<()> {
        self.categories
            .entry((user_id, category_id))
            .or_insert_with(PreferenceEntry::zero)
            .apply(delta);
        Ok(())
    }

    async fn record_search(&self, user_id: Uuid, query: &str, result_count: u32) -> Result<()> {
        tracing::debug!(%user_id, query, result_count, "Recorded search audit entry");
        let mut history = self.searches.entry(user_id).or_default();
        history.push_front((query.to_string(), result_count));
        history.truncate(self.audit_capacity);
        Ok(())
    }

    async fn recent_searches(&self, user_id: Uuid, limit: usize) -> Result<Vec<String>> {
        Ok(self
            .searches
            .get(&user_id)
            .map(|history| {
                history
                    .iter()
                    .take(limit)
                    .map(|(query, _)| query.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn bump_item_view(&self, user_id: Uuid, item_id: Uuid) -> Result<()> {
        *self.item_views.entry((user_id, item_id)).or_insert(0) += 1;
        Ok(())
    }

    async fn item_view_count(&self, user_id: Uuid, item_id: Uuid) -> Result<u32> {
        Ok(self
            .item_views
            .get(&(user_id, item_id))
            .map(|count| *count)
            .unwrap_or(0))
    }
}
