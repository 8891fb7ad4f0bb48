use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Accumulated preference score for one (user, key) pair.
///
/// Scores are unbounded reals; every behavioral event contributes exactly one
/// signed delta and never overwrites the accumulated value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceEntry {
    pub score: f64,
    pub interaction_count: u32,
    pub updated_at: DateTime<Utc>,
}

impl PreferenceEntry {
    pub fn zero() -> Self {
        Self {
            score: 0.0,
            interaction_count: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, delta: f64) {
        self.score += delta;
        self.interaction_count += 1;
        self.updated_at = Utc::now();
    }
}

/// Snapshot of everything the store knows about one user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    pub ingredients: HashMap<String, PreferenceEntry>,
    pub categories: HashMap<Uuid, PreferenceEntry>,
}

impl UserPreferences {
    /// Top ingredient preferences by score, descending.
    pub fn top_ingredients(&self, limit: usize) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .ingredients
            .iter()
            .map(|(name, entry)| (name.clone(), entry.score))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(limit);
        ranked
    }

    /// Top category preferences by score, descending.
    pub fn top_categories(&self, limit: usize) -> Vec<(Uuid, f64)> {
        let mut ranked: Vec<(Uuid, f64)> = self
            .categories
            .iter()
            .map(|(id, entry)| (*id, entry.score))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(limit);
        ranked
    }
}
