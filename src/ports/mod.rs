//! Collaborator boundaries consumed by the engine. Persistence, the catalog,
//! user profiles, meal plans, and the recipe corpus are all owned elsewhere;
//! the engine only sees these traits.

use crate::error::Result;
use crate::models::{CatalogItem, ExistingRecipe, UserPreferences, UserProfile};
use async_trait::async_trait;
use uuid::Uuid;

/// Read-only view of the recipe catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn list_items(&self) -> Result<Vec<CatalogItem>>;
    async fn get_item(&self, id: Uuid) -> Result<Option<CatalogItem>>;
}

/// Read-only view of user profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileReader: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile>;
}

/// Read-only view of the user's current meal plan.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MealPlanReader: Send + Sync {
    async fn contains(&self, user_id: Uuid, item_id: Uuid) -> Result<bool>;
}

/// Bounded sample of existing recipes for plagiarism comparison.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeCorpusReader: Send + Sync {
    async fn sample(&self, limit: usize) -> Result<Vec<ExistingRecipe>>;
}

/// Durable mapping from (user, ingredient) and (user, category) to
/// accumulated preference scores, plus per-user behavioral audit data.
///
/// Upserts add a signed delta to the current score (default 0) and bump the
/// interaction count by one. Implementations must apply the delta atomically
/// per key so concurrent events never lose an update.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<UserPreferences>;
    async fn upsert_ingredient(&self, user_id: Uuid, name: &str, delta: f64) -> Result<()>;
    async fn upsert_category(&self, user_id: Uuid, category_id: Uuid, delta: f64) -> Result<()>;

    /// Record a raw search query as audit data. No scoring effect.
    async fn record_search(&self, user_id: Uuid, query: &str, result_count: u32) -> Result<()>;
    async fn recent_searches(&self, user_id: Uuid, limit: usize) -> Result<Vec<String>>;

    async fn bump_item_view(&self, user_id: Uuid, item_id: Uuid) -> Result<()>;
    async fn item_view_count(&self, user_id: Uuid, item_id: Uuid) -> Result<u32>;
}
