//! Signal recorder: converts raw behavioral events into bounded preference
//! deltas.
//!
//! Weight hierarchy is monotonic (`view < like < plan_add`). Category signal
//! is considered higher-confidence than any single ingredient hit and gets a
//! configurable multiplier. Updates are pure addition, so interleavings under
//! concurrency can only lose magnitude, never the sign of a preference.

use crate::config::SignalConfig;
use crate::error::{EngineError, Result};
use crate::lexicon::Lexicon;
use crate::models::{BehaviorEvent, BehaviorKind};
use crate::ports::{CatalogReader, PreferenceRepository};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct SignalRecorder {
    repo: Arc<dyn PreferenceRepository>,
    catalog: Arc<dyn CatalogReader>,
    ingredient_lexicon: Arc<Lexicon>,
    config: SignalConfig,
}

impl SignalRecorder {
    pub fn new(
        repo: Arc<dyn PreferenceRepository>,
        catalog: Arc<dyn CatalogReader>,
        ingredient_lexicon: Arc<Lexicon>,
        config: SignalConfig,
    ) -> Self {
        Self {
            repo,
            catalog,
            ingredient_lexicon,
            config,
        }
    }

    fn weight(&self, kind: BehaviorKind) -> f64 {
        match kind {
            BehaviorKind::View => self.config.view_weight,
            BehaviorKind::Like => self.config.like_weight,
            BehaviorKind::PlanAdd => self.config.plan_add_weight,
            BehaviorKind::Search => 0.0,
        }
    }

    /// Ingest one behavioral event, upserting the affected preference rows.
    pub async fn record(&self, event: &BehaviorEvent) -> Result<()> {
        if event.user_id.is_nil() {
            return Err(EngineError::InvalidInput("user_id is required".into()));
        }

        match event.kind {
            BehaviorKind::Search => self.record_search(event).await,
            BehaviorKind::View | BehaviorKind::Like | BehaviorKind::PlanAdd => {
                let target_id = event.target_id.ok_or_else(|| {
                    EngineError::InvalidInput(format!(
                        "target_id is required for {} events",
                        event.kind.as_str()
                    ))
                })?;
                self.record_interaction(event.user_id, target_id, event.kind)
                    .await
            }
        }
    }

    /// Best-effort variant for post-response side effects: failures are
    /// logged and swallowed so behavior tracking never fails the primary
    /// user-facing action.
    pub async fn record_best_effort(&self, event: &BehaviorEvent) {
        if let Err(e) = self.record(event).await {
            warn!(
                user_id = %event.user_id,
                kind = event.kind.as_str(),
                error = %e,
                "Behavior signal dropped"
            );
        }
    }

    async fn record_interaction(
        &self,
        user_id: Uuid,
        target_id: Uuid,
        kind: BehaviorKind,
    ) -> Result<()> {
        let Some(item) = self.catalog.get_item(target_id).await? else {
            debug!(%target_id, "Event targets unknown catalog item; nothing to score");
            return Ok(());
        };

        let delta = self.weight(kind);
        let ingredients = self.ingredient_lexicon.matches_in(&item.full_text());

        debug!(
            %user_id,
            item = %item.name,
            kind = kind.as_str(),
            delta,
            matched = ingredients.len(),
            "Applying preference deltas"
        );

        try_join_all(
            ingredients
                .iter()
                .map(|ingredient| self.repo.upsert_ingredient(user_id, ingredient, delta)),
        )
        .await?;

        // Independent of the ingredient upserts: a failure here must not
        // roll back deltas already applied above.
        self.repo
            .upsert_category(user_id, item.category_id, delta * self.config.category_multiplier)
            .await?;

        if kind == BehaviorKind::View {
            self.repo.bump_item_view(user_id, target_id).await?;
        }

        Ok(())
    }

    async fn record_search(&self, event: &BehaviorEvent) -> Result<()> {
        let payload = event
            .search
            .as_ref()
            .ok_or_else(|| EngineError::InvalidInput("search events require a query".into()))?;
        if payload.query.trim().is_empty() {
            return Err(EngineError::InvalidInput("search query is empty".into()));
        }

        self.repo
            .record_search(event.user_id, &payload.query, payload.result_count)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogItem;
    use crate::ports::MockCatalogReader;
    use crate::store::InMemoryPreferenceStore;

    fn pasta_item(id: Uuid, category_id: Uuid) -> CatalogItem {
        CatalogItem {
            id,
            name: "Garlic Basil Pasta".to_string(),
            description: "Pasta tossed with garlic and fresh basil".to_string(),
            recipe_text: "Boil pasta. Saute garlic in oil. Add basil.".to_string(),
            category_id,
        }
    }

    fn recorder_with_item(
        item: CatalogItem,
    ) -> (SignalRecorder, Arc<InMemoryPreferenceStore>) {
        let store = Arc::new(InMemoryPreferenceStore::new());
        let mut catalog = MockCatalogReader::new();
        let item_id = item.id;
        catalog
            .expect_get_item()
            .returning(move |id| {
                let item = item.clone();
                if id == item_id {
                    Ok(Some(item))
                } else {
                    Ok(None)
                }
            });

        let lexicon = Arc::new(Lexicon::from_terms(["garlic", "basil", "pasta", "anchovy"]));
        let recorder = SignalRecorder::new(
            store.clone(),
            Arc::new(catalog),
            lexicon,
            SignalConfig::default(),
        );
        (recorder, store)
    }

    #[tokio::test]
    async fn test_view_applies_view_weight_per_matched_ingredient() {
        let (item_id, category_id, user) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (recorder, store) = recorder_with_item(pasta_item(item_id, category_id));

        recorder
            .record(&BehaviorEvent::interaction(BehaviorKind::View, user, item_id))
            .await
            .unwrap();

        let prefs = store.get(user).await.unwrap();
        for name in ["garlic", "basil", "pasta"] {
            let entry = prefs.ingredients.get(name).unwrap();
            assert!((entry.score - 0.1).abs() < 1e-9, "{name}");
            assert_eq!(entry.interaction_count, 1);
        }
        assert!(prefs.ingredients.get("anchovy").is_none());
    }

    #[tokio::test]
    async fn test_category_delta_is_doubled() {
        let (item_id, category_id, user) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (recorder, store) = recorder_with_item(pasta_item(item_id, category_id));

        recorder
            .record(&BehaviorEvent::interaction(BehaviorKind::Like, user, item_id))
            .await
            .unwrap();

        let prefs = store.get(user).await.unwrap();
        let entry = prefs.categories.get(&category_id).unwrap();
        assert!((entry.score - 1.0).abs() < 1e-9); // 0.5 like weight x 2.0 multiplier
    }

    #[tokio::test]
    async fn test_like_then_view_is_order_independent() {
        let (item_id, category_id) = (Uuid::new_v4(), Uuid::new_v4());
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        let (recorder, store) = recorder_with_item(pasta_item(item_id, category_id));

        for (user, kinds) in [
            (user_a, [BehaviorKind::Like, BehaviorKind::View]),
            (user_b, [BehaviorKind::View, BehaviorKind::Like]),
        ] {
            for kind in kinds {
                recorder
                    .record(&BehaviorEvent::interaction(kind, user, item_id))
                    .await
                    .unwrap();
            }
        }

        for user in [user_a, user_b] {
            let prefs = store.get(user).await.unwrap();
            let entry = prefs.ingredients.get("garlic").unwrap();
            assert!((entry.score - 0.6).abs() < 1e-9);
            assert_eq!(entry.interaction_count, 2);
        }
    }

    #[tokio::test]
    async fn test_view_bumps_item_view_counter() {
        let (item_id, category_id, user) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (recorder, store) = recorder_with_item(pasta_item(item_id, category_id));

        for _ in 0..3 {
            recorder
                .record(&BehaviorEvent::interaction(BehaviorKind::View, user, item_id))
                .await
                .unwrap();
        }

        assert_eq!(store.item_view_count(user, item_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_search_records_audit_only() {
        let (item_id, category_id, user) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (recorder, store) = recorder_with_item(pasta_item(item_id, category_id));

        recorder
            .record(&BehaviorEvent::search(user, "quick garlic dinner", 7))
            .await
            .unwrap();

        let prefs = store.get(user).await.unwrap();
        assert!(prefs.ingredients.is_empty());
        assert_eq!(
            store.recent_searches(user, 10).await.unwrap(),
            vec!["quick garlic dinner"]
        );
    }

    #[tokio::test]
    async fn test_missing_target_is_invalid_input() {
        let (item_id, category_id) = (Uuid::new_v4(), Uuid::new_v4());
        let (recorder, _) = recorder_with_item(pasta_item(item_id, category_id));

        let event = BehaviorEvent {
            kind: BehaviorKind::Like,
            user_id: Uuid::new_v4(),
            target_id: None,
            search: None,
        };
        let err = recorder.record(&event).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_nil_user_is_invalid_input() {
        let (item_id, category_id) = (Uuid::new_v4(), Uuid::new_v4());
        let (recorder, _) = recorder_with_item(pasta_item(item_id, category_id));

        let event = BehaviorEvent::interaction(BehaviorKind::View, Uuid::nil(), item_id);
        let err = recorder.record(&event).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unknown_item_is_a_noop() {
        let (item_id, category_id, user) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (recorder, store) = recorder_with_item(pasta_item(item_id, category_id));

        recorder
            .record(&BehaviorEvent::interaction(
                BehaviorKind::Like,
                user,
                Uuid::new_v4(),
            ))
            .await
            .unwrap();

        assert!(store.get(user).await.unwrap().ingredients.is_empty());
    }

    #[tokio::test]
    async fn test_best_effort_swallows_errors() {
        let (item_id, category_id) = (Uuid::new_v4(), Uuid::new_v4());
        let (recorder, _) = recorder_with_item(pasta_item(item_id, category_id));

        let event = BehaviorEvent {
            kind: BehaviorKind::Like,
            user_id: Uuid::new_v4(),
            target_id: None,
            search: None,
        };
        recorder.record_best_effort(&event).await;
    }

    #[tokio::test]
    async fn test_n_views_accumulate_linearly() {
        let (item_id, category_id, user) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (recorder, store) = recorder_with_item(pasta_item(item_id, category_id));

        for _ in 0..25 {
            recorder
                .record(&BehaviorEvent::interaction(BehaviorKind::View, user, item_id))
                .await
                .unwrap();
        }

        let prefs = store.get(user).await.unwrap();
        let entry = prefs.ingredients.get("garlic").unwrap();
        assert!((entry.score - 2.5).abs() < 1e-9);
        assert_eq!(entry.interaction_count, 25);
    }
}
