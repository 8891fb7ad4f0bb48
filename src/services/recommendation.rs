//! Recommendation engine.
//!
//! Two paths produce a ranked list: the optional text-generation adapter
//! (reconciled against the catalog) and a deterministic rule-based scorer
//! over the preference store. The rule-based path is always available and is
//! the mandatory fallback for every adapter failure.

use crate::config::{RecommendationConfig, SignalConfig};
use crate::error::{EngineError, Result};
use crate::lexicon::Lexicon;
use crate::llm::{extract_json, GenerationAdapter};
use crate::models::{
    CatalogItem, MealType, RankedRecommendation, RecommendationMethod, SuggestedItem,
    UserPreferences, UserProfile,
};
use crate::ports::{CatalogReader, MealPlanReader, PreferenceRepository, ProfileReader};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Sentinel forced onto any item containing a declared allergen. Dominates
/// every realistic positive accumulation, guaranteeing exclusion from top-N.
pub const ALLERGEN_SENTINEL: f64 = -1.0e9;

/// Adapter suggestion list entry after parsing. A malformed element is an
/// explicit variant, not an implicit empty fallthrough.
#[derive(Debug)]
enum AdapterSuggestion {
    Recognized(SuggestedItem),
    Unparseable(Value),
}

/// Ranked list plus the method that produced it.
pub struct RankedList {
    pub items: Vec<RankedRecommendation>,
    pub method: RecommendationMethod,
}

pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogReader>,
    profiles: Arc<dyn ProfileReader>,
    meal_plan: Arc<dyn MealPlanReader>,
    repo: Arc<dyn PreferenceRepository>,
    adapter: Option<GenerationAdapter>,
    ingredient_lexicon: Arc<Lexicon>,
    config: RecommendationConfig,
    signals: SignalConfig,
}

struct PromptContext {
    top_ingredients: Vec<(String, f64)>,
    top_categories: Vec<(Uuid, f64)>,
    recent_searches: Vec<String>,
    profile: UserProfile,
}

impl RecommendationEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        profiles: Arc<dyn ProfileReader>,
        meal_plan: Arc<dyn MealPlanReader>,
        repo: Arc<dyn PreferenceRepository>,
        adapter: Option<GenerationAdapter>,
        ingredient_lexicon: Arc<Lexicon>,
        config: RecommendationConfig,
        signals: SignalConfig,
    ) -> Self {
        Self {
            catalog,
            profiles,
            meal_plan,
            repo,
            adapter,
            ingredient_lexicon,
            config,
            signals,
        }
    }

    /// Produce up to `limit` ranked catalog items for the user.
    pub async fn recommend(&self, user_id: Uuid) -> Result<RankedList> {
        self.recommend_inner(user_id, self.config.limit, None).await
    }

    /// Narrowed variant for a specific meal slot.
    pub async fn suggest_for_meal(
        &self,
        user_id: Uuid,
        meal_type: MealType,
        day: &str,
    ) -> Result<RankedList> {
        self.recommend_inner(
            user_id,
            self.config.meal_suggestion_limit,
            Some((meal_type, day)),
        )
        .await
    }

    async fn recommend_inner(
        &self,
        user_id: Uuid,
        limit: usize,
        meal: Option<(MealType, &str)>,
    ) -> Result<RankedList> {
        if user_id.is_nil() {
            return Err(EngineError::InvalidInput("user_id is required".into()));
        }

        let prefs = self.repo.get(user_id).await?;
        let context = PromptContext {
            top_ingredients: prefs.top_ingredients(self.config.top_ingredients),
            top_categories: prefs.top_categories(self.config.top_categories),
            recent_searches: self
                .repo
                .recent_searches(user_id, self.signals.search_history_limit)
                .await?,
            profile: self.profiles.get_profile(user_id).await?,
        };

        if let Some(adapter) = &self.adapter {
            match self.adapter_path(adapter, &context, limit, meal).await {
                Ok(items) => {
                    return Ok(RankedList {
                        items,
                        method: RecommendationMethod::AiBehaviorBased,
                    })
                }
                Err(e) if e.is_fallback_trigger() => {
                    warn!(%user_id, error = %e, "Adapter path failed; using rule-based ranking");
                }
                Err(e) => return Err(e),
            }
        }

        let items = self
            .rule_based(user_id, &prefs, &context.profile, limit)
            .await?;
        Ok(RankedList {
            items,
            method: RecommendationMethod::RuleBased,
        })
    }

    // ============================================
    // Adapter path
    // ============================================

    async fn adapter_path(
        &self,
        adapter: &GenerationAdapter,
        context: &PromptContext,
        limit: usize,
        meal: Option<(MealType, &str)>,
    ) -> Result<Vec<RankedRecommendation>> {
        let prompt = self.build_prompt(context, limit, meal);
        let response = adapter.generate(&prompt).await?;
        let suggestions = parse_suggestions(&response)?;

        let catalog_items = self.catalog.list_items().await?;

        let mut items = Vec::new();
        for suggestion in suggestions.into_iter().take(limit) {
            match suggestion {
                AdapterSuggestion::Recognized(s) => {
                    let matched = match_by_name(&catalog_items, &s.name);
                    items.push(RankedRecommendation {
                        name: s.name,
                        item_id: matched.map(|item| item.id),
                        exists_in_db: matched.is_some(),
                        score: 0.0,
                        reasons: vec![s.reason],
                        estimated_calories: s.estimated_calories,
                    });
                }
                AdapterSuggestion::Unparseable(value) => {
                    debug!(%value, "Skipping unparseable adapter suggestion");
                }
            }
        }

        if items.is_empty() {
            return Err(EngineError::AdapterParse(
                "No recognizable suggestions in adapter response".into(),
            ));
        }
        Ok(items)
    }

    fn build_prompt(
        &self,
        context: &PromptContext,
        limit: usize,
        meal: Option<(MealType, &str)>,
    ) -> String {
        let ingredients = context
            .top_ingredients
            .iter()
            .map(|(name, score)| format!("- {name} (score: {score:.2})"))
            .collect::<Vec<_>>()
            .join("\n");
        let categories = context
            .top_categories
            .iter()
            .map(|(id, score)| format!("- category {id} (score: {score:.2})"))
            .collect::<Vec<_>>()
            .join("\n");
        let searches = context.recent_searches.join(", ");
        let calorie_limit = context
            .profile
            .calorie_limit
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none".to_string());

        let meal_guidance = match meal {
            Some((meal_type, day)) => format!(
                "\nThese suggestions are for {} on {}. {}",
                meal_type.as_str(),
                day,
                meal_type.guidance()
            ),
            None => String::new(),
        };

        format!(
            r#"You are a meal recommendation assistant for a recipe platform. Suggest dishes this user is likely to enjoy.

USER TASTE PROFILE:

Preferred ingredients (with accumulated preference scores):
{ingredients}

Preferred categories:
{categories}

Recent searches: {searches}

Declared allergies (never suggest anything containing these): {allergies}
Favorite foods: {favorites}
Daily calorie limit: {calorie_limit}
{meal_guidance}

TASK: Suggest up to {limit} dishes. Return ONLY a JSON array in this exact format:
[
  {{"name": "dish name", "reason": "one sentence why this fits the user", "estimated_calories": 450}},
  ...
]

Return ONLY valid JSON, no other text."#,
            ingredients = if ingredients.is_empty() { "- none yet" } else { &ingredients },
            categories = if categories.is_empty() { "- none yet" } else { &categories },
            searches = if searches.is_empty() { "none" } else { &searches },
            allergies = if context.profile.allergies.is_empty() {
                "none"
            } else {
                &context.profile.allergies
            },
            favorites = if context.profile.favorite_foods.is_empty() {
                "none"
            } else {
                &context.profile.favorite_foods
            },
            calorie_limit = calorie_limit,
            meal_guidance = meal_guidance,
            limit = limit,
        )
    }

    // ============================================
    // Rule-based fallback
    // ============================================

    async fn rule_based(
        &self,
        user_id: Uuid,
        prefs: &UserPreferences,
        profile: &UserProfile,
        limit: usize,
    ) -> Result<Vec<RankedRecommendation>> {
        let catalog_items = self.catalog.list_items().await?;
        let allergens = profile.allergen_terms();

        let mut scored = Vec::with_capacity(catalog_items.len());
        for item in &catalog_items {
            scored.push(self.score_item(user_id, item, prefs, &allergens).await?);
        }

        // Stable sort: equal scores keep catalog enumeration order.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn score_item(
        &self,
        user_id: Uuid,
        item: &CatalogItem,
        prefs: &UserPreferences,
        allergens: &[String],
    ) -> Result<RankedRecommendation> {
        let text = item.full_text();
        let mut score = 0.0;
        let mut reasons = Vec::new();

        for ingredient in self.ingredient_lexicon.matches_in(&text) {
            if let Some(entry) = prefs.ingredients.get(&ingredient) {
                score += entry.score;
                if entry.score > 0.0 {
                    reasons.push(format!("Contains {ingredient}, which you engage with"));
                }
            }
        }

        if let Some(entry) = prefs.categories.get(&item.category_id) {
            score += self.signals.category_multiplier * entry.score;
            if entry.score > 0.0 {
                reasons.push("From a category you engage with".to_string());
            }
        }

        let view_count = self.repo.item_view_count(user_id, item.id).await?;
        score -= self.config.view_count_penalty * f64::from(view_count);

        if self.meal_plan.contains(user_id, item.id).await? {
            score -= self.config.in_plan_penalty;
        }

        // Evaluated last and unconditionally: an allergen hit overrides every
        // other contribution.
        for allergen in allergens {
            if Lexicon::text_contains(&text, allergen) {
                score = ALLERGEN_SENTINEL;
                reasons = vec![format!("Excluded: contains declared allergen '{allergen}'")];
                break;
            }
        }

        Ok(RankedRecommendation {
            name: item.name.clone(),
            item_id: Some(item.id),
            exists_in_db: true,
            score,
            reasons,
            estimated_calories: None,
        })
    }
}

/// Parse the adapter response into per-entry tagged variants. A failure to
/// parse the array itself is an `AdapterParse` error (fallback trigger).
fn parse_suggestions(response: &str) -> Result<Vec<AdapterSuggestion>> {
    let body = extract_json(response);
    let values: Vec<Value> = serde_json::from_str(body)
        .map_err(|e| EngineError::AdapterParse(format!("Expected a JSON array: {e}")))?;

    Ok(values
        .into_iter()
        .map(|value| match serde_json::from_value::<SuggestedItem>(value.clone()) {
            Ok(item) if !item.name.trim().is_empty() => AdapterSuggestion::Recognized(item),
            _ => AdapterSuggestion::Unparseable(value),
        })
        .collect())
}

/// Exact case-insensitive match first, then substring in either direction.
fn match_by_name<'a>(items: &'a [CatalogItem], name: &str) -> Option<&'a CatalogItem> {
    let needle = name.to_lowercase();
    items
        .iter()
        .find(|item| item.name.to_lowercase() == needle)
        .or_else(|| {
            items.iter().find(|item| {
                let candidate = item.name.to_lowercase();
                candidate.contains(&needle) || needle.contains(&candidate)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::llm::TextGenProvider;
    use crate::models::{BehaviorEvent, BehaviorKind};
    use crate::ports::{MockMealPlanReader, MockProfileReader};
    use crate::services::SignalRecorder;
    use crate::store::InMemoryPreferenceStore;
    use async_trait::async_trait;

    struct FixedCatalog {
        items: Vec<CatalogItem>,
    }

    #[async_trait]
    impl CatalogReader for FixedCatalog {
        async fn list_items(&self) -> Result<Vec<CatalogItem>> {
            Ok(self.items.clone())
        }

        async fn get_item(&self, id: Uuid) -> Result<Option<CatalogItem>> {
            Ok(self.items.iter().find(|i| i.id == id).cloned())
        }
    }

    struct CannedProvider(String);

    #[async_trait]
    impl TextGenProvider for CannedProvider {
        async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl TextGenProvider for FailingProvider {
        async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
            Err(EngineError::AdapterUnavailable("connection refused".into()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn item(name: &str, text: &str, category_id: Uuid) -> CatalogItem {
        CatalogItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: text.to_string(),
            recipe_text: String::new(),
            category_id,
        }
    }

    struct Fixture {
        engine: RecommendationEngine,
        store: Arc<InMemoryPreferenceStore>,
        catalog: Arc<FixedCatalog>,
    }

    fn fixture(
        items: Vec<CatalogItem>,
        profile: UserProfile,
        adapter: Option<GenerationAdapter>,
    ) -> Fixture {
        let store = Arc::new(InMemoryPreferenceStore::new());
        let catalog = Arc::new(FixedCatalog { items });

        let mut profiles = MockProfileReader::new();
        profiles
            .expect_get_profile()
            .returning(move |_| Ok(profile.clone()));

        let mut meal_plan = MockMealPlanReader::new();
        meal_plan.expect_contains().returning(|_, _| Ok(false));

        let lexicon = Arc::new(Lexicon::from_terms([
            "garlic", "basil", "pasta", "peanut", "tofu", "rice",
        ]));

        let engine = RecommendationEngine::new(
            catalog.clone(),
            Arc::new(profiles),
            Arc::new(meal_plan),
            store.clone(),
            adapter,
            lexicon,
            RecommendationConfig::default(),
            SignalConfig::default(),
        );
        Fixture {
            engine,
            store,
            catalog,
        }
    }

    async fn seed_likes(fixture: &Fixture, user: Uuid, item_id: Uuid, likes: usize) {
        let recorder = SignalRecorder::new(
            fixture.store.clone(),
            fixture.catalog.clone(),
            Arc::new(Lexicon::from_terms([
                "garlic", "basil", "pasta", "peanut", "tofu", "rice",
            ])),
            SignalConfig::default(),
        );
        for _ in 0..likes {
            recorder
                .record(&BehaviorEvent::interaction(BehaviorKind::Like, user, item_id))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_unconfigured_adapter_always_rule_based() {
        let category = Uuid::new_v4();
        let fixture = fixture(
            vec![item("Garlic Pasta", "pasta with garlic", category)],
            UserProfile::default(),
            None,
        );

        let list = fixture.engine.recommend(Uuid::new_v4()).await.unwrap();
        assert_eq!(list.method, RecommendationMethod::RuleBased);
        assert_eq!(list.items.len(), 1);
    }

    #[tokio::test]
    async fn test_rule_based_prefers_liked_ingredients() {
        let category = Uuid::new_v4();
        let other_category = Uuid::new_v4();
        let garlic = item("Garlic Pasta", "pasta with garlic and basil", category);
        let garlic_id = garlic.id;
        let tofu = item("Tofu Bowl", "tofu with rice", other_category);
        let fixture = fixture(vec![tofu, garlic], UserProfile::default(), None);

        let user = Uuid::new_v4();
        seed_likes(&fixture, user, garlic_id, 3).await;

        let list = fixture.engine.recommend(user).await.unwrap();
        assert_eq!(list.items[0].name, "Garlic Pasta");
        assert!(list.items[0].score > list.items[1].score);
        assert!(!list.items[0].reasons.is_empty());
    }

    #[tokio::test]
    async fn test_allergen_item_never_in_top_n() {
        let category = Uuid::new_v4();
        let peanut = item("Peanut Noodles", "noodles with peanut sauce and garlic", category);
        let peanut_id = peanut.id;
        let safe = item("Tofu Bowl", "tofu with rice", category);
        let profile = UserProfile {
            allergies: "peanut".to_string(),
            ..Default::default()
        };
        let fixture = fixture(vec![peanut, safe], profile, None);

        let user = Uuid::new_v4();
        // Strong positive signal for the allergen item: still excluded.
        seed_likes(&fixture, user, peanut_id, 50).await;

        let list = fixture.engine.recommend(user).await.unwrap();
        let flagged = list
            .items
            .iter()
            .find(|r| r.name == "Peanut Noodles")
            .unwrap();
        assert_eq!(flagged.score, ALLERGEN_SENTINEL);
        assert_eq!(list.items[0].name, "Tofu Bowl");
        assert!(flagged.reasons[0].contains("allergen"));
    }

    #[tokio::test]
    async fn test_result_bounded_by_catalog_size() {
        let category = Uuid::new_v4();
        let fixture = fixture(
            vec![
                item("A", "garlic", category),
                item("B", "basil", category),
                item("C", "rice", category),
            ],
            UserProfile::default(),
            None,
        );

        let list = fixture.engine.recommend(Uuid::new_v4()).await.unwrap();
        assert_eq!(list.items.len(), 3);
    }

    #[tokio::test]
    async fn test_limit_applied_to_large_catalog() {
        let category = Uuid::new_v4();
        let items: Vec<CatalogItem> = (0..25)
            .map(|i| item(&format!("Dish {i}"), "garlic and rice", category))
            .collect();
        let fixture = fixture(items, UserProfile::default(), None);

        let list = fixture.engine.recommend(Uuid::new_v4()).await.unwrap();
        assert_eq!(list.items.len(), 10);
    }

    #[tokio::test]
    async fn test_ties_keep_catalog_order() {
        let category = Uuid::new_v4();
        let fixture = fixture(
            vec![
                item("First", "plain dish", category),
                item("Second", "plain dish", category),
            ],
            UserProfile::default(),
            None,
        );

        let list = fixture.engine.recommend(Uuid::new_v4()).await.unwrap();
        assert_eq!(list.items[0].name, "First");
        assert_eq!(list.items[1].name, "Second");
    }

    #[tokio::test]
    async fn test_adapter_path_reconciles_names() {
        let category = Uuid::new_v4();
        let response = r#"```json
[
  {"name": "Garlic Pasta", "reason": "matches your garlic habit", "estimated_calories": 520},
  {"name": "Dragonfruit Sorbet", "reason": "something new", "estimated_calories": 180},
  {"bogus": true}
]
```"#;
        let adapter = GenerationAdapter::with_provider(
            Arc::new(CannedProvider(response.to_string())),
            256,
            5,
        );
        let fixture = fixture(
            vec![item("Garlic Pasta", "pasta with garlic", category)],
            UserProfile::default(),
            Some(adapter),
        );

        let list = fixture.engine.recommend(Uuid::new_v4()).await.unwrap();
        assert_eq!(list.method, RecommendationMethod::AiBehaviorBased);
        assert_eq!(list.items.len(), 2);
        assert!(list.items[0].exists_in_db);
        assert!(list.items[0].item_id.is_some());
        assert!(!list.items[1].exists_in_db);
        assert!(list.items[1].item_id.is_none());
        assert_eq!(list.items[1].estimated_calories, Some(180));
    }

    #[tokio::test]
    async fn test_adapter_failure_falls_back() {
        let category = Uuid::new_v4();
        let adapter = GenerationAdapter::with_provider(Arc::new(FailingProvider), 256, 5);
        let fixture = fixture(
            vec![item("Garlic Pasta", "pasta with garlic", category)],
            UserProfile::default(),
            Some(adapter),
        );

        let list = fixture.engine.recommend(Uuid::new_v4()).await.unwrap();
        assert_eq!(list.method, RecommendationMethod::RuleBased);
        assert_eq!(list.items.len(), 1);
    }

    #[tokio::test]
    async fn test_adapter_garbage_falls_back() {
        let category = Uuid::new_v4();
        let adapter = GenerationAdapter::with_provider(
            Arc::new(CannedProvider("sorry, I can't help with that".to_string())),
            256,
            5,
        );
        let fixture = fixture(
            vec![item("Garlic Pasta", "pasta with garlic", category)],
            UserProfile::default(),
            Some(adapter),
        );

        let list = fixture.engine.recommend(Uuid::new_v4()).await.unwrap();
        assert_eq!(list.method, RecommendationMethod::RuleBased);
    }

    #[tokio::test]
    async fn test_meal_suggestions_limited_to_three() {
        let category = Uuid::new_v4();
        let items: Vec<CatalogItem> = (0..8)
            .map(|i| item(&format!("Dish {i}"), "garlic and rice", category))
            .collect();
        let fixture = fixture(items, UserProfile::default(), None);

        let list = fixture
            .engine
            .suggest_for_meal(Uuid::new_v4(), MealType::Breakfast, "monday")
            .await
            .unwrap();
        assert_eq!(list.method, RecommendationMethod::RuleBased);
        assert_eq!(list.items.len(), 3);
    }

    #[test]
    fn test_match_by_name_exact_then_substring() {
        let category = Uuid::new_v4();
        let items = vec![
            item("Garlic Pasta", "", category),
            item("Spicy Garlic Pasta Deluxe", "", category),
        ];
        assert_eq!(
            match_by_name(&items, "garlic pasta").unwrap().name,
            "Garlic Pasta"
        );
        assert_eq!(
            match_by_name(&items, "Spicy Garlic").unwrap().name,
            "Spicy Garlic Pasta Deluxe"
        );
        assert!(match_by_name(&items, "sorbet").is_none());
    }

    #[test]
    fn test_parse_suggestions_whole_failure() {
        let err = parse_suggestions("{not json").unwrap_err();
        assert!(matches!(err, EngineError::AdapterParse(_)));
    }
}
