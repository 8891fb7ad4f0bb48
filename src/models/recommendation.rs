use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a recommendation list was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationMethod {
    #[serde(rename = "ai_behavior_based")]
    AiBehaviorBased,
    #[serde(rename = "rule_based")]
    RuleBased,
}

impl RecommendationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationMethod::AiBehaviorBased => "ai_behavior_based",
            RecommendationMethod::RuleBased => "rule_based",
        }
    }
}

/// One entry parsed out of the adapter's suggestion list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedItem {
    pub name: String,
    pub reason: String,
    pub estimated_calories: Option<u32>,
}

/// A ranked recommendation returned to the caller.
///
/// Adapter suggestions that could not be matched to the catalog are still
/// returned with `exists_in_db = false` and no item id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRecommendation {
    pub name: String,
    pub item_id: Option<Uuid>,
    pub exists_in_db: bool,
    pub score: f64,
    pub reasons: Vec<String>,
    pub estimated_calories: Option<u32>,
}
