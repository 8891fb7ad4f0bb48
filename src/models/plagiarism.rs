use super::moderation::VerdictSource;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A newly submitted recipe to screen for near-duplicate content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSubmission {
    pub title: String,
    pub summary: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
}

/// Corpus entry supplied by the recipe-corpus collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingRecipe {
    pub id: Uuid,
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
}

/// Derived, ephemeral similarity verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlagiarismVerdict {
    /// Normalized similarity in [0, 1] against the closest corpus entry.
    pub similarity_score: f64,
    pub matched_item_id: Option<Uuid>,
    pub is_duplicate: bool,
    pub source: VerdictSource,
}

impl PlagiarismVerdict {
    pub fn original(source: VerdictSource) -> Self {
        Self {
            similarity_score: 0.0,
            matched_item_id: None,
            is_duplicate: false,
            source,
        }
    }
}
