//! Caller-facing surface consumed by the thin route layer.
//!
//! Every operation here follows the two-phase contract: the primary response
//! is produced first, and best-effort side effects (behavior tracking) may
//! only be logged on failure, never fail or alter the response.

use crate::error::{EngineError, Result};
use crate::models::{
    BehaviorEvent, ContentType, MealType, ModerationVerdict, PlagiarismVerdict,
    RankedRecommendation, RecipeSubmission, RecommendationMethod,
};
use crate::services::{
    ModerationEngine, PlagiarismDetector, RecommendationEngine, SignalRecorder,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<RankedRecommendation>,
    pub method: RecommendationMethod,
}

#[derive(Debug, Serialize)]
pub struct MealSuggestionsResponse {
    pub suggestions: Vec<RankedRecommendation>,
    pub method: RecommendationMethod,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCheckResponse {
    pub is_appropriate: bool,
    pub moderation: ModerationVerdict,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlagiarismCheckResponse {
    pub is_original: bool,
    pub plagiarism_check: PlagiarismVerdict,
}

/// Facade over the four engine services.
pub struct Engine {
    recorder: Arc<SignalRecorder>,
    recommender: Arc<RecommendationEngine>,
    moderation: Arc<ModerationEngine>,
    plagiarism: Arc<PlagiarismDetector>,
}

impl Engine {
    pub fn new(
        recorder: Arc<SignalRecorder>,
        recommender: Arc<RecommendationEngine>,
        moderation: Arc<ModerationEngine>,
        plagiarism: Arc<PlagiarismDetector>,
    ) -> Self {
        Self {
            recorder,
            recommender,
            moderation,
            plagiarism,
        }
    }

    /// Ingest a behavioral event. Invalid events are rejected; persistence
    /// failures are logged and swallowed because behavior tracking is
    /// best-effort.
    pub async fn record_behavior(&self, event: &BehaviorEvent) -> Result<()> {
        match self.recorder.record(event).await {
            Ok(()) => Ok(()),
            Err(e @ EngineError::InvalidInput(_)) => Err(e),
            Err(e) => {
                warn!(user_id = %event.user_id, error = %e, "Behavior signal dropped");
                Ok(())
            }
        }
    }

    pub async fn get_recommendations(&self, user_id: Uuid) -> Result<RecommendationsResponse> {
        let ranked = self.recommender.recommend(user_id).await?;
        Ok(RecommendationsResponse {
            recommendations: ranked.items,
            method: ranked.method,
        })
    }

    pub async fn get_meal_suggestions(
        &self,
        user_id: Uuid,
        meal_type: MealType,
        day: &str,
    ) -> Result<MealSuggestionsResponse> {
        let ranked = self
            .recommender
            .suggest_for_meal(user_id, meal_type, day)
            .await?;
        Ok(MealSuggestionsResponse {
            suggestions: ranked.items,
            method: ranked.method,
        })
    }

    /// Pre-write moderation hook: a blocking verdict means the originating
    /// write must be rejected; anything else is at most a warning.
    pub async fn check_content(
        &self,
        text: &str,
        content_type: ContentType,
    ) -> ContentCheckResponse {
        let verdict = self.moderation.classify(text, content_type).await;
        ContentCheckResponse {
            is_appropriate: !verdict.severity.blocks(),
            moderation: verdict,
        }
    }

    pub async fn check_plagiarism(
        &self,
        recipe: &RecipeSubmission,
    ) -> Result<PlagiarismCheckResponse> {
        let verdict = self.plagiarism.check(recipe).await?;
        Ok(PlagiarismCheckResponse {
            is_original: !verdict.is_duplicate,
            plagiarism_check: verdict,
        })
    }
}
