//! Plagiarism detector.
//!
//! Lexical similarity only: a normalized character-level edit-distance ratio
//! over serialized ingredient and step lists, averaged. No embeddings, no
//! semantic matching.

use crate::config::PlagiarismConfig;
use crate::error::{EngineError, Result};
use crate::llm::{extract_json, GenerationAdapter};
use crate::models::{ExistingRecipe, PlagiarismVerdict, RecipeSubmission, VerdictSource};
use crate::ports::RecipeCorpusReader;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use strsim::normalized_levenshtein;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct PlagiarismDetector {
    corpus: Arc<dyn RecipeCorpusReader>,
    adapter: Option<GenerationAdapter>,
    config: PlagiarismConfig,
    whitespace: Regex,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteJudgment {
    is_plagiarized: bool,
    similarity_score: f64,
    most_similar_recipe_id: Option<Uuid>,
}

impl PlagiarismDetector {
    pub fn new(
        corpus: Arc<dyn RecipeCorpusReader>,
        adapter: Option<GenerationAdapter>,
        config: PlagiarismConfig,
    ) -> Self {
        Self {
            corpus,
            adapter,
            config,
            whitespace: Regex::new(r"\s+").expect("whitespace pattern is valid"),
        }
    }

    /// Screen a new submission against the existing corpus.
    pub async fn check(&self, submission: &RecipeSubmission) -> Result<PlagiarismVerdict> {
        if submission.title.trim().is_empty() {
            return Err(EngineError::InvalidInput("recipe title is required".into()));
        }

        if let Some(adapter) = &self.adapter {
            match self.check_remote(adapter, submission).await {
                Ok(verdict) => return Ok(verdict),
                Err(e) if e.is_fallback_trigger() => {
                    warn!(error = %e, "Remote plagiarism check failed; using edit-distance scan");
                }
                Err(e) => return Err(e),
            }
        }

        self.check_local(submission).await
    }

    /// Deterministic local path: max combined similarity over a bounded
    /// corpus sample.
    pub async fn check_local(&self, submission: &RecipeSubmission) -> Result<PlagiarismVerdict> {
        let corpus = self.corpus.sample(self.config.local_sample_size).await?;

        let new_ingredients = self.serialize(&submission.ingredients);
        let new_steps = self.serialize(&submission.steps);

        let mut best_score = 0.0_f64;
        let mut best_id = None;
        for existing in &corpus {
            let ing_sim =
                normalized_levenshtein(&new_ingredients, &self.serialize(&existing.ingredients));
            let step_sim = normalized_levenshtein(&new_steps, &self.serialize(&existing.steps));
            let combined = (ing_sim + step_sim) / 2.0;

            if combined > best_score {
                best_score = combined;
                best_id = Some(existing.id);
            }
        }

        debug!(
            best_score,
            corpus_size = corpus.len(),
            "Completed local plagiarism scan"
        );

        Ok(self.verdict(best_score, best_id, VerdictSource::Local))
    }

    async fn check_remote(
        &self,
        adapter: &GenerationAdapter,
        submission: &RecipeSubmission,
    ) -> Result<PlagiarismVerdict> {
        let corpus = self.corpus.sample(self.config.remote_sample_size).await?;
        if corpus.is_empty() {
            return Ok(PlagiarismVerdict::original(VerdictSource::Remote));
        }

        let existing: Vec<_> = corpus
            .iter()
            .map(|r| {
                json!({
                    "id": r.id,
                    "title": r.title,
                    "ingredients": r.ingredients,
                    "steps": r.steps,
                })
            })
            .collect();

        let prompt = format!(
            r#"You are a plagiarism checker for a recipe platform. Compare the new recipe against the existing recipes and judge whether it is copied.

NEW RECIPE:
{new_recipe}

EXISTING RECIPES:
{existing}

TASK: Return ONLY a JSON object in this exact format:
{{"isPlagiarized": false, "similarityScore": 0.42, "mostSimilarRecipeId": "uuid-or-null"}}

Return ONLY valid JSON, no other text."#,
            new_recipe = json!({
                "title": submission.title,
                "summary": submission.summary,
                "ingredients": submission.ingredients,
                "steps": submission.steps,
            }),
            existing = serde_json::Value::Array(existing),
        );

        let response = adapter.generate(&prompt).await?;
        let parsed: RemoteJudgment = serde_json::from_str(extract_json(&response))
            .map_err(|e| EngineError::AdapterParse(e.to_string()))?;

        Ok(PlagiarismVerdict {
            similarity_score: parsed.similarity_score.clamp(0.0, 1.0),
            matched_item_id: parsed.most_similar_recipe_id,
            is_duplicate: parsed.is_plagiarized
                || parsed.similarity_score >= self.config.duplicate_threshold,
            source: VerdictSource::Remote,
        })
    }

    fn verdict(
        &self,
        score: f64,
        matched_id: Option<Uuid>,
        source: VerdictSource,
    ) -> PlagiarismVerdict {
        let is_duplicate = score >= self.config.duplicate_threshold;
        // Below the similarity threshold the match is treated as original
        // and not worth reporting.
        let matched_item_id = if score >= self.config.similarity_threshold {
            matched_id
        } else {
            None
        };

        PlagiarismVerdict {
            similarity_score: score,
            matched_item_id,
            is_duplicate,
            source,
        }
    }

    /// Lowercased, whitespace-collapsed, newline-joined serialization of a
    /// list, so cosmetic formatting differences do not inflate distance.
    fn serialize(&self, lines: &[String]) -> String {
        lines
            .iter()
            .map(|line| self.whitespace.replace_all(line.trim(), " ").to_lowercase())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
