//! Content moderation engine.
//!
//! Remote classification through the text-generation adapter when available,
//! with a mandatory fallback to a fixed-lexicon scan. A remote failure is
//! never propagated to the caller.

use crate::error::{EngineError, Result};
use crate::lexicon::Lexicon;
use crate::llm::{extract_json, GenerationAdapter};
use crate::models::{ContentType, ModerationVerdict, Severity, VerdictSource};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ModerationEngine {
    profanity_lexicon: Arc<Lexicon>,
    adapter: Option<GenerationAdapter>,
}

#[derive(Deserialize)]
struct RemoteVerdict {
    severity: String,
    #[serde(default)]
    issues: Vec<String>,
}

impl ModerationEngine {
    pub fn new(profanity_lexicon: Arc<Lexicon>, adapter: Option<GenerationAdapter>) -> Self {
        Self {
            profanity_lexicon,
            adapter,
        }
    }

    /// Classify submitted text into a severity level.
    pub async fn classify(&self, text: &str, content_type: ContentType) -> ModerationVerdict {
        if text.trim().is_empty() {
            return ModerationVerdict::clean(VerdictSource::Local);
        }

        if let Some(adapter) = &self.adapter {
            match self.classify_remote(adapter, text, content_type).await {
                Ok(verdict) => return verdict,
                Err(e) => {
                    warn!(error = %e, "Remote moderation failed; using lexicon scan");
                }
            }
        }

        self.classify_local(text)
    }

    /// Fixed-lexicon scan. Severity scales with the number of distinct
    /// matched terms: none / high (1-2) / critical (3+).
    pub fn classify_local(&self, text: &str) -> ModerationVerdict {
        let matched = self.profanity_lexicon.matches_in(text);

        let severity = match matched.len() {
            0 => Severity::None,
            1..=2 => Severity::High,
            _ => Severity::Critical,
        };

        if !matched.is_empty() {
            debug!(matches = matched.len(), severity = severity.as_str(), "Lexicon scan flagged text");
        }

        ModerationVerdict {
            severity,
            detected_issues: matched,
            source: VerdictSource::Local,
        }
    }

    async fn classify_remote(
        &self,
        adapter: &GenerationAdapter,
        text: &str,
        content_type: ContentType,
    ) -> Result<ModerationVerdict> {
        let prompt = format!(
            r#"You are a content moderator for a recipe platform. Review this {content_type} submission for profanity, hate speech, spam, and threats.

TEXT TO REVIEW:
{text}

TASK: Return ONLY a JSON object in this exact format:
{{"severity": "none|low|medium|high|critical", "issues": ["short description of each issue found"]}}

Return ONLY valid JSON, no other text."#,
            content_type = content_type.as_str(),
            text = text,
        );

        let response = adapter.generate(&prompt).await?;
        let parsed: RemoteVerdict = serde_json::from_str(extract_json(&response))
            .map_err(|e| EngineError::AdapterParse(e.to_string()))?;

        Ok(ModerationVerdict {
            severity: Severity::parse(&parsed.severity),
            detected_issues: parsed.issues,
            source: VerdictSource::Remote,
        })
    }
}
