//! Optional remote text-generation adapter.
//!
//! Bounded by a capability flag: when unconfigured the adapter simply does
//! not exist (`from_config` returns `None`) and every consumer runs its
//! deterministic local path. Adapter failures (transport, timeout, parse)
//! are fallback triggers, never fatal.

use crate::config::LlmConfig;
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenProvider: Send + Sync {
    /// Generate a completion for the prompt.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

// ============================================
// OpenAI-compatible chat-completions provider
// ============================================

pub struct OpenAiProvider {
    client: HttpClient,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EngineError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl TextGenProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens,
            temperature: 0.3,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EngineError::AdapterUnavailable(format!(
                "Provider returned {status}: {error_text}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| EngineError::AdapterParse(e.to_string()))?;

        Ok(result
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ============================================
// Adapter wrapper
// ============================================

/// Shared handle around a configured provider. Stateless, safe to share
/// across requests. All calls go through a hard timeout so a slow provider
/// can never stall the deterministic fallback.
#[derive(Clone)]
pub struct GenerationAdapter {
    provider: Arc<dyn TextGenProvider>,
    max_tokens: u32,
    timeout_secs: u64,
}

impl GenerationAdapter {
    /// Build from config. Returns `None` when the adapter is disabled or
    /// has no API key; correctness never depends on it existing.
    pub fn from_config(config: &LlmConfig) -> Option<Self> {
        if !config.enabled {
            info!("Text-generation adapter is disabled");
            return None;
        }
        if config.api_key.is_empty() {
            warn!("Text-generation adapter enabled but no API key set; running without it");
            return None;
        }

        let provider =
            OpenAiProvider::new(&config.api_url, &config.api_key, &config.model, config.timeout_secs)
                .ok()?;

        info!(provider = provider.name(), model = %config.model, "Text-generation adapter initialized");

        Some(Self {
            provider: Arc::new(provider),
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn with_provider(provider: Arc<dyn TextGenProvider>, max_tokens: u32, timeout_secs: u64) -> Self {
        Self {
            provider,
            max_tokens,
            timeout_secs,
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let call = self.provider.complete(prompt, self.max_tokens);
        match tokio::time::timeout(Duration::from_secs(self.timeout_secs), call).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::AdapterTimeout(self.timeout_secs)),
        }
    }
}

/// Strip markdown code fences so a fenced JSON body parses cleanly.
pub fn extract_json(response: &str) -> &str {
    let body = if response.contains("```json") {
        response
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(response)
    } else if response.contains("```") {
        response.split("```").nth(1).unwrap_or(response)
    } else {
        response
    };
    body.trim()
}
