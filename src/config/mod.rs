use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Lexicon files
    pub ingredient_terms_path: String,
    pub profanity_terms_path: String,

    // Behavior signal weights
    pub signals: SignalConfig,

    // Recommendation tunables
    pub recommendation: RecommendationConfig,

    // Plagiarism thresholds
    pub plagiarism: PlagiarismConfig,

    // Remote text-generation adapter
    pub llm: LlmConfig,

    // Service configuration
    pub service_name: String,
    pub environment: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignalConfig {
    pub view_weight: f64,
    pub like_weight: f64,
    pub plan_add_weight: f64,
    /// Category signal is higher-confidence than any single ingredient hit.
    pub category_multiplier: f64,
    /// Most recent search queries kept per user for prompt context.
    pub search_history_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationConfig {
    pub limit: usize,
    pub meal_suggestion_limit: usize,
    pub top_ingredients: usize,
    pub top_categories: usize,
    pub view_count_penalty: f64,
    pub in_plan_penalty: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlagiarismConfig {
    pub duplicate_threshold: f64,
    pub similarity_threshold: f64,
    pub remote_sample_size: usize,
    pub local_sample_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub enabled: bool,
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, crate::error::EngineError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            ingredient_terms_path: env::var("INGREDIENT_TERMS_PATH")
                .unwrap_or_else(|_| "data/ingredient_terms.txt".to_string()),
            profanity_terms_path: env::var("PROFANITY_TERMS_PATH")
                .unwrap_or_else(|_| "data/profanity_terms.txt".to_string()),
            signals: SignalConfig {
                view_weight: parse_or("VIEW_WEIGHT", 0.1),
                like_weight: parse_or("LIKE_WEIGHT", 0.5),
                plan_add_weight: parse_or("PLAN_ADD_WEIGHT", 1.0),
                category_multiplier: parse_or("CATEGORY_MULTIPLIER", 2.0),
                search_history_limit: parse_or("SEARCH_HISTORY_LIMIT", 10),
            },
            recommendation: RecommendationConfig {
                limit: parse_or("RECOMMENDATION_LIMIT", 10),
                meal_suggestion_limit: parse_or("MEAL_SUGGESTION_LIMIT", 3),
                top_ingredients: parse_or("TOP_INGREDIENTS", 20),
                top_categories: parse_or("TOP_CATEGORIES", 5),
                view_count_penalty: parse_or("VIEW_COUNT_PENALTY", 0.1),
                in_plan_penalty: parse_or("IN_PLAN_PENALTY", 0.5),
            },
            plagiarism: PlagiarismConfig {
                duplicate_threshold: parse_or("DUPLICATE_THRESHOLD", 0.8),
                similarity_threshold: parse_or("SIMILARITY_THRESHOLD", 0.5),
                remote_sample_size: parse_or("PLAGIARISM_REMOTE_SAMPLE", 50),
                local_sample_size: parse_or("PLAGIARISM_LOCAL_SAMPLE", 100),
            },
            llm: LlmConfig {
                enabled: parse_or("LLM_ENABLED", false),
                api_key: env::var("LLM_API_KEY").unwrap_or_default(),
                api_url: env::var("LLM_API_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                max_tokens: parse_or("LLM_MAX_TOKENS", 1024),
                timeout_secs: parse_or("LLM_TIMEOUT_SECS", 15),
            },
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "preference-service".to_string()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        })
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            view_weight: 0.1,
            like_weight: 0.5,
            plan_add_weight: 1.0,
            category_multiplier: 2.0,
            search_history_limit: 10,
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            meal_suggestion_limit: 3,
            top_ingredients: 20,
            top_categories: 5,
            view_count_penalty: 0.1,
            in_plan_penalty: 0.5,
        }
    }
}

impl Default for PlagiarismConfig {
    fn default() -> Self {
        Self {
            duplicate_threshold: 0.8,
            similarity_threshold: 0.5,
            remote_sample_size: 50,
            local_sample_size: 100,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
