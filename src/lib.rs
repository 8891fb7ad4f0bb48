pub mod api;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod llm;
pub mod models;
pub mod ports;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use api::Engine;
pub use config::Config;
pub use error::{EngineError, Result};
pub use lexicon::Lexicon;
pub use llm::{GenerationAdapter, TextGenProvider};
pub use models::{
    BehaviorEvent, BehaviorKind, CatalogItem, ContentType, MealType, ModerationVerdict,
    PlagiarismVerdict, RecipeSubmission, Severity, UserProfile, VerdictSource,
};
pub use services::{ModerationEngine, PlagiarismDetector, RecommendationEngine, SignalRecorder};
pub use store::InMemoryPreferenceStore;
