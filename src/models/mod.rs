pub mod behavior;
pub mod catalog;
pub mod moderation;
pub mod plagiarism;
pub mod preference;
pub mod recommendation;

pub use behavior::{BehaviorEvent, BehaviorKind, SearchPayload};
pub use catalog::{CatalogItem, MealType, UserProfile};
pub use moderation::{ContentType, ModerationVerdict, Severity, VerdictSource};
pub use plagiarism::{ExistingRecipe, PlagiarismVerdict, RecipeSubmission};
pub use preference::{PreferenceEntry, UserPreferences};
pub use recommendation::{RankedRecommendation, RecommendationMethod, SuggestedItem};
