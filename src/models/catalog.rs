use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog item owned by the external catalog; read-only to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub recipe_text: String,
    pub category_id: Uuid,
}

impl CatalogItem {
    /// Combined free text scanned for lexicon ingredients and allergens.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.description, self.recipe_text)
    }
}

/// Profile fields supplied by the user-profile collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    /// Comma-separated allergen declarations, e.g. "peanut, shellfish".
    pub allergies: String,
    pub favorite_foods: String,
    pub calorie_limit: Option<u32>,
}

impl UserProfile {
    pub fn allergen_terms(&self) -> Vec<String> {
        self.allergies
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    /// Prompt guidance injected into the adapter request for this meal.
    pub fn guidance(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Favor lighter options with a lower estimated calorie count.",
            MealType::Lunch => "Favor balanced options that work as a midday meal.",
            MealType::Dinner => "Favor substantial options suited to an evening meal.",
            MealType::Snack => "Favor small, quick options between meals.",
        }
    }
}
