use crate::error::{EngineError, Result};
use std::fs;
use std::path::Path;
use unicode_segmentation::UnicodeSegmentation;

/// Fixed, finite term list used for case-insensitive matching.
///
/// A term is only recognized when it appears verbatim in the scanned text as
/// a full word (or word sequence, for multi-word terms). Nothing outside the
/// listed terms is ever matched; this is a deliberate precision/recall
/// trade-off, not an oversight.
#[derive(Debug, Clone)]
pub struct Lexicon {
    terms: Vec<String>,
}

impl Lexicon {
    /// Load terms from a file, one per line. Blank lines and `#` comments
    /// are skipped; terms are lowercased and de-duplicated, keeping file
    /// order so scan results are deterministic.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            EngineError::Config(format!(
                "Failed to load lexicon from {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let lines = content
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
            .map(|line| line.trim().to_lowercase());

        Ok(Self::from_terms(lines))
    }

    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = std::collections::HashSet::new();
        let terms = terms
            .into_iter()
            .map(|t| t.into().trim().to_lowercase())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();
        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Every lexicon term found in `text`, in lexicon order.
    pub fn matches_in(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        let haystack = Self::normalize(text);
        self.terms
            .iter()
            .filter(|term| Self::contains_term(&haystack, term))
            .cloned()
            .collect()
    }

    pub fn contains_any(&self, text: &str) -> bool {
        !self.matches_in(text).is_empty()
    }

    /// Word-boundary-aware containment check against normalized text.
    /// Matches single words and multi-word phrases alike.
    pub fn text_contains(text: &str, term: &str) -> bool {
        Self::contains_term(&Self::normalize(text), &term.to_lowercase())
    }

    /// Lowercase the text and collapse it to space-joined unicode words,
    /// padded so every word has a boundary on both sides.
    fn normalize(text: &str) -> String {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered.unicode_words().collect();
        format!(" {} ", words.join(" "))
    }

    fn contains_term(normalized: &str, term: &str) -> bool {
        normalized.contains(&format!(" {} ", term))
    }
}
