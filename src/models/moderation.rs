use serde::{Deserialize, Serialize};

/// Ordinal severity of a policy violation. `High` and above blocks the
/// originating write; anything below is surfaced as a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::None,
        }
    }

    pub fn blocks(&self) -> bool {
        *self >= Severity::High
    }
}

/// Which path produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    Remote,
    Local,
}

/// Per-check moderation verdict. Not stored by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub severity: Severity,
    pub detected_issues: Vec<String>,
    pub source: VerdictSource,
}

impl ModerationVerdict {
    pub fn clean(source: VerdictSource) -> Self {
        Self {
            severity: Severity::None,
            detected_issues: Vec::new(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Recipe,
    Comment,
    Post,
    ProfileBio,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Recipe => "recipe",
            ContentType::Comment => "comment",
            ContentType::Post => "post",
            ContentType::ProfileBio => "profile_bio",
        }
    }
}
