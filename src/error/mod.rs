use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Text-generation adapter unavailable: {0}")]
    AdapterUnavailable(String),

    #[error("Text-generation adapter timed out after {0}s")]
    AdapterTimeout(u64),

    #[error("Failed to parse adapter response: {0}")]
    AdapterParse(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Adapter failures are recovered via the deterministic local path and
    /// must never surface as failure of the overall operation.
    pub fn is_fallback_trigger(&self) -> bool {
        matches!(
            self,
            EngineError::AdapterUnavailable(_)
                | EngineError::AdapterTimeout(_)
                | EngineError::AdapterParse(_)
        )
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::AdapterUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_triggers() {
        assert!(EngineError::AdapterTimeout(10).is_fallback_trigger());
        assert!(EngineError::AdapterUnavailable("down".into()).is_fallback_trigger());
        assert!(EngineError::AdapterParse("bad json".into()).is_fallback_trigger());
        assert!(!EngineError::InvalidInput("missing user_id".into()).is_fallback_trigger());
        assert!(!EngineError::Persistence("write failed".into()).is_fallback_trigger());
    }
}
