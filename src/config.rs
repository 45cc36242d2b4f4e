use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::extract::{CaseMode, Extractor};

pub const DEFAULT_MAX_DEPTH: usize = 4;
/// Deepest chain a single search may unroll.
pub const MAX_UNROLL: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Characters a single seed is asked to produce at most.
    pub max_depth: usize,
    pub case: CaseMode,
    /// Per-query deadline for solver backends that support one.
    pub timeout_ms: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            case: CaseMode::default(),
            timeout_ms: None,
        }
    }
}

impl SearchConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: SearchConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 || self.max_depth > MAX_UNROLL {
            return Err(Error::config(format!(
                "max_depth must be between 1 and {}, got {}",
                MAX_UNROLL, self.max_depth
            )));
        }
        if self.timeout_ms == Some(0) {
            return Err(Error::config("timeout_ms must be positive"));
        }
        Ok(())
    }

    pub fn extractor(&self) -> Extractor {
        Extractor::new(self.case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SearchConfig = serde_json::from_str(r#"{"case": "upper"}"#).unwrap();
        assert_eq!(config.case, CaseMode::Upper);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.timeout_ms, None);
    }

    #[test]
    fn rejects_bad_depths() {
        for max_depth in [0, MAX_UNROLL + 1] {
            let config = SearchConfig { max_depth, ..SearchConfig::default() };
            assert!(matches!(config.validate(), Err(Error::Config { .. })));
        }
    }

    #[test]
    fn unknown_fields_are_errors() {
        let parsed: Result<SearchConfig, _> = serde_json::from_str(r#"{"depth": 3}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn loads_from_file() {
        let path = std::env::temp_dir().join(format!("seedspell-config-{}.json", std::process::id()));
        fs::write(&path, r#"{"max_depth": 6, "timeout_ms": 500}"#).unwrap();
        let config = SearchConfig::from_file(&path);
        fs::remove_file(&path).ok();
        let config = config.unwrap();
        assert_eq!(config.max_depth, 6);
        assert_eq!(config.timeout_ms, Some(500));
    }
}
