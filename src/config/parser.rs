//! Intent parser configuration

use serde::Deserialize;

use crate::domain::intent::ParserStrategy;

/// Parser selection and tool priority
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParserConfig {
    /// `pattern`, `generative` or `hybrid`
    #[serde(default)]
    pub strategy: ParserStrategy,

    /// Tools tried first when a clause matches several (comma-separated)
    pub priority: Option<String>,
}

impl ParserConfig {
    pub fn priority_list(&self) -> Vec<String> {
        self.priority
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the chosen strategy needs a generative backend.
    pub fn needs_generative(&self) -> bool {
        matches!(
            self.strategy,
            ParserStrategy::Generative | ParserStrategy::Hybrid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.strategy, ParserStrategy::Pattern);
        assert!(config.priority_list().is_empty());
        assert!(!config.needs_generative());
    }

    #[test]
    fn test_priority_parsing_skips_blanks() {
        let config = ParserConfig {
            priority: Some("news, ,weather ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.priority_list(), vec!["news", "weather"]);
    }

    #[test]
    fn test_hybrid_needs_generative() {
        let config = ParserConfig {
            strategy: ParserStrategy::Hybrid,
            priority: None,
        };
        assert!(config.needs_generative());
    }
}
