//! Framework Configuration

use serde::{Deserialize, Serialize};

use crate::matching::MatchStrategy;
use crate::Result;

/// Event types the body listens for, in registration order
pub const DELEGATED_EVENTS: [&str; 13] = [
    "click", "mousedown", "mouseup", "mousemove",
    "touchstart", "touchmove", "touchend",
    "keyup", "keydown",
    "blur", "focus", "submit", "change",
];

/// Index in [`DELEGATED_EVENTS`] from which listeners use the capture phase
pub const CAPTURE_FROM: usize = 9;

/// Framework configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Event types handled through a delegated listener on the body
    pub delegated_events: Vec<String>,

    /// Listeners at or past this index register for the capture phase
    pub capture_from: usize,

    /// How `matches` tests selectors
    pub match_strategy: MatchStrategy,

    /// URL of documents the framework creates itself
    pub document_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delegated_events: DELEGATED_EVENTS.iter().map(|ty| ty.to_string()).collect(),
            capture_from: CAPTURE_FROM,
            match_strategy: MatchStrategy::Native,
            document_url: "about:blank".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether the listener at `index` registers for the capture phase
    pub fn uses_capture(&self, index: usize) -> bool {
        index >= self.capture_from
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ComponentError;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.delegated_events.len(), 13);
        assert_eq!(config.match_strategy, MatchStrategy::Native);

        let capturing: Vec<_> = config
            .delegated_events
            .iter()
            .enumerate()
            .filter(|(i, _)| config.uses_capture(*i))
            .map(|(_, ty)| ty.as_str())
            .collect();
        assert_eq!(capturing, ["blur", "focus", "submit", "change"]);
    }

    #[test]
    fn test_from_json_partial() {
        let config = Config::from_json(r#"{ "match_strategy": "query", "capture_from": 0 }"#).unwrap();
        assert_eq!(config.match_strategy, MatchStrategy::Query);
        assert_eq!(config.capture_from, 0);
        assert_eq!(config.document_url, "about:blank");
        assert_eq!(config.delegated_events.len(), 13);
    }

    #[test]
    fn test_from_json_custom_events() {
        let config = Config::from_json(r#"{ "delegated_events": ["click", "input"] }"#).unwrap();
        assert_eq!(config.delegated_events, ["click", "input"]);
    }

    #[test]
    fn test_from_json_invalid() {
        let err = Config::from_json(r#"{ "match_strategy": "guess" }"#).unwrap_err();
        assert!(matches!(err, ComponentError::Config(_)));
    }
}
