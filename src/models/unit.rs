// file: src/models/unit.rs
// description: unit description (title, topics, vocabulary) fed into prompts
// reference: internal data structures

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub title: String,
    pub topics: Vec<String>,
    pub vocab: Vec<String>,
}

impl UnitSpec {
    pub fn new(title: impl Into<String>, topics: Vec<String>, vocab: Vec<String>) -> Self {
        Self {
            title: title.into(),
            topics,
            vocab,
        }
    }

    /// Topics as `* topic` lines, the shape the prompts expect.
    pub fn topics_block(&self) -> String {
        self.topics
            .iter()
            .map(|t| format!("* {}", t))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn vocab_line(&self) -> String {
        if self.vocab.is_empty() {
            "(none)".to_string()
        } else {
            self.vocab.join(", ")
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics_block() {
        let unit = UnitSpec::new(
            "Food",
            vec!["favorite foods".to_string(), "cooking".to_string()],
            vec![],
        );
        assert_eq!(unit.topics_block(), "* favorite foods\n* cooking");
        assert_eq!(unit.vocab_line(), "(none)");
    }

    #[test]
    fn test_vocab_line() {
        let unit = UnitSpec::new("", vec![], vec!["recipe".to_string(), "spicy".to_string()]);
        assert_eq!(unit.vocab_line(), "recipe, spicy");
        assert!(!unit.has_title());
    }
}
