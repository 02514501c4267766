// file: src/ai/topics.rs
// description: turns ocr text into a unit title, discussion themes and vocabulary
// reference: internal prompt design

use crate::ai::model::ContentModel;
use crate::models::UnitSpec;
use crate::parser::{parse_topic_extraction, simple_topic_fallback};
use crate::utils::DebugRecorder;
use std::sync::Arc;
use tracing::{debug, warn};

pub const MAX_SOURCE_CHARS: usize = 2000;

pub struct TopicExtractor {
    model: Option<Arc<dyn ContentModel>>,
    recorder: DebugRecorder,
}

impl TopicExtractor {
    pub fn new(model: Arc<dyn ContentModel>, recorder: DebugRecorder) -> Self {
        Self {
            model: Some(model),
            recorder,
        }
    }

    /// Extractor that only uses the keyword heuristic.
    pub fn offline() -> Self {
        Self {
            model: None,
            recorder: DebugRecorder::disabled(),
        }
    }

    pub async fn extract(&self, text: &str, fallback_title: &str) -> UnitSpec {
        if text.trim().is_empty() {
            debug!("No text for topic extraction");
            return UnitSpec::new(fallback_title, Vec::new(), Vec::new());
        }

        let Some(model) = &self.model else {
            return simple_topic_fallback(text, fallback_title);
        };

        let prompt = topic_prompt(text, fallback_title);

        match model.generate(&prompt).await {
            Ok(response) => {
                self.recorder
                    .record_conversation("topic_extraction", &prompt, Some(&response), None);

                let unit = parse_topic_extraction(&response, fallback_title);
                if unit.topics.is_empty() {
                    warn!("Topic extraction reply had no topics, using keyword fallback");
                    return simple_topic_fallback(text, fallback_title);
                }
                unit
            }
            Err(e) => {
                let message = e.to_string();
                self.recorder
                    .record_conversation("topic_extraction", &prompt, None, Some(&message));
                warn!("Topic extraction failed ({}), using keyword fallback", message);
                simple_topic_fallback(text, fallback_title)
            }
        }
    }
}

/// Longest prefix of at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn topic_prompt(text: &str, fallback_title: &str) -> String {
    format!(
        "Analyze the following text and extract simple discussion topics for ESL students.\n\n\
         1. A simple unit title (if not obvious, use \"{fallback_title}\")\n\
         2. 3-4 simple discussion topics (NOT questions - just topic themes like \"favorite foods\" or \"travel experiences\")\n\
         3. 5-8 key vocabulary words (comma-separated)\n\n\
         IMPORTANT:\n\
         - Topics should be THEMES for discussion, NOT questions\n\
         - Keep topics simple and conversational\n\
         - Examples: \"favorite foods\", \"travel experiences\", \"daily routines\", \"hobbies\"\n\
         - Avoid complex academic topics\n\n\
         Text to analyze:\n{}\n\n\
         Format your response as:\n\
         UNIT_TITLE: [simple title]\n\
         TOPICS:\n\
         * [topic theme 1]\n\
         * [topic theme 2]\n\
         * [topic theme 3]\n\
         VOCAB: [word1, word2, word3, ...]",
        truncate_chars(text, MAX_SOURCE_CHARS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::model::scripted::ScriptedModel;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate_chars("caf\u{e9} au lait", 4), "caf\u{e9}");
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[test]
    fn test_prompt_limits_source_text() {
        let text = "word ".repeat(1000);
        let prompt = topic_prompt(&text, "Unit 1");
        assert!(prompt.contains("use \"Unit 1\""));
        assert!(!prompt.contains(&text));
        assert!(prompt.contains(truncate_chars(&text, MAX_SOURCE_CHARS)));
    }

    #[tokio::test]
    async fn test_extract_parses_model_reply() {
        let model = Arc::new(ScriptedModel::new().reply(
            "UNIT_TITLE: City Life\nTOPICS:\n* public transport\n* noise\nVOCAB: commute, crowded",
        ));
        let extractor = TopicExtractor::new(model.clone(), DebugRecorder::disabled());

        let unit = extractor.extract("Buses and trains in the city", "Document").await;
        assert_eq!(unit.title, "City Life");
        assert_eq!(unit.topics, vec!["public transport", "noise"]);
        assert_eq!(unit.vocab, vec!["commute", "crowded"]);
        assert!(model.prompts()[0].contains("Buses and trains in the city"));
    }

    #[tokio::test]
    async fn test_extract_falls_back_on_error() {
        let model = Arc::new(ScriptedModel::new().fail("quota exceeded"));
        let extractor = TopicExtractor::new(model, DebugRecorder::disabled());

        let unit = extractor.extract("We cook a family meal every Sunday", "Document").await;
        assert_eq!(unit.title, "Document");
        assert_eq!(unit.topics[0], "Favorite foods");
    }

    #[tokio::test]
    async fn test_empty_text_skips_model() {
        let model = Arc::new(ScriptedModel::new());
        let extractor = TopicExtractor::new(model.clone(), DebugRecorder::disabled());

        let unit = extractor.extract("   ", "Blank").await;
        assert_eq!(unit, UnitSpec::new("Blank", vec![], vec![]));
        assert!(model.prompts().is_empty());
    }
}
