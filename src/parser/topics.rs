// file: src/parser/topics.rs
// description: parsing of hand-written topic specs and model topic extraction output
// reference: unit/topic/vocab sheet layout used by course books

use crate::models::UnitSpec;
use crate::parser::patterns::{UNIT_LINE, VOCAB_LINE, VOCAB_SPLIT, collapse_whitespace};
use std::collections::HashSet;

const MAX_TOPIC_WORDS: usize = 12;
const MAX_FALLBACK_VOCAB: usize = 8;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would",
    "could", "should", "may", "might", "can", "this", "that", "these", "those", "i", "you", "he",
    "she", "it", "we", "they", "me", "him", "her", "us", "them",
];

const THEMES: &[(&[&str], [&str; 3])] = &[
    (
        &["food", "eat", "restaurant", "cooking", "meal"],
        ["Favorite foods", "Cooking and recipes", "Restaurant experiences"],
    ),
    (
        &["travel", "trip", "vacation", "visit", "journey"],
        ["Travel experiences", "Dream destinations", "Travel planning"],
    ),
    (
        &["work", "job", "career", "office", "business"],
        ["Work and jobs", "Career goals", "Work-life balance"],
    ),
    (
        &["family", "parent", "child", "mother", "father"],
        ["Family relationships", "Family traditions", "Childhood memories"],
    ),
    (
        &["sport", "music", "movie", "book", "game"],
        ["Hobbies and interests", "Entertainment preferences", "Free time activities"],
    ),
];

const DEFAULT_THEMES: [&str; 3] = ["Personal experiences", "Daily life", "General discussion"];

/// Parsed topic sheet: optional unit title, topics and vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicSpec {
    pub title: Option<String>,
    pub topics: Vec<String>,
    pub vocab: Vec<String>,
}

impl TopicSpec {
    pub fn into_unit(self, fallback_title: &str) -> UnitSpec {
        UnitSpec::new(
            self.title.unwrap_or_else(|| fallback_title.to_string()),
            self.topics,
            self.vocab,
        )
    }
}

fn is_bullet(line: &str) -> bool {
    line.starts_with('*') || line.starts_with('-')
}

/// Parse a free-form sheet such as:
///
/// ```text
/// Unit 3A - Eating Out
/// * restaurants
/// * tipping
/// Vocab: menu, bill, waiter
/// ```
pub fn parse_topics_spec(raw: &str) -> TopicSpec {
    let mut title: Option<String> = None;
    let mut topics: Vec<String> = Vec::new();
    let mut vocab_chunks: Vec<String> = Vec::new();
    let mut vocab_mode = false;

    for line in raw.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();

        if title.is_none() {
            if let Some(caps) = UNIT_LINE.captures(line) {
                title = Some(caps[1].trim().to_string());
                continue;
            }
            if lower.starts_with("unit")
                && let Some((_, rest)) = line.split_once('-')
            {
                title = Some(rest.trim().to_string());
                continue;
            }
        }

        if let Some(caps) = VOCAB_LINE.captures(line) {
            let first = caps[1].trim();
            if !first.is_empty() {
                vocab_chunks.push(first.to_string());
            }
            vocab_mode = true;
            continue;
        }

        if vocab_mode {
            if is_bullet(line) || lower.starts_with("unit") {
                vocab_mode = false;
            } else {
                vocab_chunks.push(line.to_string());
                continue;
            }
        }

        if is_bullet(line) {
            topics.push(line.trim_start_matches(['*', '-', ' ']).trim().to_string());
        } else if !lower.starts_with("vocab")
            && line.split_whitespace().count() <= MAX_TOPIC_WORDS
            && !line.ends_with('?')
        {
            topics.push(line.to_string());
        }
    }

    let topics = topics
        .iter()
        .map(|t| collapse_whitespace(t).trim_matches([' ', '.']).to_string())
        .filter(|t| !t.is_empty() && !t.to_lowercase().starts_with("vocab"))
        .collect();

    TopicSpec {
        title,
        topics,
        vocab: split_vocab(&vocab_chunks.join(" ")),
    }
}

fn split_vocab(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    VOCAB_SPLIT
        .split(text)
        .map(|w| w.trim_matches([' ', '.', ';', ':', ',']).to_string())
        .filter(|w| !w.is_empty())
        .filter(|w| seen.insert(w.to_lowercase()))
        .collect()
}

/// Parse a topic extraction reply in the `UNIT_TITLE:` / `* topic` / `VOCAB:` layout.
pub fn parse_topic_extraction(response: &str, fallback_title: &str) -> UnitSpec {
    let mut title = fallback_title.to_string();
    let mut topics = Vec::new();
    let mut vocab = Vec::new();

    for line in response.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("UNIT_TITLE:") {
            let rest = rest.trim();
            if !rest.is_empty() {
                title = rest.to_string();
            }
        } else if let Some(rest) = line.strip_prefix('*') {
            let topic = rest.trim();
            if !topic.is_empty() {
                topics.push(topic.to_string());
            }
        } else if let Some(rest) = line.strip_prefix("VOCAB:") {
            vocab = rest
                .split(',')
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();
        }
    }

    UnitSpec::new(title, topics, vocab)
}

/// Keyword-driven themes and vocabulary for when no model is reachable.
pub fn simple_topic_fallback(text: &str, fallback_title: &str) -> UnitSpec {
    let words: Vec<String> = text.split_whitespace().map(|w| w.to_lowercase()).collect();

    let themes = THEMES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| words.iter().any(|w| w == k)))
        .map(|(_, themes)| *themes)
        .unwrap_or(DEFAULT_THEMES);

    let vocab = words
        .iter()
        .map(|w| {
            w.trim_matches(|c: char| ".,!?;:\"()[]{}".contains(c))
                .to_string()
        })
        .filter(|w| {
            w.chars().count() > 3
                && w.chars().all(char::is_alphabetic)
                && !STOP_WORDS.contains(&w.as_str())
        })
        .take(MAX_FALLBACK_VOCAB)
        .collect();

    UnitSpec::new(
        fallback_title,
        themes.iter().map(|t| t.to_string()).collect(),
        vocab,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_spec() {
        let raw = "Unit 3A - Eating Out\n* restaurants\n- tipping  culture.\nVocab: menu, bill; waiter\n  \u{201C}starter\u{201D}, Menu\n* service";
        let spec = parse_topics_spec(raw);

        assert_eq!(spec.title.as_deref(), Some("Eating Out"));
        assert_eq!(spec.topics, vec!["restaurants", "tipping culture", "service"]);
        assert_eq!(spec.vocab, vec!["menu", "bill", "waiter", "starter"]);
    }

    #[test]
    fn test_plain_lines_become_topics() {
        let raw = "Weekend plans\nWhat did you do last weekend?\nThis line is far too long to be a topic because it has many many words in it";
        let spec = parse_topics_spec(raw);

        assert_eq!(spec.title, None);
        assert_eq!(spec.topics, vec!["Weekend plans"]);
        assert!(spec.vocab.is_empty());
    }

    #[test]
    fn test_unit_without_number_uses_hyphen() {
        let spec = parse_topics_spec("Unit - Looking Back\n* memories");
        assert_eq!(spec.title.as_deref(), Some("Looking Back"));
        assert_eq!(spec.into_unit("fallback").title, "Looking Back");
    }

    #[test]
    fn test_topic_extraction_response() {
        let response = "UNIT_TITLE: Daily Routines\nTOPICS:\n* morning habits\n* commuting\n*  \nVOCAB: alarm, commute , , breakfast";
        let unit = parse_topic_extraction(response, "Document");

        assert_eq!(unit.title, "Daily Routines");
        assert_eq!(unit.topics, vec!["morning habits", "commuting"]);
        assert_eq!(unit.vocab, vec!["alarm", "commute", "breakfast"]);
    }

    #[test]
    fn test_topic_extraction_keeps_fallback_title() {
        let unit = parse_topic_extraction("UNIT_TITLE:\n* hobbies", "Document");
        assert_eq!(unit.title, "Document");
        assert_eq!(unit.topics, vec!["hobbies"]);
    }

    #[test]
    fn test_simple_fallback_travel() {
        let unit = simple_topic_fallback(
            "Our trip to Lisbon was the best journey, with sunny beaches and trams.",
            "Document",
        );
        assert_eq!(unit.topics[0], "Travel experiences");
        assert!(unit.vocab.contains(&"lisbon".to_string()));
        assert!(!unit.vocab.contains(&"with".to_string()));
        assert!(unit.vocab.len() <= 8);
    }

    #[test]
    fn test_simple_fallback_default_themes() {
        let unit = simple_topic_fallback("Quantum chromodynamics lecture notes", "Physics");
        assert_eq!(unit.title, "Physics");
        assert_eq!(unit.topics, vec!["Personal experiences", "Daily life", "General discussion"]);
    }
}
