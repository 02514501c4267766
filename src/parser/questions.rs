// file: src/parser/questions.rs
// description: extraction of discussion questions from free-form model output
// reference: numbered list conventions used by generative models

use crate::parser::patterns::{
    BULLET_QUESTION, NUMBER_SPLIT, NUMBERED_QUESTION, collapse_whitespace,
};
use std::collections::HashSet;

pub const DEFAULT_QUESTION_COUNT: usize = 15;

pub const FILLER_QUESTION: &str =
    "How could this topic affect an everyday situation at home, work, or school?";

pub const FALLBACK_SINGLE_QUESTION: &str = "What everyday example fits this topic for you?";

/// Pull up to `max_items` distinct questions out of model output.
///
/// Numbered (`1.` / `1)`) and bulleted lines ending in `?` are taken first.
/// When none exist the whole text is split on inline numbering instead.
pub fn parse_numbered_questions(text: &str, max_items: usize) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if let Some(caps) = NUMBERED_QUESTION.captures(line) {
            found.push(format!("{}?", caps[2].trim()));
            continue;
        }
        if let Some(caps) = BULLET_QUESTION.captures(line) {
            found.push(format!("{}?", caps[1].trim()));
        }
    }

    if found.is_empty() {
        found = NUMBER_SPLIT
            .split(text)
            .map(str::trim)
            .filter(|piece| piece.ends_with('?'))
            .map(str::to_string)
            .collect();
    }

    let mut seen = HashSet::new();
    let mut clean = Vec::new();

    for question in found.into_iter().take(max_items) {
        let question = clean_question(&question);
        if question.is_empty() {
            continue;
        }
        if seen.insert(question.to_lowercase()) {
            clean.push(question);
        }
    }

    clean
}

fn clean_question(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    let unquoted = collapsed.trim_matches(|c| c == '"' || c == '\u{201D}').trim_end();

    if unquoted.is_empty() {
        return String::new();
    }

    if unquoted.ends_with('?') {
        unquoted.to_string()
    } else {
        format!("{}?", unquoted.trim_end_matches(['.', '!', ' ']))
    }
}

/// Normalise a question list to exactly `count` entries, padding with a filler question.
pub fn ensure_count(questions: Vec<String>, count: usize) -> Vec<String> {
    let mut out: Vec<String> = questions
        .iter()
        .map(|q| collapse_whitespace(q))
        .filter(|q| !q.is_empty())
        .take(count)
        .collect();

    while out.len() < count {
        out.push(FILLER_QUESTION.to_string());
    }

    out
}

/// Best single question from a regeneration response.
pub fn single_question_from_response(text: &str) -> String {
    if let Some(question) = parse_numbered_questions(text, 1).into_iter().next() {
        return question;
    }

    let first_line = text.trim().lines().next().unwrap_or("").trim();
    let line = if first_line.ends_with('?') {
        first_line.to_string()
    } else {
        let stem = first_line.trim_end_matches(['.', '!', ' ']).trim();
        if stem.is_empty() {
            FALLBACK_SINGLE_QUESTION.to_string()
        } else {
            format!("{}?", stem)
        }
    };

    collapse_whitespace(&line)
}
