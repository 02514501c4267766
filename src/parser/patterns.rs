// file: src/parser/patterns.rs
// description: compiled regex patterns for question and topic parsing
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Model output
    pub static ref NUMBERED_QUESTION: Regex = Regex::new(
        r"^\s*(\d+)[.)]\s+(.*)\?$"
    ).expect("NUMBERED_QUESTION regex is valid");

    pub static ref BULLET_QUESTION: Regex = Regex::new(
        r"^[-*\x{2022}]\s+(.*)\?$"
    ).expect("BULLET_QUESTION regex is valid");

    pub static ref NUMBER_SPLIT: Regex = Regex::new(
        r"\s*\d+[.)]\s+"
    ).expect("NUMBER_SPLIT regex is valid");

    pub static ref WHITESPACE: Regex = Regex::new(
        r"\s+"
    ).expect("WHITESPACE regex is valid");

    // Topic specs
    pub static ref UNIT_LINE: Regex = Regex::new(
        r"(?i)^\s*unit\s*\d+[a-b]?\s*[-\x{2013}]\s*(.+)$"
    ).expect("UNIT_LINE regex is valid");

    pub static ref VOCAB_LINE: Regex = Regex::new(
        r"(?i)^vocab\s*:\s*(.*)$"
    ).expect("VOCAB_LINE regex is valid");

    pub static ref VOCAB_SPLIT: Regex = Regex::new(
        r#"[,"\x{201C}\x{201D}\x{2022};]+"#
    ).expect("VOCAB_SPLIT regex is valid");

    // Prompt templates
    pub static ref PLACEHOLDER: Regex = Regex::new(
        r"\{([A-Za-z_][A-Za-z0-9_]*)\}"
    ).expect("PLACEHOLDER regex is valid");

    pub static ref PROMPTS_VERSION: Regex = Regex::new(
        r"# Version:[ \t]*([^\n]+)"
    ).expect("PROMPTS_VERSION regex is valid");

    pub static ref PROMPTS_LAST_UPDATED: Regex = Regex::new(
        r"# Last Updated:[ \t]*([^\n]+)"
    ).expect("PROMPTS_LAST_UPDATED regex is valid");

    // Document templates
    pub static ref FIRST_NUMBERED_ITEM: Regex = Regex::new(
        r"^\s*1([.)])(\s+)"
    ).expect("FIRST_NUMBERED_ITEM regex is valid");

    pub static ref LEVEL_TOKEN: Regex = Regex::new(
        r"A1|A2|B1\+?|B2|C1|C2"
    ).expect("LEVEL_TOKEN regex is valid");
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}
