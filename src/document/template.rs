// file: src/document/template.rs
// description: fills a user-supplied docx template with a new question set
// reference: ECMA-376 part 1, 17.3.1 (paragraphs)

use crate::document::package::{RunFont, question_paragraph};
use crate::document::xml::{
    body_layout, map_run_text, paragraph_style, paragraph_text, replace_level_tokens,
};
use crate::error::{EflError, Result};
use crate::parser::patterns::FIRST_NUMBERED_ITEM;
use tracing::debug;

pub const TITLE_MARKER: &str = "LOOKING BACK";
pub const DISCUSSION_HEADING: &str = "Discussion";

/// Numbering style copied from the template's first question.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Numbering {
    style: Option<String>,
    punctuation: char,
    spacing: String,
}

impl Default for Numbering {
    fn default() -> Self {
        Self {
            style: None,
            punctuation: '.',
            spacing: " ".to_string(),
        }
    }
}

impl Numbering {
    fn prefix(&self, number: usize) -> String {
        format!("{}{}{}", number, self.punctuation, self.spacing)
    }
}

/// Rewrite a template's `word/document.xml`.
///
/// Paragraphs up to the `Discussion` heading get the title marker and level
/// tokens replaced. Every top-level paragraph from the template's first
/// question onward is dropped and the new questions are appended before the
/// section properties.
pub fn fill_document_xml(
    xml: &str,
    unit_title: &str,
    level: &str,
    questions: &[String],
    font: &RunFont,
) -> Result<String> {
    let layout = body_layout(xml)?;
    let children = &layout.children;

    let mut discussion = None;
    for (i, child) in children.iter().enumerate() {
        if child.is_paragraph() && paragraph_text(child.xml(xml))?.trim() == DISCUSSION_HEADING {
            discussion = Some(i);
            break;
        }
    }
    let discussion = discussion.ok_or_else(|| {
        EflError::Template(format!(
            "Could not find \"{}\" in template",
            DISCUSSION_HEADING
        ))
    })?;

    let mut numbering = Numbering::default();
    let mut first_question = None;

    for (i, child) in children.iter().enumerate().skip(discussion + 1) {
        if !child.is_paragraph() {
            continue;
        }
        let paragraph = child.xml(xml);
        if let Some(caps) = FIRST_NUMBERED_ITEM.captures(&paragraph_text(paragraph)?) {
            numbering = Numbering {
                style: paragraph_style(paragraph)?,
                punctuation: caps[1].chars().next().unwrap_or('.'),
                spacing: caps[2].to_string(),
            };
            first_question = Some(i);
            break;
        }
    }

    let remove_from = match first_question {
        Some(i) => i,
        None => {
            numbering.style = match children.get(discussion + 1) {
                Some(next) if next.is_paragraph() => paragraph_style(next.xml(xml))?,
                _ => None,
            };
            discussion + 1
        }
    };

    debug!(
        "Template: Discussion at child {}, replacing paragraphs from {} ({:?})",
        discussion, remove_from, numbering
    );

    let new_paragraphs = questions
        .iter()
        .enumerate()
        .map(|(i, q)| question_paragraph(&numbering.prefix(i + 1), q, numbering.style.as_deref(), font))
        .collect::<Result<String>>()?;

    let mut out = String::with_capacity(xml.len() + new_paragraphs.len());
    out.push_str(&xml[..layout.content_start]);

    let mut cursor = layout.content_start;
    let mut inserted = false;

    for (i, child) in children.iter().enumerate() {
        let gap = &xml[cursor..child.start];
        cursor = child.end;

        if child.is_paragraph() && i >= remove_from {
            continue;
        }
        out.push_str(gap);

        if child.is_section_properties() && !inserted {
            out.push_str(&new_paragraphs);
            inserted = true;
        }

        if child.is_paragraph() && i <= discussion {
            out.push_str(&map_run_text(child.xml(xml), |text| {
                replace_level_tokens(&text.replace(TITLE_MARKER, unit_title), level)
            })?);
        } else {
            out.push_str(child.xml(xml));
        }
    }

    out.push_str(&xml[cursor..layout.content_end]);
    if !inserted {
        out.push_str(&new_paragraphs);
    }
    out.push_str(&xml[layout.content_end..]);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::xml::BodyChild;
    use pretty_assertions::assert_eq;

    fn para(text: &str, style: Option<&str>) -> String {
        let style = style
            .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, s))
            .unwrap_or_default();
        format!(r#"<w:p>{}<w:r><w:t>{}</w:t></w:r></w:p>"#, style, text)
    }

    fn template(body: &[String], sect: bool) -> String {
        format!(
            r#"<?xml version="1.0"?><w:document xmlns:w="x"><w:body>{}{}</w:body></w:document>"#,
            body.concat(),
            if sect { r#"<w:sectPr><w:pgSz w:w="11906"/></w:sectPr>"# } else { "" }
        )
    }

    fn texts(xml: &str) -> Vec<String> {
        body_layout(xml)
            .unwrap()
            .children
            .iter()
            .filter(|c: &&BodyChild| c.is_paragraph())
            .map(|c| paragraph_text(c.xml(xml)).unwrap())
            .collect()
    }

    fn questions() -> Vec<String> {
        vec!["New one?".to_string(), "New two?".to_string()]
    }

    #[test]
    fn test_fill_replaces_header_and_questions() {
        let xml = template(
            &[
                para("UNIT 4 LOOKING BACK", None),
                para("Level B1 and B1+", None),
                para("Discussion", Some("Heading2")),
                para("Warm up first", None),
                para("1) Old question?", Some("QuestionList")),
                para("2) Another old one?", Some("QuestionList")),
                r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>notes</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#.to_string(),
                para("Footer text", None),
            ],
            true,
        );

        let filled = fill_document_xml(&xml, "Food & Drink", "C1", &questions(), &RunFont::new("Tahoma", 12)).unwrap();

        assert_eq!(
            texts(&filled),
            vec![
                "UNIT 4 Food & Drink",
                "Level C1 and C1",
                "Discussion",
                "Warm up first",
                "1) New one?",
                "2) New two?",
            ]
        );
        assert!(filled.contains(r#"<w:pStyle w:val="QuestionList"/>"#));
        assert!(filled.contains("<w:tbl>"));
        assert!(filled.contains(r#"<w:sz w:val="24"/>"#));

        let layout = body_layout(&filled).unwrap();
        let names: Vec<&str> = layout.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.last(), Some(&"w:sectPr"));
        assert_eq!(names[names.len() - 2], "w:p");
    }

    #[test]
    fn test_fill_without_numbered_items_clears_after_heading() {
        let xml = template(
            &[
                para("Discussion", None),
                para("placeholder", Some("Body")),
                para("more", None),
            ],
            false,
        );

        let filled = fill_document_xml(&xml, "T", "B2", &questions(), &RunFont::new("Arial", 11)).unwrap();
        assert_eq!(texts(&filled), vec!["Discussion", "1. New one?", "2. New two?"]);
        assert!(filled.contains(r#"<w:pStyle w:val="Body"/>"#));
        assert!(filled.ends_with("</w:body></w:document>"));
    }

    #[test]
    fn test_tab_numbered_template_keeps_intro_and_spacing() {
        let xml = template(
            &[
                para("Discussion", None),
                para("Warm up first", None),
                r#"<w:p><w:r><w:t>1.</w:t></w:r><w:r><w:tab/><w:t>Old question?</w:t></w:r></w:p>"#.to_string(),
                r#"<w:p><w:r><w:t>2.</w:t></w:r><w:r><w:tab/><w:t>Older question?</w:t></w:r></w:p>"#.to_string(),
            ],
            true,
        );

        let filled = fill_document_xml(&xml, "T", "B2", &questions(), &RunFont::new("Tahoma", 12)).unwrap();
        assert_eq!(
            texts(&filled),
            vec!["Discussion", "Warm up first", "1.\tNew one?", "2.\tNew two?"]
        );
        assert!(!filled.contains("Old question?"));
    }

    #[test]
    fn test_missing_discussion_heading() {
        let xml = template(&[para("Questions", None)], true);
        let err = fill_document_xml(&xml, "T", "B2", &questions(), &RunFont::new("Tahoma", 12)).unwrap_err();
        assert!(err.to_string().contains("Could not find \"Discussion\""));
    }
}
