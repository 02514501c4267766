// file: src/document/package.rs
// description: built-in docx package for question sheets when no template is configured
// reference: ECMA-376 part 2 (open packaging conventions)

use crate::document::xml::{XmlWriter, into_string, xml_writer};
use crate::error::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Page size and margins in twips (1/1440 inch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub width: u32,
    pub height: u32,
    pub margin_top: u32,
    pub margin_right: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
}

impl PageLayout {
    pub fn a4() -> Self {
        Self {
            width: 11906,
            height: 16838,
            margin_top: 1418,
            margin_right: 1077,
            margin_bottom: 1021,
            margin_left: 1077,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFont {
    pub name: String,
    pub size_pt: u32,
}

impl RunFont {
    pub fn new(name: impl Into<String>, size_pt: u32) -> Self {
        Self {
            name: name.into(),
            size_pt,
        }
    }

    /// `w:rPr` for this font; `w:sz` is in half-points. Emphasis is bold red.
    fn write_properties(&self, w: &mut XmlWriter, emphasis: bool) -> Result<()> {
        let half_points = (self.size_pt * 2).to_string();

        open(w, "w:rPr", &[])?;
        empty(
            w,
            "w:rFonts",
            &[
                ("w:ascii", self.name.as_str()),
                ("w:hAnsi", self.name.as_str()),
                ("w:cs", self.name.as_str()),
            ],
        )?;
        if emphasis {
            empty(w, "w:b", &[])?;
            empty(w, "w:bCs", &[])?;
            empty(w, "w:color", &[("w:val", RED)])?;
        }
        empty(w, "w:sz", &[("w:val", half_points.as_str())])?;
        empty(w, "w:szCs", &[("w:val", half_points.as_str())])?;
        close(w, "w:rPr")
    }
}

const RED: &str = "FF0000";
const TITLE_SIZE_PT: u32 = 20;
const HEADING_SIZE_PT: u32 = 14;
/// 20pt left indent for question paragraphs.
const QUESTION_INDENT: u32 = 400;
const QUESTION_SPACE_BEFORE: u32 = 120;
const QUESTION_SPACE_AFTER: u32 = 240;

pub const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

pub const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

pub const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn declaration(w: &mut XmlWriter) -> Result<()> {
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(())
}

fn element(name: &str, attrs: &[(&str, &str)]) -> BytesStart<'static> {
    let mut e = BytesStart::new(name.to_string());
    for &attr in attrs {
        e.push_attribute(attr);
    }
    e
}

fn open(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    w.write_event(Event::Start(element(name, attrs)))?;
    Ok(())
}

fn empty(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    w.write_event(Event::Empty(element(name, attrs)))?;
    Ok(())
}

fn close(w: &mut XmlWriter, name: &str) -> Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// `w:pPr` children in schema order.
#[derive(Debug, Default)]
struct ParagraphProps<'a> {
    style: Option<&'a str>,
    space_before: Option<u32>,
    space_after: Option<u32>,
    indent_left: Option<u32>,
    centered: bool,
}

impl ParagraphProps<'_> {
    fn write(&self, w: &mut XmlWriter) -> Result<()> {
        open(w, "w:pPr", &[])?;
        if let Some(style) = self.style {
            empty(w, "w:pStyle", &[("w:val", style)])?;
        }

        let before = self.space_before.map(|v| v.to_string());
        let after = self.space_after.map(|v| v.to_string());
        let spacing: Vec<(&str, &str)> = [("w:before", &before), ("w:after", &after)]
            .into_iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
            .collect();
        if !spacing.is_empty() {
            empty(w, "w:spacing", &spacing)?;
        }

        if let Some(indent) = self.indent_left {
            let indent = indent.to_string();
            empty(w, "w:ind", &[("w:left", indent.as_str())])?;
        }
        if self.centered {
            empty(w, "w:jc", &[("w:val", "center")])?;
        }
        close(w, "w:pPr")
    }
}

fn write_text(w: &mut XmlWriter, text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    open(w, "w:t", &[("xml:space", "preserve")])?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    close(w, "w:t")
}

/// One run; tabs and newlines become `w:tab` and `w:br` so they survive as layout.
fn write_run(w: &mut XmlWriter, text: &str, font: &RunFont, emphasis: bool) -> Result<()> {
    open(w, "w:r", &[])?;
    font.write_properties(w, emphasis)?;

    let mut segment = String::new();
    for c in text.chars() {
        match c {
            '\t' | '\n' => {
                write_text(w, &segment)?;
                segment.clear();
                empty(w, if c == '\t' { "w:tab" } else { "w:br" }, &[])?;
            }
            _ => segment.push(c),
        }
    }
    write_text(w, &segment)?;

    close(w, "w:r")
}

fn write_paragraph(
    w: &mut XmlWriter,
    text: &str,
    props: &ParagraphProps,
    font: &RunFont,
    emphasis: bool,
) -> Result<()> {
    open(w, "w:p", &[])?;
    props.write(w)?;
    write_run(w, text, font, emphasis)?;
    close(w, "w:p")
}

fn write_section_properties(w: &mut XmlWriter, page: &PageLayout) -> Result<()> {
    let width = page.width.to_string();
    let height = page.height.to_string();
    let top = page.margin_top.to_string();
    let right = page.margin_right.to_string();
    let bottom = page.margin_bottom.to_string();
    let left = page.margin_left.to_string();

    open(w, "w:sectPr", &[])?;
    empty(w, "w:pgSz", &[("w:w", width.as_str()), ("w:h", height.as_str())])?;
    empty(
        w,
        "w:pgMar",
        &[
            ("w:top", top.as_str()),
            ("w:right", right.as_str()),
            ("w:bottom", bottom.as_str()),
            ("w:left", left.as_str()),
            ("w:header", "709"),
            ("w:footer", "709"),
            ("w:gutter", "0"),
        ],
    )?;
    close(w, "w:sectPr")
}

pub fn styles_xml(font: &RunFont) -> Result<String> {
    let mut w = xml_writer();
    declaration(&mut w)?;
    open(&mut w, "w:styles", &[("xmlns:w", W_NS)])?;
    open(&mut w, "w:docDefaults", &[])?;
    open(&mut w, "w:rPrDefault", &[])?;
    font.write_properties(&mut w, false)?;
    close(&mut w, "w:rPrDefault")?;
    close(&mut w, "w:docDefaults")?;
    open(
        &mut w,
        "w:style",
        &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")],
    )?;
    empty(&mut w, "w:name", &[("w:val", "Normal")])?;
    close(&mut w, "w:style")?;
    close(&mut w, "w:styles")?;
    into_string(w)
}

/// A numbered question paragraph, `prefix` being e.g. `3. `.
pub fn question_paragraph(prefix: &str, text: &str, style: Option<&str>, font: &RunFont) -> Result<String> {
    let mut w = xml_writer();
    let props = ParagraphProps {
        style,
        ..Default::default()
    };
    write_paragraph(&mut w, &format!("{}{}", prefix, text), &props, font, false)?;
    into_string(w)
}

/// `word/document.xml` for a stand-alone question sheet.
pub fn document_xml(
    unit_title: &str,
    level: &str,
    questions: &[String],
    font: &RunFont,
    page: &PageLayout,
) -> Result<String> {
    let title_font = RunFont::new(font.name.clone(), TITLE_SIZE_PT);
    let heading_font = RunFont::new(font.name.clone(), HEADING_SIZE_PT);

    let mut w = xml_writer();
    declaration(&mut w)?;
    open(&mut w, "w:document", &[("xmlns:w", W_NS)])?;
    open(&mut w, "w:body", &[])?;

    let centered = ParagraphProps {
        centered: true,
        ..Default::default()
    };
    write_paragraph(&mut w, unit_title, &centered, &title_font, true)?;

    let level_props = ParagraphProps {
        space_after: Some(240),
        centered: true,
        ..Default::default()
    };
    write_paragraph(&mut w, &format!("Level: {}", level), &level_props, font, false)?;

    let heading_props = ParagraphProps {
        space_before: Some(240),
        space_after: Some(120),
        ..Default::default()
    };
    write_paragraph(&mut w, "Discussion", &heading_props, &heading_font, true)?;

    let question_props = ParagraphProps {
        space_before: Some(QUESTION_SPACE_BEFORE),
        space_after: Some(QUESTION_SPACE_AFTER),
        indent_left: Some(QUESTION_INDENT),
        ..Default::default()
    };
    for (i, question) in questions.iter().enumerate() {
        write_paragraph(
            &mut w,
            &format!("{}. {}", i + 1, question),
            &question_props,
            font,
            false,
        )?;
    }

    write_section_properties(&mut w, page)?;
    close(&mut w, "w:body")?;
    close(&mut w, "w:document")?;
    into_string(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::xml::{body_layout, paragraph_text};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_run_properties_half_points() {
        let mut w = xml_writer();
        RunFont::new("Tahoma", 12).write_properties(&mut w, true).unwrap();
        let props = into_string(w).unwrap();

        assert!(props.contains(r#"w:ascii="Tahoma""#));
        assert!(props.contains(r#"<w:b/><w:bCs/><w:color w:val="FF0000"/><w:sz w:val="24"/>"#));
    }

    #[test]
    fn test_question_paragraph_tab_spacing() {
        let xml = question_paragraph("1.\t", "Tea & cake?", Some("ListNumber"), &RunFont::new("Arial", 11)).unwrap();

        assert!(xml.contains(r#"<w:pStyle w:val="ListNumber"/>"#));
        assert!(xml.contains("<w:tab/>"));
        assert_eq!(paragraph_text(&xml).unwrap(), "1.\tTea & cake?");
    }

    #[test]
    fn test_document_layout() {
        let questions = vec!["Fish & chips?".to_string(), "Tea or coffee?".to_string()];
        let xml = document_xml(
            "Eating <Out>",
            "B1+",
            &questions,
            &RunFont::new("Tahoma", 12),
            &PageLayout::a4(),
        )
        .unwrap();

        let layout = body_layout(&xml).unwrap();
        let texts: Vec<String> = layout
            .children
            .iter()
            .filter(|c| c.is_paragraph())
            .map(|c| paragraph_text(c.xml(&xml)).unwrap())
            .collect();
        assert_eq!(
            texts,
            vec![
                "Eating <Out>",
                "Level: B1+",
                "Discussion",
                "1. Fish & chips?",
                "2. Tea or coffee?"
            ]
        );

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(xml.contains(r#"<w:pgSz w:w="11906" w:h="16838"/>"#));
        assert!(xml.contains(r#"w:left="1077""#));
        assert!(xml.contains(r#"<w:ind w:left="400"/>"#));
        assert!(xml.contains(r#"<w:sz w:val="40"/>"#));
        assert!(xml.contains("Eating &lt;Out&gt;"));
        assert!(layout.children.last().unwrap().is_section_properties());
    }

    #[test]
    fn test_styles_declare_default_font() {
        let styles = styles_xml(&RunFont::new("Tahoma", 12)).unwrap();
        assert!(styles.contains(r#"<w:rPrDefault><w:rPr><w:rFonts w:ascii="Tahoma""#));
        assert!(styles.contains(r#"w:styleId="Normal""#));
    }
}
