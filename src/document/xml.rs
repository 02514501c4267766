// file: src/document/xml.rs
// description: wordprocessingml body and paragraph access over quick-xml events
// reference: ECMA-376 part 1, 17.2 (document body)

use crate::error::{EflError, Result};
use crate::parser::patterns::LEVEL_TOKEN;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

pub type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// A direct child of `<w:body>`, as a byte range into the document xml.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyChild {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

impl BodyChild {
    pub fn is_paragraph(&self) -> bool {
        self.name == "w:p"
    }

    pub fn is_section_properties(&self) -> bool {
        self.name == "w:sectPr"
    }

    pub fn xml<'a>(&self, document: &'a str) -> &'a str {
        &document[self.start..self.end]
    }
}

#[derive(Debug, Clone)]
pub struct BodyLayout {
    /// Offset just after `<w:body>`.
    pub content_start: usize,
    /// Offset of `</w:body>`.
    pub content_end: usize,
    pub children: Vec<BodyChild>,
}

pub fn xml_writer() -> XmlWriter {
    Writer::new(Cursor::new(Vec::new()))
}

pub fn into_string(writer: XmlWriter) -> Result<String> {
    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| EflError::Document(format!("generated XML is not UTF-8: {}", e)))
}

fn element_name(element: &BytesStart) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

/// Locate `<w:body>` and split its content into top-level elements.
///
/// Text is never trimmed, so every byte of the body belongs to some event
/// and the reader position before and after an event brackets it exactly.
pub fn body_layout(xml: &str) -> Result<BodyLayout> {
    let mut reader = Reader::from_str(xml);
    let mut content_start = None;
    let mut depth = 0usize;
    let mut open: Option<(String, usize)> = None;
    let mut children = Vec::new();

    loop {
        let start = reader.buffer_position();
        let event = reader.read_event()?;
        let end = reader.buffer_position();

        let Some(body_start) = content_start else {
            match event {
                Event::Start(e) if e.name().as_ref() == b"w:body" => content_start = Some(end),
                Event::Eof => {
                    return Err(EflError::Template("document.xml has no <w:body>".to_string()));
                }
                _ => {}
            }
            continue;
        };

        match event {
            Event::Start(e) => {
                if depth == 0 {
                    open = Some((element_name(&e), start));
                }
                depth += 1;
            }
            Event::Empty(e) if depth == 0 => children.push(BodyChild {
                name: element_name(&e),
                start,
                end,
            }),
            Event::End(_) if depth == 0 => {
                return Ok(BodyLayout {
                    content_start: body_start,
                    content_end: start,
                    children,
                });
            }
            Event::End(_) => {
                depth -= 1;
                if depth == 0
                    && let Some((name, child_start)) = open.take()
                {
                    children.push(BodyChild {
                        name,
                        start: child_start,
                        end,
                    });
                }
            }
            Event::Eof => return Err(EflError::Template("unterminated <w:body>".to_string())),
            _ => {}
        }
    }
}

/// Visible text of a paragraph: `<w:t>` contents, with run tabs as `\t` and breaks as `\n`.
pub fn paragraph_text(paragraph: &str) -> Result<String> {
    let mut reader = Reader::from_str(paragraph);
    let mut text = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:r" => in_run = true,
                b"w:t" => in_text = in_run,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                _ => {}
            },
            // Tab stops inside w:pPr share the w:tab name; only run content counts.
            Event::Empty(e) if in_run => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => text.push_str(&t.unescape()?),
            Event::Eof => return Ok(text),
            _ => {}
        }
    }
}

pub fn paragraph_style(paragraph: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(paragraph);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"w:pStyle" => {
                let style = match e.try_get_attribute("w:val")? {
                    Some(attr) => Some(attr.unescape_value()?.into_owned()),
                    None => None,
                };
                return Ok(style);
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Apply `edit` to the text of every `<w:t>` in `paragraph`, passing all other markup through.
pub fn map_run_text(paragraph: &str, edit: impl Fn(&str) -> String) -> Result<String> {
    let mut reader = Reader::from_str(paragraph);
    let mut writer = xml_writer();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if e.name().as_ref() == b"w:t" {
                    in_text = true;
                }
                writer.write_event(Event::Start(e))?;
            }
            Event::End(e) => {
                if e.name().as_ref() == b"w:t" {
                    in_text = false;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Text(t) if in_text => {
                let edited = edit(&t.unescape()?);
                writer.write_event(Event::Text(BytesText::new(&edited)))?;
            }
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
    }

    into_string(writer)
}

/// Replace CEFR level tokens that stand alone, so `B1` never matches inside `B1+` or `AB12`.
pub fn replace_level_tokens(text: &str, level: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for m in LEVEL_TOKEN.find_iter(text) {
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        let standalone = !before.is_some_and(char::is_alphanumeric)
            && !after.is_some_and(|c| c.is_alphanumeric() || c == '+');

        if standalone {
            out.push_str(&text[last..m.start()]);
            out.push_str(level);
            last = m.end();
        }
    }

    out.push_str(&text[last..]);
    out
}
