// file: src/document/writer.rs
// description: writes question sheets as docx, from scratch or through a template
// reference: https://docs.rs/zip

use crate::config::OutputConfig;
use crate::document::package::{
    CONTENT_TYPES_XML, DOCUMENT_RELS_XML, PACKAGE_RELS_XML, PageLayout, RunFont, document_xml,
    styles_xml,
};
use crate::document::template::fill_document_xml;
use crate::error::{EflError, Result};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const DOCUMENT_PART: &str = "word/document.xml";

pub struct DocxWriter {
    font: RunFont,
    page: PageLayout,
    template: Option<PathBuf>,
}

impl DocxWriter {
    pub fn new(font: RunFont) -> Self {
        Self {
            font,
            page: PageLayout::a4(),
            template: None,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(RunFont::new(config.font_name.clone(), config.font_size_pt))
            .with_template(config.template_path.clone())
    }

    pub fn with_template(mut self, template: Option<PathBuf>) -> Self {
        self.template = template;
        self
    }

    pub fn template(&self) -> Option<&Path> {
        self.template.as_deref()
    }

    pub fn write(&self, path: &Path, unit_title: &str, level: &str, questions: &[String]) -> Result<()> {
        if unit_title.trim().is_empty() {
            return Err(EflError::Validation(
                "A unit title is required before exporting".to_string(),
            ));
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| EflError::file(parent, e))?;
        }

        match &self.template {
            Some(template) => self.write_from_template(template, path, unit_title, level, questions)?,
            None => self.write_package(path, unit_title, level, questions)?,
        }

        info!(
            "Wrote {} questions for '{}' to {}",
            questions.len(),
            unit_title,
            path.display()
        );
        Ok(())
    }

    fn write_package(&self, path: &Path, unit_title: &str, level: &str, questions: &[String]) -> Result<()> {
        let file = File::create(path).map_err(|e| EflError::file(path, e))?;
        let mut zip = ZipWriter::new(file);
        let options = deflated();

        let parts: [(&str, String); 5] = [
            ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
            ("_rels/.rels", PACKAGE_RELS_XML.to_string()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.to_string()),
            ("word/styles.xml", styles_xml(&self.font)?),
            (
                DOCUMENT_PART,
                document_xml(unit_title, level, questions, &self.font, &self.page)?,
            ),
        ];

        for (name, content) in parts {
            zip.start_file(name, options)?;
            zip.write_all(content.as_bytes())?;
        }

        zip.finish()?;
        Ok(())
    }

    fn write_from_template(
        &self,
        template: &Path,
        path: &Path,
        unit_title: &str,
        level: &str,
        questions: &[String],
    ) -> Result<()> {
        if !template.is_file() {
            return Err(EflError::Template(format!(
                "Template not found: {}",
                template.display()
            )));
        }

        let source = File::open(template).map_err(|e| EflError::file(template, e))?;
        let mut archive = ZipArchive::new(source)?;

        // Rendered fully before the output file is created, so a bad template leaves no partial file.
        let mut entries: Vec<(String, bool, Vec<u8>)> = Vec::with_capacity(archive.len());
        let mut found_document = false;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();

            if entry.is_dir() {
                entries.push((name, true, Vec::new()));
                continue;
            }

            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;

            if name == DOCUMENT_PART {
                let xml = String::from_utf8(data).map_err(|e| {
                    EflError::Template(format!("{} is not UTF-8: {}", DOCUMENT_PART, e))
                })?;
                data = fill_document_xml(&xml, unit_title, level, questions, &self.font)?.into_bytes();
                found_document = true;
            }

            entries.push((name, false, data));
        }

        if !found_document {
            return Err(EflError::Template(format!(
                "{} has no {}",
                template.display(),
                DOCUMENT_PART
            )));
        }

        debug!("Copying {} template entries from {}", entries.len(), template.display());

        let file = File::create(path).map_err(|e| EflError::file(path, e))?;
        let mut zip = ZipWriter::new(file);
        let options = deflated();

        for (name, is_dir, data) in entries {
            if is_dir {
                zip.add_directory(name, options)?;
            } else {
                zip.start_file(name, options)?;
                zip.write_all(&data)?;
            }
        }

        zip.finish()?;
        Ok(())
    }
}

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::xml::{body_layout, paragraph_text};
    use tempfile::TempDir;

    fn read_part(path: &Path, name: &str) -> String {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    fn paragraph_texts(xml: &str) -> Vec<String> {
        body_layout(xml)
            .unwrap()
            .children
            .iter()
            .filter(|c| c.is_paragraph())
            .map(|c| paragraph_text(c.xml(xml)).unwrap())
            .collect()
    }

    fn questions() -> Vec<String> {
        vec!["What do you cook?".to_string(), "Who cooks at home?".to_string()]
    }

    #[test]
    fn test_write_builtin_package() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/unit.docx");

        DocxWriter::new(RunFont::new("Tahoma", 12))
            .write(&path, "Cooking", "A2", &questions())
            .unwrap();

        let archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "[Content_Types].xml",
                "_rels/.rels",
                "word/_rels/document.xml.rels",
                "word/document.xml",
                "word/styles.xml",
            ]
        );

        let document = read_part(&path, DOCUMENT_PART);
        assert_eq!(
            paragraph_texts(&document),
            vec!["Cooking", "Level: A2", "Discussion", "1. What do you cook?", "2. Who cooks at home?"]
        );
        assert!(read_part(&path, "word/styles.xml").contains("Tahoma"));
    }

    #[test]
    fn test_write_through_template() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("template.docx");

        {
            let mut zip = ZipWriter::new(File::create(&template).unwrap());
            let options = deflated();
            zip.add_directory("word/", options).unwrap();
            zip.start_file("word/document.xml", options).unwrap();
            zip.write_all(
                concat!(
                    r#"<w:document xmlns:w="x"><w:body>"#,
                    r#"<w:p><w:r><w:t>LOOKING BACK (B2)</w:t></w:r></w:p>"#,
                    r#"<w:p><w:r><w:t>Discussion</w:t></w:r></w:p>"#,
                    r#"<w:p><w:r><w:t>1. Old?</w:t></w:r></w:p>"#,
                    r#"<w:sectPr/></w:body></w:document>"#
                )
                .as_bytes(),
            )
            .unwrap();
            zip.start_file("word/media/logo.png", options).unwrap();
            zip.write_all(&[1, 2, 3]).unwrap();
            zip.finish().unwrap();
        }

        let out = dir.path().join("filled.docx");
        DocxWriter::new(RunFont::new("Tahoma", 12))
            .with_template(Some(template))
            .write(&out, "Cooking", "A2", &questions())
            .unwrap();

        let document = read_part(&out, DOCUMENT_PART);
        assert_eq!(
            paragraph_texts(&document),
            vec!["Cooking (A2)", "Discussion", "1. What do you cook?", "2. Who cooks at home?"]
        );

        let mut archive = ZipArchive::new(File::open(&out).unwrap()).unwrap();
        let mut logo = Vec::new();
        archive.by_name("word/media/logo.png").unwrap().read_to_end(&mut logo).unwrap();
        assert_eq!(logo, vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_template_and_title() {
        let dir = TempDir::new().unwrap();
        let writer = DocxWriter::new(RunFont::new("Tahoma", 12))
            .with_template(Some(dir.path().join("missing.docx")));

        let out = dir.path().join("x.docx");
        assert!(matches!(
            writer.write(&out, "Unit", "B2", &questions()),
            Err(EflError::Template(_))
        ));
        assert!(!out.exists());
        assert!(matches!(
            writer.write(&out, "  ", "B2", &questions()),
            Err(EflError::Validation(_))
        ));
    }
}
