// file: src/pipeline/session.rs
// description: regenerate and export steps over a saved question session
// reference: orchestrates the regen and export commands

use crate::ai::QuestionGenerator;
use crate::document::{DocxWriter, PdfConverter};
use crate::error::Result;
use crate::exporter::{load_session, save_session_to};
use crate::models::QuestionSession;
use crate::utils::{FeedbackLog, Validator};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Regeneration {
    pub number: usize,
    pub previous: String,
    pub replacement: String,
    pub feedback_key: Option<String>,
    pub session: QuestionSession,
}

/// Replace question `number` (1-based) in the session stored at `path`.
///
/// Feedback is logged only after the replacement has been generated and saved.
pub async fn regenerate_question(
    generator: &QuestionGenerator,
    path: &Path,
    number: usize,
    feedback: Option<&str>,
    log: &FeedbackLog,
) -> Result<Regeneration> {
    let mut session = load_session(path)?;
    let index = Validator::validate_question_number(number, session.questions.len())?;
    let previous = session.get(index)?.text.clone();
    let feedback = feedback.map(str::trim).filter(|f| !f.is_empty());

    let replacement = generator
        .regenerate_one(&session.unit, &session.options, &session.texts(), feedback)
        .await?;
    session.replace(index, replacement)?;
    save_session_to(path, &session, true)?;

    let feedback_key = match feedback {
        Some(reason) => {
            let key = log.append(&previous, reason)?;
            info!("Recorded feedback {} for question {}", key, number);
            Some(key)
        }
        None => None,
    };

    Ok(Regeneration {
        number,
        replacement: session.get(index)?.text.clone(),
        previous,
        feedback_key,
        session,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedSheet {
    pub docx: PathBuf,
    pub pdf: Option<PathBuf>,
}

/// Write `session` as a DOCX sheet, plus a PDF beside it when a converter is given.
pub async fn export_session(
    session: &QuestionSession,
    docx: &Path,
    writer: &DocxWriter,
    pdf: Option<&PdfConverter>,
) -> Result<ExportedSheet> {
    Validator::validate_docx_extension(docx)?;
    if let Some(template) = writer.template() {
        Validator::validate_file_path(template)?;
    }

    writer.write(
        docx,
        &session.unit.title,
        session.options.level.as_str(),
        &session.texts(),
    )?;

    let pdf = match pdf {
        Some(converter) => Some(converter.convert(docx, &docx.with_extension("pdf")).await?),
        None => None,
    };

    Ok(ExportedSheet {
        docx: docx.to_path_buf(),
        pdf,
    })
}
