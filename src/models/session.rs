// file: src/models/session.rs
// description: generated question set persisted between generate, regen and export
// reference: internal data structures

use crate::error::{EflError, Result};
use crate::models::{GenerationOptions, UnitSpec};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    #[serde(default)]
    pub regenerated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSession {
    pub id: Uuid,
    pub unit: UnitSpec,
    pub options: GenerationOptions,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuestionSession {
    pub fn new(unit: UnitSpec, options: GenerationOptions, questions: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            unit,
            options,
            questions: questions
                .into_iter()
                .map(|text| Question {
                    text,
                    regenerated: false,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.questions.iter().map(|q| q.text.clone()).collect()
    }

    pub fn get(&self, index: usize) -> Result<&Question> {
        self.questions.get(index).ok_or_else(|| {
            EflError::Validation(format!(
                "question index {} out of range (1..={})",
                index + 1,
                self.questions.len()
            ))
        })
    }

    /// Replace the question at a zero-based index and flag it as regenerated.
    pub fn replace(&mut self, index: usize, text: String) -> Result<()> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(EflError::Validation(
                "replacement question is empty".to_string(),
            ));
        }

        let count = self.questions.len();
        let slot = self.questions.get_mut(index).ok_or_else(|| {
            EflError::Validation(format!(
                "question index {} out of range (1..={})",
                index + 1,
                count
            ))
        })?;

        slot.text = text;
        slot.regenerated = true;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Stable digest of the rendered content; changes whenever a question does.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.unit.title.as_bytes());
        hasher.update(self.options.level.as_str().as_bytes());
        for question in &self.questions {
            hasher.update(b"\n");
            hasher.update(question.text.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}
