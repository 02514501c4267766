// file: src/ai/questions.rs
// description: batch and single discussion question generation over a content model
// reference: internal prompt design

use crate::ai::model::ContentModel;
use crate::error::{EflError, Result};
use crate::models::{GenerationOptions, UnitSpec};
use crate::parser::{
    DEFAULT_QUESTION_COUNT, ensure_count, parse_numbered_questions, single_question_from_response,
};
use crate::prompts::{PromptTemplates, PromptVars, render, with_feedback};
use crate::utils::DebugRecorder;
use std::sync::Arc;
use tracing::{info, warn};

pub struct QuestionGenerator {
    model: Arc<dyn ContentModel>,
    templates: PromptTemplates,
    recorder: DebugRecorder,
    question_count: usize,
}

impl QuestionGenerator {
    pub fn new(
        model: Arc<dyn ContentModel>,
        templates: PromptTemplates,
        recorder: DebugRecorder,
    ) -> Self {
        Self {
            model,
            templates,
            recorder,
            question_count: DEFAULT_QUESTION_COUNT,
        }
    }

    pub fn with_question_count(mut self, count: usize) -> Self {
        self.question_count = count.max(1);
        self
    }

    pub fn batch_prompt(&self, unit: &UnitSpec, options: &GenerationOptions) -> Result<String> {
        require_title(unit)?;
        let vars = PromptVars::for_unit(unit, options);
        Ok(render(&self.templates.batch, &vars).text)
    }

    pub fn single_prompt(
        &self,
        unit: &UnitSpec,
        options: &GenerationOptions,
        existing: &[String],
        feedback: Option<&str>,
    ) -> Result<String> {
        require_title(unit)?;
        let template = match feedback {
            Some(feedback) => with_feedback(&self.templates.single, feedback),
            None => self.templates.single.clone(),
        };
        let vars = PromptVars::for_unit(unit, options).with_existing_questions(existing);
        Ok(render(&template, &vars).text)
    }

    /// Generate a full question set, padded to the configured count.
    pub async fn generate_batch(
        &self,
        unit: &UnitSpec,
        options: &GenerationOptions,
    ) -> Result<Vec<String>> {
        let prompt = self.batch_prompt(unit, options)?;
        let response = self.exchange("batch", &prompt).await?;

        let parsed = parse_numbered_questions(&response, self.question_count);
        if parsed.len() < self.question_count {
            warn!(
                "Model returned {} of {} questions, padding the rest",
                parsed.len(),
                self.question_count
            );
        }

        info!(
            "Generated {} questions for '{}' at {} with {}",
            parsed.len(),
            unit.title,
            options.level,
            self.model.name()
        );
        Ok(ensure_count(parsed, self.question_count))
    }

    /// Generate one replacement question that avoids `existing`.
    pub async fn regenerate_one(
        &self,
        unit: &UnitSpec,
        options: &GenerationOptions,
        existing: &[String],
        feedback: Option<&str>,
    ) -> Result<String> {
        let prompt = self.single_prompt(unit, options, existing, feedback)?;
        let response = self.exchange("single", &prompt).await?;
        Ok(single_question_from_response(&response))
    }

    async fn exchange(&self, kind: &str, prompt: &str) -> Result<String> {
        match self.model.generate(prompt).await {
            Ok(response) => {
                self.recorder
                    .record_conversation(kind, prompt, Some(&response), None);
                Ok(response)
            }
            Err(e) => {
                self.recorder
                    .record_conversation(kind, prompt, None, Some(&e.to_string()));
                Err(e)
            }
        }
    }
}

fn require_title(unit: &UnitSpec) -> Result<()> {
    if !unit.has_title() {
        return Err(EflError::Validation(
            "A unit title is required to generate questions".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::model::scripted::ScriptedModel;
    use crate::parser::FILLER_QUESTION;
    use tempfile::TempDir;

    fn unit() -> UnitSpec {
        UnitSpec::new("Eating Out", vec!["restaurants".to_string()], vec![])
    }

    #[tokio::test]
    async fn test_generate_batch_pads_to_count() {
        let model = Arc::new(
            ScriptedModel::new().reply("1. Do you eat out often?\n2. What is your favourite restaurant?"),
        );
        let generator = QuestionGenerator::new(
            model.clone(),
            PromptTemplates::default(),
            DebugRecorder::disabled(),
        );

        let questions = generator
            .generate_batch(&unit(), &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(questions.len(), 15);
        assert_eq!(questions[0], "Do you eat out often?");
        assert_eq!(questions[14], FILLER_QUESTION);
        assert!(model.prompts()[0].contains("UNIT: Eating Out"));
    }

    #[tokio::test]
    async fn test_custom_count_truncates() {
        let reply: String = (1..=15).map(|i| format!("{}. Question {}?\n", i, i)).collect();
        let model = Arc::new(ScriptedModel::new().reply(&reply));
        let generator = QuestionGenerator::new(model, PromptTemplates::default(), DebugRecorder::disabled())
            .with_question_count(5);

        let questions = generator
            .generate_batch(&unit(), &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[4], "Question 5?");
    }

    #[tokio::test]
    async fn test_missing_title_rejected_before_model_call() {
        let model = Arc::new(ScriptedModel::new());
        let generator = QuestionGenerator::new(
            model.clone(),
            PromptTemplates::default(),
            DebugRecorder::disabled(),
        );

        let untitled = UnitSpec::new("  ", vec![], vec![]);
        let result = generator
            .generate_batch(&untitled, &GenerationOptions::default())
            .await;
        assert!(matches!(result, Err(EflError::Validation(_))));
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_regenerate_with_feedback_and_existing() {
        let model = Arc::new(ScriptedModel::new().reply("Would you tip a rude waiter."));
        let generator = QuestionGenerator::new(
            model.clone(),
            PromptTemplates::default(),
            DebugRecorder::disabled(),
        );

        let existing = vec!["Do you tip?".to_string()];
        let question = generator
            .regenerate_one(&unit(), &GenerationOptions::default(), &existing, Some("too easy"))
            .await
            .unwrap();

        assert_eq!(question, "Would you tip a rude waiter?");
        let prompt = &model.prompts()[0];
        assert!(prompt.contains("- Do you tip?"));
        assert!(prompt.contains("FEEDBACK ON PREVIOUS QUESTION: too easy"));
    }

    #[tokio::test]
    async fn test_failures_are_recorded() {
        let dir = TempDir::new().unwrap();
        let model = Arc::new(ScriptedModel::new().fail("503"));
        let generator = QuestionGenerator::new(
            model,
            PromptTemplates::default(),
            DebugRecorder::new(dir.path()),
        );

        let result = generator
            .generate_batch(&unit(), &GenerationOptions::default())
            .await;
        assert!(result.is_err());

        let log = std::fs::read_dir(dir.path())
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        let content = std::fs::read_to_string(log).unwrap();
        assert!(content.contains("CONVERSATION TYPE: batch"));
        assert!(content.contains("AI request failed: 503"));
    }
}
