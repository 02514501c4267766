// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{EflError, Result};
use crate::models::{BloomsLevel, CefrLevel, CefrTier, EngagementLevel, GenerationOptions, TopicConsistency};
use crate::utils::validation::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "EFL Cafe Wizard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub ocr: OcrConfig,
    pub pipeline: PipelineConfig,
    pub generation: GenerationConfig,
    pub output: OutputConfig,
    pub prompts: PromptsConfig,
    pub debug: DebugConfig,
    pub update: UpdateConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    #[serde(default)]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OcrConfig {
    pub tesseract_cmd: String,
    #[serde(default)]
    pub tessdata_dir: Option<PathBuf>,
    pub language: String,
    pub psm: u8,
    pub pdftoppm_cmd: String,
    pub pdf_dpi: u32,
    pub max_pdf_pages: u32,
    pub grayscale: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    pub parallel_workers: usize,
    pub skip_patterns: Vec<String>,
    pub max_file_size_mb: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    pub level: CefrLevel,
    pub tier: CefrTier,
    pub blooms: BloomsLevel,
    pub engagement: EngagementLevel,
    pub topic_consistency: TopicConsistency,
    pub quality_validation: bool,
    pub academic_background: bool,
    pub naturalness_check: bool,
    pub question_count: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub template_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub font_name: String,
    pub font_size_pt: u32,
    /// LibreOffice binary used for PDF export.
    pub soffice_cmd: String,
    pub pdf_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptsConfig {
    pub path: PathBuf,
    pub feedback_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebugConfig {
    pub enabled: bool,
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateConfig {
    pub enabled: bool,
    pub manifest_url: String,
    pub timeout_secs: u64,
}

impl GenerationConfig {
    pub fn options(&self) -> GenerationOptions {
        GenerationOptions {
            level: self.level,
            tier: self.tier,
            blooms: self.blooms,
            engagement: self.engagement,
            topic_consistency: self.topic_consistency,
            quality_validation: self.quality_validation,
            academic_background: self.academic_background,
            naturalness_check: self.naturalness_check,
        }
    }
}

impl GeminiConfig {
    /// Configured key, falling back to `GEMINI_API_KEY`.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| EflError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(
                config::File::from(Path::new("config/default.toml")).required(false),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix("EFL_CAFE")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| EflError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| EflError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            gemini: GeminiConfig {
                api_key: None,
                model: "gemini-2.5-flash".to_string(),
                endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                timeout_secs: 30,
                temperature: None,
            },
            ocr: OcrConfig {
                tesseract_cmd: "tesseract".to_string(),
                tessdata_dir: None,
                language: "eng".to_string(),
                psm: 3,
                pdftoppm_cmd: "pdftoppm".to_string(),
                pdf_dpi: 150,
                max_pdf_pages: 5,
                grayscale: true,
            },
            pipeline: PipelineConfig {
                parallel_workers: 2,
                skip_patterns: vec![".git/*".to_string(), "*.tmp".to_string()],
                max_file_size_mb: 50,
            },
            generation: GenerationConfig {
                level: CefrLevel::B2,
                tier: CefrTier::Upper,
                blooms: BloomsLevel::Auto,
                engagement: EngagementLevel::Balanced,
                topic_consistency: TopicConsistency::Neutral,
                quality_validation: true,
                academic_background: false,
                naturalness_check: true,
                question_count: 15,
            },
            output: OutputConfig {
                template_path: None,
                output_dir: PathBuf::from("./output"),
                font_name: "Tahoma".to_string(),
                font_size_pt: 12,
                soffice_cmd: "soffice".to_string(),
                pdf_timeout_secs: 60,
            },
            prompts: PromptsConfig {
                path: PathBuf::from("config/prompts.toml"),
                feedback_path: PathBuf::from("feedback.ini"),
            },
            debug: DebugConfig {
                enabled: false,
                directory: PathBuf::from("DEBUG"),
            },
            update: UpdateConfig {
                enabled: true,
                manifest_url: "https://raw.githubusercontent.com/aerladis/eflai/main/manifest.json"
                    .to_string(),
                timeout_secs: 20,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.pipeline.parallel_workers == 0 {
            return Err(EflError::Config(
                "parallel_workers must be greater than 0".to_string(),
            ));
        }

        if self.generation.question_count == 0 {
            return Err(EflError::Config(
                "question_count must be greater than 0".to_string(),
            ));
        }

        if self.output.font_size_pt == 0 || self.output.font_size_pt > 96 {
            return Err(EflError::Config(format!(
                "font_size_pt must be between 1 and 96, got {}",
                self.output.font_size_pt
            )));
        }

        Validator::validate_url(&self.gemini.endpoint)
            .map_err(|e| EflError::Config(e.to_string()))?;

        if self.update.enabled {
            Validator::validate_url(&self.update.manifest_url)
                .map_err(|e| EflError::Config(e.to_string()))?;
        }

        Ok(())
    }
}
