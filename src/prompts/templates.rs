// file: src/prompts/templates.rs
// description: prompt template loading, placeholder rendering and file version tracking
// reference: https://docs.rs/config

use crate::error::{EflError, Result};
use crate::models::{GenerationOptions, UnitSpec};
use crate::parser::patterns::{PLACEHOLDER, PROMPTS_LAST_UPDATED, PROMPTS_VERSION};
use crate::prompts::instructions;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_BATCH_TEMPLATE: &str = "You are an ESL materials writer for an online {modifier}{unit_level} discussion class.\n\
UNIT: {unit_title}\nCONTENT TOPICS:\n{topics}\nTARGET VOCABULARY (optional): {vocab}\n\
CEFR TIER: {cefr_tier}\n\n\
RULES\n- EXACTLY 15 questions, numbered 1\u{2013}15, one per line.\n\
- Each is ONE sentence, 12\u{2013}20 words, ends with '?'.\n\
- Use the topics; distribute evenly; high-frequency English, CEFR {unit_level}.\n\
- {tier_instructions}\n\
- Avoid clich\u{e9}s/filler (amazing/awesome/etc.).\n\
OUTPUT: only the 15 numbered questions.";

pub const DEFAULT_SINGLE_TEMPLATE: &str = "You are an ESL materials writer for an online {modifier}{unit_level} discussion class.\n\
UNIT: {unit_title}\nCONTENT TOPICS:\n{topics}\nTARGET VOCABULARY (optional): {vocab}\n\
CEFR TIER: {cefr_tier}\n\n\
TASK: Write ONE NEW question (12\u{2013}20 words, one sentence, ends with '?').\n\
- {tier_instructions}\n\
Avoid clich\u{e9}s. Do not repeat any of these:\n{existing_questions}\n\
OUTPUT: only the question text.";

/// Placeholders a debug log checks for after rendering.
pub const CORE_PLACEHOLDERS: [&str; 5] =
    ["{topics}", "{vocab}", "{unit_title}", "{unit_level}", "{cefr_tier}"];

#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplates {
    pub batch: String,
    pub single: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            batch: DEFAULT_BATCH_TEMPLATE.to_string(),
            single: DEFAULT_SINGLE_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Load `[batch] template` / `[single] template` from a TOML file.
    ///
    /// A missing file or missing section falls back to the built-in template.
    pub fn load(path: &Path) -> Result<Self> {
        let defaults = Self::default();

        if !path.exists() {
            debug!("Prompts file {} not found, using built-in templates", path.display());
            return Ok(defaults);
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .build()
            .map_err(|e| EflError::Prompt(format!("{}: {}", path.display(), e)))?;

        let pick = |key: &str, fallback: String| {
            settings
                .get_string(key)
                .ok()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(fallback)
        };

        let templates = Self {
            batch: pick("batch.template", defaults.batch),
            single: pick("single.template", defaults.single),
        };

        info!("Loaded prompt templates from {}", path.display());
        Ok(templates)
    }

    /// TOML text equivalent to the built-in templates, with a version header.
    pub fn default_file_contents(app_version: &str, today: NaiveDate) -> String {
        let defaults = Self::default();
        format!(
            "# EFL Cafe prompt templates\n# Version: {}\n# Last Updated: {}\n\n[batch]\ntemplate = '''\n{}'''\n\n[single]\ntemplate = '''\n{}'''\n",
            app_version,
            today.format("%Y-%m-%d"),
            defaults.batch,
            defaults.single
        )
    }
}

/// Values substituted into a template.
#[derive(Debug, Clone, Default)]
pub struct PromptVars {
    values: HashMap<&'static str, String>,
}

impl PromptVars {
    pub fn for_unit(unit: &UnitSpec, options: &GenerationOptions) -> Self {
        let level = options.level.to_string();
        let mut vars = Self::default();

        vars.set("unit_level", level.clone())
            .set("level", level)
            .set("modifier", options.tier.modifier())
            .set("unit_title", unit.title.clone())
            .set("topics", unit.topics_block())
            .set("vocab", unit.vocab_line())
            .set("cefr_tier", options.tier.to_string())
            .set(
                "tier_instructions",
                instructions::tier_instructions(options.level, options.tier),
            )
            .set(
                "quality_validation_instructions",
                instructions::quality_validation_instructions(options.quality_validation),
            )
            .set(
                "blooms_taxonomy_instructions",
                instructions::blooms_taxonomy_instructions(options.blooms),
            )
            .set(
                "engagement_level_instructions",
                instructions::engagement_level_instructions(options.engagement),
            )
            .set(
                "academic_background_instructions",
                instructions::academic_background_instructions(options.academic_background),
            )
            .set(
                "naturalness_instructions",
                instructions::naturalness_instructions(options.naturalness_check),
            )
            .set(
                "strictness_instructions",
                instructions::strictness_instructions(options.topic_consistency),
            );

        vars
    }

    pub fn set(&mut self, key: &'static str, value: impl Into<String>) -> &mut Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn with_existing_questions(mut self, existing: &[String]) -> Self {
        let block = existing
            .iter()
            .map(|q| format!("- {}", q))
            .collect::<Vec<_>>()
            .join("\n");
        self.set("existing_questions", block);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub text: String,
    pub unresolved: Vec<String>,
}

impl RenderedPrompt {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Substitute `{name}` placeholders in a single pass.
///
/// Values are never re-scanned, so braces inside topics or questions survive.
pub fn render(template: &str, vars: &PromptVars) -> RenderedPrompt {
    let mut unresolved = Vec::new();

    let text = PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            match vars.get(name) {
                Some(value) => value.to_string(),
                None => {
                    if !unresolved.iter().any(|u| u == name) {
                        unresolved.push(name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        })
        .into_owned();

    if !unresolved.is_empty() {
        warn!(
            "Prompt template has unknown placeholders left unformatted: {}",
            unresolved.join(", ")
        );
    }

    RenderedPrompt { text, unresolved }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    Match(String),
    Mismatch { file: String, app: String },
    Missing,
    NoFile,
}

pub fn prompts_file_version(content: &str) -> Option<String> {
    PROMPTS_VERSION
        .captures(content)
        .map(|caps| caps[1].trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn check_version(path: &Path, app_version: &str) -> Result<VersionCheck> {
    if !path.exists() {
        return Ok(VersionCheck::NoFile);
    }

    let content = fs::read_to_string(path).map_err(|e| EflError::file(path, e))?;

    let check = match prompts_file_version(&content) {
        Some(file) if file == app_version => VersionCheck::Match(file),
        Some(file) => VersionCheck::Mismatch {
            file,
            app: app_version.to_string(),
        },
        None => VersionCheck::Missing,
    };

    match &check {
        VersionCheck::Match(v) => debug!("Prompts version check passed: {}", v),
        VersionCheck::Mismatch { file, app } => warn!(
            "Prompts file {} is version {} but the application is {}",
            path.display(),
            file,
            app
        ),
        VersionCheck::Missing => warn!("No version header found in {}", path.display()),
        VersionCheck::NoFile => {}
    }

    Ok(check)
}

/// Rewrite the `# Version:` and `# Last Updated:` headers, keeping a `.backup` copy.
///
/// Returns the backup path.
pub fn sync_version(path: &Path, app_version: &str, today: NaiveDate) -> Result<PathBuf> {
    let content = fs::read_to_string(path).map_err(|e| EflError::file(path, e))?;

    let mut backup = path.as_os_str().to_owned();
    backup.push(".backup");
    let backup = PathBuf::from(backup);
    fs::write(&backup, &content).map_err(|e| EflError::file(&backup, e))?;

    let version_line = format!("# Version: {}", app_version);
    let date_line = format!("# Last Updated: {}", today.format("%Y-%m-%d"));

    let updated = if PROMPTS_VERSION.is_match(&content) {
        PROMPTS_VERSION
            .replace_all(&content, regex::NoExpand(&version_line))
            .into_owned()
    } else {
        format!("{}\n{}", version_line, content)
    };
    let updated = PROMPTS_LAST_UPDATED
        .replace_all(&updated, regex::NoExpand(&date_line))
        .into_owned();

    fs::write(path, updated).map_err(|e| EflError::file(path, e))?;
    info!(
        "Updated {} to version {} (backup at {})",
        path.display(),
        app_version,
        backup.display()
    );

    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CefrLevel, CefrTier};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn unit() -> UnitSpec {
        UnitSpec::new(
            "Eating Out",
            vec!["restaurants".to_string(), "tipping".to_string()],
            vec!["menu".to_string()],
        )
    }

    #[test]
    fn test_render_default_batch_template() {
        let options = GenerationOptions {
            level: CefrLevel::B1,
            tier: CefrTier::Lower,
            ..GenerationOptions::default()
        };
        let vars = PromptVars::for_unit(&unit(), &options);
        let rendered = render(DEFAULT_BATCH_TEMPLATE, &vars);

        assert!(rendered.is_complete());
        assert!(rendered.text.starts_with(
            "You are an ESL materials writer for an online Lower B1 discussion class.\nUNIT: Eating Out\n"
        ));
        assert!(rendered.text.contains("CONTENT TOPICS:\n* restaurants\n* tipping\n"));
        assert!(rendered.text.contains("TARGET VOCABULARY (optional): menu\n"));
        assert!(rendered.text.contains("Have you ever...?"));
    }

    #[test]
    fn test_render_reports_unknown_placeholders() {
        let vars = PromptVars::for_unit(&unit(), &GenerationOptions::default());
        let rendered = render("{unit_title} {mystery} {mystery}", &vars);

        assert_eq!(rendered.text, "Eating Out {mystery} {mystery}");
        assert_eq!(rendered.unresolved, vec!["mystery".to_string()]);
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let tricky = UnitSpec::new("{vocab}", vec![], vec![]);
        let vars = PromptVars::for_unit(&tricky, &GenerationOptions::default());
        let rendered = render("{unit_title}", &vars);
        assert_eq!(rendered.text, "{vocab}");
    }

    #[test]
    fn test_existing_questions_block() {
        let vars = PromptVars::for_unit(&unit(), &GenerationOptions::default())
            .with_existing_questions(&["Do you tip?".to_string(), "Why?".to_string()]);
        let rendered = render(DEFAULT_SINGLE_TEMPLATE, &vars);
        assert!(rendered.text.contains("Do not repeat any of these:\n- Do you tip?\n- Why?\n"));
        assert!(rendered.is_complete());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let templates = PromptTemplates::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(templates, PromptTemplates::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompts.toml");
        fs::write(&path, "# Version: 0.1.0\n[batch]\ntemplate = \"Custom {unit_title}\"\n").unwrap();

        let templates = PromptTemplates::load(&path).unwrap();
        assert_eq!(templates.batch, "Custom {unit_title}");
        assert_eq!(templates.single, DEFAULT_SINGLE_TEMPLATE);
    }

    #[test]
    fn test_default_file_contents_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompts.toml");
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        fs::write(&path, PromptTemplates::default_file_contents("0.23.0", today)).unwrap();

        let templates = PromptTemplates::load(&path).unwrap();
        assert_eq!(templates.batch.trim_end(), DEFAULT_BATCH_TEMPLATE);
        assert_eq!(
            check_version(&path, "0.23.0").unwrap(),
            VersionCheck::Match("0.23.0".to_string())
        );
    }

    #[test]
    fn test_version_check_and_sync() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompts.toml");
        fs::write(
            &path,
            "# Version: 0.20 BETA\n# Last Updated: 2025-01-01\n[batch]\ntemplate = \"x\"\n",
        )
        .unwrap();

        assert_eq!(
            check_version(&path, "0.23.0").unwrap(),
            VersionCheck::Mismatch {
                file: "0.20 BETA".to_string(),
                app: "0.23.0".to_string()
            }
        );

        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let backup = sync_version(&path, "0.23.0", today).unwrap();

        let updated = fs::read_to_string(&path).unwrap();
        assert!(updated.starts_with("# Version: 0.23.0\n# Last Updated: 2026-10-19\n"));
        assert!(fs::read_to_string(backup).unwrap().contains("0.20 BETA"));
    }

    #[test]
    fn test_version_missing_and_no_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompts.toml");
        assert_eq!(check_version(&path, "1").unwrap(), VersionCheck::NoFile);

        fs::write(&path, "[batch]\ntemplate = \"x\"\n").unwrap();
        assert_eq!(check_version(&path, "1").unwrap(), VersionCheck::Missing);
    }
}
