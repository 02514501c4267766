// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{ArgAction, Parser, Subcommand};
use efl_cafe::utils::logging::{
    format_error, format_info, format_question, format_success, format_warning,
};
use efl_cafe::{
    APP_NAME, APP_VERSION, BloomsLevel, CefrLevel, CefrTier, Config, ContentModel, DebugRecorder,
    DocxWriter, EngagementLevel, FeedbackLog, GeminiClient, GenerationOptions, IngestOutcome,
    IngestPipeline, JsonExporter, OcrEngine, OperationTimer, PdfConverter, PromptTemplates,
    QuestionGenerator, QuestionSession, SourceScanner, TopicConsistency, TopicExtractor, UnitSpec,
    UpdateChecker, UpdateStatus, Validator, VersionCheck, export_session, load_session,
    parse_topics_spec, regenerate_question, save_session_to,
};
use efl_cafe::exporter::load_unit;
use efl_cafe::prompts::{check_version, sync_version};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "efl_cafe")]
#[command(author = "EFL Cafe contributors")]
#[command(version)]
#[command(about = "OCR course material and generate EFL discussion questions", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// OCR images and PDFs and extract a unit spec from each
    Ocr {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long)]
        pretty: bool,
    },

    /// Generate a full question set for one unit
    Generate {
        /// Topic sheet (plain text) or a unit JSON written by `ocr`
        #[arg(long, value_name = "FILE")]
        spec: Option<PathBuf>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, num_args = 1..)]
        topics: Vec<String>,

        #[arg(long, num_args = 1..)]
        vocab: Vec<String>,

        #[command(flatten)]
        knobs: GenerationArgs,

        #[arg(long, value_name = "FILE")]
        session: Option<PathBuf>,

        #[arg(long, value_name = "FILE")]
        docx: Option<PathBuf>,

        /// Also convert the DOCX to PDF with LibreOffice
        #[arg(long, requires = "docx")]
        pdf: bool,
    },

    /// Replace one question in a saved session
    Regen {
        #[arg(long, value_name = "FILE")]
        session: PathBuf,

        /// 1-based question number
        #[arg(long)]
        index: usize,

        #[arg(long)]
        feedback: Option<String>,

        #[arg(long, value_name = "FILE")]
        docx: Option<PathBuf>,

        #[arg(long, requires = "docx")]
        pdf: bool,
    },

    /// Write a saved session as a DOCX question sheet
    Export {
        #[arg(long, value_name = "FILE")]
        session: PathBuf,

        #[arg(long, value_name = "FILE")]
        docx: PathBuf,

        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// Also write a PDF beside the DOCX (needs LibreOffice)
        #[arg(long)]
        pdf: bool,
    },

    /// Inspect and maintain the prompts file
    Prompts {
        #[command(subcommand)]
        action: PromptsAction,
    },

    /// Check external tools, credentials and files
    Doctor,

    /// Check the release manifest for a newer version
    Update {
        #[arg(long, value_name = "DIR")]
        download: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum PromptsAction {
    Show,
    Check,
    SyncVersion,
}

#[derive(clap::Args)]
struct GenerationArgs {
    #[arg(long)]
    level: Option<CefrLevel>,

    #[arg(long)]
    tier: Option<CefrTier>,

    #[arg(long)]
    blooms: Option<BloomsLevel>,

    #[arg(long)]
    engagement: Option<EngagementLevel>,

    #[arg(long)]
    consistency: Option<TopicConsistency>,

    #[arg(long)]
    no_quality: bool,

    #[arg(long)]
    academic: bool,

    #[arg(long)]
    no_naturalness: bool,
}

impl GenerationArgs {
    fn apply(&self, mut options: GenerationOptions) -> GenerationOptions {
        if let Some(level) = self.level {
            options.level = level;
        }
        if let Some(tier) = self.tier {
            options.tier = tier;
        }
        if let Some(blooms) = self.blooms {
            options.blooms = blooms;
        }
        if let Some(engagement) = self.engagement {
            options.engagement = engagement;
        }
        if let Some(consistency) = self.consistency {
            options.topic_consistency = consistency;
        }
        if self.no_quality {
            options.quality_validation = false;
        }
        if self.academic {
            options.academic_background = true;
        }
        if self.no_naturalness {
            options.naturalness_check = false;
        }
        options
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    efl_cafe::utils::logging::init_logger(cli.color, cli.verbose);

    info!("{} {}", APP_NAME, APP_VERSION);
    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    match cli.command {
        Commands::Ocr {
            paths,
            output,
            pretty,
        } => {
            cmd_ocr(&config, &paths, output, pretty, cli.color).await?;
        }
        Commands::Generate {
            spec,
            title,
            topics,
            vocab,
            knobs,
            session,
            docx,
            pdf,
        } => {
            let unit = resolve_unit(spec.as_deref(), title, topics, vocab)?;
            let options = knobs.apply(config.generation.options());
            cmd_generate(&config, unit, options, session, docx, pdf).await?;
        }
        Commands::Regen {
            session,
            index,
            feedback,
            docx,
            pdf,
        } => {
            cmd_regen(&config, &session, index, feedback.as_deref(), docx, pdf).await?;
        }
        Commands::Export {
            session,
            docx,
            template,
            pdf,
        } => {
            cmd_export(&config, &session, &docx, template, pdf).await?;
        }
        Commands::Prompts { action } => {
            cmd_prompts(&config, action)?;
        }
        Commands::Doctor => {
            cmd_doctor(&config).await?;
        }
        Commands::Update { download } => {
            cmd_update(&config, download).await?;
        }
    }

    Ok(())
}

async fn cmd_ocr(
    config: &Config,
    paths: &[PathBuf],
    output: Option<PathBuf>,
    pretty: bool,
    colored: bool,
) -> Result<()> {
    let timer = OperationTimer::new("ocr");

    let sources = SourceScanner::new(config.pipeline.clone())
        .scan(paths)
        .context("Failed to scan input paths")?;
    if sources.is_empty() {
        println!("{}", format_warning("No images or PDFs found"));
        return Ok(());
    }

    let engine = OcrEngine::new(config.ocr.clone());
    if !engine.is_available().await {
        bail!(
            "Tesseract not found ({}). Install it or set ocr.tesseract_cmd",
            config.ocr.tesseract_cmd
        );
    }

    let recorder = DebugRecorder::from_config(&config.debug);
    let extractor = match GeminiClient::from_config(&config.gemini) {
        Ok(client) => TopicExtractor::new(Arc::new(client), recorder.clone()),
        Err(e) => {
            warn!("{}; using keyword topic fallback", e);
            TopicExtractor::offline()
        }
    };

    let pipeline = IngestPipeline::new(engine, extractor, recorder)
        .with_workers(config.pipeline.parallel_workers)
        .with_color(colored);
    let (outcomes, _stats) = pipeline.run(sources).await;

    let exporter = JsonExporter::new(output.unwrap_or_else(|| config.output.output_dir.join("units")))
        .context("Failed to create output directory")?;

    let mut written = Vec::new();
    let mut failed = Vec::new();
    for outcome in &outcomes {
        match outcome {
            IngestOutcome::Extracted { source, unit } => {
                let path = exporter
                    .export_unit(unit, pretty)
                    .with_context(|| format!("Failed to export {}", source.relative_path))?;
                println!(
                    "{}",
                    format_success(&format!(
                        "{} -> {} ({} topics)",
                        source.relative_path,
                        unit.unit.title,
                        unit.unit.topics.len()
                    ))
                );
                written.push(path);
            }
            IngestOutcome::Failed { source, error } => {
                println!(
                    "{}",
                    format_error(&format!("{}: {}", source.relative_path, error))
                );
                failed.push(source.path.clone());
            }
        }
    }

    exporter.write_manifest(&written, &failed)?;
    timer.finish();
    Ok(())
}

fn resolve_unit(
    spec: Option<&Path>,
    title: Option<String>,
    topics: Vec<String>,
    vocab: Vec<String>,
) -> Result<UnitSpec> {
    let mut unit = match spec {
        Some(path) if path.to_string_lossy().ends_with(".json") => {
            load_unit(path)
                .with_context(|| format!("Failed to read unit {}", path.display()))?
                .unit
        }
        Some(path) => {
            Validator::validate_file_path(path)?;
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Validator::validate_content_not_empty(&content)?;
            parse_topics_spec(&content).into_unit("")
        }
        None => UnitSpec::new("", Vec::new(), Vec::new()),
    };

    if let Some(title) = title {
        unit.title = title.trim().to_string();
    }
    if !topics.is_empty() {
        unit.topics = topics;
    }
    if !vocab.is_empty() {
        unit.vocab = vocab;
    }

    if !unit.has_title() {
        bail!("A unit title is required: pass --title or a topic sheet with a Unit line");
    }
    Ok(unit)
}

fn question_generator(config: &Config) -> Result<QuestionGenerator> {
    let client = GeminiClient::from_config(&config.gemini).context("Gemini is not configured")?;
    let model: Arc<dyn ContentModel> = Arc::new(client);

    match check_version(&config.prompts.path, APP_VERSION)? {
        VersionCheck::Mismatch { file, app } => println!(
            "{}",
            format_warning(&format!(
                "Prompts file is version {} but the application is {}; run `prompts sync-version`",
                file, app
            ))
        ),
        VersionCheck::Missing => println!(
            "{}",
            format_warning("Prompts file has no version header")
        ),
        VersionCheck::Match(_) | VersionCheck::NoFile => {}
    }
    let templates = PromptTemplates::load(&config.prompts.path)?;

    Ok(QuestionGenerator::new(
        model,
        templates,
        DebugRecorder::from_config(&config.debug),
    )
    .with_question_count(config.generation.question_count))
}

async fn cmd_generate(
    config: &Config,
    unit: UnitSpec,
    options: GenerationOptions,
    session_path: Option<PathBuf>,
    docx: Option<PathBuf>,
    pdf: bool,
) -> Result<()> {
    let timer = OperationTimer::new("generate");
    let generator = question_generator(config)?;

    info!("Generating questions for '{}' at {}", unit.title, options.level);
    let questions = generator
        .generate_batch(&unit, &options)
        .await
        .context("Question generation failed")?;
    let session = QuestionSession::new(unit, options, questions);

    let saved = match session_path {
        Some(path) => {
            save_session_to(&path, &session, true)?;
            path
        }
        None => JsonExporter::new(&config.output.output_dir)?.save_session(&session, true)?,
    };

    print_questions(&session);
    println!("{}", format_success(&format!("Session saved to {}", saved.display())));

    if let Some(docx) = docx {
        write_sheet(config, &session, &docx, None, pdf).await?;
    }
    timer.finish();
    Ok(())
}

async fn cmd_regen(
    config: &Config,
    session_path: &Path,
    number: usize,
    feedback: Option<&str>,
    docx: Option<PathBuf>,
    pdf: bool,
) -> Result<()> {
    let generator = question_generator(config)?;
    let log = FeedbackLog::new(&config.prompts.feedback_path);

    let regen = regenerate_question(&generator, session_path, number, feedback, &log)
        .await
        .with_context(|| {
            format!(
                "Failed to regenerate question {} in {}",
                number,
                session_path.display()
            )
        })?;

    println!("{} {}", format_info(&format!("{}. was:", regen.number)), regen.previous);
    println!("{}", format_success(&format!("{}. {}", regen.number, regen.replacement)));
    if let Some(key) = &regen.feedback_key {
        println!("{}", format_info(&format!("Feedback recorded as {}", key)));
    }

    if let Some(docx) = docx {
        write_sheet(config, &regen.session, &docx, None, pdf).await?;
    }
    Ok(())
}

async fn cmd_export(
    config: &Config,
    session_path: &Path,
    docx: &Path,
    template: Option<PathBuf>,
    pdf: bool,
) -> Result<()> {
    let session = load_session(session_path)
        .with_context(|| format!("Failed to load session {}", session_path.display()))?;
    write_sheet(config, &session, docx, template, pdf).await
}

async fn write_sheet(
    config: &Config,
    session: &QuestionSession,
    path: &Path,
    template: Option<PathBuf>,
    pdf: bool,
) -> Result<()> {
    let writer = DocxWriter::from_config(&config.output)
        .with_template(template.or_else(|| config.output.template_path.clone()));
    let converter = pdf.then(|| PdfConverter::from_config(&config.output));

    let sheet = export_session(session, path, &writer, converter.as_ref())
        .await
        .with_context(|| format!("Failed to export {}", path.display()))?;

    println!("{}", format_success(&format!("Wrote {}", sheet.docx.display())));
    if let Some(pdf) = &sheet.pdf {
        println!("{}", format_success(&format!("Wrote {}", pdf.display())));
    }
    Ok(())
}

fn print_questions(session: &QuestionSession) {
    println!(
        "\n{} ({})\n",
        session.unit.title,
        session.options.level.as_str()
    );
    for (idx, question) in session.questions.iter().enumerate() {
        println!("{}", format_question(idx + 1, &question.text, question.regenerated));
    }
    println!();
}

fn cmd_prompts(config: &Config, action: PromptsAction) -> Result<()> {
    let path = &config.prompts.path;

    match action {
        PromptsAction::Show => {
            let templates = PromptTemplates::load(path)?;
            println!("{}", format_info(&format!("Prompts file: {}", path.display())));
            println!("\n[batch]\n{}\n\n[single]\n{}", templates.batch, templates.single);

            let feedback = FeedbackLog::new(&config.prompts.feedback_path).entries()?;
            println!(
                "\n{}",
                format_info(&format!(
                    "{} feedback entr{} in {}",
                    feedback.len(),
                    if feedback.len() == 1 { "y" } else { "ies" },
                    config.prompts.feedback_path.display()
                ))
            );
            for entry in feedback.iter().rev().take(5) {
                println!("  {} | {}", entry.question, entry.reason);
            }
        }
        PromptsAction::Check => match check_version(path, APP_VERSION)? {
            VersionCheck::Match(v) => {
                println!("{}", format_success(&format!("Prompts version {} matches", v)))
            }
            VersionCheck::Mismatch { file, app } => println!(
                "{}",
                format_warning(&format!(
                    "Prompts version {} does not match application version {}",
                    file, app
                ))
            ),
            VersionCheck::Missing => {
                println!("{}", format_warning("Prompts file has no version header"))
            }
            VersionCheck::NoFile => println!(
                "{}",
                format_warning(&format!(
                    "{} not found; built-in templates are used",
                    path.display()
                ))
            ),
        },
        PromptsAction::SyncVersion => {
            let today = Local::now().date_naive();
            if path.exists() {
                let backup = sync_version(path, APP_VERSION, today)?;
                println!(
                    "{}",
                    format_success(&format!(
                        "Updated {} to {} (backup: {})",
                        path.display(),
                        APP_VERSION,
                        backup.display()
                    ))
                );
            } else {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, PromptTemplates::default_file_contents(APP_VERSION, today))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!(
                    "{}",
                    format_success(&format!("Created {} with built-in templates", path.display()))
                );
            }
        }
    }
    Ok(())
}

async fn cmd_doctor(config: &Config) -> Result<()> {
    let report = efl_cafe::utils::diagnose(config).await;
    println!("{}", report.format());

    if !report.is_usable() {
        bail!("One or more required components are unavailable");
    }
    Ok(())
}

async fn cmd_update(config: &Config, download: Option<PathBuf>) -> Result<()> {
    if !config.update.enabled {
        println!("{}", format_info("Update checks are disabled in configuration"));
        return Ok(());
    }

    let checker = UpdateChecker::from_config(&config.update, APP_VERSION)?;
    match checker
        .check(APP_VERSION)
        .await
        .context("Update check failed")?
    {
        UpdateStatus::UpToDate { current, latest } => {
            println!(
                "{}",
                format_success(&format!("Up to date ({}; latest {})", current, latest))
            );
        }
        UpdateStatus::Available(manifest) => {
            println!(
                "{}",
                format_info(&format!(
                    "Version {} is available (current {})",
                    manifest.version, APP_VERSION
                ))
            );
            if let Some(notes) = manifest.notes.as_deref().filter(|n| !n.trim().is_empty()) {
                println!("\n{}\n", notes.trim());
            }

            if let Some(dir) = download {
                let path = checker.download(&manifest, &dir).await?;
                println!("{}", format_success(&format!("Downloaded to {}", path.display())));
            }
        }
    }
    Ok(())
}
