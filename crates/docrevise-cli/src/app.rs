//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use docrevise_core::{
    extract_runs, uniformize, ChangeJournal, MediaCensus, ParagraphSource, PassReport, Reviser,
    StyledParagraph, TextTransformer, UniformizeReport,
};
use docrevise_ooxml::{OoxmlArchive, OoxmlParagraph, PackageKind, WordDocument};
use docrevise_pptx::Presentation;

use crate::changelog::{log_path, JsonLinesJournal, LogHeader, TextJournal};
use crate::config::{JournalFormat, Settings};
use crate::service::ChatCompletionsClient;

/// Characters of paragraph text shown by `inspect`
const PREVIEW_CHARS: usize = 60;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "docrevise")]
#[command(author, version, long_about = None)]
#[command(about = "AI-assisted revision of Word and PowerPoint files")]
struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite every paragraph through the text service, keeping formatting
    Revise {
        /// Input .docx or .pptx file
        input: PathBuf,

        /// Instruction sent with each paragraph
        #[arg(short, long)]
        instruction: String,

        /// Output file (default: <stem>_revised.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Document language hint
        #[arg(short, long)]
        language: Option<String>,

        /// Process without writing the document or the change log
        #[arg(long)]
        dry_run: bool,
    },

    /// List paragraphs, their runs and embedded media
    Inspect {
        /// Input .docx or .pptx file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Normalise font family and body font size
    Uniformize {
        /// Input .docx or .pptx file
        input: PathBuf,

        /// Output file (default: <stem>_uniformized.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Revise {
            input,
            instruction,
            output,
            config,
            language,
            dry_run,
        } => {
            let mut settings = Settings::load(config.as_deref())?;
            if language.is_some() {
                settings.revision.language = language;
            }
            let client = ChatCompletionsClient::from_settings(&settings.service)
                .context("Failed to configure the text service")?;
            info!(model = client.model(), "text service ready");
            revise_command(
                &input,
                output.as_deref(),
                &instruction,
                &settings,
                client,
                dry_run,
            )?;
        }
        Commands::Inspect { input, format } => {
            let report = inspect_command(&input)?;
            print_inspection(&report, format)?;
        }
        Commands::Uniformize {
            input,
            output,
            config,
        } => {
            let settings = Settings::load(config.as_deref())?;
            uniformize_command(&input, output.as_deref(), &settings)?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` applies when set; `--verbose` forces debug output.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // a subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// An opened Word document or slide deck
#[derive(Debug)]
pub enum OfficeDocument {
    Word(WordDocument),
    Slides(Presentation),
}

impl OfficeDocument {
    /// Open a `.docx` or `.pptx`, detected from the package contents
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Input file not found: {}", path.display());
        }
        let archive = OoxmlArchive::open(path)
            .with_context(|| format!("Failed to open package: {}", path.display()))?;

        match archive.kind() {
            Some(PackageKind::Word) => Ok(Self::Word(
                WordDocument::from_archive(archive)
                    .with_context(|| format!("Failed to read Word document: {}", path.display()))?,
            )),
            Some(PackageKind::Presentation) => Ok(Self::Slides(
                Presentation::from_archive(archive)
                    .with_context(|| format!("Failed to read presentation: {}", path.display()))?,
            )),
            None => bail!(
                "Unsupported file: {} (expected a .docx or .pptx package)",
                path.display()
            ),
        }
    }

    /// Short name of the format
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Word(_) => "docx",
            Self::Slides(_) => "pptx",
        }
    }

    /// Save the package
    pub fn save(&mut self, path: &Path) -> Result<()> {
        match self {
            Self::Word(doc) => doc.save(path)?,
            Self::Slides(deck) => deck.save(path)?,
        }
        Ok(())
    }
}

impl ParagraphSource for OfficeDocument {
    type Paragraph<'a> = OoxmlParagraph<'a>;

    fn paragraph_count(&self) -> usize {
        match self {
            Self::Word(doc) => doc.paragraph_count(),
            Self::Slides(deck) => deck.paragraph_count(),
        }
    }

    fn paragraph_mut(&mut self, index: usize) -> Option<Self::Paragraph<'_>> {
        match self {
            Self::Word(doc) => doc.paragraph_mut(index),
            Self::Slides(deck) => deck.paragraph_mut(index),
        }
    }
}

/// `<dir>/<stem>_<suffix>.<ext>` next to the input
pub fn derived_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{}_{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}_{}", stem, suffix),
    };
    input.with_file_name(name)
}

fn open_journal(
    settings: &Settings,
    input: &Path,
    paragraph_count: usize,
) -> Result<(PathBuf, Box<dyn ChangeJournal>)> {
    let path = log_path(
        &settings.journal.directory,
        input,
        settings.journal.format,
        Local::now().date_naive(),
    );
    let journal: Box<dyn ChangeJournal> = match settings.journal.format {
        JournalFormat::Text => {
            let header = LogHeader {
                document: input
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                paragraph_count,
                language: settings.revision.language.clone(),
                started: Local::now(),
            };
            Box::new(
                TextJournal::open(&path, &header)
                    .with_context(|| format!("Failed to open change log: {}", path.display()))?,
            )
        }
        JournalFormat::Json => Box::new(
            JsonLinesJournal::open(&path)
                .with_context(|| format!("Failed to open change log: {}", path.display()))?,
        ),
    };
    Ok((path, journal))
}

/// Execute the revise command with any text service
pub fn revise_command<T: TextTransformer>(
    input: &Path,
    output: Option<&Path>,
    instruction: &str,
    settings: &Settings,
    transformer: T,
    dry_run: bool,
) -> Result<PassReport> {
    if instruction.trim().is_empty() {
        bail!("The instruction must not be empty");
    }

    let mut document = OfficeDocument::open(input)?;
    let paragraph_count = document.paragraph_count();
    println!("docrevise v{}", crate::VERSION);
    println!(
        "Revising: {} ({} paragraphs)",
        input.display(),
        paragraph_count
    );

    let mut journal = match (settings.journal.enabled, dry_run) {
        (true, false) => {
            let (path, journal) = open_journal(settings, input, paragraph_count)?;
            println!("  Change log: {}", path.display());
            Some(journal)
        }
        _ => None,
    };

    let mut reviser = Reviser::new(transformer).with_options(settings.revision.to_options());
    let report = reviser.run(
        &mut document,
        instruction,
        journal.as_deref_mut().map(|j| j as &mut dyn ChangeJournal),
    );

    print_pass_summary(&report);

    if dry_run {
        println!("Dry run: no file written");
        return Ok(report);
    }

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => derived_output(input, "revised"),
    };
    document
        .save(&output_path)
        .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;
    println!("  Created: {}", output_path.display());

    Ok(report)
}

fn print_pass_summary(report: &PassReport) {
    let counts = report.counts();
    println!();
    println!("Paragraphs:");
    println!("  modified:  {}", counts.modified);
    println!("  unchanged: {}", counts.unchanged);
    println!("  skipped:   {}", counts.skipped);
    println!("  restored:  {}", counts.restored);
    println!("  failed:    {}", counts.failed);
    if report.cancelled {
        println!("  (pass cancelled)");
    }

    let verification = &report.verification;
    println!();
    println!("Media verification:");
    println!("  before: {}", verification.initial_media_count);
    println!("  after:  {}", verification.final_media_count);
    if verification.paragraphs_restored.is_empty() {
        println!("  no paragraph restored");
    } else {
        let numbers: Vec<String> = verification
            .paragraphs_restored
            .iter()
            .map(|i| (i + 1).to_string())
            .collect();
        println!("  restored paragraphs: {}", numbers.join(", "));
    }
    if verification.is_intact() {
        println!("  OK: all media preserved");
    } else {
        println!("  WARNING: media count decreased");
    }
}

/// One paragraph as listed by `inspect`
#[derive(Debug, Clone, Serialize)]
pub struct ParagraphInfo {
    /// One-based paragraph number
    pub number: usize,
    pub preview: String,
    pub characters: usize,
    /// Style spans of the paragraph text
    pub spans: usize,
    pub media: usize,
    pub heading: bool,
}

/// Result of `inspect`
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub document: String,
    pub format: &'static str,
    pub paragraphs: Vec<ParagraphInfo>,
    pub media: MediaCensus,
}

/// Execute the inspect command
pub fn inspect_command(input: &Path) -> Result<Inspection> {
    let mut document = OfficeDocument::open(input)?;
    let media = document.media_census();

    let mut paragraphs = Vec::new();
    for index in 0..document.paragraph_count() {
        let Some(paragraph) = document.paragraph_mut(index) else {
            continue;
        };
        let (text, spans) = extract_runs(&paragraph.runs());
        let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
        if text.chars().count() > PREVIEW_CHARS {
            preview.push_str("...");
        }
        paragraphs.push(ParagraphInfo {
            number: index + 1,
            preview,
            characters: text.chars().count(),
            spans: spans.len(),
            media: paragraph.media_count(),
            heading: paragraph.is_heading(),
        });
    }

    Ok(Inspection {
        document: input.display().to_string(),
        format: document.kind_name(),
        paragraphs,
        media,
    })
}

fn print_inspection(report: &Inspection, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("{} ({})", report.document, report.format);
            for p in &report.paragraphs {
                println!(
                    "  {:>4}  {}{:>3} spans {:>2} media  {}",
                    p.number,
                    if p.heading { "H " } else { "  " },
                    p.spans,
                    p.media,
                    p.preview.replace('\n', " ")
                );
            }
            let with_media: Vec<String> = report
                .media
                .paragraphs
                .iter()
                .map(|i| (i + 1).to_string())
                .collect();
            println!();
            println!("Paragraphs: {}", report.paragraphs.len());
            println!(
                "Media: {} in paragraphs [{}]",
                report.media.total,
                with_media.join(", ")
            );
        }
    }
    Ok(())
}

/// Execute the uniformize command
pub fn uniformize_command(
    input: &Path,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<UniformizeReport> {
    let options = settings.uniformize.to_options()?;
    let mut document = OfficeDocument::open(input)?;
    println!("docrevise v{}", crate::VERSION);
    println!("Uniformizing: {}", input.display());

    let report = uniformize(&mut document, &options);
    println!(
        "  Target font: {}",
        report.target_font.as_deref().unwrap_or("(none found)")
    );
    match report.target_size {
        Some(size) => println!("  Target size: {}pt", size.points()),
        None => println!("  Target size: (none found)"),
    }
    println!(
        "  Runs changed: {} ({} font, {} size, {} emphasis kept)",
        report.runs_changed, report.font_changes, report.size_changes, report.preserved_emphasis
    );

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => derived_output(input, "uniformized"),
    };
    document
        .save(&output_path)
        .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;
    println!("  Created: {}", output_path.display());

    Ok(report)
}
