use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use citescan_core::config_file::{self, ConfigFile};
use citescan_ingest::{IngestError, SourceFile, read_source};
use citescan_parsing::{CitationExtractor, ParsingConfig, ParsingConfigBuilder};

mod output;

use output::{ColorMode, InspectedSentence};

/// Citation Scanner - List the author-year citations made near a keyword in .docx and .txt documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file (default: .citescan.toml over the platform config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the citations that appear near a keyword
    Extract {
        /// Keyword or phrase to search for (case-insensitive)
        #[arg(short, long)]
        keyword: String,

        /// One or more .docx or .txt files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Path to output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Sentences to scan on each side of a keyword sentence
        #[arg(long)]
        window: Option<usize>,

        /// Only match the keyword as a whole word
        #[arg(long)]
        whole_word: bool,
    },

    /// Print a document's cleaned text as numbered sentences with the citations found in each
    Inspect {
        /// Path to a .docx or .txt file
        file: PathBuf,

        /// Mark sentences containing this keyword
        #[arg(short, long)]
        keyword: Option<String>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => config_file::load_explicit(path)?,
        None => config_file::load_config(),
    };
    tracing::debug!(explicit = cli.config.is_some(), "configuration loaded");

    match cli.command {
        Command::Extract {
            keyword,
            files,
            json,
            output,
            no_color,
            window,
            whole_word,
        } => {
            let config = parsing_config(&file_config, window, whole_word)?;
            extract(&files, &keyword, &config, json, output, no_color)
        }
        Command::Inspect {
            file,
            keyword,
            no_color,
        } => {
            let config = parsing_config(&file_config, None, false)?;
            inspect(&file, keyword.as_deref(), config, no_color)
        }
    }
}

/// Log to stderr so stdout stays clean for `--json`. `RUST_LOG` overrides the
/// default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve configuration: CLI flags > config file > defaults.
fn parsing_config(
    file_config: &ConfigFile,
    window: Option<usize>,
    whole_word: bool,
) -> anyhow::Result<ParsingConfig> {
    let mut builder = file_config
        .extraction
        .as_ref()
        .map(ParsingConfigBuilder::from_file_config)
        .unwrap_or_default();
    if let Some(radius) = window {
        builder = builder.window_radius(radius);
    }
    if whole_word {
        builder = builder.whole_word(true);
    }
    builder
        .build()
        .context("invalid section_header_regex in config")
}

fn open_writer(output: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    })
}

fn extract(
    paths: &[PathBuf],
    keyword: &str,
    config: &ParsingConfig,
    json: bool,
    output: Option<PathBuf>,
    no_color: bool,
) -> anyhow::Result<()> {
    let color = ColorMode(!no_color && output.is_none() && !json);

    let files = read_inputs(paths, keyword)?;

    let report = match citescan_ingest::extract_from_files(&files, keyword, config) {
        Ok(report) => report,
        Err(IngestError::AllFilesFailed { skipped }) => {
            let mut stderr = std::io::stderr();
            output::print_file_reports(&mut stderr, &skipped, ColorMode(!no_color))?;
            anyhow::bail!("none of the {} files could be processed", skipped.len());
        }
        Err(e) => return Err(e.into()),
    };

    let mut writer = open_writer(output.as_deref())?;
    if json {
        serde_json::to_writer_pretty(&mut writer, &report)?;
        writeln!(writer)?;
    } else {
        output::print_report(&mut writer, &report, keyword, color)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read every input file. The keyword is checked first so an empty keyword
/// is reported even when a path is missing.
fn read_inputs(paths: &[PathBuf], keyword: &str) -> anyhow::Result<Vec<SourceFile>> {
    if keyword.trim().is_empty() {
        return Err(IngestError::EmptyKeyword.into());
    }
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.exists() {
            anyhow::bail!("File not found: {}", path.display());
        }
        files.push(read_source(path)?);
    }
    Ok(files)
}

fn inspect(
    path: &Path,
    keyword: Option<&str>,
    config: ParsingConfig,
    no_color: bool,
) -> anyhow::Result<()> {
    let color = ColorMode(!no_color);
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let file = read_source(path)?;
    let doc = citescan_ingest::decode(&file)
        .with_context(|| format!("cannot decode {}", file.name))?;

    let extractor = CitationExtractor::with_config(config);
    let keyword = keyword.map(|k| extractor.keyword(k)).transpose()?;
    let text = extractor.normalize(&doc)?;
    let sentences = extractor.segment_sentences(&text);

    let items: Vec<InspectedSentence<'_>> = sentences
        .iter()
        .map(|sentence| InspectedSentence {
            sentence,
            has_keyword: keyword.as_ref().is_some_and(|k| k.is_found_in(&sentence.text)),
            citations: extractor
                .match_citations(&sentence.text)
                .into_iter()
                .map(|c| c.raw_text)
                .collect(),
        })
        .collect();

    let mut stdout = std::io::stdout();
    output::print_sentences(&mut stdout, &file.name, &items, color)?;
    Ok(())
}
