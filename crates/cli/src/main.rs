mod cli;
mod config;
mod sink;
mod terminal;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};

use studybase_core::{upload_id, Config, UploadSummary};
use studybase_ingest::{extract_text, segment_text, SegmentConfig};
use studybase_llm::Classifier;

use crate::cli::{CliArgs, Command, RunArgs};
use crate::config::PipelineFile;
use crate::sink::{default_output_path, EntrySink, JsonlSink};
use crate::terminal::Terminal;

const SAMPLE_NAME: &str = "Sample: Cell Biology Study Notes";
const SAMPLE_MATERIAL: &str = include_str!("../sample/study-notes.md");
const SAMPLE_OUT: &str = "sample.entries.jsonl";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let terminal = Terminal::new();

    studybase_core::config::load_dotenv();
    let mut config = Config::from_env();
    PipelineFile::load(args.config.as_deref())
        .context("failed to load pipeline configuration")?
        .apply(&mut config);

    let result = match args.command {
        Command::Segment { file, json } => segment(&config, &terminal, &file, json),
        Command::Ingest { file, run } => match read_document(&file) {
            Ok((doc_name, text)) => ingest(config, &terminal, &doc_name, &text, run).await,
            Err(e) => Err(e),
        },
        Command::Sample { mut run } => {
            run.out.get_or_insert_with(|| PathBuf::from(SAMPLE_OUT));
            ingest(config, &terminal, SAMPLE_NAME, SAMPLE_MATERIAL, run).await
        }
    };

    if let Err(e) = result {
        terminal.print_error(&format!("{e:#}"))?;
        std::process::exit(1);
    }
    Ok(())
}

fn read_document(path: &Path) -> Result<(String, String)> {
    let doc_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("document path has no file name")?
        .to_string();
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let doc = extract_text(&bytes, &doc_name).with_context(|| format!("failed to extract text from {doc_name}"))?;
    if doc.is_blank() {
        bail!("{doc_name} has no extractable text (scanned or image-only?)");
    }
    info!(doc = %doc_name, pages = doc.pages.len(), chars = doc.total_chars(), "document extracted");
    Ok((doc_name, doc.full_text()))
}

fn segment(config: &Config, terminal: &Terminal, file: &Path, json: bool) -> Result<()> {
    let (doc_name, text) = read_document(file)?;
    let segment_config = SegmentConfig::from_pipeline(&config.pipeline).context("invalid header pattern")?;
    let chunks = segment_text(&text, &segment_config);

    if json {
        terminal.print_json(&chunks)?;
    } else {
        terminal.print_chunks(&chunks)?;
    }
    if chunks.is_empty() {
        bail!("no classifiable text found in {doc_name}");
    }
    Ok(())
}

async fn ingest(mut config: Config, terminal: &Terminal, doc_name: &str, text: &str, run: RunArgs) -> Result<()> {
    if let Some(provider) = run.provider {
        config.llm.provider = provider;
    }
    if let Some(batch_size) = run.batch_size {
        config.pipeline.batch_size = batch_size;
    }
    config.log_summary();
    debug!(config = %config.redacted_summary(), "effective configuration");

    let segment_config = SegmentConfig::from_pipeline(&config.pipeline).context("invalid header pattern")?;
    let chunks = segment_text(text, &segment_config);
    if chunks.is_empty() {
        bail!("no classifiable text found in {doc_name}");
    }

    let classifier = Classifier::from_config(&config).context("failed to set up classifier")?;
    let entries = classifier.classify_all(&chunks).await;

    let summary = UploadSummary::from_entries(upload_id(), doc_name, chunks.len(), &entries);
    let out: PathBuf = run.out.unwrap_or_else(|| default_output_path(doc_name));
    let mut sink = JsonlSink::create(&out)?;
    sink.persist(&summary, &entries)?;

    if run.json {
        terminal.print_json(&summary)?;
    } else {
        terminal.print_summary(&summary, &out)?;
    }
    Ok(())
}
