use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Turn study documents into classified knowledge entries.
///
/// Text is segmented into chunks, each chunk is classified by the configured
/// language model, and the resulting entries are written as JSON lines.
#[derive(Parser, Debug)]
#[command(name = "studybase", version, about = "Segment and classify study material")]
pub struct CliArgs {
    /// Pipeline config file (default: ~/.config/studybase/pipeline.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract, segment and classify a document (.pdf, .txt, .md)
    Ingest {
        file: PathBuf,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Segment a document and print its chunks without classifying
    Segment {
        file: PathBuf,
        /// Print chunks as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify the bundled sample material
    Sample {
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Where to write entries as JSON lines (default: <document>.entries.jsonl)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// LLM provider: openai, anthropic, gemini or ollama
    #[arg(long)]
    pub provider: Option<String>,

    /// Chunks classified concurrently per wave
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Print the upload summary as JSON
    #[arg(long)]
    pub json: bool,
}
