use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use studybase_core::{TextChunk, UploadSummary};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const HEADER: Color = Color::Magenta;
    const LABEL: Color = Color::Cyan;
    const COUNT: Color = Color::Green;
    const WARN: Color = Color::Yellow;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
}

/// Human-readable output for the pipeline commands.
#[derive(Debug, Default)]
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the result of a classification run.
    pub fn print_summary(&self, summary: &UploadSummary, out: &Path) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(&summary.doc_name),
            ResetColor,
            SetForegroundColor(Colors::DIM),
            Print(format!("  ({})\n", summary.upload_id)),
            ResetColor,
            Print(format!(
                "chunks: {}  persisted: {}  templates dropped: {}\n",
                summary.total_chunks, summary.persisted, summary.templates_dropped
            )),
        )?;

        if summary.parse_errors > 0 {
            execute!(
                stdout,
                SetForegroundColor(Colors::WARN),
                Print(format!("unclassified (parse errors): {}\n", summary.parse_errors)),
                ResetColor,
            )?;
        }

        for (kind, count) in &summary.by_type {
            execute!(
                stdout,
                SetForegroundColor(Colors::LABEL),
                Print(format!("  {kind:<12}")),
                SetForegroundColor(Colors::COUNT),
                Print(format!("{count}\n")),
                ResetColor,
            )?;
        }

        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("entries written to {}\n", out.display())),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print segmented chunks, one numbered block each.
    pub fn print_chunks(&self, chunks: &[TextChunk]) -> Result<()> {
        let mut stdout = io::stdout();
        for (i, chunk) in chunks.iter().enumerate() {
            execute!(
                stdout,
                SetForegroundColor(Colors::LABEL),
                Print(format!("[{}] ", i + 1)),
                SetForegroundColor(Colors::DIM),
                Print(format!("{} chars\n", chunk.char_len)),
                ResetColor,
                Print(format!("{}\n\n", chunk.clean)),
            )?;
        }
        execute!(
            stdout,
            SetForegroundColor(Colors::COUNT),
            Print(format!("{} chunks\n", chunks.len())),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print a serializable value as pretty JSON.
    pub fn print_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        let mut stdout = io::stdout();
        serde_json::to_writer_pretty(&mut stdout, value)?;
        writeln!(stdout)?;
        Ok(())
    }

    /// Print an error message in red to stderr.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stderr = io::stderr();
        execute!(
            stderr,
            SetForegroundColor(Colors::ERROR),
            Print(format!("error: {msg}\n")),
            ResetColor,
        )?;
        Ok(())
    }
}
