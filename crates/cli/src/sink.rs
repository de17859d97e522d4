use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use studybase_core::{ProcessedEntry, UploadSummary};
use tracing::info;

/// Final owner of a run's entries. Decides what is kept.
pub trait EntrySink {
    /// Store `entries` under `summary.upload_id`, returning how many were kept.
    fn persist(&mut self, summary: &UploadSummary, entries: &[ProcessedEntry]) -> Result<usize>;
}

/// One stored line: the entry plus the upload it came from.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry<'a> {
    upload_id: &'a str,
    doc_name: &'a str,
    #[serde(flatten)]
    entry: &'a ProcessedEntry,
}

/// Writes non-template entries as JSON lines.
pub struct JsonlSink<W: Write> {
    writer: W,
}

impl JsonlSink<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create output dir: {}", parent.display()))?;
        }
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EntrySink for JsonlSink<W> {
    fn persist(&mut self, summary: &UploadSummary, entries: &[ProcessedEntry]) -> Result<usize> {
        let mut kept = 0;
        for entry in entries.iter().filter(|e| !e.is_template) {
            let line = StoredEntry {
                upload_id: &summary.upload_id,
                doc_name: &summary.doc_name,
                entry,
            };
            serde_json::to_writer(&mut self.writer, &line)?;
            self.writer.write_all(b"\n")?;
            kept += 1;
        }
        self.writer.flush()?;

        info!(upload_id = %summary.upload_id, kept, dropped = entries.len() - kept, "entries persisted");
        Ok(kept)
    }
}

/// `notes.pdf` -> `notes.entries.jsonl` in the working directory.
pub fn default_output_path(doc_name: &str) -> PathBuf {
    let stem = Path::new(doc_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("upload");
    PathBuf::from(format!("{stem}.entries.jsonl"))
}
