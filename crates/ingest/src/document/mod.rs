mod pdf;
mod txt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("PDF extraction failed: {0}")]
    PdfError(String),
}

/// A page of extracted text.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// 1-based page number (for PDFs). For TXT/MD, always 1.
    pub page_number: usize,
    pub text: String,
}

/// Result of extracting text from a document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Original filename.
    pub filename: String,
    /// File type: "pdf", "txt", "md"
    pub file_type: String,
    pub pages: Vec<PageContent>,
}

impl ExtractedDocument {
    /// All pages joined by a single newline, the way the segmenter expects
    /// extractor output.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Total character count across all pages.
    pub fn total_chars(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }

    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.text.trim().is_empty())
    }
}

/// Extract text from file bytes based on file type.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<ExtractedDocument, ExtractionError> {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
    let file_type = ext.as_str();

    let pages = match file_type {
        "pdf" => pdf::extract_pdf(bytes)?,
        "txt" | "text" | "md" | "markdown" => txt::extract_txt(bytes),
        other => return Err(ExtractionError::UnsupportedType(other.to_string())),
    };

    tracing::debug!(filename, file_type, pages = pages.len(), "extracted document text");

    Ok(ExtractedDocument {
        filename: filename.to_string(),
        file_type: file_type.to_string(),
        pages,
    })
}
