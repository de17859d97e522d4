use super::{ExtractionError, PageContent};

pub fn extract_pdf(bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::PdfError(e.to_string()))?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        // Scanned/image-only PDFs come back empty; the caller reports it.
        tracing::warn!("PDF contained no extractable text");
        return Ok(Vec::new());
    }

    // pdf-extract separates pages with form feeds when it can.
    let pages: Vec<PageContent> = if text.contains('\x0C') {
        text.split('\x0C')
            .enumerate()
            .filter(|(_, page_text)| !page_text.trim().is_empty())
            .map(|(i, page_text)| PageContent {
                page_number: i + 1,
                text: page_text.trim().to_string(),
            })
            .collect()
    } else {
        vec![PageContent {
            page_number: 1,
            text: trimmed.to_string(),
        }]
    };

    Ok(pages)
}

