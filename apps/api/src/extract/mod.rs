//! Document text extraction: uploaded résumé bytes → plain text.
//!
//! PDF goes through `pdf-extract` on the blocking pool, DOCX through the zip
//! archive's `word/document.xml`, and anything that decodes as UTF-8 is taken
//! as plain text.

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

pub mod docx;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Could not read DOCX: {0}")]
    Docx(String),

    #[error("No text could be extracted from the uploaded file")]
    EmptyDocument,
}

/// A file as received from the upload form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
    /// Unknown type; accepted only if the bytes are valid UTF-8.
    Unknown,
}

impl DocumentFormat {
    /// Classifies by MIME type first, then by file extension.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Self {
        let mime = content_type.unwrap_or_default().to_ascii_lowercase();
        let name = file_name.to_ascii_lowercase();

        if mime == "application/pdf" || name.ends_with(".pdf") {
            DocumentFormat::Pdf
        } else if mime.contains("wordprocessingml") || name.ends_with(".docx") {
            DocumentFormat::Docx
        } else if mime.starts_with("text/") || name.ends_with(".txt") || name.ends_with(".md") {
            DocumentFormat::PlainText
        } else {
            DocumentFormat::Unknown
        }
    }
}

/// Extracts plain text from an uploaded résumé.
pub async fn extract_text(file: &UploadedFile) -> Result<String, ExtractError> {
    let format = DocumentFormat::detect(&file.file_name, file.content_type.as_deref());
    debug!(file = %file.file_name, ?format, bytes = file.bytes.len(), "Extracting résumé text");

    let text = match format {
        DocumentFormat::Pdf => extract_pdf(file.bytes.clone()).await?,
        DocumentFormat::Docx => docx::extract_docx_text(&file.bytes)?,
        DocumentFormat::PlainText => String::from_utf8_lossy(&file.bytes).into_owned(),
        DocumentFormat::Unknown => String::from_utf8(file.bytes.to_vec()).map_err(|_| {
            ExtractError::UnsupportedFormat(
                file.content_type
                    .clone()
                    .unwrap_or_else(|| file.file_name.clone()),
            )
        })?,
    };

    if text.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }

    info!(file = %file.file_name, chars = text.len(), "Extracted résumé text");
    Ok(text)
}

/// PDF parsing is CPU-bound; keep it off the async executor.
async fn extract_pdf(bytes: Bytes) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| ExtractError::Pdf(format!("extraction task failed: {e}")))?
        .map_err(|e| ExtractError::Pdf(e.to_string()))
}
