//! Text extraction for uploaded documents.
//!
//! Extraction works on in-memory bytes, so uploads never touch the disk.

use std::path::Path;

use crate::error::{Error, Result};

/// MIME types accepted for upload.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
    "text/plain",
    "text/markdown",
];

/// File extensions accepted for upload and directory ingestion.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["pdf", "docx", "doc", "txt", "md", "markdown"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Word,
    Text,
    Markdown,
}

impl DocumentKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" | "doc" => Some(Self::Word),
            "txt" => Some(Self::Text),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        // Ignore parameters such as "; charset=utf-8".
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence {
            "application/pdf" => Some(Self::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            | "application/msword" => Some(Self::Word),
            "text/plain" => Some(Self::Text),
            "text/markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Work out the document kind from its filename, falling back to the
    /// declared content type.
    ///
    /// # Examples
    ///
    /// ```
    /// use docqa::extract::DocumentKind;
    ///
    /// assert_eq!(
    ///     DocumentKind::detect("report.PDF", None).unwrap(),
    ///     DocumentKind::Pdf
    /// );
    /// assert_eq!(
    ///     DocumentKind::detect("notes", Some("text/markdown")).unwrap(),
    ///     DocumentKind::Markdown
    /// );
    /// assert!(DocumentKind::detect("image.png", Some("image/png")).is_err());
    /// ```
    pub fn detect(filename: &str, content_type: Option<&str>) -> Result<Self> {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .or_else(|| content_type.and_then(Self::from_mime))
            .ok_or_else(|| Error::UnsupportedFileType(filename.to_string()))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Word => "word",
            Self::Text => "text",
            Self::Markdown => "markdown",
        }
    }
}

/// Extract trimmed plain text from a document's raw bytes.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String> {
    let text = match kind {
        DocumentKind::Text | DocumentKind::Markdown => {
            String::from_utf8_lossy(bytes).into_owned()
        }
        DocumentKind::Pdf => extract_pdf(bytes)?,
        DocumentKind::Word => extract_docx(bytes)?,
    };
    Ok(text.trim().to_string())
}

fn extract_pdf(bytes: &[u8]) -> Result<String> {
    // pdf-extract panics on some malformed files instead of returning Err.
    match std::panic::catch_unwind(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => {
            Err(Error::Extraction(format!("failed to process PDF: {e}")))
        }
        Err(_) => Err(Error::Extraction(
            "failed to process PDF: parser panicked on malformed input".into(),
        )),
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String> {
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    let docx = docx_rs::read_docx(bytes).map_err(|e| {
        Error::Extraction(format!("failed to process Word document: {e:?}"))
    })?;

    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(para) = child {
            for para_child in &para.children {
                if let ParagraphChild::Run(run) = para_child {
                    for run_child in &run.children {
                        if let RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }

    Ok(text)
}
