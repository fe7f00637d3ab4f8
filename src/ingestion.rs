use rayon::prelude::*;
use serde::Serialize;

use crate::{
    document_store::{DocumentStore, StoredDocument},
    error::{Error, Result},
    extract::{self, DocumentKind},
    summarizer,
    walker::DiscoveredFile,
};

/// Turn raw bytes into a summarized document ready to store.
///
/// Fails with [`Error::EmptyDocument`] if no text could be extracted.
pub fn prepare_document(
    filename: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<StoredDocument> {
    let kind = DocumentKind::detect(filename, content_type)?;
    let text = extract::extract_text(kind, bytes)?;
    if text.is_empty() {
        return Err(Error::EmptyDocument(filename.to_string()));
    }

    let summary = summarizer::generate_summary(&text);
    tracing::debug!(
        filename,
        kind = kind.label(),
        chars = text.chars().count(),
        "extracted document text"
    );
    Ok(StoredDocument::new(filename, text, summary))
}

/// Extract, summarize, and store one uploaded document.
pub fn ingest_bytes(
    store: &DocumentStore,
    filename: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<StoredDocument> {
    let doc = prepare_document(filename, content_type, bytes)?;
    store.insert(&doc)?;
    tracing::info!(id = %doc.id, filename, "stored document");
    Ok(doc)
}

/// Outcome of ingesting one file from disk.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IngestReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Ingest a batch of discovered files into the document store.
///
/// Files are read and extracted in parallel, then stored one at a time in
/// discovery order. A file that cannot be read or extracted is reported
/// and skipped. Storage errors abort the batch.
pub fn ingest_files(
    store: &DocumentStore,
    files: &[DiscoveredFile],
) -> Result<Vec<IngestReport>> {
    let prepared: Vec<_> = files
        .par_iter()
        .map(|file| {
            let path = file.relative_path.to_string_lossy().to_string();
            let doc = std::fs::read(&file.absolute_path)
                .map_err(Error::from)
                .and_then(|bytes| {
                    prepare_document(&file.file_name(), None, &bytes)
                });
            (path, doc)
        })
        .collect();

    let mut reports = Vec::with_capacity(prepared.len());
    for (path, doc) in prepared {
        match doc {
            Ok(doc) => {
                store.insert(&doc)?;
                tracing::info!(id = %doc.id, path = %path, "stored document");
                reports.push(IngestReport {
                    path,
                    id: Some(doc.id),
                    summary: Some(doc.summary),
                    error: None,
                });
            }
            Err(e) => {
                tracing::warn!(path = %path, "skipping file: {e}");
                reports.push(IngestReport {
                    path,
                    id: None,
                    summary: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    Ok(reports)
}
