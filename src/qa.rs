//! Question answering over the stored documents.

use serde::Serialize;

use crate::{
    chunking::{self, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE},
    document_store::DocumentStore,
    error::{Error, Result},
    search::{self, SearchHit, SearchParams},
    similarity::SimilarityRanker,
    summarizer,
    text_util::{self, SOURCE_PREVIEW_CHARS},
};

/// Answer given when the search comes back empty.
pub const NO_RELEVANT_DOCUMENTS: &str = "I couldn't find relevant information in the uploaded documents to answer your question.";

/// A document that contributed to an answer.
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub id: String,
    pub filename: String,
    /// The start of the document text.
    pub content: String,
    /// The chunk of the document closest to the question.
    pub excerpt: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<Source>,
}

/// Answer `question` from the `limit` most similar documents.
pub fn answer(
    store: &DocumentStore,
    question: &str,
    limit: usize,
) -> Result<Answer> {
    let question = question.trim();
    if question.is_empty() {
        return Err(Error::InvalidInput("Question is required".into()));
    }
    if store.is_empty()? {
        return Err(Error::NoDocuments);
    }

    let hits = search::execute_search(&SearchParams::new(question, limit), store)?;
    if hits.is_empty() {
        return Ok(Answer {
            answer: NO_RELEVANT_DOCUMENTS.to_string(),
            sources: vec![],
        });
    }

    let context = hits
        .iter()
        .map(|h| h.document.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    let answer = summarizer::answer_question(question, &context);

    let sources = hits.iter().map(|hit| to_source(hit, question)).collect();

    tracing::info!(
        question,
        sources = hits.len(),
        "answered question"
    );

    Ok(Answer { answer, sources })
}

fn to_source(hit: &SearchHit, question: &str) -> Source {
    let doc = &hit.document;
    Source {
        id: doc.id.clone(),
        filename: doc.filename.clone(),
        content: text_util::preview(&doc.content, SOURCE_PREVIEW_CHARS),
        excerpt: best_excerpt(&doc.content, question),
        similarity: hit.score,
    }
}

/// The chunk of `content` that best matches `question`.
///
/// Falls back to the first chunk when nothing overlaps.
pub fn best_excerpt(content: &str, question: &str) -> String {
    let chunks = chunking::split_into_chunks(
        content,
        DEFAULT_CHUNK_SIZE,
        DEFAULT_CHUNK_OVERLAP,
    );
    let candidates: Vec<(usize, &str)> = chunks
        .iter()
        .map(|c| (c.index, c.text.as_str()))
        .collect();

    SimilarityRanker::new(1)
        .rank(question, &candidates)
        .first()
        .map(|best| chunks[best.id].text.clone())
        .unwrap_or_default()
}
