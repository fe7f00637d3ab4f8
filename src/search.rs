use serde::Serialize;

use crate::{
    document_store::{DocumentStore, StoredDocument},
    doc_id::DocumentId,
    error::Result,
    similarity::{RankedDocument, SimilarityRanker},
    text_util,
};

/// Parameters for a document search.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    pub count: usize,
    pub min_score: f32,
    pub all: bool,
}

impl SearchParams {
    pub fn new(query: &str, count: usize) -> Self {
        Self {
            query: query.to_string(),
            count,
            min_score: 0.0,
            all: false,
        }
    }
}

/// A ranked document returned by [`execute_search`].
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub rank: usize,
    pub score: f32,
    pub document: StoredDocument,
}

/// Execute the search pipeline.
///
/// 1. Load every stored document, newest first (this order breaks ties)
/// 2. Rank by Jaccard similarity against the query
/// 3. Filter by `min_score`
/// 4. Limit to `count` results unless `all` is set
pub fn execute_search(
    params: &SearchParams,
    store: &DocumentStore,
) -> Result<Vec<SearchHit>> {
    let documents = store.list()?;
    if documents.is_empty() {
        return Ok(vec![]);
    }

    // Stage 1-2: score every document
    let corpus: Vec<(usize, &str)> = documents
        .iter()
        .enumerate()
        .map(|(i, d)| (i, d.content.as_str()))
        .collect();
    let ranked = SimilarityRanker::default().rank_all(&params.query, &corpus);

    // Stage 3-4: threshold, then limit
    let limit = if params.all { ranked.len() } else { params.count };
    let hits: Vec<SearchHit> = ranked
        .into_iter()
        .filter(|r| r.score >= params.min_score)
        .take(limit)
        .enumerate()
        .map(|(i, RankedDocument { id, score })| SearchHit {
            rank: i + 1,
            score,
            document: documents[id].clone(),
        })
        .collect();

    tracing::debug!(
        query = %params.query,
        candidates = documents.len(),
        returned = hits.len(),
        "search complete"
    );

    Ok(hits)
}

/// Format results for human-readable terminal output, with a snippet of
/// each document around the query.
pub fn format_human(results: &[SearchHit], query: &str) {
    if results.is_empty() {
        println!("No results found.");
        return;
    }

    for r in results {
        let short = DocumentId::parse(&r.document.id)
            .map(|id| id.short())
            .unwrap_or_else(|_| r.document.id.clone());
        println!(
            "{:>3}. [{:.3}] {} #{}",
            r.rank, r.score, r.document.filename, short
        );
        if let Some(snippet) =
            text_util::snippet_around(&r.document.content, query)
        {
            for line in snippet.numbered().lines() {
                println!("     {line}");
            }
        }
    }
    println!("\n{} result(s)", results.len());
}

#[derive(Serialize)]
struct JsonHit<'a> {
    rank: usize,
    score: f32,
    id: &'a str,
    filename: &'a str,
    summary: &'a str,
    uploaded_at: String,
}

#[derive(Serialize)]
struct JsonResults<'a> {
    query: &'a str,
    result_count: usize,
    results: Vec<JsonHit<'a>>,
}

/// Render results as the JSON document printed by `search --json`.
pub fn to_json(results: &[SearchHit], query: &str) -> Result<String> {
    let payload = JsonResults {
        query,
        result_count: results.len(),
        results: results
            .iter()
            .map(|r| JsonHit {
                rank: r.rank,
                score: r.score,
                id: &r.document.id,
                filename: &r.document.filename,
                summary: &r.document.summary,
                uploaded_at: r.document.uploaded_at.to_rfc3339(),
            })
            .collect(),
    };
    Ok(serde_json::to_string(&payload)?)
}

/// Format results as JSON output.
pub fn format_json(results: &[SearchHit], query: &str) -> Result<()> {
    println!("{}", to_json(results, query)?);
    Ok(())
}

/// Format results as bare filenames (one per line).
pub fn format_files(results: &[SearchHit]) {
    for r in results {
        println!("{}", r.document.filename);
    }
}
