//! docqa - upload documents, read quick summaries, and ask questions about
//! them.
//!
//! Text is pulled out of PDF, Word, markdown, and plain text files, summarized
//! by word frequency, and kept in a [redb](https://github.com/cberner/redb)
//! store. Questions are answered by ranking documents on word overlap
//! (Jaccard similarity) and quoting the sentences that mention the
//! question's keywords. The same operations are served over HTTP by
//! [`server`].
//!
//! # Quick start
//!
//! ```no_run
//! use docqa::{DataDir, DocumentStore, ingestion, qa};
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//! let store = DocumentStore::open(&data_dir.documents_db()).unwrap();
//!
//! ingestion::ingest_bytes(
//!     &store,
//!     "notes.txt",
//!     Some("text/plain"),
//!     b"The launch is on Friday. Marketing owns the budget.",
//! )
//! .unwrap();
//!
//! let answer = qa::answer(&store, "When is the launch?", 3).unwrap();
//! println!("{}", answer.answer);
//! for source in &answer.sources {
//!     println!("  {} ({:.3})", source.filename, source.similarity);
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod data_dir;
pub mod doc_id;
pub mod document_store;
pub mod error;
pub mod extract;
pub mod ingestion;
pub mod qa;
pub mod search;
pub mod server;
pub mod similarity;
pub mod summarizer;
pub mod text_util;
pub mod walker;

pub use data_dir::DataDir;
pub use doc_id::DocumentId;
pub use document_store::{DocumentStore, StoredDocument};
pub use error::{Error, Result};
pub use similarity::SimilarityRanker;
