use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::{server::DEFAULT_MAX_UPLOAD_BYTES, similarity::DEFAULT_TOP_K};

#[derive(Debug, Parser)]
#[command(
    name = "docqa",
    version,
    about = "Upload documents, read quick summaries, and ask questions about them"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP API server
    Serve(ServeArgs),
    /// Extract, summarize, and store documents from files or directories
    Ingest(IngestArgs),
    /// Ask a question about the stored documents
    Ask(AskArgs),
    /// Rank stored documents by word overlap with a query
    Search(SearchArgs),
    /// List stored documents, newest first
    List(ListArgs),
    /// Show a stored document
    Get(GetArgs),
    /// Delete a stored document
    Remove {
        /// Document id
        id: String,
    },
    /// Show system status and statistics
    Status(StatusArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Serve --

#[derive(Debug, Parser)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Largest accepted upload body, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

// -- Ingest --

#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// Files or directories to ingest
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output a JSON report
    #[arg(long)]
    pub json: bool,
}

// -- Ask --

#[derive(Debug, Parser)]
pub struct AskArgs {
    /// The question
    pub question: String,

    /// Number of source documents to consult
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_K)]
    pub count: usize,

    /// Output the answer as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query
    pub query: String,

    /// Number of results to return
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_K)]
    pub count: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Return all results above the score threshold
    #[arg(long)]
    pub all: bool,

    /// Output only filenames (one per line)
    #[arg(long)]
    pub files: bool,

    /// Minimum score threshold
    #[arg(long, default_value = "0.0")]
    pub min_score: f32,
}

// -- List --

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Only list documents whose filename matches this glob
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Get --

#[derive(Debug, Parser)]
pub struct GetArgs {
    /// Document id
    pub id: String,

    /// Output as JSON with metadata
    #[arg(long)]
    pub json: bool,

    /// Print only metadata
    #[arg(long)]
    pub meta: bool,

    /// Print the summary instead of the full text
    #[arg(long)]
    pub summary: bool,

    /// Prefix each line with its line number
    #[arg(long)]
    pub line_numbers: bool,

    /// First line to print (1-indexed)
    #[arg(long, default_value = "1")]
    pub from_line: usize,

    /// Maximum number of lines to print
    #[arg(long)]
    pub max_lines: Option<usize>,
}

// -- Status --

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "docqa",
            &mut std::io::stdout(),
        );
    }
}
