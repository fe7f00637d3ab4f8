use clap::Parser;
use docqa::{
    DataDir,
    DocumentId,
    DocumentStore,
    StoredDocument,
    cli::{self, Cli, Command},
    error::{self, Error},
    ingestion,
    qa,
    search::{self, SearchParams},
    server::{self, ServerConfig},
    similarity::DEFAULT_TOP_K,
    text_util,
    walker,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DOCQA_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    init_tracing(cli.verbose, cli.quiet);

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let store = DocumentStore::open(&data_dir.documents_db())?;

    match cli.command {
        Command::Serve(args) => {
            let config = ServerConfig {
                host: args.host,
                port: args.port,
                max_upload_bytes: args.max_upload_bytes,
                source_limit: DEFAULT_TOP_K,
            };
            tracing::info!(data_dir = %data_dir.root().display(), "starting server");
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(server::serve(store, config))?;
        }
        Command::Ingest(args) => {
            cmd_ingest(&store, &args)?;
        }
        Command::Ask(args) => {
            cmd_ask(&store, &args)?;
        }
        Command::Search(args) => {
            let params = SearchParams {
                query: args.query.clone(),
                count: args.count,
                min_score: args.min_score,
                all: args.all,
            };
            let results = search::execute_search(&params, &store)?;

            if args.json {
                search::format_json(&results, &args.query)?;
            } else if args.files {
                search::format_files(&results);
            } else {
                search::format_human(&results, &args.query);
            }
        }
        Command::List(args) => {
            cmd_list(&store, &args)?;
        }
        Command::Get(args) => {
            cmd_get(&store, &args)?;
        }
        Command::Remove { id } => {
            cmd_remove(&store, &id)?;
        }
        Command::Status(args) => {
            cmd_status(&store, &data_dir, args.json)?;
        }
        Command::Completions(_) => {}
    }

    Ok(())
}

fn cmd_ingest(
    store: &DocumentStore,
    args: &cli::IngestArgs,
) -> error::Result<()> {
    let mut files = Vec::new();
    for path in &args.paths {
        if !path.exists() {
            return Err(Error::Config(format!(
                "path does not exist: {}",
                path.display()
            )));
        }
        files.extend(walker::discover(path)?);
    }

    if files.is_empty() {
        eprintln!("No supported documents found.");
        return Ok(());
    }
    eprintln!("Found {} file(s)", files.len());

    let reports = ingestion::ingest_files(store, &files)?;

    if args.json {
        println!("{}", serde_json::to_string(&reports)?);
        return Ok(());
    }

    let mut stored = 0;
    for report in &reports {
        match (&report.id, &report.error) {
            (Some(id), _) => {
                stored += 1;
                println!("#{}  {}", short_id(id), report.path);
                if let Some(summary) = &report.summary
                    && !summary.is_empty()
                {
                    println!("    {}", text_util::preview(summary, 120));
                }
            }
            (None, Some(err)) => println!("skipped  {}: {err}", report.path),
            (None, None) => {}
        }
    }
    eprintln!("Stored {stored} of {} document(s)", reports.len());
    Ok(())
}

fn cmd_ask(store: &DocumentStore, args: &cli::AskArgs) -> error::Result<()> {
    let answer = qa::answer(store, &args.question, args.count)?;

    if args.json {
        println!("{}", serde_json::to_string(&answer)?);
        return Ok(());
    }

    println!("{}", answer.answer);
    if !answer.sources.is_empty() {
        println!("\nSources:");
        for (i, source) in answer.sources.iter().enumerate() {
            println!(
                "{:>3}. [{:.3}] {}",
                i + 1,
                source.similarity,
                source.filename
            );
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ListEntry<'a> {
    id: &'a str,
    filename: &'a str,
    summary: &'a str,
    uploaded_at: String,
    chars: usize,
}

fn cmd_list(store: &DocumentStore, args: &cli::ListArgs) -> error::Result<()> {
    let matcher = args
        .filter
        .as_deref()
        .map(|pattern| {
            globset::Glob::new(pattern)
                .map(|glob| glob.compile_matcher())
                .map_err(|e| {
                    Error::Config(format!("invalid glob pattern: {e}"))
                })
        })
        .transpose()?;

    let documents: Vec<StoredDocument> = store
        .list()?
        .into_iter()
        .filter(|doc| {
            matcher.as_ref().is_none_or(|m| m.is_match(&doc.filename))
        })
        .collect();

    if args.json {
        let entries: Vec<ListEntry> = documents
            .iter()
            .map(|doc| ListEntry {
                id: &doc.id,
                filename: &doc.filename,
                summary: &doc.summary,
                uploaded_at: doc.uploaded_at.to_rfc3339(),
                chars: doc.content.chars().count(),
            })
            .collect();
        println!("{}", serde_json::to_string(&entries)?);
    } else if documents.is_empty() {
        println!("No documents stored.");
    } else {
        for doc in &documents {
            println!(
                "#{}  {}  {}",
                short_id(&doc.id),
                doc.uploaded_at.format("%Y-%m-%d %H:%M"),
                doc.filename
            );
        }
        println!("\n{} document(s)", documents.len());
    }
    Ok(())
}

fn short_id(id: &str) -> String {
    DocumentId::parse(id)
        .map(|id| id.short())
        .unwrap_or_else(|_| id.to_string())
}

/// Find a stored document by full id or by a unique id prefix, with or
/// without a leading `#`.
fn resolve_document(
    store: &DocumentStore,
    reference: &str,
) -> error::Result<StoredDocument> {
    let reference = reference.strip_prefix('#').unwrap_or(reference);
    let not_found = || Error::NotFound {
        kind: "document",
        name: reference.to_string(),
    };

    if let Ok(id) = DocumentId::parse(reference) {
        return store.get(&id)?.ok_or_else(not_found);
    }
    if reference.is_empty() {
        return Err(not_found());
    }

    let mut matches: Vec<StoredDocument> = store
        .list()?
        .into_iter()
        .filter(|doc| doc.id.starts_with(reference))
        .collect();
    match matches.len() {
        0 => Err(not_found()),
        1 => Ok(matches.remove(0)),
        n => Err(Error::Config(format!(
            "id prefix '{reference}' is ambiguous ({n} documents match)"
        ))),
    }
}

fn cmd_get(store: &DocumentStore, args: &cli::GetArgs) -> error::Result<()> {
    let doc = resolve_document(store, &args.id)?;

    if args.meta {
        println!("id: {}", doc.id);
        println!("filename: {}", doc.filename);
        println!("uploaded_at: {}", doc.uploaded_at.to_rfc3339());
        println!("chars: {}", doc.content.chars().count());
        println!("summary: {}", doc.summary);
        return Ok(());
    }
    if args.json {
        println!("{}", serde_json::to_string(&doc)?);
        return Ok(());
    }

    let body = if args.summary { &doc.summary } else { &doc.content };
    let window = text_util::line_window(body, args.from_line, args.max_lines);
    if args.line_numbers {
        println!(
            "{}",
            text_util::number_lines(&window.text, window.first_line)
        );
    } else {
        println!("{}", window.text);
    }
    if window.omitted > 0 {
        println!("\n[... {} more lines]", window.omitted);
    }
    Ok(())
}

fn cmd_remove(store: &DocumentStore, reference: &str) -> error::Result<()> {
    let doc = resolve_document(store, reference)?;
    let id = DocumentId::parse(&doc.id)?;
    if !store.remove(&id)? {
        return Err(Error::NotFound {
            kind: "document",
            name: reference.to_string(),
        });
    }
    println!("Removed {} (#{})", doc.filename, id.short());
    Ok(())
}

#[derive(Serialize)]
struct Status {
    data_dir: String,
    database: String,
    documents: usize,
}

fn cmd_status(
    store: &DocumentStore,
    data_dir: &DataDir,
    json: bool,
) -> error::Result<()> {
    let status = Status {
        data_dir: data_dir.root().display().to_string(),
        database: data_dir.documents_db().display().to_string(),
        documents: store.len()?,
    };

    if json {
        println!("{}", serde_json::to_string(&status)?);
    } else {
        println!("Data directory: {}", status.data_dir);
        println!("Database: {}", status.database);
        println!("Documents: {}", status.documents);
    }
    Ok(())
}
