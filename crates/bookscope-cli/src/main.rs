use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use bookscope_core::{AppConfig, Book, SearchResults, SummaryRequest};
use bookscope_sources::{AutocompleteController, Phase, SearchEngine};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "bookscope",
    about = "Search Google Books and Naver at once, ranked and deduplicated",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting BOOKSCOPE_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging on stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full search across all enabled sources.
    Search {
        query: String,
        /// Show at most this many ranked results.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Autocomplete suggestions for a partial query.
    Suggest { query: String },

    /// Details of one result, selected by its `source:id` key.
    Show { query: String, key: String },

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file path.
    Path,
    /// Show the effective configuration.
    Show,
    /// Write the default configuration to the config path.
    Init {
        #[arg(long)]
        force: bool,
    },
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json_output = cli.json || std::env::var("BOOKSCOPE_JSON").as_deref() == Ok("1");
    let config = AppConfig::load().context("failed to load config")?;
    debug!(path = %AppConfig::config_path().display(), "configuration loaded");

    match cli.command {
        Commands::Search { query, limit } => {
            let engine = SearchEngine::from_config(&config)?;
            let mut results = engine.search(&query).await;
            if let Some(limit) = limit {
                results.truncate(limit);
            }
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": results.ranked, "total": results.len(), "query": query },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if results.is_empty() {
                println!("No results for \"{query}\".");
            } else {
                print_results(&results);
            }
        }

        Commands::Suggest { query } => {
            let engine = Arc::new(SearchEngine::from_config(&config)?);
            let controller = AutocompleteController::from_config(engine, &config);
            let mut rx = controller.subscribe();
            controller.input(&query);

            let suggestions = loop {
                let state = rx.borrow_and_update().clone();
                if state.phase != Phase::Pending && state.generation > 0 {
                    break state;
                }
                rx.changed().await?;
            };
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": suggestions,
                    "meta": { "duration_ms": dur }
                }))?;
            } else if suggestions.items.is_empty() {
                println!("No suggestions.");
            } else {
                for book in &suggestions.items {
                    println!(
                        "{key:<28}  {title:<40}  {authors}",
                        key = book.selection_key(),
                        title = book.title,
                        authors = book.authors_joined(", "),
                    );
                }
            }
        }

        Commands::Show { query, key } => {
            let engine = SearchEngine::from_config(&config)?;
            let results = engine.search(&query).await;
            let Some(book) = results.select(&key) else {
                bail!("no result with key {key} for \"{query}\"");
            };
            let summary_request = SummaryRequest::for_book(book);
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "book": book, "summary_request": summary_request },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                print_book(book);
                if let Some(request) = summary_request {
                    println!();
                    println!("Summary request:");
                    println!("{}", serde_json::to_string_pretty(&request)?);
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Path => {
                println!("{}", AppConfig::config_path().display());
            }
            ConfigAction::Show => {
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":config}))?;
                } else {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
            ConfigAction::Init { force } => {
                let path = AppConfig::config_path();
                if path.exists() && !force {
                    bail!("{} already exists (use --force to overwrite)", path.display());
                }
                AppConfig::default().save_to(&path)?;
                println!("Wrote {}", path.display());
            }
        },
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn print_results(results: &SearchResults) {
    for ranked in &results.ranked {
        let book = &ranked.book;
        println!(
            "{rank:>3}. {title:<40}  {authors:<25}  {date:<10}  {key}",
            rank = ranked.rank,
            title = book.title,
            authors = book.authors_joined(", "),
            date = book.published_date,
            key = book.selection_key(),
        );
    }
}

fn print_book(book: &Book) {
    println!("{}", book.title);
    println!("  Source:     {}", book.source.label());
    println!("  Authors:    {}", book.authors_joined(", "));
    println!("  Publisher:  {}", book.publisher);
    println!("  Published:  {}", book.published_date);
    println!("  ISBN:       {}", book.isbn);
    if !book.categories.is_empty() {
        println!("  Categories: {}", book.categories.join(", "));
    }
    if !book.thumbnail_url.is_empty() {
        println!("  Cover:      {}", book.thumbnail_url);
    }
    if !book.description.is_empty() {
        println!();
        println!("{}", book.description);
    }
}
