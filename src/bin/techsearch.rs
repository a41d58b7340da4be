//! CLI binary for techsearch.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use techsearch::config::AppConfig;
use techsearch::export;
use techsearch::{Provider, Query, SearchOutcome, SearchService, TechDomain};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Snippet characters shown per result in text output.
const SNIPPET_PREVIEW_CHARS: usize = 300;

/// Technical search across web, LLM analysis and video transcripts.
#[derive(Parser)]
#[command(name = "techsearch", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a search.
    Search {
        /// Query text or a YouTube link.
        text: String,

        /// Provider to query (web-search, text-analysis, transcript). Repeatable.
        #[arg(short, long = "provider")]
        providers: Vec<Provider>,

        /// Restrict to a technology domain. Repeatable.
        #[arg(short, long = "domain")]
        domains: Vec<TechDomain>,

        /// Maximum number of results. Web search returns at most 20 per query.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Show only results from this provider.
        #[arg(long, value_name = "PROVIDER")]
        only: Option<Provider>,

        /// Skip the cache lookup (the result is still cached).
        #[arg(long)]
        no_cache: bool,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Delete expired cache entries.
    Cleanup,

    /// Delete every cache entry.
    Clear,

    /// Show provider availability and cache statistics.
    Status,

    /// Print the config file location.
    ConfigPath,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::ConfigPath = cli.command {
        let path = cli.config.unwrap_or_else(AppConfig::default_config_path);
        println!("{}", path.display());
        return Ok(());
    }

    let config = AppConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    let _log_guard = techsearch::logging::init(&config.logging)?;

    let service = SearchService::from_config(&config).context("failed to start search service")?;

    match cli.command {
        Command::Search {
            text,
            providers,
            domains,
            limit,
            only,
            no_cache,
            json,
        } => {
            let query = Query::new(text)
                .with_providers(providers)
                .with_domains(domains)
                .with_limit(limit.unwrap_or(config.search.default_limit));
            run_search(&service, &query, only, !no_cache, json).await
        }
        Command::Cleanup => {
            let removed = service.cleanup_cache().await?;
            println!("Removed {removed} expired cache entries.");
            Ok(())
        }
        Command::Clear => {
            let removed = service.clear_cache().await?;
            println!("Removed {removed} cache entries.");
            Ok(())
        }
        Command::Status => show_status(&service, &config).await,
        Command::ConfigPath => Ok(()),
    }
}

async fn run_search(
    service: &SearchService,
    query: &Query,
    only: Option<Provider>,
    use_cache: bool,
    json: bool,
) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, cancelling search");
            cancel_clone.cancel();
        }
    });

    let mut outcome = service.search_with_cancel(query, use_cache, cancel).await?;
    if let Some(provider) = only {
        outcome.results = export::filter_by_provider(&outcome.results, provider);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&export::to_json(&outcome.results))?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

fn print_outcome(outcome: &SearchOutcome) {
    let source = if outcome.from_cache { " (cached)" } else { "" };
    println!(
        "{} results from {} provider(s){source}\n",
        outcome.results.len(),
        export::summarize_providers(&outcome.results),
    );

    for (i, result) in outcome.results.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, result.provider, result.title);
        if let Some(url) = &result.url {
            println!("   {url}");
        }
        println!("   {}\n", preview(&result.snippet, SNIPPET_PREVIEW_CHARS));
    }

    for failure in &outcome.failures {
        eprintln!("warning: {failure}");
    }
}

async fn show_status(service: &SearchService, config: &AppConfig) -> anyhow::Result<()> {
    println!("Providers:");
    for status in service.provider_status() {
        match status.reason {
            None => println!("  {:<14} available", status.provider.slug()),
            Some(reason) => println!("  {:<14} unavailable ({reason})", status.provider.slug()),
        }
    }
    if !config.has_any_api_key() {
        println!("\nNo API keys configured; only transcripts can be searched.");
    }

    let stats = service.cache_stats().await?;
    let location = service
        .store()
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "in memory".to_owned());
    println!("\nCache: {location}");
    println!("  entries: {} ({} expired)", stats.entries, stats.expired);
    if let (Some(oldest), Some(newest)) = (stats.oldest, stats.newest) {
        println!("  oldest:  {}", oldest.to_rfc3339());
        println!("  newest:  {}", newest.to_rfc3339());
    }
    Ok(())
}

/// First `max` characters of `text` on one line, with an ellipsis if cut.
fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
