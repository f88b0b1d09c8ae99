use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docdex::index::{self, load_index};
use docdex::output::{self, ColorMode};
use docdex::query::{parse_query, MatchMode, SearchExecutor, Summarizer};
use docdex::utils::{init_logging, AppConfig};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "docdex", version)]
#[command(about = "Build, inspect and query documentation search indexes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (default: <data dir>/docdex/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a search index from a documentation source tree
    Build {
        /// Source directory
        source: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "searchindex.js")]
        output: PathBuf,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },
    /// Search an index
    Search {
        /// Index file
        index: PathBuf,

        /// Query words; prefix a word with - to exclude it
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        query: Vec<String>,

        /// Maximum number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Match documents containing any query term
        #[arg(long)]
        any: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Documentation sources, used to show result summaries
        #[arg(long)]
        source: Option<PathBuf>,

        /// When to use colors
        #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
        color: ColorMode,
    },
    /// Show index statistics
    Stats {
        /// Index file
        index: PathBuf,
    },
    /// Check an index against its structural invariants
    Validate {
        /// Index file
        index: PathBuf,
    },
    /// List the documents of an index
    Docs {
        /// Index file
        index: PathBuf,

        /// When to use colors
        #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
        color: ColorMode,
    },
    /// Interactive search box
    #[cfg(feature = "interactive")]
    Interactive {
        /// Index file
        index: PathBuf,

        /// Initial query
        query: Option<String>,

        /// Documentation sources, used to show result summaries
        #[arg(long)]
        source: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref())?;
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Build {
            source,
            output,
            quiet,
        } => {
            index::build::build_index(&source, &output, &config.build, quiet)?;
        }
        Commands::Search {
            index,
            query,
            limit,
            any,
            json,
            source,
            color,
        } => {
            let search_index = load_index(&index)
                .with_context(|| format!("Failed to load index {}", index.display()))?;
            let query = query.join(" ");
            let parsed = parse_query(&query);
            let mode = if any { MatchMode::Any } else { config.match_mode };

            let mut hits = SearchExecutor::new(&search_index)
                .with_weights(config.scoring)
                .with_mode(mode)
                .with_limit(limit.unwrap_or(config.limit))
                .search(&parsed);
            tracing::info!(query = %query, hits = hits.len(), "search finished");

            if let Some(source) = source {
                Summarizer::new(&source).annotate(&mut hits, &parsed.highlight_terms);
            }

            if json {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                output::print_hits_json(&mut lock, &hits)?;
                lock.flush()?;
            } else {
                let mut stdout = output::stdout(color);
                output::print_hits(&mut stdout, &hits)?;
            }
        }
        Commands::Stats { index } => {
            index::stats::show_stats(&index)?;
        }
        Commands::Validate { index } => {
            if index::stats::validate_report(&index)? > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Docs { index, color } => {
            let search_index = load_index(&index)
                .with_context(|| format!("Failed to load index {}", index.display()))?;
            let mut stdout = output::stdout(color);
            output::print_docs(&mut stdout, &search_index)?;
        }
        #[cfg(feature = "interactive")]
        Commands::Interactive {
            index,
            query,
            source,
        } => {
            let search_index = load_index(&index)
                .with_context(|| format!("Failed to load index {}", index.display()))?;
            let mut app = docdex::tui::App::new(
                search_index,
                config.scoring,
                config.match_mode,
                config.limit,
            );
            if let Some(source) = source {
                app = app.with_summarizer(Summarizer::new(&source));
            }
            docdex::tui::run(app, query)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
