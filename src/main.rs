use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use scholar_tally::batch::{
    BatchRunner, BlockDecision, BlockPrompt, CandidateRange, Checkpoint, FixedDecision,
};
use scholar_tally::config::{find_config_file, load_candidates, load_config, load_venue_list, RunMode};
use scholar_tally::matching::VenueMatcher;
use scholar_tally::models::Candidate;
use scholar_tally::pagination::PaginationOutcome;
use scholar_tally::sources::{CachedPageFetcher, HttpFetcher, PageCache, PageFetcher};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Scholar Tally - venue and authorship-position counts from public profile pages
#[derive(Parser, Debug)]
#[command(name = "scholar-tally")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tally publications per allow-listed venue and author position", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process a candidate list
    #[command(alias = "r")]
    Run {
        /// JSON file with candidates ({"id", "name", "profile_url"})
        #[arg(long)]
        candidates: PathBuf,

        /// Venue allow-list, one canonical name per line
        #[arg(long)]
        venues: Option<PathBuf>,

        /// First candidate to process (1-based)
        #[arg(long)]
        start: Option<usize>,

        /// Last candidate to process (inclusive)
        #[arg(long)]
        end: Option<usize>,

        /// Start from the saved checkpoint
        #[arg(long, conflicts_with = "start")]
        resume: bool,

        /// Tally previously cached pages without network access
        #[arg(long, conflicts_with = "fetch_only")]
        offline: bool,

        /// Fetch and cache pages without tallying
        #[arg(long)]
        fetch_only: bool,

        /// Directory for cached pages
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Halt on a suspected block instead of asking
        #[arg(long)]
        non_interactive: bool,

        /// Write the JSON report here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

/// Asks on the terminal whether to continue past a suspected block
struct TerminalPrompt;

#[async_trait]
impl BlockPrompt for TerminalPrompt {
    async fn on_suspected_block(
        &self,
        candidate: &Candidate,
        outcome: &PaginationOutcome,
    ) -> BlockDecision {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            eprint!(
                "No pages for {} ({}). Possibly blocked. [c]ontinue or [s]top? ",
                candidate.name, outcome.reason
            );
            let _ = std::io::stderr().flush();

            match lines.next_line().await {
                Ok(Some(line)) => match line.trim().to_lowercase().as_str() {
                    "c" => return BlockDecision::Continue,
                    "s" => return BlockDecision::Halt,
                    _ => continue,
                },
                Ok(None) => return BlockDecision::Halt,
                Err(e) => {
                    tracing::error!("Failed to read answer: {}", e);
                    return BlockDecision::Halt;
                }
            }
        }
    }
}

/// How a suspected block is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptChoice {
    Terminal,
    AutoHalt,
}

impl PromptChoice {
    /// Nobody can answer without a terminal, so those runs halt
    fn choose(non_interactive: bool, stdin_is_terminal: bool) -> Self {
        if non_interactive || !stdin_is_terminal {
            PromptChoice::AutoHalt
        } else {
            PromptChoice::Terminal
        }
    }

    fn build(self) -> Box<dyn BlockPrompt> {
        match self {
            PromptChoice::Terminal => Box::new(TerminalPrompt),
            PromptChoice::AutoHalt => Box::new(FixedDecision(BlockDecision::Halt)),
        }
    }
}

/// `--offline` and `--fetch-only` override the configured mode
fn mode_override(offline: bool, fetch_only: bool) -> Option<RunMode> {
    if offline {
        Some(RunMode::Offline)
    } else if fetch_only {
        Some(RunMode::FetchOnly)
    } else {
        None
    }
}

/// `--log-format` wins over `logging.format`
fn use_json_logs(flag: Option<LogFormat>, configured: Option<&str>) -> bool {
    match flag {
        Some(format) => format == LogFormat::Json,
        None => configured == Some("json"),
    }
}

fn log_level<'a>(verbose: u8, quiet: bool, default_level: &'a str) -> &'a str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => default_level,
        1 => "debug",
        _ => "trace",
    }
}

fn init_tracing(cli: &Cli, default_level: &str, json: bool) {
    let level = log_level(cli.verbose, cli.quiet, default_level);
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("scholar_tally={}", level)),
    );

    // Logs go to stderr; stdout carries the report
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(find_config_file);
    let mut config = load_config(config_path.as_deref()).context("Failed to load configuration")?;

    let json_logs = use_json_logs(cli.log_format, config.logging.format.as_deref());
    init_tracing(&cli, &config.logging.level, json_logs);

    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    match cli.command {
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }

        Commands::Run {
            candidates,
            venues,
            start,
            end,
            resume,
            offline,
            fetch_only,
            cache_dir,
            non_interactive,
            output,
        } => {
            if let Some(mode) = mode_override(offline, fetch_only) {
                config.mode = mode;
            }
            if let Some(dir) = cache_dir {
                config.paths.cache_dir = dir;
            }

            let candidates = load_candidates(&candidates)?;
            let venue_path = venues
                .or_else(|| config.paths.venue_list.clone())
                .context("No venue list given (--venues or paths.venue_list)")?;
            let matcher = VenueMatcher::new(load_venue_list(&venue_path)?);
            tracing::info!(
                "Loaded {} candidates and {} venues",
                candidates.len(),
                matcher.len()
            );

            let fetcher: Box<dyn PageFetcher> = match config.mode {
                RunMode::Offline => Box::new(CachedPageFetcher::new(PageCache::new(
                    &config.paths.cache_dir,
                ))),
                _ => Box::new(HttpFetcher::new(&config.pagination)?),
            };

            let prompt =
                PromptChoice::choose(non_interactive, std::io::stdin().is_terminal()).build();

            let runner = BatchRunner::new(&config, fetcher.as_ref(), &matcher, prompt.as_ref());
            let report = if resume {
                let checkpoint = Checkpoint::load(&config.paths.checkpoint)?;
                runner.resume(&candidates, checkpoint.as_ref(), end).await?
            } else {
                runner
                    .run(&candidates, CandidateRange::new(start, end))
                    .await?
            };

            if let Some(halted_at) = report.halted_at {
                tracing::warn!(
                    "Stopped at candidate {}; rerun with --resume to continue",
                    halted_at
                );
            }

            let json = serde_json::to_string_pretty(&report)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Report written to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}
