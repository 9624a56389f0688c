use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use spellsweep::cli::output::{self, OutputFormat, ProgressSink};
use spellsweep::config::ConfigOverrides;
use spellsweep::documents::{collect_documents, FsDocumentStore};
use spellsweep::oracle::BingSpellClient;
use spellsweep::pipeline::{CancelToken, NullSink, WorkerOptions};
use spellsweep::rewrite::RewriteSummary;
use spellsweep::{Config, SpellChecker};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spellsweep")]
#[command(version, about = "Concurrent spell checking for plain-text documents", long_about = None)]
struct Cli {
    /// Files or directories to check
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Apply suggested corrections to the files after checking
    #[arg(short, long)]
    fix: bool,

    /// Interactively choose which corrections to apply
    #[arg(short, long, requires = "fix")]
    interactive: bool,

    /// Number of concurrent checker workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Delay between oracle requests per worker, in milliseconds
    #[arg(long, value_name = "MS")]
    throttle_ms: Option<u64>,

    /// Retry attempts for a failed oracle request
    #[arg(long)]
    retries: Option<u32>,

    /// Spell-check API key
    #[arg(long, env = "SPELLSWEEP_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Spell-check API endpoint
    #[arg(long, env = "SPELLSWEEP_API_URL")]
    api_url: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if misspellings are found
    #[arg(long)]
    no_fail: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "spellsweep", &mut io::stdout());
        return Ok(());
    }

    // Load configuration
    let config = Config::load(ConfigOverrides {
        workers: cli.workers,
        throttle_ms: cli.throttle_ms,
        retry_limit: cli.retries,
        api_key: cli.api_key.clone(),
        api_url: cli.api_url.clone(),
        no_color: cli.no_color,
    })?;

    // Validate input files
    if cli.files.is_empty() {
        anyhow::bail!("No files specified. Use --help for usage information.");
    }

    let mut selected = Vec::new();
    for file_path in &cli.files {
        if !file_path.exists() {
            eprintln!("Error: File not found: {}", file_path.display());
            continue;
        }
        selected.push(file_path.clone());
    }
    if selected.is_empty() {
        anyhow::bail!("None of the given paths exist.");
    }

    let documents = collect_documents(&selected);
    let colored = config.color;

    // Initialize checker
    let client = BingSpellClient::new(&config)?;
    let options = WorkerOptions::from_config(&config)?;
    let mut checker = SpellChecker::new(Box::new(client), options);

    let store = FsDocumentStore;
    let cancel = CancelToken::new();

    // Run the pipeline
    let report = if matches!(cli.format, OutputFormat::Text) {
        let progress = ProgressSink::new();
        checker.run(&documents, &store, &progress, &cancel)?
    } else {
        checker.run(&documents, &store, &NullSink, &cancel)?
    };

    output::print_report(&report, &documents, colored, &cli.format);

    // Apply corrections and print summary
    if cli.fix && !report.cancelled() {
        let pairs = if cli.interactive {
            output::select_corrections(&report.results)?
        } else {
            output::all_corrections(&report.results)
        };

        let summary = if pairs.is_empty() {
            RewriteSummary::default()
        } else {
            checker.apply_corrections(&pairs, &documents, &store)?
        };

        if matches!(cli.format, OutputFormat::Text) {
            output::print_fix_summary(&summary, colored);
        }
    } else if matches!(cli.format, OutputFormat::Text) {
        output::print_run_summary(&report, &documents, colored);
    }

    // Exit with appropriate code
    if report.results.has_misspellings() && !cli.no_fail && !cli.fix {
        std::process::exit(1);
    }

    Ok(())
}
