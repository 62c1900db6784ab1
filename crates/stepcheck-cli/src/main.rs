//! stepcheck CLI - run declarative JSON test suites against a search service

mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use stepcheck_core::Config;
use stepcheck_runner::{HttpTarget, NoopObserver, SuiteRunner};

use report::{TerminalReporter, summary_text};

/// Exit code when a test failed or no tests were found.
const EXIT_TEST_FAILURE: i32 = 3;
/// Exit code for errors that stopped the run.
const EXIT_ERROR: u8 = 1;

const CONFIG_FILE: &str = ".stepcheck.toml";

#[derive(Parser)]
#[command(name = "stepcheck")]
#[command(about = "Run declarative JSON test suites against a search service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a test suite, or a single test
    ///
    /// Runs all JSON test files in the given directory, or the single JSON
    /// test file given. Without a path, the working directory is used.
    Test {
        /// Tests directory or test file
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file (default: .stepcheck.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Initialize config file
    Init,

    /// Export JSON Schema for test files
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(EXIT_ERROR)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Test { path, config } => run_tests(&path, config.as_deref(), cli.output),

        Commands::Init => {
            if Path::new(CONFIG_FILE).exists() {
                eprintln!("{CONFIG_FILE} already exists");
                return Ok(i32::from(EXIT_ERROR));
            }

            std::fs::write(CONFIG_FILE, Config::example())?;
            println!("Created {CONFIG_FILE}");
            println!("\nEdit the file to configure:");
            println!("  - target: service to test");
            println!("  - endpoints: query endpoint per cluster");
            println!("  - headers: auth tokens, API keys");
            Ok(0)
        }

        Commands::Schema => {
            let schema = stepcheck_core::schema::generate_schema();
            println!("{schema}");
            Ok(0)
        }
    }
}

fn run_tests(path: &Path, config: Option<&Path>, output: OutputFormat) -> Result<i32> {
    let mut cfg = match config {
        Some(p) => Config::load(p)?,
        None => Config::load_default()?,
    };
    cfg.apply_env()?;
    tracing::debug!(
        base_url = %cfg.target,
        endpoints = cfg.endpoints.len(),
        headers = cfg.headers.len(),
        "loaded config"
    );

    let target = HttpTarget::from_config(&cfg)?;
    let runner = SuiteRunner::new(target);

    let summary = match output {
        OutputFormat::Terminal => {
            let mut reporter = TerminalReporter::new(std::io::stdout());
            runner.run(path, &mut reporter)
        }
        OutputFormat::Json | OutputFormat::Silent => runner.run(path, &mut NoopObserver),
    }
    .with_context(|| format!("Failed running tests at {}", path.display()))?;

    match output {
        OutputFormat::Terminal => print!("{}", summary_text(&summary, path)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Silent => {}
    }

    Ok(if summary.is_success() {
        0
    } else {
        EXIT_TEST_FAILURE
    })
}
