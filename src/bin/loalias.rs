//! loalias - loopback alias manager
//!
//! Adds, removes, lists and probes IPv4 aliases on the loopback device.
//! Privileged calls go through `sudo` without a password prompt, so an
//! unattended run fails fast instead of hanging.
//!
//! # Usage
//!
//! ```bash
//! # List aliases with their reachability
//! loalias
//!
//! # Add two aliases (bare addresses become /32)
//! loalias add 10.1.1.5 10.1.1.6
//!
//! # Remove one, or every alias on the device
//! loalias remove 10.1.1.5
//! loalias remove all
//!
//! # Probe addresses
//! loalias test 10.1.1.5 203.0.113.1
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use libloalias::style::{self, ColorChoice};
use libloalias::{render, AliasConfig, AliasManager, ElevatedRunner, Request};
use std::path::PathBuf;
use std::process;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "loalias")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Loopback alias manager - add, remove, list and test IPv4 aliases on lo",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (defaults to $LOALIAS_CONFIG, then built-in settings)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use colors in output
    #[arg(long, value_enum, default_value = "auto", global = true)]
    color: ColorMode,

    /// Exit with status 1 if any address failed
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl From<ColorMode> for ColorChoice {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add aliases to the loopback device
    #[command(alias = "a")]
    Add {
        /// IPv4 addresses, optionally with a /prefix
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Remove aliases ("remove all" removes every alias)
    #[command(aliases = ["rm", "del"])]
    Remove {
        /// IPv4 addresses, optionally with a /prefix, or "all"
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Probe addresses with a single ping
    #[command(alias = "t")]
    Test {
        /// Addresses to probe
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// List aliases and their reachability (default)
    #[command(alias = "ls")]
    List,
}

impl Commands {
    fn into_request(self) -> Request {
        match self {
            Commands::Add { addresses } => Request::Add(addresses),
            Commands::Remove { addresses } => Request::remove(addresses),
            Commands::Test { addresses } => Request::Test(addresses),
            Commands::List => Request::List,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    style::apply(cli.color.into());

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config =
        AliasConfig::resolve(cli.config.as_deref()).context("Failed to load configuration")?;
    debug!("configuration: {:?}", config);

    let request = cli.command.map(Commands::into_request).unwrap_or(Request::List);
    info!("request: {:?}", request);

    let manager = AliasManager::new(ElevatedRunner::from_config(&config), &config);
    let summary = manager
        .execute(&request, |report| println!("{}", render(report)))
        .await;

    info!("{} processed, {} failed", summary.total, summary.failures);

    // Per-address failures are reported inline; only --strict turns them into an exit code
    if cli.strict && summary.has_failures() {
        return Ok(1);
    }
    Ok(0)
}

/// Logs go to stderr so they never interleave with status lines on stdout
fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("loalias={},libloalias={}", log_level, log_level))
    });

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();
}
