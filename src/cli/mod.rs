//! CLI for questrunner
//!
//! `run` (the default) loads wallets and proxies, then drives the full batch
//! either under the terminal dashboard or, with `--plain`, as a stream of
//! formatted lines on stdout.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use config::{Config, Environment, File, FileFormat};
use std::path::Path;
use tracing::info;

use questrunner_core::{load_proxies, load_wallets, run_all, BotConfig, EventBus, LogLevel};

pub mod plain;
pub mod tui;

/// Embedded default configuration (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Questrunner CLI
#[derive(Parser, Debug)]
#[command(name = "questrunner")]
#[command(about = "Automated quest sign-in and claim runner")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a batch run (default)
    Run(RunArgs),
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Override the wallet list path
    #[arg(long)]
    pub wallets: Option<String>,

    /// Override the proxy list path
    #[arg(long)]
    pub proxies: Option<String>,

    /// Print log lines to stdout instead of the dashboard
    #[arg(long)]
    pub plain: bool,
}

impl Cli {
    /// Whether this invocation will render the full-screen dashboard.
    pub fn uses_dashboard(&self) -> bool {
        match &self.command {
            Some(Commands::Run(args)) => !args.plain,
            None => true,
        }
    }
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let args = match cli.command {
        Some(Commands::Run(args)) => args,
        None => RunArgs::default(),
    };

    let mut config = load_config().context("Failed to load configuration")?;
    if let Some(path) = args.wallets {
        config.files.wallets = path;
    }
    if let Some(path) = args.proxies {
        config.files.proxies = path;
    }

    info!(
        wallets = %config.files.wallets,
        proxies = %config.files.proxies,
        api = %config.api.base_url,
        "starting questrunner v{}",
        env!("CARGO_PKG_VERSION")
    );

    // The bus is built here, once, and handed to the presenter and the
    // driver; neither side reaches for a shared global.
    let bus = EventBus::default();

    if args.plain {
        plain::run(bus, config).await
    } else {
        tui::run(bus, config).await
    }
}

/// Load configuration from the embedded defaults, optional local overrides,
/// and environment variables.
pub(crate) fn load_config() -> anyhow::Result<BotConfig> {
    let config = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(File::with_name("config/local").required(false))
        // 3. Environment variables (highest priority), QUESTRUNNER_API__BASE_URL etc.
        .add_source(
            Environment::with_prefix("QUESTRUNNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Load inputs and drive the whole batch, reporting through `bus`.
///
/// An empty wallet source is the one fatal startup condition: the error
/// propagates to `main` and the process exits non-zero.
pub(crate) async fn drive(bus: &EventBus, config: &BotConfig) -> anyhow::Result<()> {
    let wallets = match load_wallets(bus, Path::new(&config.files.wallets)) {
        Ok(wallets) => wallets,
        Err(error) => {
            bus.log(LogLevel::Error, format!("🚨 {error}. Exiting."));
            return Err(error.into());
        }
    };

    let proxies = load_proxies(bus, Path::new(&config.files.proxies));

    run_all(bus, &config.api, &config.delays, &wallets, &proxies).await;

    bus.log(LogLevel::Info, "✨ Run finished. ✨");
    Ok(())
}
