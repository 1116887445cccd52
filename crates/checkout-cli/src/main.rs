//! # Strategy Checkout
//!
//! Payment strategy demo and scenario runner.
//!
//! ## Usage
//!
//! ```bash
//! # Scripted walkthrough
//! checkout-demo demo
//!
//! # Run a scenario and print the outcome as JSON
//! checkout-demo run scenarios/laptop.toml
//!
//! # Check a scenario's wallets without paying
//! CHECKOUT_REJECT_EXPIRED_CARDS=true checkout-demo validate scenarios/laptop.toml
//! ```

use anyhow::Context;
use checkout_cli::{demo, AppConfig, LogFormat, Scenario};
use checkout_core::PaymentProcessor;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "checkout-demo")]
#[command(author, version, about = "Payment strategy checkout demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scripted walkthrough of success and failure paths
    Demo,
    /// Run a scenario file and print the checkout outcome as JSON
    Run {
        /// Path to the scenario TOML
        path: PathBuf,
    },
    /// Validate every wallet in a scenario without paying
    Validate {
        /// Path to the scenario TOML
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    init_tracing(config.log_format);
    info!("Environment: {}", config.environment);

    let today = chrono::Utc::now().date_naive();
    let processor =
        PaymentProcessor::new(config.event_sink()).with_policy(config.validation_policy(today));

    match cli.command {
        Commands::Demo => {
            print_banner();
            demo::run(&processor, config.currency)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run { path } => {
            let scenario = Scenario::load(&path)?;
            let run = scenario
                .run(&processor, config.currency)
                .with_context(|| format!("Scenario {} could not be set up", path.display()))?;
            println!("{}", serde_json::to_string_pretty(&run.outcome)?);
            Ok(if run.outcome.is_paid() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Validate { path } => {
            let scenario = Scenario::load(&path)?;
            let reports = scenario
                .validate(&processor)
                .with_context(|| format!("Scenario {} could not be set up", path.display()))?;
            println!("{}", serde_json::to_string_pretty(&reports)?);
            Ok(if reports.iter().all(|r| r.valid) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

/// Logs go to stderr; stdout carries command output
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn print_banner() {
    println!(
        r#"
  Strategy Checkout
  ━━━━━━━━━━━━━━━━━━━━━━━
  Card · PayPal · Crypto
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
