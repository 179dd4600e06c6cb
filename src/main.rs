//! guardlink - enroll a Steam Guard mobile authenticator from the terminal.
//!
//! The tool logs the operator into the account (handling email-code and
//! CAPTCHA challenges interactively), requests authenticator enrollment,
//! and writes the returned secrets to a local JSON file. Confirming the
//! authenticator with the SMS code in the mobile app remains a manual step.

mod api;
mod auth;
mod config;
mod prompt;
mod secrets;
mod workflow;

use std::io;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use api::AuthClient;
use config::Config;
use prompt::TerminalPrompt;
use workflow::Outcome;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug).
    // Logs go to stderr; stdout is reserved for operator prompts and
    // guidance. Secret values are never logged.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("guardlink starting");

    let mut config = Config::load()?;
    let mut client = AuthClient::new()?;
    let mut prompt = TerminalPrompt;

    let outcome = workflow::run(&mut client, &mut prompt, &mut config).await?;

    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    info!(?outcome, "guardlink finished");
    match outcome {
        Outcome::Enrolled => Ok(()),
        other => std::process::exit(other.exit_code()),
    }
}
