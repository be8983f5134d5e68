//! StockSync - partner inventory sync
//!
//! Main entry point for one sync run.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use stocksync_app::context::load_config;
use stocksync_app::{exit_code, render_json, render_text, AppContext, Cli, EXIT_FAULT};
use stocksync_infra::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional; real environment variables win
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    match run(cli, dotenv.is_ok()).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "app.run_aborted");
            #[allow(clippy::print_stderr)]
            {
                eprintln!("stocksync: {err:#}");
            }
            ExitCode::from(EXIT_FAULT)
        }
    }
}

async fn run(cli: Cli, dotenv_loaded: bool) -> anyhow::Result<u8> {
    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(&config.logging).context("failed to initialise logging")?;
    tracing::debug!(dotenv_loaded, "app.environment_loaded");

    let ctx = AppContext::new(config).context("failed to start sync run")?;
    let result = ctx.run(cli.partner.as_deref()).await.context("inventory sync failed")?;

    if cli.json {
        println!("{}", render_json(&result).context("failed to encode summary")?);
    } else {
        print!("{}", render_text(&result));
    }

    Ok(exit_code(&result))
}
