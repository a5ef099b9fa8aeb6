use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod domain;
mod services;

use cli::Cli;
use commands::{handle_config_commands, handle_kobo_commands, handle_nomination_commands};
use domain::constants::LOG_JSON_ENV;
use services::config::load_config;
use services::nominations::NominationManager;
use services::output::print_error;
use services::storage::{default_store_path, JsonFileStore};

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

/// Logs go to stderr so `--json` stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if env_bool(LOG_JSON_ENV, false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    let store_path = match (&cli.store, &cfg.store.path) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => p.into(),
        (None, None) => default_store_path()?,
    };
    let store = JsonFileStore::open(store_path);

    if handle_config_commands(cli, &cfg, &store)? {
        return Ok(());
    }

    let mut manager = NominationManager::new(store, cfg.review.clone());
    if handle_kobo_commands(cli, &cfg, &mut manager)? {
        return Ok(());
    }
    handle_nomination_commands(cli, &mut manager)?;
    Ok(())
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        tracing::debug!(error = ?e, "command failed");
        print_error(cli.json, &e);
        std::process::exit(1);
    }
}
