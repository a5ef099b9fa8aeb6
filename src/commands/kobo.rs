use crate::cli::{Cli, Commands, ConfigCommands, KoboCommands};
use crate::domain::models::ConfigFile;
use crate::services::config::kobo_token;
use crate::services::kobo::{pull_all, pull_batch, KoboClient, PullOptions};
use crate::services::nominations::NominationManager;
use crate::services::output::print_one;
use crate::services::storage::JsonFileStore;
use std::path::PathBuf;

fn attachments_root(store: &JsonFileStore) -> PathBuf {
    store
        .path()
        .parent()
        .map(|p| p.join("attachments"))
        .unwrap_or_else(|| PathBuf::from("attachments"))
}

pub fn handle_kobo_commands(
    cli: &Cli,
    cfg: &ConfigFile,
    manager: &mut NominationManager<JsonFileStore>,
) -> anyhow::Result<bool> {
    let Commands::Kobo { command } = &cli.command else {
        return Ok(false);
    };

    let client = KoboClient::new(&cfg.kobo, kobo_token(cfg)?)?;
    let root = attachments_root(manager.store());

    match command {
        KoboCommands::Pull {
            page_size,
            start_page,
            with_attachments,
            log_missing,
        } => {
            let opts = PullOptions {
                page_size: *page_size,
                start_page: *start_page,
                with_attachments: *with_attachments,
                log_missing: *log_missing,
                attachments_root: root,
            };
            let report = pull_batch(&client, manager.store_mut(), &cfg.kobo, &opts)?;
            print_one(cli.json, report, |r| {
                format!(
                    "imported {} from page {} (next: {})",
                    r.imported,
                    r.start_page,
                    r.next_page
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "none".to_string())
                )
            })?;
        }
        KoboCommands::PullAll {
            page_size,
            with_attachments,
        } => {
            let opts = PullOptions {
                page_size: *page_size,
                start_page: 1,
                with_attachments: *with_attachments,
                log_missing: false,
                attachments_root: root,
            };
            let report = pull_all(&client, manager.store_mut(), &cfg.kobo, &opts)?;
            print_one(cli.json, report, |r| format!("imported {}", r.imported))?;
        }
    }

    Ok(true)
}

pub fn handle_config_commands(
    cli: &Cli,
    cfg: &ConfigFile,
    store: &JsonFileStore,
) -> anyhow::Result<bool> {
    let Commands::Config { command } = &cli.command else {
        return Ok(false);
    };

    match command {
        ConfigCommands::Show => {
            let data = serde_json::json!({
                "store": store.path().to_string_lossy(),
                "review": cfg.review,
                "kobo": cfg.kobo,
                "kobo_token_set": kobo_token(cfg).is_ok(),
            });
            print_one(cli.json, data, |d| {
                toml::to_string_pretty(d).unwrap_or_else(|_| d.to_string())
            })?;
        }
    }

    Ok(true)
}
