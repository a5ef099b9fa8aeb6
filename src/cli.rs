use crate::domain::models::{Decision, Status};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vawards", version, about = "Volunteer award nominations")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        help = "Nomination ledger file (default: ~/.local/share/vawards/nominations.json)"
    )]
    pub store: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Config file (default: ~/.config/vawards/config.toml)"
    )]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a draft nomination.
    Create {
        #[arg(long)]
        nominator: String,
        #[arg(long)]
        nominee: String,
        #[arg(long)]
        cycle: String,
        #[arg(long)]
        justification: String,
    },
    /// Change a draft; only its nominator may do so.
    Edit {
        id: String,
        #[arg(long = "as")]
        actor: String,
        #[arg(long)]
        nominee: Option<String>,
        #[arg(long)]
        cycle: Option<String>,
        #[arg(long)]
        justification: Option<String>,
    },
    Submit {
        id: String,
    },
    StartReview {
        id: String,
        #[arg(long)]
        reviewer: String,
    },
    Review {
        id: String,
        #[arg(long, value_enum)]
        decision: Decision,
        #[arg(long)]
        reviewer: Option<String>,
    },
    Vote {
        id: String,
    },
    Show {
        id: String,
    },
    List {
        #[arg(long)]
        cycle: Option<String>,
        #[arg(long, value_enum)]
        status: Option<Status>,
    },
    Kobo {
        #[command(subcommand)]
        command: KoboCommands,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum KoboCommands {
    /// Import one page of submissions.
    Pull {
        #[arg(long, default_value_t = 10)]
        page_size: u32,
        #[arg(long, default_value_t = 1)]
        start_page: u32,
        #[arg(long, default_value_t = false)]
        with_attachments: bool,
        #[arg(long, default_value_t = false)]
        log_missing: bool,
    },
    /// Import every page of submissions.
    PullAll {
        #[arg(long, default_value_t = 500)]
        page_size: u32,
        #[arg(long, default_value_t = false)]
        with_attachments: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    Show,
}
