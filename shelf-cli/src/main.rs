//! shelf CLI
//!
//! Keeps a unified game library in sync with the storefronts you own games on.

mod commands;
mod error;
mod progress;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use shelf_lib::{
    CancellationToken, FileStateStore, LibrarySyncManager, RateLimiter, Reconciler, StorePlatform,
    SyncSettings,
};
use shelf_remote::IgdbClient;

pub(crate) use error::CliError;

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Sync owned games into a catalog-backed library", long_about = None)]
struct Cli {
    /// Library to operate on
    #[arg(short, long, global = true, default_value = "default")]
    user: String,

    /// Directory holding library snapshots (overrides settings.toml)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch owned games and reconcile the new ones against IGDB
    Sync {
        /// Store to sync from
        #[arg(short, long, default_value = "steam")]
        platform: StorePlatform,

        /// Also retry records that previously found no match
        #[arg(long)]
        retry: bool,
    },

    /// Show library totals, configuration and key sources
    Status {
        /// List every library entry
        #[arg(short, long)]
        entries: bool,
    },

    /// List owned games that have no catalog match yet
    Unreconciled,

    /// Match an unreconciled game to an explicit IGDB id
    Match {
        /// Store id of the unreconciled game (e.g. the Steam app id)
        source_id: i64,

        /// IGDB game id to link it to
        catalog_id: u64,

        /// Store the game was synced from
        #[arg(short, long, default_value = "steam")]
        platform: StorePlatform,
    },
}

/// Shared state for every command.
pub(crate) struct Context {
    pub user: String,
    pub settings: SyncSettings,
}

impl Context {
    pub(crate) fn store(&self) -> FileStateStore {
        FileStateStore::new(&self.settings.state_dir)
    }

    pub(crate) fn load_library(&self) -> Result<LibrarySyncManager<FileStateStore>, CliError> {
        Ok(LibrarySyncManager::load(&self.user, self.store())?)
    }

    pub(crate) fn reconciler(&self, catalog: IgdbClient) -> Reconciler<IgdbClient> {
        let limiter = Arc::new(RateLimiter::new(self.settings.qps));
        Reconciler::new(catalog, limiter).with_max_workers(self.settings.max_workers)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Cancellation token tripped by Ctrl-C. Must be called inside the runtime.
pub(crate) fn ctrl_c_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, stopping after in-flight lookups");
            token.cancel();
        }
    });
    cancel
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    Ok(tokio::runtime::Runtime::new()?)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Context {
        user: cli.user,
        settings: SyncSettings::load().with_state_dir(cli.state_dir),
    };

    let result = match cli.command {
        Commands::Sync { platform, retry } => commands::sync::run_sync(&ctx, platform, retry),
        Commands::Status { entries } => commands::library::run_status(&ctx, entries),
        Commands::Unreconciled => commands::library::run_unreconciled(&ctx),
        Commands::Match {
            source_id,
            catalog_id,
            platform,
        } => commands::sync::run_match(&ctx, platform, source_id, catalog_id),
    };

    if let Err(e) = result {
        if e.is_cancelled() {
            eprintln!("Cancelled, library left unchanged.");
        } else {
            eprintln!("{} {}", "\u{2718}".if_supports_color(Stderr, |t| t.red()), e);
        }
        std::process::exit(1);
    }
}
