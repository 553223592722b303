//! # Gamerteca CLI (`gamerteca`)
//!
//! Browse the remote game catalog through the local cache and manage a
//! personal library and game lists.
//!
//! ## Usage
//!
//! ```bash
//! gamerteca --config ./config/gamerteca.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `gamerteca init` | Create the SQLite database and run schema migrations |
//! | `gamerteca popular [--refresh]` | Popular games (cache answers unless refreshed) |
//! | `gamerteca get <id>` | One game, remote first with cache fallback |
//! | `gamerteca related <id>` | Games related to one game |
//! | `gamerteca browse genre\|platform\|developer\|year <value>` | Category browsing, cache first |
//! | `gamerteca search "<text>"` | Search by name |
//! | `gamerteca recent` | Most recently cached games |
//! | `gamerteca cache stats\|clear` | Inspect or empty the cache |
//! | `gamerteca library ...` | Statuses, favorites, ratings |
//! | `gamerteca list ...` | Named game lists |
//!
//! Ctrl-C cancels an in-flight catalog request.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use gamerteca::app::App;
use gamerteca::{commands, config, logging, migrate};
use gamerteca_core::models::GameStatus;
use gamerteca_core::query::Category;

/// Gamerteca: a game catalog with a local cache and a personal library.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/gamerteca.example.toml` for a full example.
#[derive(Parser)]
#[command(name = "gamerteca", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/gamerteca.toml")]
    config: PathBuf,

    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Popular games.
    ///
    /// A warm cache answers with its most recently written games; `--refresh`
    /// always asks the catalog first.
    Popular {
        #[arg(long)]
        refresh: bool,
    },

    /// Show one game by catalog id.
    Get { id: i64 },

    /// Games related to the given game.
    Related { id: i64 },

    /// Browse a category. Cached games answer first.
    Browse {
        #[command(subcommand)]
        by: BrowseBy,
    },

    /// Search games by name.
    Search { text: String },

    /// Most recently cached games. Never contacts the catalog.
    Recent {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Inspect or empty the local catalog cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage the personal library.
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },

    /// Manage game lists.
    List {
        #[command(subcommand)]
        action: ListAction,
    },
}

#[derive(Subcommand)]
enum BrowseBy {
    Genre { name: String },
    Platform { name: String },
    Developer { name: String },
    Year { year: i32 },
}

#[derive(Subcommand)]
enum CacheAction {
    Stats,
    Clear,
}

#[derive(Subcommand)]
enum LibraryAction {
    /// List library entries, newest first.
    Show {
        /// wishlist, playing, completed or dropped.
        #[arg(long)]
        status: Option<GameStatus>,
        #[arg(long)]
        favorites: bool,
    },
    /// Set the status of a game, adding it to the library if needed.
    Status { game_id: i64, status: GameStatus },
    /// Toggle the favorite flag.
    Favorite { game_id: i64 },
    /// Rate a game from 1 to 10. Without a rating, clears it.
    Rate { game_id: i64, rating: Option<u8> },
    /// Remove a game from the library.
    Remove { game_id: i64 },
}

#[derive(Subcommand)]
enum ListAction {
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        public: bool,
    },
    Show { list_id: String },
    Add { list_id: String, game_id: i64 },
    Remove { list_id: String, game_id: i64 },
    Share { list_id: String },
    Unshare { list_id: String },
    Delete { list_id: String },
    /// Lists owned by the current user.
    Mine,
    /// Public lists of every user.
    Public,
}

/// Cancel `token` on Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling");
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(if cli.verbose {
        "gamerteca=debug"
    } else {
        "gamerteca=warn"
    })?;

    let cfg = config::load_config(&cli.config)?;

    if let Commands::Init = cli.command {
        migrate::run_migrations(&cfg).await?;
        println!("Database initialized successfully.");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let app = App::open(&cfg).await?;
    let result = dispatch(&app, cli.command, &cancel).await;
    app.close().await;
    result
}

async fn dispatch(app: &App, command: Commands, cancel: &CancellationToken) -> anyhow::Result<()> {
    match command {
        Commands::Init => Ok(()),
        Commands::Popular { refresh } => commands::run_popular(app, refresh, cancel).await,
        Commands::Get { id } => commands::run_get(app, id, cancel).await,
        Commands::Related { id } => commands::run_related(app, id, cancel).await,
        Commands::Browse { by } => {
            let category = match by {
                BrowseBy::Genre { name } => Category::Genre(name),
                BrowseBy::Platform { name } => Category::Platform(name),
                BrowseBy::Developer { name } => Category::Developer(name),
                BrowseBy::Year { year } => Category::Year(year),
            };
            commands::run_browse(app, category, cancel).await
        }
        Commands::Search { text } => commands::run_search(app, &text, cancel).await,
        Commands::Recent { limit } => commands::run_recent(app, limit).await,
        Commands::Cache { action } => match action {
            CacheAction::Stats => commands::run_cache_stats(app).await,
            CacheAction::Clear => commands::run_cache_clear(app).await,
        },
        Commands::Library { action } => match action {
            LibraryAction::Show { status, favorites } => {
                commands::run_library_show(app, status, favorites).await
            }
            LibraryAction::Status { game_id, status } => {
                commands::run_library_status(app, game_id, status).await
            }
            LibraryAction::Favorite { game_id } => {
                commands::run_library_favorite(app, game_id).await
            }
            LibraryAction::Rate { game_id, rating } => {
                commands::run_library_rate(app, game_id, rating).await
            }
            LibraryAction::Remove { game_id } => commands::run_library_remove(app, game_id).await,
        },
        Commands::List { action } => match action {
            ListAction::Create {
                name,
                description,
                public,
            } => commands::run_list_create(app, &name, description, public).await,
            ListAction::Show { list_id } => commands::run_list_show(app, &list_id).await,
            ListAction::Add { list_id, game_id } => {
                commands::run_list_add(app, &list_id, game_id).await
            }
            ListAction::Remove { list_id, game_id } => {
                commands::run_list_remove(app, &list_id, game_id).await
            }
            ListAction::Share { list_id } => commands::run_list_share(app, &list_id, true).await,
            ListAction::Unshare { list_id } => {
                commands::run_list_share(app, &list_id, false).await
            }
            ListAction::Delete { list_id } => commands::run_list_delete(app, &list_id).await,
            ListAction::Mine => commands::run_list_index(app, false).await,
            ListAction::Public => commands::run_list_index(app, true).await,
        },
    }
}
