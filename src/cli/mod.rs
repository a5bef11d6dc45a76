use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{self, Config};
use crate::domain::track::Track;
use crate::http::server::HttpServer;
use crate::storage::{error::StorageError, operations::Storage, seed};

#[derive(Parser)]
#[command(name = "trackstore")]
#[command(version = "0.1")]
#[command(about = "Track record service")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run http server exposing the tracks API
    Serve,
    /// List stored tracks
    List,
    /// Drop all tracks and seed the store again
    Reset,
}

fn init_logging(cfg: &config::LoggingConfig) {
    let env = env_logger::Env::default().default_filter_or(&cfg.filter);
    env_logger::Builder::from_env(env).init();
}

/// Opens the store the way `serve` does: reset and seed according to config
fn open_storage(cfg: &Config) -> Result<Storage, StorageError> {
    let mut storage = Storage::new(&cfg.database)?;
    if cfg.seed.enabled {
        seed::seed_if_empty(&mut storage)?;
    }
    Ok(storage)
}

/// Opens the store keeping whatever it holds, regardless of `reset_on_startup`
fn open_existing_storage(db_config: &config::Database) -> Result<Storage, StorageError> {
    Storage::new(&config::Database {
        reset_on_startup: false,
        ..db_config.clone()
    })
}

fn print_track(track: &Track) {
    let fields = &track.fields;
    println!(
        "[{}] {} - {} ({}, {})",
        track.id,
        fields.artist.as_deref().unwrap_or("?"),
        fields.song_name.as_deref().unwrap_or("?"),
        fields.album.as_deref().unwrap_or("?"),
        fields
            .release_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "?".to_string()),
    );
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = Config::load(&cli.config)?;
    init_logging(&cfg.logging);

    match &cli.command {
        Commands::Serve => {
            let storage = open_storage(&cfg).context("Failed to initialize storage")?;

            let http_server = HttpServer::new(storage, cfg.http);

            println!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }

        Commands::List => {
            let storage =
                open_existing_storage(&cfg.database).context("Failed to initialize storage")?;

            let tracks = storage.list()?;
            println!("Tracks ({}):", tracks.len());
            for track in &tracks {
                print_track(track);
            }
        }

        Commands::Reset => {
            let mut storage =
                open_existing_storage(&cfg.database).context("Failed to initialize storage")?;
            storage.reset()?;
            let seeded = if cfg.seed.enabled {
                seed::seed_if_empty(&mut storage)?
            } else {
                0
            };
            println!("Store reset, seeded {seeded} tracks");
        }
    }

    Ok(())
}
