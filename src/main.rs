//! Energy War - game server CLI
//!
//! Serves the REST API or inspects stored games.

#![warn(missing_docs)]

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use energy_war::{
    BoardRenderer, GameRegistry, GameRepository, GameStore, ServerConfig, server,
};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    initialize_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            host,
            db,
            config,
        } => run_server(config, db, host, port).await,
        Command::Render {
            game,
            player,
            blind,
            db,
            config,
        } => render(config, db, &game, &player, blind),
    }
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,energy_war=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Loads layered config and applies command-line overrides.
#[instrument]
fn load_config(
    path: Option<PathBuf>,
    db: Option<String>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<ServerConfig> {
    let mut config = ServerConfig::load(path.as_deref())?;
    if let Some(db) = db {
        config.set_database(db);
    }
    if let Some(host) = host {
        config.set_host(host);
    }
    if let Some(port) = port {
        config.set_port(port);
    }
    Ok(config)
}

/// Opens the repository and brings its schema up to date.
#[instrument(skip(config), fields(database = %config.database()))]
fn open_repository(config: &ServerConfig) -> Result<GameRepository> {
    let repository = GameRepository::new(config.database().clone())?;
    repository
        .run_migrations()
        .context("Failed to prepare database schema")?;
    Ok(repository)
}

/// Run the HTTP game server
async fn run_server(
    config_path: Option<PathBuf>,
    db: Option<String>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let config = load_config(config_path, db, host, port)?;
    let repository = open_repository(&config)?;
    let registry = GameRegistry::new(Arc::new(repository), *config.tokens());

    let app = server::router(registry);
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(address = %address, database = %config.database(), "Energy War server ready");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Print a stored board
fn render(
    config_path: Option<PathBuf>,
    db: Option<String>,
    game_id: &str,
    player: &str,
    blind: bool,
) -> Result<()> {
    let config = load_config(config_path, db, None, None)?;
    let repository = open_repository(&config)?;

    let game = repository
        .find_by_id(game_id)?
        .with_context(|| format!("Game '{}' not found", game_id))?;
    let info = game.require_player(player)?;

    print!("{}", game);
    println!();
    print!(
        "{}",
        BoardRenderer::render_with_axes(info.board(), *game.size(), blind)
    );
    Ok(())
}
