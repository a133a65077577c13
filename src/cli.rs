//! Command-line interface for energy_war.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Energy War - turn-based power plant strike game server
#[derive(Parser, Debug)]
#[command(name = "energy_war")]
#[command(about = "Turn-based power plant strike game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Port to bind to (overrides config and SERVER_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config and SERVER_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Path to the SQLite database (overrides config and DB_URI)
        #[arg(long)]
        db: Option<String>,

        /// Path to a TOML config file (defaults to energy_war.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print a player's board from the database as a labelled grid
    Render {
        /// Game id
        game: String,

        /// Player name
        player: String,

        /// Hide plant positions, as an opponent would see the board
        #[arg(long)]
        blind: bool,

        /// Path to the SQLite database (overrides config and DB_URI)
        #[arg(long)]
        db: Option<String>,

        /// Path to a TOML config file (defaults to energy_war.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
