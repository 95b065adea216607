//! Command-line interface for strictly_roshambo.

use clap::{Parser, Subcommand};
use strictly_roshambo::GameMode;

/// Strictly Roshambo - concealed-choice rock, paper, scissors
#[derive(Parser, Debug)]
#[command(name = "strictly_roshambo")]
#[command(about = "Roshambo matches with concealed, timed selections", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a match on this terminal
    Play {
        /// Game mode: classic, bo3 or ls
        #[arg(short, long, default_value = "classic")]
        mode: GameMode,

        /// Challenger id (must be a person)
        #[arg(long)]
        challenger: String,

        /// Opponent id, or `ai` for the automatic player
        #[arg(long, default_value = "ai")]
        opponent: String,

        /// Path to a TOML match config
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Override the reply timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Print the legal moves and what each one beats
    Rules {
        /// Game mode: classic, bo3 or ls
        #[arg(short, long, default_value = "classic")]
        mode: GameMode,
    },
}
