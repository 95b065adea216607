//! Strictly Roshambo - terminal front end.
//!
//! Runs one match with prompts on stdout and replies read from stdin.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use std::sync::Arc;
use strictly_roshambo::{
    ConsoleChannel, Contestant, GameMode, HeadToHeadLedger, MatchConfig, MatchRegistry,
    MatchRunner, Participant, ReplyRouter, pump_stdin,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Play {
            mode,
            challenger,
            opponent,
            config,
            timeout,
        } => run_match(mode, challenger, opponent, config, timeout).await,
        Command::Rules { mode } => {
            print_rules(mode);
            Ok(())
        }
    }
}

/// Play one match on the terminal
#[instrument]
async fn run_match(
    mode: GameMode,
    challenger: String,
    opponent: String,
    config: Option<PathBuf>,
    timeout: Option<u64>,
) -> Result<()> {
    let mut config = match config {
        Some(path) => MatchConfig::from_file(path)?,
        None => MatchConfig::default(),
    };
    if let Some(secs) = timeout {
        config = config.with_timeout_secs(secs);
    }

    let challenger = contestant(&challenger);
    let opponent = contestant(&opponent);
    let humans: Vec<_> = [challenger.participant(), opponent.participant()]
        .into_iter()
        .filter_map(Participant::human_id)
        .cloned()
        .collect();

    let router = ReplyRouter::new();
    let console = Arc::new(ConsoleChannel);
    let runner = MatchRunner::new(
        &config,
        console.clone(),
        console,
        router.clone(),
        Arc::new(MatchRegistry::new()),
        Arc::new(HeadToHeadLedger::new()),
    );

    std::thread::spawn(move || pump_stdin(router, humans));
    let outcome = runner.run(mode, &challenger, &opponent).await?;

    info!(?outcome, "Done");
    Ok(())
}

fn contestant(id: &str) -> Contestant {
    let participant = Participant::from_id(id);
    let name = match &participant {
        Participant::Automatic => "Roshambot".to_string(),
        Participant::Human(id) => id.to_string(),
    };
    Contestant::new(participant, name)
}

fn print_rules(mode: GameMode) {
    println!("Mode: {mode}");
    for mv in mode.legal_moves() {
        let beats: Vec<_> = mv
            .beats()
            .into_iter()
            .filter(|other| mode.allows(*other))
            .map(|other| other.description())
            .collect();
        println!("  ({}) {} beats {}", mv.code(), mv.description(), beats.join(" and "));
    }
}
