//! Strictly Roshambo library - concealed-choice match engine
//!
//! Runs rock/paper/scissors (optionally lizard/spock) matches between two
//! participants over a private messaging channel the host provides.
//!
//! # Architecture
//!
//! - **Games**: moves, winner resolution, round and best-of-3 orchestration
//! - **Solicit**: prompt / validate / retry / timeout for one participant
//! - **Channel**: messaging traits and ticketed reply routing
//! - **Session**: exclusive match slots and the match command
//! - **Record**: head-to-head results and odds
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_roshambo::{
//!     ConsoleChannel, Contestant, GameMode, HeadToHeadLedger, MatchConfig, MatchRegistry,
//!     MatchRunner, Participant, ReplyRouter,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let console = Arc::new(ConsoleChannel);
//! let runner = MatchRunner::new(
//!     &MatchConfig::default(),
//!     console.clone(),
//!     console,
//!     ReplyRouter::new(),
//!     Arc::new(MatchRegistry::new()),
//!     Arc::new(HeadToHeadLedger::new()),
//! );
//! let alice = Contestant::new(Participant::from_id("alice"), "Alice".to_string());
//! let bot = Contestant::new(Participant::Automatic, "Roshambot".to_string());
//! runner.run(GameMode::BestOfThree, &alice, &bot).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod channel;
mod config;
mod console;
mod games;
mod participant;
mod record;
mod session;
mod solicit;

// Crate-level exports - Game types
pub use games::roshambo::{
    Abandonment, GameMode, Move, Outcome, ProtocolError, RoundOrchestrator, RoundReport,
    RoundResult, SERIES_TARGET, SeriesOrchestrator, SeriesPhase, SeriesReport, SeriesState, Side,
    resolve_codes, resolve_in,
};

// Crate-level exports - Participants
pub use participant::{Contestant, Participant, ParticipantId, RandomPicker};

// Crate-level exports - Messaging
pub use channel::{
    DeliveryError, Messenger, PendingReply, ReplyRouter, Reporter, WaitError, report_best_effort,
};

// Crate-level exports - Solicitation
pub use solicit::{
    INVALID_SELECTION, MoveSource, RESPONSE_ACCEPTED, SolicitError, Solicitation, Solicitor,
    parse_reply, prompt_text,
};

// Crate-level exports - Sessions
pub use session::{MatchGate, MatchOutcome, MatchRegistry, MatchRunner, MatchSlot};

// Crate-level exports - Records
pub use record::{HeadToHeadLedger, Odds, RecordKeeper};

// Crate-level exports - Configuration
pub use config::{ConfigError, MatchConfig};

// Crate-level exports - Terminal glue
pub use console::{ConsoleChannel, address_line, pump_stdin};
