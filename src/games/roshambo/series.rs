//! Best-of-3 series with draw replay.

use super::round::{RoundOrchestrator, RoundReport};
use super::rules::ProtocolError;
use super::{GameMode, Outcome, Side};
use crate::channel::report_best_effort;
use crate::participant::Contestant;
use crate::record::RecordKeeper;
use derive_getters::Getters;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Decisive rounds counted in a series.
pub const SERIES_TARGET: u32 = 3;

/// Where a series is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesPhase {
    /// No round has started.
    NotStarted,
    /// A round is being played or replayed.
    RoundInProgress,
    /// Three decisive rounds were played.
    Finished(Side),
    /// A round was abandoned; the score is discarded.
    Abandoned,
}

/// Running tally of a series. Updated one round at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct SeriesState {
    /// Rounds played so far, replayed draws included.
    rounds_played: u32,
    /// Decisive rounds counted toward the target.
    decisive_rounds: u32,
    /// Positive favours the challenger, negative the opponent.
    score_delta: i32,
    /// Decisive rounds needed to finish.
    target: u32,
    /// Set once a round is abandoned. The tally is discarded.
    abandoned: bool,
}

impl Default for SeriesState {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesState {
    /// A fresh best-of-3 tally.
    pub fn new() -> Self {
        Self {
            rounds_played: 0,
            decisive_rounds: 0,
            score_delta: 0,
            target: SERIES_TARGET,
            abandoned: false,
        }
    }

    /// Returns the tally after one more round with `outcome`.
    pub fn after(self, outcome: Outcome) -> Self {
        Self {
            rounds_played: self.rounds_played + 1,
            decisive_rounds: self.decisive_rounds + u32::from(outcome.is_decisive()),
            score_delta: self.score_delta + outcome.score(),
            target: self.target,
            abandoned: self.abandoned,
        }
    }

    /// Returns the tally marked as abandoned.
    pub fn abandon(self) -> Self {
        Self {
            abandoned: true,
            ..self
        }
    }

    /// True once the target number of decisive rounds has been counted.
    pub fn is_complete(&self) -> bool {
        self.decisive_rounds >= self.target
    }

    /// Phase implied by this tally.
    pub fn phase(&self) -> SeriesPhase {
        if self.abandoned {
            SeriesPhase::Abandoned
        } else if self.rounds_played == 0 {
            SeriesPhase::NotStarted
        } else if self.is_complete() {
            SeriesPhase::Finished(self.leader())
        } else {
            SeriesPhase::RoundInProgress
        }
    }

    /// Side currently ahead. Ties go to the opponent, which cannot happen
    /// once an odd number of decisive rounds is counted.
    pub fn leader(&self) -> Side {
        if self.score_delta > 0 {
            Side::Challenger
        } else {
            Side::Opponent
        }
    }
}

/// How a series ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesReport {
    /// Three decisive rounds were counted.
    Won {
        /// Winning side.
        winner: Side,
        /// Final tally.
        state: SeriesState,
    },
    /// A round was abandoned. No winner and no score.
    Abandoned,
}

/// Runs best-of-3 series, one round at a time.
#[derive(Clone)]
pub struct SeriesOrchestrator {
    rounds: RoundOrchestrator,
    records: Arc<dyn RecordKeeper>,
    pacing: Duration,
}

impl std::fmt::Debug for SeriesOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeriesOrchestrator")
            .field("rounds", &self.rounds)
            .field("pacing", &self.pacing)
            .finish_non_exhaustive()
    }
}

impl SeriesOrchestrator {
    /// Creates a series orchestrator.
    ///
    /// `pacing` is slept between messages so they arrive in order.
    pub fn new(rounds: RoundOrchestrator, records: Arc<dyn RecordKeeper>, pacing: Duration) -> Self {
        Self {
            rounds,
            records,
            pacing,
        }
    }

    /// Plays a best-of-3 series. Drawn rounds are replayed and not counted.
    #[instrument(skip(self, challenger, opponent), fields(
        challenger = %challenger.participant(),
        opponent = %opponent.participant(),
    ))]
    pub async fn play_series(
        &self,
        challenger: &Contestant,
        opponent: &Contestant,
    ) -> Result<SeriesReport, ProtocolError> {
        let reporter = self.rounds.reporter();
        let (ch, op) = (challenger.display_name(), opponent.display_name());
        let mut state = SeriesState::new();

        let winner = loop {
            debug!(?state, "Starting round");
            let result = match self
                .rounds
                .play_round(GameMode::BestOfThree, challenger, opponent)
                .await?
            {
                RoundReport::Decided(result) => result,
                RoundReport::Abandoned(reason) => {
                    let state = state.abandon();
                    info!(?reason, phase = ?state.phase(), ?state, "Series abandoned");
                    let text = format!("Best of 3 cancelled between {ch} and {op}");
                    report_best_effort(reporter.notice(&text).await);
                    return Ok(SeriesReport::Abandoned);
                }
            };

            state = state.after(*result.outcome());

            if !result.outcome().is_decisive() {
                info!(rounds_played = state.rounds_played, "Draw, replaying round");
                let lines = vec![
                    format!(
                        "{ch}: {}, {op}: {}",
                        result.challenger_move(),
                        result.opponent_move()
                    ),
                    "Result: Draw! ... Replaying ...".to_string(),
                ];
                report_best_effort(reporter.round_summary(&lines).await);
                continue;
            }

            let mut lines = result.into_summary();
            if !state.is_complete() {
                lines.push("Starting the next round...".to_string());
            }
            tokio::time::sleep(self.pacing).await;
            report_best_effort(reporter.round_summary(&lines).await);
            tokio::time::sleep(self.pacing).await;

            if let SeriesPhase::Finished(winner) = state.phase() {
                break winner;
            }
        };

        let (winner_contestant, winner_name) = match winner {
            Side::Challenger => (challenger, ch),
            Side::Opponent => (opponent, op),
        };
        info!(?winner, score_delta = state.score_delta, "Series finished");
        debug!(winner = %winner_contestant.participant(), "Recording series result");
        let record = self
            .records
            .record(GameMode::BestOfThree, challenger, opponent, winner);
        report_best_effort(reporter.series_outcome(winner_name, &record).await);

        Ok(SeriesReport::Won { winner, state })
    }
}
