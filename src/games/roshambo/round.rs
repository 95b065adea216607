//! One concealed-choice round between two contestants.

use super::rules::{ProtocolError, resolve_in};
use super::{GameMode, Move, Outcome};
use crate::channel::{Reporter, report_best_effort};
use crate::participant::Contestant;
use crate::solicit::{MoveSource, SolicitError};
use derive_getters::Getters;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Why a round ended without a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Abandonment {
    /// A participant let the timeout lapse.
    Declined,
    /// Something else went wrong, e.g. a prompt could not be delivered.
    Failed(String),
}

/// A completed round.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct RoundResult {
    /// Resolved outcome, left = challenger.
    outcome: Outcome,
    /// Challenger's move.
    challenger_move: Move,
    /// Opponent's move.
    opponent_move: Move,
    /// Human-readable lines describing the round.
    summary: Vec<String>,
}

impl RoundResult {
    /// Builds a result and its summary lines.
    #[instrument(skip(challenger, opponent), fields(
        challenger = %challenger.participant(),
        opponent = %opponent.participant(),
    ))]
    pub fn new(
        challenger: &Contestant,
        opponent: &Contestant,
        challenger_move: Move,
        opponent_move: Move,
        outcome: Outcome,
    ) -> Self {
        let ch = challenger.display_name();
        let op = opponent.display_name();
        let headline = match outcome {
            Outcome::Draw => format!("{ch} and {op} both picked {challenger_move}!"),
            Outcome::LeftWins => flavour(ch, challenger_move, op, opponent_move),
            Outcome::RightWins => flavour(op, opponent_move, ch, challenger_move),
        };
        let verdict = match outcome {
            Outcome::Draw => "Result: Draw!".to_string(),
            Outcome::LeftWins => format!("Result: {ch} wins!"),
            Outcome::RightWins => format!("Result: {op} wins!"),
        };
        Self {
            outcome,
            challenger_move,
            opponent_move,
            summary: vec![
                headline,
                format!("Challenger: {ch} picked {challenger_move}"),
                format!("Opponent: {op} picked {opponent_move}"),
                verdict,
            ],
        }
    }

    /// Consumes the result, returning its summary lines.
    pub fn into_summary(self) -> Vec<String> {
        self.summary
    }
}

#[instrument]
fn flavour(winner: &str, winning: Move, loser: &str, losing: Move) -> String {
    let verb = winning.verb_against(losing).unwrap_or("beat");
    format!("{winner} {winning} {verb} {loser} {losing}!")
}

/// What a round produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundReport {
    /// Both moves were committed and resolved.
    Decided(RoundResult),
    /// The round ended without a result.
    Abandoned(Abandonment),
}

/// Runs single rounds: solicits both moves concurrently and resolves them.
#[derive(Clone)]
pub struct RoundOrchestrator {
    moves: Arc<dyn MoveSource>,
    reporter: Arc<dyn Reporter>,
    timeout: Duration,
    stagger: Duration,
}

impl std::fmt::Debug for RoundOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundOrchestrator")
            .field("timeout", &self.timeout)
            .field("stagger", &self.stagger)
            .finish_non_exhaustive()
    }
}

impl RoundOrchestrator {
    /// Creates a round orchestrator.
    ///
    /// `stagger` delays the opponent's prompt behind the challenger's so the
    /// two prompts do not interleave.
    pub fn new(
        moves: Arc<dyn MoveSource>,
        reporter: Arc<dyn Reporter>,
        timeout: Duration,
        stagger: Duration,
    ) -> Self {
        Self {
            moves,
            reporter,
            timeout,
            stagger,
        }
    }

    /// Reporter rounds announce abandonment through.
    pub fn reporter(&self) -> &Arc<dyn Reporter> {
        &self.reporter
    }

    /// Plays one round.
    ///
    /// Both solicitations run concurrently. The first failure ends the round
    /// and the sibling solicitation is dropped, closing its reply ticket.
    /// Only a [`ProtocolError`] escapes as an error.
    #[instrument(skip(self, challenger, opponent), fields(
        challenger = %challenger.participant(),
        opponent = %opponent.participant(),
    ))]
    pub async fn play_round(
        &self,
        mode: GameMode,
        challenger: &Contestant,
        opponent: &Contestant,
    ) -> Result<RoundReport, ProtocolError> {
        let challenge = format!(
            "{} has challenged you to Roshambo.\n",
            challenger.display_name()
        );
        let left = self
            .moves
            .solicit(challenger.participant(), mode, self.timeout, "");
        let right = async {
            tokio::time::sleep(self.stagger).await;
            self.moves
                .solicit(opponent.participant(), mode, self.timeout, &challenge)
                .await
        };

        let (left, right) = match tokio::try_join!(left, right) {
            Ok(picks) => picks,
            Err(SolicitError::Timeout) => {
                info!("Round abandoned: participant declined");
                let text = format!(
                    "Looks like {} and {} chickened out!",
                    challenger.display_name(),
                    opponent.display_name()
                );
                report_best_effort(self.reporter.notice(&text).await);
                return Ok(RoundReport::Abandoned(Abandonment::Declined));
            }
            Err(e) => {
                warn!(error = %e, "Round abandoned");
                let message = e.to_string();
                let text = format!("Failed to complete Roshambo: {message}");
                report_best_effort(self.reporter.notice(&text).await);
                return Ok(RoundReport::Abandoned(Abandonment::Failed(message)));
            }
        };

        let outcome = resolve_in(mode, *left.choice(), *right.choice())?;
        info!(?outcome, "Round decided");
        Ok(RoundReport::Decided(RoundResult::new(
            challenger,
            opponent,
            *left.choice(),
            *right.choice(),
            outcome,
        )))
    }
}
