//! Winner resolution under the beats-relation.

use super::{GameMode, Move, Outcome};
use derive_more::{Display, Error};
use tracing::{error, instrument};

/// A move reached the resolver that should have been rejected upstream.
///
/// This is a programming error, never a user error, and must not be
/// coerced into a game outcome.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Protocol error: {} at {}:{}", message, file, line)]
pub struct ProtocolError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ProtocolError {
    /// Creates a new protocol error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(%message, "Protocol error");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl Outcome {
    /// Resolves an ordered pair of moves.
    pub fn resolve(left: Move, right: Move) -> Outcome {
        if left == right {
            Outcome::Draw
        } else if left.defeats(right) {
            Outcome::LeftWins
        } else {
            Outcome::RightWins
        }
    }
}

/// Resolves two moves after checking both are legal in `mode`.
#[instrument]
pub fn resolve_in(mode: GameMode, left: Move, right: Move) -> Result<Outcome, ProtocolError> {
    for mv in [left, right] {
        if !mode.allows(mv) {
            return Err(ProtocolError::new(format!(
                "Unable to determine Roshambo winner: {mv:?} is not legal in {mode}"
            )));
        }
    }
    Ok(Outcome::resolve(left, right))
}

/// Resolves two raw move codes.
#[instrument]
pub fn resolve_codes(left: char, right: char) -> Result<Outcome, ProtocolError> {
    let lookup = |code: char| {
        Move::from_code(code).ok_or_else(|| {
            ProtocolError::new(format!(
                "Unable to determine Roshambo winner: invalid selection {code:?}"
            ))
        })
    };
    Ok(Outcome::resolve(lookup(left)?, lookup(right)?))
}
