//! Extended Roshambo: moves, winner resolution, rounds and series.

mod round;
mod rules;
mod series;
mod types;

pub use round::{Abandonment, RoundOrchestrator, RoundReport, RoundResult};
pub use rules::{ProtocolError, resolve_codes, resolve_in};
pub use series::{SERIES_TARGET, SeriesOrchestrator, SeriesPhase, SeriesReport, SeriesState};
pub use types::{GameMode, Move, Outcome, Side};
