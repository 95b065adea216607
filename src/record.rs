//! Head-to-head records between pairs of participants.

use crate::games::roshambo::{GameMode, Side};
use crate::participant::Contestant;
use derive_getters::Getters;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

/// Estimated chance of winning for each side of a pairing.
#[derive(Debug, Clone, Copy, PartialEq, Getters)]
pub struct Odds {
    /// Challenger's chance, 0.0 to 1.0.
    challenger: f64,
    /// Opponent's chance, 0.0 to 1.0.
    opponent: f64,
}

impl Odds {
    /// Challenger's chance as a whole percentage.
    pub fn challenger_percent(&self) -> u32 {
        (self.challenger * 100.0).round() as u32
    }

    /// Opponent's chance as a whole percentage.
    pub fn opponent_percent(&self) -> u32 {
        (self.opponent * 100.0).round() as u32
    }
}

/// Keeps the cumulative record of decided matches.
pub trait RecordKeeper: Send + Sync {
    /// Records a decided match and returns lines describing the updated record.
    fn record(
        &self,
        mode: GameMode,
        challenger: &Contestant,
        opponent: &Contestant,
        winner: Side,
    ) -> Vec<String>;

    /// Current odds for a pairing.
    fn odds(&self, mode: GameMode, challenger: &Contestant, opponent: &Contestant) -> Odds;

    /// Leaderboard position in `mode`, ranked by total wins. Ties share a
    /// position; the leader is 1.
    fn position(&self, mode: GameMode, contestant: &Contestant) -> u32;
}

/// Pair key with the two participant keys in sorted order.
type PairKey = (GameMode, String, String);

/// Wins for the lower and higher sorted participant of a pair.
#[derive(Debug, Clone, Copy, Default)]
struct PairRecord {
    low_wins: u32,
    high_wins: u32,
}

/// In-memory record keeper. Nothing survives the process.
#[derive(Debug, Default)]
pub struct HeadToHeadLedger {
    records: Mutex<HashMap<PairKey, PairRecord>>,
}

#[instrument(skip(a, b), fields(a = %a.participant(), b = %b.participant()))]
fn pair_key(mode: GameMode, a: &Contestant, b: &Contestant) -> (PairKey, bool) {
    let a = a.participant().to_string();
    let b = b.participant().to_string();
    if a <= b {
        ((mode, a, b), true)
    } else {
        ((mode, b, a), false)
    }
}

impl HeadToHeadLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wins recorded for (challenger, opponent).
    #[instrument(skip(self, challenger, opponent))]
    pub fn wins(&self, mode: GameMode, challenger: &Contestant, opponent: &Contestant) -> (u32, u32) {
        let (key, challenger_low) = pair_key(mode, challenger, opponent);
        let record = self
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .copied()
            .unwrap_or_default();
        if challenger_low {
            (record.low_wins, record.high_wins)
        } else {
            (record.high_wins, record.low_wins)
        }
    }
}

impl RecordKeeper for HeadToHeadLedger {
    #[instrument(skip(self, challenger, opponent))]
    fn record(
        &self,
        mode: GameMode,
        challenger: &Contestant,
        opponent: &Contestant,
        winner: Side,
    ) -> Vec<String> {
        let (key, challenger_low) = pair_key(mode, challenger, opponent);
        {
            let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
            let record = records.entry(key).or_default();
            match (winner, challenger_low) {
                (Side::Challenger, true) | (Side::Opponent, false) => record.low_wins += 1,
                (Side::Challenger, false) | (Side::Opponent, true) => record.high_wins += 1,
            }
        }
        let (ch_wins, op_wins) = self.wins(mode, challenger, opponent);
        info!(ch_wins, op_wins, "Recorded match result");
        vec![
            format!("{}: {} wins", challenger.display_name(), ch_wins),
            format!("{}: {} wins", opponent.display_name(), op_wins),
            format!("Total: {} games", ch_wins + op_wins),
        ]
    }

    fn odds(&self, mode: GameMode, challenger: &Contestant, opponent: &Contestant) -> Odds {
        let (ch_wins, op_wins) = self.wins(mode, challenger, opponent);
        // Laplace smoothing keeps a fresh pairing at even odds.
        let games = f64::from(ch_wins + op_wins) + 2.0;
        let odds = Odds {
            challenger: (f64::from(ch_wins) + 1.0) / games,
            opponent: (f64::from(op_wins) + 1.0) / games,
        };
        debug!(?odds, "Computed odds");
        odds
    }

    #[instrument(skip(self, contestant), fields(contestant = %contestant.participant()))]
    fn position(&self, mode: GameMode, contestant: &Contestant) -> u32 {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let mut totals: HashMap<&str, u32> = HashMap::new();
        for ((key_mode, low, high), record) in records.iter() {
            if *key_mode != mode {
                continue;
            }
            *totals.entry(low.as_str()).or_default() += record.low_wins;
            *totals.entry(high.as_str()).or_default() += record.high_wins;
        }
        let id = contestant.participant().to_string();
        let own = totals.get(id.as_str()).copied().unwrap_or_default();
        let ahead = totals.values().filter(|wins| **wins > own).count();
        let position = u32::try_from(ahead).unwrap_or(u32::MAX).saturating_add(1);
        debug!(own, position, "Computed leaderboard position");
        position
    }
}
