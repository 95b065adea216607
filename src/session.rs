//! Match sessions: the exclusive match slot and the match command.

use crate::channel::{Messenger, ReplyRouter, Reporter, report_best_effort};
use crate::config::MatchConfig;
use crate::games::roshambo::{
    GameMode, ProtocolError, RoundOrchestrator, RoundReport, SeriesOrchestrator, SeriesReport,
    Side,
};
use crate::participant::{Contestant, Participant, ParticipantId, RandomPicker};
use crate::record::RecordKeeper;
use crate::solicit::{MoveSource, Solicitor};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Gate allowing each participant at most one active match.
pub trait MatchGate: Send + Sync {
    /// Marks both participants as in a game. Returns `false` if either already is.
    fn acquire(&self, mode: GameMode, a: &Participant, b: &Participant) -> bool;

    /// Clears the in-game mark for both participants.
    fn release(&self, mode: GameMode, a: &Participant, b: &Participant);
}

/// In-memory [`MatchGate`] keyed by participant, across all modes.
///
/// A participant has one private reply channel, so a second concurrent
/// match would compete for the same replies. The automatic player is never
/// registered, so it can play any number of matches at once.
#[derive(Debug, Clone, Default)]
pub struct MatchRegistry {
    active: Arc<Mutex<HashSet<ParticipantId>>>,
}

impl MatchRegistry {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating match registry");
        Self::default()
    }

    /// True while `participant` is in a match of any mode.
    #[instrument(skip(self))]
    pub fn is_active(&self, participant: &Participant) -> bool {
        participant.human_id().is_some_and(|id| {
            self.active
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .contains(id)
        })
    }
}

impl MatchGate for MatchRegistry {
    #[instrument(skip(self))]
    fn acquire(&self, mode: GameMode, a: &Participant, b: &Participant) -> bool {
        let keys: Vec<_> = [a, b]
            .into_iter()
            .filter_map(Participant::human_id)
            .cloned()
            .collect();

        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if keys.iter().any(|key| active.contains(key)) {
            warn!("Participant already in a game");
            return false;
        }
        active.extend(keys);
        debug!(active = active.len(), "Match slot acquired");
        true
    }

    #[instrument(skip(self))]
    fn release(&self, mode: GameMode, a: &Participant, b: &Participant) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        for id in [a, b].into_iter().filter_map(Participant::human_id) {
            active.remove(id);
        }
        debug!(active = active.len(), "Match slot released");
    }
}

/// Lease on an acquired match slot. Released exactly once, on drop.
pub struct MatchSlot {
    gate: Arc<dyn MatchGate>,
    mode: GameMode,
    a: Participant,
    b: Participant,
}

impl std::fmt::Debug for MatchSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchSlot")
            .field("mode", &self.mode)
            .field("a", &self.a)
            .field("b", &self.b)
            .finish_non_exhaustive()
    }
}

impl MatchSlot {
    /// Acquires the slot for both participants, or `None` if either is busy.
    pub fn acquire(
        gate: Arc<dyn MatchGate>,
        mode: GameMode,
        a: &Participant,
        b: &Participant,
    ) -> Option<Self> {
        gate.acquire(mode, a, b).then(|| Self {
            gate,
            mode,
            a: a.clone(),
            b: b.clone(),
        })
    }
}

impl Drop for MatchSlot {
    fn drop(&mut self) {
        self.gate.release(self.mode, &self.a, &self.b);
    }
}

/// Terminal state of one match command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The match never started.
    Rejected,
    /// A round was abandoned.
    Abandoned,
    /// A single-round match ended level.
    Draw,
    /// A side won.
    Won(Side),
}

/// Runs complete matches: preconditions, slot, announcement, play, record.
#[derive(Clone)]
pub struct MatchRunner {
    rounds: RoundOrchestrator,
    series: SeriesOrchestrator,
    records: Arc<dyn RecordKeeper>,
    gate: Arc<dyn MatchGate>,
    pacing: Duration,
}

impl std::fmt::Debug for MatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchRunner")
            .field("rounds", &self.rounds)
            .field("pacing", &self.pacing)
            .finish_non_exhaustive()
    }
}

impl MatchRunner {
    /// Wires a runner around the default [`Solicitor`].
    pub fn new(
        config: &MatchConfig,
        messenger: Arc<dyn Messenger>,
        reporter: Arc<dyn Reporter>,
        router: ReplyRouter,
        gate: Arc<dyn MatchGate>,
        records: Arc<dyn RecordKeeper>,
    ) -> Self {
        let picker = Arc::new(RandomPicker::new(*config.seed()));
        let solicitor = Solicitor::new(messenger, router, picker);
        Self::with_move_source(config, Arc::new(solicitor), reporter, gate, records)
    }

    /// Wires a runner around any [`MoveSource`].
    pub fn with_move_source(
        config: &MatchConfig,
        moves: Arc<dyn MoveSource>,
        reporter: Arc<dyn Reporter>,
        gate: Arc<dyn MatchGate>,
        records: Arc<dyn RecordKeeper>,
    ) -> Self {
        let rounds = RoundOrchestrator::new(moves, reporter, config.timeout(), config.stagger());
        let series = SeriesOrchestrator::new(rounds.clone(), records.clone(), config.pacing());
        Self {
            rounds,
            series,
            records,
            gate,
            pacing: config.pacing(),
        }
    }

    /// Runs one match in `mode`.
    ///
    /// The match slot is held for the whole match and released on every
    /// exit path, including errors and panics.
    #[instrument(skip(self, challenger, opponent), fields(
        challenger = %challenger.participant(),
        opponent = %opponent.participant(),
    ))]
    pub async fn run(
        &self,
        mode: GameMode,
        challenger: &Contestant,
        opponent: &Contestant,
    ) -> Result<MatchOutcome, ProtocolError> {
        let reporter = self.rounds.reporter();

        if let Some(reason) = precondition_failure(challenger, opponent) {
            info!(reason, "Match rejected");
            report_best_effort(reporter.notice(reason).await);
            return Ok(MatchOutcome::Rejected);
        }

        let Some(_slot) = MatchSlot::acquire(
            self.gate.clone(),
            mode,
            challenger.participant(),
            opponent.participant(),
        ) else {
            report_best_effort(
                reporter
                    .notice("Unable to start: Both users can only be in one game at a time")
                    .await,
            );
            return Ok(MatchOutcome::Rejected);
        };

        let odds = self.records.odds(mode, challenger, opponent);
        let announcement = format!(
            "#{} {} ({}%) versus #{} {} ({}%)!",
            self.records.position(mode, challenger),
            challenger.display_name(),
            odds.challenger_percent(),
            self.records.position(mode, opponent),
            opponent.display_name(),
            odds.opponent_percent()
        );
        report_best_effort(reporter.notice(&announcement).await);

        let outcome = if mode.is_series() {
            tokio::time::sleep(self.pacing).await;
            match self.series.play_series(challenger, opponent).await? {
                SeriesReport::Won { winner, .. } => MatchOutcome::Won(winner),
                SeriesReport::Abandoned => MatchOutcome::Abandoned,
            }
        } else {
            self.play_single(mode, challenger, opponent).await?
        };

        info!(?outcome, "Match finished");
        Ok(outcome)
    }

    async fn play_single(
        &self,
        mode: GameMode,
        challenger: &Contestant,
        opponent: &Contestant,
    ) -> Result<MatchOutcome, ProtocolError> {
        let result = match self.rounds.play_round(mode, challenger, opponent).await? {
            RoundReport::Decided(result) => result,
            RoundReport::Abandoned(_) => return Ok(MatchOutcome::Abandoned),
        };

        let winner = result.outcome().winner();
        let mut lines = result.into_summary();
        let outcome = match winner {
            Some(side) => {
                lines.extend(self.records.record(mode, challenger, opponent, side));
                MatchOutcome::Won(side)
            }
            None => MatchOutcome::Draw,
        };
        report_best_effort(self.rounds.reporter().round_summary(&lines).await);
        Ok(outcome)
    }
}

fn precondition_failure(challenger: &Contestant, opponent: &Contestant) -> Option<&'static str> {
    if challenger.participant() == opponent.participant() {
        Some("You cannot challenge yourself")
    } else if challenger.participant().is_automatic() {
        Some("Roshambo cancelled: the automatic player cannot issue a challenge")
    } else {
        None
    }
}
