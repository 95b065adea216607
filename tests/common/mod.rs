//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strictly_roshambo::{
    Contestant, DeliveryError, GameMode, MatchGate, Messenger, Move, MoveSource, Participant,
    ParticipantId, ReplyRouter, Reporter, SolicitError, Solicitation,
};
use tokio::time::Instant;

/// A scripted answer to one prompt.
#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// Reply with `text` after `delay`.
    After(Duration, &'static str),
    /// Never reply.
    Silent,
}

/// Something the reporter was asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Notice(String),
    Summary(Vec<String>),
    Outcome(String, Vec<String>),
}

/// A reply the script tried to deliver, and whether the router accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: ParticipantId,
    pub text: String,
    pub accepted: bool,
}

/// Messenger and reporter that answers prompts from per-participant scripts.
#[derive(Default)]
pub struct ScriptedChannel {
    router: ReplyRouter,
    scripts: Mutex<HashMap<ParticipantId, VecDeque<Script>>>,
    pub prompts: Mutex<Vec<(ParticipantId, String, Instant)>>,
    pub acks: Mutex<Vec<ParticipantId>>,
    pub reports: Mutex<Vec<Report>>,
    pub deliveries: Arc<Mutex<Vec<Delivery>>>,
    failing_prompts: Mutex<HashSet<ParticipantId>>,
    failing_acks: Mutex<HashSet<ParticipantId>>,
}

impl ScriptedChannel {
    pub fn new(router: ReplyRouter) -> Arc<Self> {
        Arc::new(Self {
            router,
            ..Default::default()
        })
    }

    pub fn script(&self, id: &str, replies: impl IntoIterator<Item = Script>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(ParticipantId::new(id))
            .or_default()
            .extend(replies);
    }

    pub fn fail_prompts_to(&self, id: &str) {
        self.failing_prompts.lock().unwrap().insert(ParticipantId::new(id));
    }

    pub fn fail_acks_to(&self, id: &str) {
        self.failing_acks.lock().unwrap().insert(ParticipantId::new(id));
    }

    /// Schedules a reply that is not tied to any prompt.
    pub fn reply_later(&self, id: &str, delay: Duration, text: &'static str) {
        let router = self.router.clone();
        let deliveries = self.deliveries.clone();
        let to = ParticipantId::new(id);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let accepted = router.deliver(&to, text);
            deliveries.lock().unwrap().push(Delivery {
                to,
                text: text.to_string(),
                accepted,
            });
        });
    }

    pub fn prompts_to(&self, id: &str) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _, _)| to.as_str() == id)
            .map(|(_, text, _)| text.clone())
            .collect()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Messenger for ScriptedChannel {
    async fn send_prompt(&self, to: &ParticipantId, text: &str) -> Result<(), DeliveryError> {
        if self.failing_prompts.lock().unwrap().contains(to) {
            return Err(DeliveryError::new("channel_not_found"));
        }
        self.prompts
            .lock()
            .unwrap()
            .push((to.clone(), text.to_string(), Instant::now()));

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(to)
            .and_then(VecDeque::pop_front);
        if let Some(Script::After(delay, text)) = next {
            self.reply_later(to.as_str(), delay, text);
        }
        Ok(())
    }

    async fn send_acknowledgement(
        &self,
        to: &ParticipantId,
        _text: &str,
    ) -> Result<(), DeliveryError> {
        if self.failing_acks.lock().unwrap().contains(to) {
            return Err(DeliveryError::new("ack failed"));
        }
        self.acks.lock().unwrap().push(to.clone());
        Ok(())
    }
}

#[async_trait::async_trait]
impl Reporter for ScriptedChannel {
    async fn notice(&self, text: &str) -> Result<(), DeliveryError> {
        self.reports.lock().unwrap().push(Report::Notice(text.to_string()));
        Ok(())
    }

    async fn round_summary(&self, lines: &[String]) -> Result<(), DeliveryError> {
        self.reports.lock().unwrap().push(Report::Summary(lines.to_vec()));
        Ok(())
    }

    async fn series_outcome(
        &self,
        winner_label: &str,
        record_lines: &[String],
    ) -> Result<(), DeliveryError> {
        self.reports
            .lock()
            .unwrap()
            .push(Report::Outcome(winner_label.to_string(), record_lines.to_vec()));
        Ok(())
    }
}

/// What a [`FixedMoves`] source yields for one solicitation.
#[derive(Debug, Clone)]
pub enum Pick {
    Play(Move),
    Fail(SolicitError),
    Panic,
}

/// Move source returning queued picks per participant, without prompting.
#[derive(Debug, Default)]
pub struct FixedMoves {
    picks: Mutex<HashMap<String, VecDeque<Pick>>>,
    pub calls: AtomicU32,
}

impl FixedMoves {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queue(&self, participant: &str, picks: impl IntoIterator<Item = Pick>) {
        self.picks
            .lock()
            .unwrap()
            .entry(participant.to_string())
            .or_default()
            .extend(picks);
    }
}

#[async_trait::async_trait]
impl MoveSource for FixedMoves {
    async fn solicit(
        &self,
        participant: &Participant,
        _mode: GameMode,
        _timeout: Duration,
        _leading: &str,
    ) -> Result<Solicitation, SolicitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let pick = self
            .picks
            .lock()
            .unwrap()
            .get_mut(&participant.to_string())
            .and_then(VecDeque::pop_front);
        match pick {
            Some(Pick::Play(mv)) => Ok(Solicitation::new(mv, 1)),
            Some(Pick::Fail(e)) => Err(e),
            Some(Pick::Panic) => panic!("move source exploded"),
            None => panic!("no pick queued for {participant}"),
        }
    }
}

/// Gate that always grants and counts calls.
#[derive(Debug, Default)]
pub struct CountingGate {
    pub acquired: AtomicU32,
    pub released: AtomicU32,
}

impl CountingGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn released(&self) -> u32 {
        self.released.load(Ordering::SeqCst)
    }

    pub fn acquired(&self) -> u32 {
        self.acquired.load(Ordering::SeqCst)
    }
}

impl MatchGate for CountingGate {
    fn acquire(&self, _mode: GameMode, _a: &Participant, _b: &Participant) -> bool {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn release(&self, _mode: GameMode, _a: &Participant, _b: &Participant) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn contestant(id: &str, name: &str) -> Contestant {
    Contestant::new(Participant::from_id(id), name.to_string())
}

pub fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}
