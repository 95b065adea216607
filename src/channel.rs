//! Messaging collaborators and private reply routing.
//!
//! Outbound traffic goes through [`Messenger`] and [`Reporter`], which the
//! host application implements. Inbound private replies are pushed into a
//! [`ReplyRouter`], which hands each one to the solicitation currently
//! waiting on that participant and drops anything nobody is waiting for.

use crate::participant::ParticipantId;
use derive_more::{Display, Error};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

/// A private message could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Failed to message user: {}", message)]
pub struct DeliveryError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DeliveryError {
    /// Creates a new delivery error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Outbound private messages to a single participant.
#[async_trait::async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a selection prompt.
    async fn send_prompt(&self, to: &ParticipantId, text: &str) -> Result<(), DeliveryError>;

    /// Confirms that a selection was accepted.
    async fn send_acknowledgement(
        &self,
        to: &ParticipantId,
        text: &str,
    ) -> Result<(), DeliveryError>;
}

/// Caller-visible sink for match progress.
#[async_trait::async_trait]
pub trait Reporter: Send + Sync {
    /// A single line notice (announcements, abandonment, replays).
    async fn notice(&self, text: &str) -> Result<(), DeliveryError>;

    /// Lines summarising a completed round.
    async fn round_summary(&self, lines: &[String]) -> Result<(), DeliveryError>;

    /// Final series winner plus the head-to-head record.
    async fn series_outcome(
        &self,
        winner_label: &str,
        record_lines: &[String],
    ) -> Result<(), DeliveryError>;
}

/// Logs a failed report. Reporting never changes a game outcome.
pub fn report_best_effort(result: Result<(), DeliveryError>) {
    if let Err(e) = result {
        warn!(error = %e, "Failed to report match progress");
    }
}

/// Waiting for a private reply ended without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum WaitError {
    /// Nothing arrived before the deadline.
    #[display("No reply before the deadline")]
    Timeout,
    /// A newer expectation replaced this one.
    #[display("Reply expectation superseded")]
    Superseded,
}

#[derive(Debug)]
struct Expectation {
    ticket: u64,
    reply_tx: oneshot::Sender<String>,
}

#[derive(Debug, Default)]
struct RouterState {
    next_ticket: u64,
    open: HashMap<ParticipantId, Expectation>,
}

/// Routes inbound private replies to the solicitation expecting them.
///
/// Each expectation carries a ticket. At most one ticket is open per
/// participant, and a reply is consumed by the open ticket only. Replies
/// that arrive while no ticket is open are discarded.
#[derive(Debug, Clone, Default)]
pub struct ReplyRouter {
    state: Arc<Mutex<RouterState>>,
}

impl ReplyRouter {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Opens a fresh expectation for `participant`, superseding any open one.
    #[instrument(skip(self))]
    pub fn expect(&self, participant: &ParticipantId) -> PendingReply {
        let (reply_tx, reply_rx) = oneshot::channel();
        let mut state = self.lock();
        state.next_ticket += 1;
        let ticket = state.next_ticket;
        if let Some(old) = state
            .open
            .insert(participant.clone(), Expectation { ticket, reply_tx })
        {
            debug!(old_ticket = old.ticket, ticket, "Superseded open expectation");
        }
        debug!(ticket, "Opened reply expectation");
        PendingReply {
            router: self.clone(),
            participant: participant.clone(),
            ticket,
            reply_rx,
        }
    }

    /// Delivers an inbound private message.
    ///
    /// Returns `false` when no solicitation is waiting on the participant,
    /// in which case the text is dropped.
    #[instrument(skip(self, text))]
    pub fn deliver(&self, participant: &ParticipantId, text: impl Into<String>) -> bool {
        let expectation = self.lock().open.remove(participant);
        match expectation {
            Some(expectation) => {
                let ticket = expectation.ticket;
                let delivered = expectation.reply_tx.send(text.into()).is_ok();
                debug!(ticket, delivered, "Routed reply");
                delivered
            }
            None => {
                warn!("Discarding reply with no open expectation");
                false
            }
        }
    }

    /// Ticket currently open for `participant`, if any.
    pub fn open_ticket(&self, participant: &ParticipantId) -> Option<u64> {
        self.lock().open.get(participant).map(|e| e.ticket)
    }

    fn close(&self, participant: &ParticipantId, ticket: u64) {
        let mut state = self.lock();
        if state.open.get(participant).is_some_and(|e| e.ticket == ticket) {
            state.open.remove(participant);
            debug!(ticket, "Closed reply expectation");
        }
    }
}

/// An open expectation for one private reply.
///
/// Dropping it closes the ticket, so a reply arriving later is discarded
/// instead of reaching a later solicitation.
#[derive(Debug)]
pub struct PendingReply {
    router: ReplyRouter,
    participant: ParticipantId,
    ticket: u64,
    reply_rx: oneshot::Receiver<String>,
}

impl PendingReply {
    /// Ticket identifying this expectation.
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Waits for the reply, bounded by `timeout`.
    #[instrument(skip(self), fields(participant = %self.participant, ticket = self.ticket))]
    pub async fn wait(mut self, timeout: Duration) -> Result<String, WaitError> {
        match tokio::time::timeout(timeout, &mut self.reply_rx).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(_)) => Err(WaitError::Superseded),
            Err(_) => {
                debug!("Reply wait timed out");
                Err(WaitError::Timeout)
            }
        }
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        self.router.close(&self.participant, self.ticket);
    }
}
