//! Concealed move solicitation from a single participant.

use crate::channel::{DeliveryError, Messenger, ReplyRouter, WaitError};
use crate::games::roshambo::{GameMode, Move};
use crate::participant::{Participant, ParticipantId, RandomPicker};
use derive_getters::Getters;
use derive_more::{Display, Error, From};
use derive_new::new;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Leading text for a re-prompt after an unusable reply.
pub const INVALID_SELECTION: &str = "Invalid selection. ";

/// Private acknowledgement sent after a valid reply.
pub const RESPONSE_ACCEPTED: &str = "Response accepted";

/// Solicitation failed without producing a move.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum SolicitError {
    /// The participant did not answer in time.
    #[display("Participant did not respond in time")]
    #[from(ignore)]
    Timeout,
    /// Another prompt to the same participant took over its reply channel.
    #[display("Reply expectation superseded by another prompt")]
    #[from(ignore)]
    Superseded,
    /// The prompt could not be sent.
    #[display("{}", _0)]
    Delivery(DeliveryError),
}

/// A move obtained from a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, new)]
pub struct Solicitation {
    /// The accepted move.
    choice: Move,
    /// Prompts sent before the move was accepted. Zero for the automatic player.
    prompts_sent: u32,
}

/// Anything that can produce a participant's move for a round.
#[async_trait::async_trait]
pub trait MoveSource: Send + Sync {
    /// Obtains one move from `participant`, legal for `mode`.
    async fn solicit(
        &self,
        participant: &Participant,
        mode: GameMode,
        timeout: Duration,
        leading: &str,
    ) -> Result<Solicitation, SolicitError>;
}

/// Builds the prompt listing every legal move for `mode`.
pub fn prompt_text(mode: GameMode, leading: &str) -> String {
    let available = mode
        .legal_moves()
        .iter()
        .map(|mv| format!("({}) {}", mv.code(), mv.description()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{leading}Enter your selection: {available}")
}

/// Normalises a free-text reply into a move legal for `mode`.
///
/// Only the first non-whitespace character counts, matched case-sensitively.
pub fn parse_reply(mode: GameMode, reply: &str) -> Option<Move> {
    reply
        .trim()
        .chars()
        .next()
        .and_then(Move::from_code)
        .filter(|mv| mode.allows(*mv))
}

/// Asks participants for their move over the private channel.
#[derive(Clone)]
pub struct Solicitor {
    messenger: Arc<dyn Messenger>,
    router: ReplyRouter,
    picker: Arc<RandomPicker>,
}

impl std::fmt::Debug for Solicitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solicitor")
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

impl Solicitor {
    /// Creates a solicitor.
    pub fn new(
        messenger: Arc<dyn Messenger>,
        router: ReplyRouter,
        picker: Arc<RandomPicker>,
    ) -> Self {
        Self {
            messenger,
            router,
            picker,
        }
    }

    #[instrument(skip(self))]
    async fn acknowledge(&self, id: &ParticipantId) {
        if let Err(e) = self.messenger.send_acknowledgement(id, RESPONSE_ACCEPTED).await {
            warn!(error = %e, "Failed to acknowledge selection");
        }
    }
}

#[async_trait::async_trait]
impl MoveSource for Solicitor {
    /// Obtains one move from `participant`.
    ///
    /// The automatic player answers immediately with a classic move. Humans
    /// are prompted until they send a usable reply; every re-prompt starts a
    /// fresh `timeout` window.
    #[instrument(skip(self, leading), fields(participant = %participant))]
    async fn solicit(
        &self,
        participant: &Participant,
        mode: GameMode,
        timeout: Duration,
        leading: &str,
    ) -> Result<Solicitation, SolicitError> {
        let id = match participant {
            Participant::Automatic => {
                return Ok(Solicitation {
                    choice: self.picker.pick(),
                    prompts_sent: 0,
                });
            }
            Participant::Human(id) => id,
        };

        let mut leading = leading.to_string();
        let mut prompts_sent = 0u32;
        loop {
            // Open the expectation before prompting so a fast reply is not lost.
            let pending = self.router.expect(id);
            self.messenger
                .send_prompt(id, &prompt_text(mode, &leading))
                .await?;
            prompts_sent += 1;
            debug!(prompts_sent, ticket = pending.ticket(), "Prompt sent");

            let reply = match pending.wait(timeout).await {
                Ok(reply) => reply,
                Err(WaitError::Timeout) => {
                    info!(prompts_sent, "Solicitation timed out");
                    return Err(SolicitError::Timeout);
                }
                Err(WaitError::Superseded) => {
                    warn!(prompts_sent, "Reply expectation superseded");
                    return Err(SolicitError::Superseded);
                }
            };

            match parse_reply(mode, &reply) {
                Some(choice) => {
                    self.acknowledge(id).await;
                    info!(?choice, prompts_sent, "Selection accepted");
                    return Ok(Solicitation {
                        choice,
                        prompts_sent,
                    });
                }
                None => {
                    warn!(reply = %reply.trim(), "Invalid selection, prompting again");
                    leading = INVALID_SELECTION.to_string();
                }
            }
        }
    }
}
