//! Participant identities and the automatic player.

use crate::games::roshambo::Move;
use derive_getters::Getters;
use derive_new::new;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{debug, instrument};

/// Opaque handle for a participant on the messaging channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Creates a participant id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One side of a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Participant {
    /// A person answering prompts over the private channel.
    Human(ParticipantId),
    /// The built-in random player. Never prompted.
    Automatic,
}

impl Participant {
    /// Reserved id naming the automatic player.
    pub const AUTOMATIC_ID: &'static str = "ai";

    /// Parses a participant from its id, mapping the reserved id to
    /// [`Participant::Automatic`].
    pub fn from_id(id: &str) -> Self {
        if id == Self::AUTOMATIC_ID {
            Participant::Automatic
        } else {
            Participant::Human(ParticipantId::new(id))
        }
    }

    /// Returns the channel id for a human participant.
    pub fn human_id(&self) -> Option<&ParticipantId> {
        match self {
            Participant::Human(id) => Some(id),
            Participant::Automatic => None,
        }
    }

    /// True for the automatic player.
    pub fn is_automatic(&self) -> bool {
        matches!(self, Participant::Automatic)
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Participant::Human(id) => write!(f, "{id}"),
            Participant::Automatic => f.write_str(Self::AUTOMATIC_ID),
        }
    }
}

/// A participant paired with the display name the caller resolved for it.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct Contestant {
    /// Who plays.
    participant: Participant,
    /// Name used in prompts and summaries.
    display_name: String,
}

/// Uniform random choice among the classic moves.
///
/// Seedable so tests can reproduce a sequence of picks.
#[derive(Debug)]
pub struct RandomPicker {
    rng: Mutex<StdRng>,
}

impl RandomPicker {
    /// Creates a picker, seeded when `seed` is given, from OS entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Draws one of rock, scissors or paper.
    #[instrument(skip(self))]
    pub fn pick(&self) -> Move {
        let index = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.random_range(0..Move::CLASSIC.len())
        };
        let mv = Move::CLASSIC[index];
        debug!(?mv, "Automatic player picked");
        mv
    }
}

impl Default for RandomPicker {
    fn default() -> Self {
        Self::new(None)
    }
}
