//! Core domain types for Roshambo.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// A hand sign a participant commits to in a round.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
)]
pub enum Move {
    /// Rock.
    Rock,
    /// Paper.
    Paper,
    /// Scissors.
    Scissors,
    /// Lizard (extended mode only).
    Lizard,
    /// Spock (extended mode only).
    Spock,
}

impl Move {
    /// The three classic moves, in the order the automatic player draws from.
    pub const CLASSIC: [Move; 3] = [Move::Rock, Move::Scissors, Move::Paper];

    /// Single-character canonical code.
    pub fn code(self) -> char {
        match self {
            Move::Rock => 'r',
            Move::Paper => 'p',
            Move::Scissors => 's',
            Move::Lizard => 'l',
            Move::Spock => 'k',
        }
    }

    /// Maps a canonical code back to a move. Case-sensitive.
    pub fn from_code(code: char) -> Option<Move> {
        Move::iter().find(|m| m.code() == code)
    }

    /// Human description shown in prompts.
    pub fn description(self) -> &'static str {
        match self {
            Move::Rock => "rock",
            Move::Paper => "paper",
            Move::Scissors => "scissors",
            Move::Lizard => "lizard",
            Move::Spock => "spock",
        }
    }

    /// The moves this move defeats.
    pub fn beats(self) -> [Move; 2] {
        match self {
            Move::Rock => [Move::Scissors, Move::Lizard],
            Move::Paper => [Move::Rock, Move::Spock],
            Move::Scissors => [Move::Paper, Move::Lizard],
            Move::Lizard => [Move::Spock, Move::Paper],
            Move::Spock => [Move::Scissors, Move::Rock],
        }
    }

    /// True when `self` defeats `other`.
    pub fn defeats(self, other: Move) -> bool {
        self.beats().contains(&other)
    }

    /// Flavour verb for `self` defeating `other`, if it does.
    pub fn verb_against(self, other: Move) -> Option<&'static str> {
        let verb = match (self, other) {
            (Move::Scissors, Move::Paper) => "shredded",
            (Move::Scissors, Move::Lizard) => "decapitated",
            (Move::Rock, Move::Scissors | Move::Lizard) => "crushed",
            (Move::Paper, Move::Rock) => "smothered",
            (Move::Paper, Move::Spock) => "disproved",
            (Move::Lizard, Move::Paper) => "devoured",
            (Move::Lizard, Move::Spock) => "poisoned",
            (Move::Spock, Move::Scissors) => "smashed",
            (Move::Spock, Move::Rock) => "vaporized",
            _ => return None,
        };
        Some(verb)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.description())
    }
}

/// Selected game mode. Fixed for the whole match.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Single round, rock/paper/scissors.
    #[strum(serialize = "classic")]
    Classic,
    /// Best of three decisive rounds, rock/paper/scissors.
    #[serde(rename = "bo3")]
    #[strum(serialize = "bo3")]
    BestOfThree,
    /// Single round with lizard and spock added.
    #[serde(rename = "ls")]
    #[strum(serialize = "ls")]
    LizardSpock,
}

impl GameMode {
    /// Moves legal for this mode.
    pub fn legal_moves(self) -> &'static [Move] {
        const CLASSIC: &[Move] = &[Move::Rock, Move::Paper, Move::Scissors];
        const EXTENDED: &[Move] = &[
            Move::Rock,
            Move::Paper,
            Move::Scissors,
            Move::Lizard,
            Move::Spock,
        ];
        match self {
            GameMode::Classic | GameMode::BestOfThree => CLASSIC,
            GameMode::LizardSpock => EXTENDED,
        }
    }

    /// True when `mv` may be played in this mode.
    pub fn allows(self, mv: Move) -> bool {
        self.legal_moves().contains(&mv)
    }

    /// True for modes played as a best-of-3 series.
    pub fn is_series(self) -> bool {
        matches!(self, GameMode::BestOfThree)
    }
}

/// Which side of the match a participant occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Left side, the participant who issued the challenge.
    Challenger,
    /// Right side.
    Opponent,
}

/// Result of comparing two moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Left (challenger) move wins.
    LeftWins,
    /// Right (opponent) move wins.
    RightWins,
    /// Same move on both sides.
    Draw,
}

impl Outcome {
    /// Series score contribution: +1 left, -1 right, 0 draw.
    pub fn score(self) -> i32 {
        match self {
            Outcome::LeftWins => 1,
            Outcome::RightWins => -1,
            Outcome::Draw => 0,
        }
    }

    /// Winning side, if decisive.
    pub fn winner(self) -> Option<Side> {
        match self {
            Outcome::LeftWins => Some(Side::Challenger),
            Outcome::RightWins => Some(Side::Opponent),
            Outcome::Draw => None,
        }
    }

    /// True unless the outcome is a draw.
    pub fn is_decisive(self) -> bool {
        self != Outcome::Draw
    }
}
