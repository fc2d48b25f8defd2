//! Game rules with an Intent/Effect vocabulary.
//!
//! The pipeline mirrors how a presentation layer talks to the engine:
//! 1. The player (or a timer, or the dictionary service) produces an [`Intent`]
//! 2. [`GameSession::dispatch`](crate::session::GameSession::dispatch) checks it
//!    against the current phase and applies it
//! 3. [`Effect`]s describe what changed, for rendering and for the driver
//!
//! Scoring tables live here too, so every point awarded can be traced to a
//! single function.

use crate::dictionary::{DictionaryStatus, LookupResult};
use crate::letters::WordSubmission;
use crate::numbers::{Operation, Operator, RoundSummary, TokenId};
use crate::timer::TimerToken;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Phases
// ============================================================================

/// The active round type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Drawing ten letters and building the longest word.
    Letters,
    /// Six numbers are on the table, target not yet drawn.
    Numbers,
    /// Reaching the target with the six numbers.
    Target,
}

impl Phase {
    /// The phase that follows this one in the round cycle.
    pub fn next(&self) -> Phase {
        match self {
            Phase::Letters => Phase::Numbers,
            Phase::Numbers => Phase::Target,
            Phase::Target => Phase::Letters,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Letters => "letters",
            Phase::Numbers => "numbers",
            Phase::Target => "target",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown phase '{0}' (expected letters, numbers or target)")]
pub struct UnknownPhase(pub String);

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "letters" => Ok(Phase::Letters),
            "numbers" => Ok(Phase::Numbers),
            "target" => Ok(Phase::Target),
            other => Err(UnknownPhase(other.to_string())),
        }
    }
}

// ============================================================================
// Intents
// ============================================================================

/// Everything that can change a session.
///
/// Player intents come from the presentation layer; `Tick` and
/// `DictionaryResultArrived` are produced by the driver and go through the
/// same serialized path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    DrawLetter { vowel: bool },
    AppendToWord { tile_index: usize },
    RemoveLastLetter,
    ClearWord,
    SubmitWord,
    GenerateTarget,
    AppendNumber { token_id: TokenId },
    AppendOperator { op: Operator },
    SetPendingResult { text: String },
    CommitStep,
    FinalizeAnswer,
    AdvancePhase { to: Phase },
    ResetGame { phase: Phase },
    ResetEntireGame,

    /// One second elapsed for the timer instance `token`.
    Tick { token: TimerToken },

    /// The dictionary service answered for `word`.
    DictionaryResultArrived { word: String, result: LookupResult },
}

// ============================================================================
// Effects
// ============================================================================

/// A state change produced by applying an intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// A new phase instance began.
    PhaseEntered { phase: Phase, rounds_played: u32 },

    /// A letter was drawn into slot `index`.
    LetterDrawn { index: usize, symbol: char },

    /// The word in progress changed.
    WordChanged { word: String },

    /// A word was submitted.
    WordSubmitted(WordSubmission),

    /// The dictionary service should be asked about `word`.
    LookupRequested { word: String },

    /// The dictionary display changed.
    LookupResolved(DictionaryStatus),

    /// The target number was drawn.
    TargetGenerated { target: i64 },

    /// The expression being built changed.
    ExpressionChanged { expression: String },

    /// An intermediate calculation joined the ledger.
    OperationCommitted(Operation),

    /// The numbers round ended and was scored.
    RoundScored(RoundSummary),

    /// Points were added to the session.
    ScoreChanged { points: u32, total: u32 },

    /// A new timer instance was armed; ticks must carry `token`.
    TimerArmed { token: TimerToken, phase: Phase },

    /// The countdown or main clock ticked down.
    TimerTicked { remaining: u32 },

    /// The countdown finished and the main clock started.
    ClockStarted { total: u32 },

    /// The main clock ran out.
    TimeExpired { phase: Phase },

    /// The active timer instance was stopped or discarded.
    TimerStopped,

    /// A short confirmation for the player.
    Notice { text: String },
}

// ============================================================================
// Scoring
// ============================================================================

/// Points for the letters round: one per letter.
pub fn word_points(word: &str) -> u32 {
    word.chars().count() as u32
}

/// How close a final result landed to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProximityTier {
    Exact,
    VeryClose,
    Close,
    Far,
}

impl ProximityTier {
    pub fn for_difference(difference: i64) -> Self {
        match difference.abs() {
            0 => ProximityTier::Exact,
            1..=5 => ProximityTier::VeryClose,
            6..=20 => ProximityTier::Close,
            _ => ProximityTier::Far,
        }
    }

    /// Message shown in the round summary.
    pub fn message(&self, final_result: i64, difference: i64) -> String {
        match self {
            ProximityTier::Exact => "Congratulations! You found the exact number!".to_string(),
            ProximityTier::VeryClose => format!(
                "Very good! Your result ({final_result}) is only {difference} away from the target."
            ),
            ProximityTier::Close => {
                format!("Your result ({final_result}) is {difference} away from the target.")
            }
            ProximityTier::Far => {
                format!("You are {difference} away from the target. Keep practicing!")
            }
        }
    }
}

/// Points for the numbers round, by distance to the target.
pub fn proximity_points(difference: i64) -> u32 {
    match difference.abs() {
        0 => 10,
        1..=5 => 5,
        6..=10 => 3,
        11..=20 => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_cycle() {
        assert_eq!(Phase::Letters.next(), Phase::Numbers);
        assert_eq!(Phase::Numbers.next(), Phase::Target);
        assert_eq!(Phase::Target.next(), Phase::Letters);
    }

    #[test]
    fn test_phase_from_str() {
        assert_eq!("letters".parse::<Phase>(), Ok(Phase::Letters));
        assert_eq!(" Numbers ".parse::<Phase>(), Ok(Phase::Numbers));
        assert_eq!("target".parse::<Phase>(), Ok(Phase::Target));
        assert!("chiffres".parse::<Phase>().is_err());
    }

    #[test]
    fn test_word_points() {
        assert_eq!(word_points("MAISON"), 6);
        assert_eq!(word_points(""), 0);
    }

    #[test]
    fn test_proximity_points() {
        assert_eq!(proximity_points(0), 10);
        assert_eq!(proximity_points(5), 5);
        assert_eq!(proximity_points(-5), 5);
        assert_eq!(proximity_points(6), 3);
        assert_eq!(proximity_points(10), 3);
        assert_eq!(proximity_points(11), 2);
        assert_eq!(proximity_points(20), 2);
        assert_eq!(proximity_points(30), 1);
    }

    #[test]
    fn test_proximity_tiers() {
        assert_eq!(ProximityTier::for_difference(0), ProximityTier::Exact);
        assert_eq!(ProximityTier::for_difference(5), ProximityTier::VeryClose);
        assert_eq!(ProximityTier::for_difference(15), ProximityTier::Close);
        assert_eq!(ProximityTier::for_difference(21), ProximityTier::Far);
        assert!(ProximityTier::Close.message(515, 15).contains("515"));
    }

    #[test]
    fn test_intent_serializes_tagged() {
        let json = serde_json::to_value(Intent::DrawLetter { vowel: true }).unwrap();
        assert_eq!(json["intent"], "draw_letter");
        assert_eq!(json["vowel"], true);

        let back: Intent = serde_json::from_value(json).unwrap();
        assert_eq!(back, Intent::DrawLetter { vowel: true });
    }
}
