//! Letters and numbers game engine.
//!
//! This crate provides:
//! - The letters round: weighted letter draws and word building
//! - The numbers round: six numbers, a target, and a ledger of calculations
//! - An Intent/Effect session state machine with generation-guarded timers
//! - A headless Tokio driver with dictionary lookup
//!
//! # Quick Start
//!
//! ```ignore
//! use chiffres_core::{GameSession, Intent, Phase, SessionConfig};
//!
//! let mut session = GameSession::new(SessionConfig::new());
//! for _ in 0..10 {
//!     session.dispatch(Intent::DrawLetter { vowel: true })?;
//! }
//! session.dispatch(Intent::AdvancePhase { to: Phase::Numbers })?;
//! let resolution = session.dispatch(Intent::GenerateTarget)?;
//! println!("{:?}", resolution.snapshot.data);
//! ```

pub mod dictionary;
pub mod draw;
pub mod expression;
pub mod headless;
pub mod letters;
pub mod numbers;
pub mod rules;
pub mod session;
pub mod solver;
pub mod testing;
pub mod timer;

// Primary public API
pub use dictionary::{DictionaryLookup, DictionaryStatus, LookupError, LookupResult};
pub use draw::{Draw, LetterKind, RandomDraw};
pub use expression::{evaluate_expression, ExprError};
pub use headless::{HeadlessGame, Update};
pub use letters::{LettersError, WordRound};
pub use numbers::{ArithmeticRound, NumbersError, Operator, RoundSummary, TokenId};
pub use rules::{Effect, Intent, Phase};
pub use session::{
    GameSession, IntentError, PhaseData, RejectionKind, Resolution, SessionConfig, Snapshot,
};
pub use solver::{format_hint, solve_approx, SolverHint};
pub use testing::{MockDictionary, ScriptedDraw, TestHarness};
pub use timer::{TimerState, TimerToken};
