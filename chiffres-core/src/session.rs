//! GameSession - the primary public API for a game of letters and numbers.
//!
//! A session owns the active phase, the cumulative score, the phase timer
//! and the dictionary display. Every change goes through
//! [`GameSession::dispatch`], one intent at a time.

use crate::dictionary::{DictionaryStatus, LookupResult};
use crate::draw::{Draw, LetterKind, RandomDraw, NUMBERS_PER_ROUND};
use crate::letters::{LettersError, WordRound, TILES_PER_ROUND};
use crate::numbers::{ArithmeticRound, NumbersError, Operator, TokenId};
use crate::rules::{Effect, Intent, Phase};
use crate::timer::{
    PhaseTimer, TickOutcome, TimerState, TimerToken, COUNTDOWN_SECONDS, LETTERS_SECONDS,
    NUMBERS_SECONDS,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// How a rejected intent should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// Not legal in the current state; shown as a warning.
    InvalidIntent,
    /// The typed result is not a number.
    InputParseFailure,
}

/// Errors from GameSession operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error(transparent)]
    Letters(#[from] LettersError),

    #[error(transparent)]
    Numbers(#[from] NumbersError),

    #[error("Not available during the {0} phase")]
    WrongPhase(Phase),

    #[error("Wait for the countdown to finish")]
    CountdownActive,

    #[error("Time is up")]
    TimeExpired,

    #[error("Cannot go from the {from} phase to the {to} phase")]
    IllegalTransition { from: Phase, to: Phase },
}

impl IntentError {
    pub fn kind(&self) -> RejectionKind {
        match self {
            IntentError::Numbers(NumbersError::InvalidResult(_)) => {
                RejectionKind::InputParseFailure
            }
            _ => RejectionKind::InvalidIntent,
        }
    }
}

/// Configuration for creating a new game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Main clock of the letters round, in seconds.
    pub letters_seconds: u32,

    /// Main clock of the numbers round, in seconds.
    pub numbers_seconds: u32,

    /// Pre-roll before either main clock.
    pub countdown_seconds: u32,

    /// Ask the dictionary about submitted words.
    pub dictionary_lookup: bool,

    /// Check typed step results against the expression.
    pub verify_results: bool,

    /// Seed for reproducible draws.
    pub seed: Option<u64>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            letters_seconds: LETTERS_SECONDS,
            numbers_seconds: NUMBERS_SECONDS,
            countdown_seconds: COUNTDOWN_SECONDS,
            dictionary_lookup: true,
            verify_results: false,
            seed: None,
        }
    }

    pub fn with_letters_seconds(mut self, seconds: u32) -> Self {
        self.letters_seconds = seconds;
        self
    }

    pub fn with_numbers_seconds(mut self, seconds: u32) -> Self {
        self.numbers_seconds = seconds;
        self
    }

    pub fn with_countdown_seconds(mut self, seconds: u32) -> Self {
        self.countdown_seconds = seconds;
        self
    }

    pub fn with_dictionary_lookup(mut self, enabled: bool) -> Self {
        self.dictionary_lookup = enabled;
        self
    }

    /// Reject committed steps whose typed result disagrees with the expression.
    pub fn with_verified_results(mut self, verify: bool) -> Self {
        self.verify_results = verify;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The six numbers, before the target is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumbersDraw {
    pub numbers: [i64; NUMBERS_PER_ROUND],
}

/// Data owned by the active phase. Exactly one exists at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "phase", content = "data", rename_all = "lowercase")]
pub enum PhaseData {
    Letters(WordRound),
    Numbers(NumbersDraw),
    Target(ArithmeticRound),
}

impl PhaseData {
    pub fn phase(&self) -> Phase {
        match self {
            PhaseData::Letters(_) => Phase::Letters,
            PhaseData::Numbers(_) => Phase::Numbers,
            PhaseData::Target(_) => Phase::Target,
        }
    }
}

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub data: PhaseData,
    pub score: u32,
    pub rounds_played: u32,
    pub timer: TimerState,
    pub time_expired: bool,
    pub dictionary: DictionaryStatus,
}

/// Result of a successfully applied intent.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub effects: Vec<Effect>,
    pub snapshot: Snapshot,
}

/// A game session.
pub struct GameSession {
    config: SessionConfig,
    draw: Box<dyn Draw>,
    data: PhaseData,
    score: u32,
    rounds_played: u32,
    timer: PhaseTimer,
    dictionary: DictionaryStatus,
}

impl GameSession {
    /// Create a session with random draws (seeded if the config says so).
    pub fn new(config: SessionConfig) -> Self {
        let draw: Box<dyn Draw> = match config.seed {
            Some(seed) => Box::new(RandomDraw::seeded(seed)),
            None => Box::new(RandomDraw::from_entropy()),
        };
        Self::with_draw(config, draw)
    }

    /// Create a session with a custom source of letters and numbers.
    pub fn with_draw(config: SessionConfig, draw: Box<dyn Draw>) -> Self {
        Self {
            timer: PhaseTimer::new(config.countdown_seconds),
            config,
            draw,
            data: PhaseData::Letters(WordRound::new()),
            score: 0,
            rounds_played: 0,
            dictionary: DictionaryStatus::Idle,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.data.phase()
    }

    pub fn data(&self) -> &PhaseData {
        &self.data
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn timer(&self) -> TimerState {
        self.timer.state()
    }

    /// Token the driver must attach to ticks for the armed timer.
    pub fn timer_token(&self) -> Option<TimerToken> {
        self.timer.token()
    }

    pub fn time_expired(&self) -> bool {
        self.timer.state().is_expired()
    }

    pub fn dictionary(&self) -> &DictionaryStatus {
        &self.dictionary
    }

    pub fn word_round(&self) -> Option<&WordRound> {
        match &self.data {
            PhaseData::Letters(round) => Some(round),
            _ => None,
        }
    }

    pub fn arithmetic_round(&self) -> Option<&ArithmeticRound> {
        match &self.data {
            PhaseData::Target(round) => Some(round),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase(),
            data: self.data.clone(),
            score: self.score,
            rounds_played: self.rounds_played,
            timer: self.timer.state(),
            time_expired: self.time_expired(),
            dictionary: self.dictionary.clone(),
        }
    }

    /// Apply one intent.
    #[instrument(skip(self), fields(phase = %self.phase()))]
    pub fn dispatch(&mut self, intent: Intent) -> Result<Resolution, IntentError> {
        let effects = match intent {
            Intent::DrawLetter { vowel } => self.draw_letter(vowel),
            Intent::AppendToWord { tile_index } => self.append_to_word(tile_index),
            Intent::RemoveLastLetter => self.remove_last_letter(),
            Intent::ClearWord => self.clear_word(),
            Intent::SubmitWord => self.submit_word(),
            Intent::GenerateTarget => self.generate_target(),
            Intent::AppendNumber { token_id } => self.append_number(token_id),
            Intent::AppendOperator { op } => self.append_operator(op),
            Intent::SetPendingResult { text } => self.set_pending_result(text),
            Intent::CommitStep => self.commit_step(),
            Intent::FinalizeAnswer => self.finalize_answer(),
            Intent::AdvancePhase { to } => self.advance_phase(to),
            Intent::ResetGame { phase } => Ok(self.reset_game(phase)),
            Intent::ResetEntireGame => Ok(self.reset_entire_game()),
            Intent::Tick { token } => Ok(self.tick(token)),
            Intent::DictionaryResultArrived { word, result } => {
                Ok(self.dictionary_result_arrived(&word, result))
            }
        };

        match effects {
            Ok(effects) => Ok(Resolution {
                effects,
                snapshot: self.snapshot(),
            }),
            Err(err) => {
                debug!(error = %err, "Intent rejected");
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Guards
    // ------------------------------------------------------------------

    fn ensure_not_counting_down(&self) -> Result<(), IntentError> {
        if self.timer.state().is_countdown() {
            Err(IntentError::CountdownActive)
        } else {
            Ok(())
        }
    }

    fn ensure_playable(&self) -> Result<(), IntentError> {
        self.ensure_not_counting_down()?;
        if self.time_expired() {
            return Err(IntentError::TimeExpired);
        }
        Ok(())
    }

    fn word_round_mut(&mut self) -> Result<&mut WordRound, IntentError> {
        match &mut self.data {
            PhaseData::Letters(round) => Ok(round),
            other => Err(IntentError::WrongPhase(other.phase())),
        }
    }

    fn arithmetic_round_mut(&mut self) -> Result<&mut ArithmeticRound, IntentError> {
        match &mut self.data {
            PhaseData::Target(round) => Ok(round),
            other => Err(IntentError::WrongPhase(other.phase())),
        }
    }

    fn award(&mut self, points: u32, effects: &mut Vec<Effect>) {
        if points == 0 {
            return;
        }
        self.score += points;
        effects.push(Effect::ScoreChanged {
            points,
            total: self.score,
        });
    }

    // ------------------------------------------------------------------
    // Letters
    // ------------------------------------------------------------------

    /// Draw a vowel or a consonant. The tenth letter arms the clock.
    pub fn draw_letter(&mut self, vowel: bool) -> Result<Vec<Effect>, IntentError> {
        let round = self.word_round_mut()?;
        if round.is_locked() {
            return Err(LettersError::Locked.into());
        }
        if round.is_full() {
            return Err(LettersError::TilesFull.into());
        }

        let symbol = self.draw.letter(LetterKind::from_vowel_flag(vowel));
        let round = self.word_round_mut()?;
        let count = round.push_tile(symbol)?;
        let mut effects = vec![Effect::LetterDrawn {
            index: count - 1,
            symbol,
        }];

        if count == TILES_PER_ROUND {
            let token = self.timer.arm(self.config.letters_seconds);
            info!(%token, "All letters drawn, clock armed");
            effects.push(Effect::TimerArmed {
                token,
                phase: Phase::Letters,
            });
        }
        Ok(effects)
    }

    pub fn append_to_word(&mut self, tile_index: usize) -> Result<Vec<Effect>, IntentError> {
        self.ensure_playable()?;
        let round = self.word_round_mut()?;
        round.append_letter(tile_index)?;
        Ok(vec![Effect::WordChanged { word: round.word() }])
    }

    pub fn remove_last_letter(&mut self) -> Result<Vec<Effect>, IntentError> {
        self.ensure_playable()?;
        let round = self.word_round_mut()?;
        round.remove_last_letter()?;
        Ok(vec![Effect::WordChanged { word: round.word() }])
    }

    pub fn clear_word(&mut self) -> Result<Vec<Effect>, IntentError> {
        self.ensure_playable()?;
        let round = self.word_round_mut()?;
        round.clear_word()?;
        Ok(vec![Effect::WordChanged {
            word: String::new(),
        }])
    }

    /// Submit the word. Scores one point per letter unless the clock ran out.
    ///
    /// A late word is shown but never looked up.
    pub fn submit_word(&mut self) -> Result<Vec<Effect>, IntentError> {
        self.ensure_not_counting_down()?;
        let late = self.time_expired();
        let submission = self.word_round_mut()?.submit(late)?;
        self.timer.halt();

        info!(word = %submission.word, points = submission.points, late, "Word submitted");
        let mut effects = vec![
            Effect::WordSubmitted(submission.clone()),
            Effect::TimerStopped,
        ];
        self.award(submission.points, &mut effects);

        if self.config.dictionary_lookup && !late {
            self.dictionary = DictionaryStatus::Pending {
                word: submission.word.clone(),
            };
            effects.push(Effect::LookupRequested {
                word: submission.word,
            });
        }
        Ok(effects)
    }

    // ------------------------------------------------------------------
    // Numbers
    // ------------------------------------------------------------------

    /// Draw the target and start the arithmetic round.
    pub fn generate_target(&mut self) -> Result<Vec<Effect>, IntentError> {
        let numbers = match &self.data {
            PhaseData::Numbers(draw) => draw.numbers,
            other => return Err(IntentError::WrongPhase(other.phase())),
        };
        let target = self.draw.target();
        Ok(self.start_target_round(target, numbers))
    }

    fn start_target_round(&mut self, target: i64, numbers: [i64; NUMBERS_PER_ROUND]) -> Vec<Effect> {
        self.data = PhaseData::Target(ArithmeticRound::new(target, &numbers));
        let token = self.timer.arm(self.config.numbers_seconds);
        info!(target, ?numbers, %token, "Target drawn, clock armed");
        vec![
            Effect::PhaseEntered {
                phase: Phase::Target,
                rounds_played: self.rounds_played,
            },
            Effect::TargetGenerated { target },
            Effect::TimerArmed {
                token,
                phase: Phase::Target,
            },
        ]
    }

    pub fn append_number(&mut self, token_id: TokenId) -> Result<Vec<Effect>, IntentError> {
        self.ensure_playable()?;
        let round = self.arithmetic_round_mut()?;
        round.append_number(token_id)?;
        Ok(vec![Effect::ExpressionChanged {
            expression: round.step().display(),
        }])
    }

    pub fn append_operator(&mut self, op: Operator) -> Result<Vec<Effect>, IntentError> {
        self.ensure_playable()?;
        let round = self.arithmetic_round_mut()?;
        round.append_operator(op)?;
        Ok(vec![Effect::ExpressionChanged {
            expression: round.step().display(),
        }])
    }

    pub fn set_pending_result(&mut self, text: impl Into<String>) -> Result<Vec<Effect>, IntentError> {
        self.ensure_playable()?;
        self.arithmetic_round_mut()?.set_pending_input(text)?;
        Ok(Vec::new())
    }

    pub fn commit_step(&mut self) -> Result<Vec<Effect>, IntentError> {
        self.ensure_playable()?;
        let verify = self.config.verify_results;
        let operation = self.arithmetic_round_mut()?.commit_step(verify)?;
        debug!(%operation, "Step committed");
        Ok(vec![
            Effect::Notice {
                text: format!("Operation validated: {operation}"),
            },
            Effect::OperationCommitted(operation),
        ])
    }

    /// End the numbers round with the typed result or the last clicked number.
    pub fn finalize_answer(&mut self) -> Result<Vec<Effect>, IntentError> {
        self.ensure_playable()?;
        let summary = self.arithmetic_round_mut()?.finalize()?;
        self.timer.halt();
        info!(
            target = summary.target,
            result = summary.final_result,
            points = summary.points,
            "Round scored"
        );

        let mut effects = vec![
            Effect::Notice {
                text: format!("Final result set: {}", summary.final_result),
            },
            Effect::TimerStopped,
        ];
        let points = summary.points;
        effects.push(Effect::RoundScored(summary));
        self.award(points, &mut effects);
        Ok(effects)
    }

    // ------------------------------------------------------------------
    // Phase transitions
    // ------------------------------------------------------------------

    /// Move to the next phase of the cycle. Any other target is rejected.
    pub fn advance_phase(&mut self, to: Phase) -> Result<Vec<Effect>, IntentError> {
        let from = self.phase();
        if from.next() != to {
            return Err(IntentError::IllegalTransition { from, to });
        }
        match to {
            Phase::Target => self.generate_target(),
            Phase::Letters | Phase::Numbers => Ok(self.reset_game(to)),
        }
    }

    /// Start a fresh instance of `phase`, discarding the current one.
    ///
    /// Score is kept. Entering the letters phase counts a new round.
    pub fn reset_game(&mut self, phase: Phase) -> Vec<Effect> {
        self.timer.cancel();
        self.dictionary = DictionaryStatus::Idle;
        let mut effects = vec![Effect::TimerStopped];

        match phase {
            Phase::Letters => {
                self.rounds_played += 1;
                self.data = PhaseData::Letters(WordRound::new());
                effects.push(Effect::PhaseEntered {
                    phase,
                    rounds_played: self.rounds_played,
                });
            }
            Phase::Numbers => {
                let numbers = self.draw.six_numbers();
                self.data = PhaseData::Numbers(NumbersDraw { numbers });
                effects.push(Effect::PhaseEntered {
                    phase,
                    rounds_played: self.rounds_played,
                });
            }
            Phase::Target => {
                let numbers = self.draw.six_numbers();
                let target = self.draw.target();
                effects.extend(self.start_target_round(target, numbers));
            }
        }

        info!(%phase, rounds_played = self.rounds_played, "Phase entered");
        effects
    }

    /// Back to a fresh letters round with score and round count zeroed.
    pub fn reset_entire_game(&mut self) -> Vec<Effect> {
        let mut effects = self.reset_game(Phase::Letters);
        self.score = 0;
        self.rounds_played = 0;
        for effect in &mut effects {
            if let Effect::PhaseEntered { rounds_played, .. } = effect {
                *rounds_played = 0;
            }
        }
        effects
    }

    // ------------------------------------------------------------------
    // Driver events
    // ------------------------------------------------------------------

    /// One second elapsed for timer instance `token`.
    pub fn tick(&mut self, token: TimerToken) -> Vec<Effect> {
        match self.timer.tick(token) {
            TickOutcome::Stale => {
                debug!(%token, "Stale tick ignored");
                Vec::new()
            }
            TickOutcome::Inactive => Vec::new(),
            TickOutcome::Counted { remaining } => vec![Effect::TimerTicked { remaining }],
            TickOutcome::Started { total } => vec![Effect::ClockStarted { total }],
            TickOutcome::Expired => self.on_time_expired(),
        }
    }

    fn on_time_expired(&mut self) -> Vec<Effect> {
        let phase = self.phase();
        info!(%phase, "Time expired");
        let mut effects = vec![Effect::TimeExpired { phase }];

        let summary = match &mut self.data {
            PhaseData::Letters(round) => {
                round.lock();
                None
            }
            PhaseData::Target(round) => round.expire(),
            PhaseData::Numbers(_) => None,
        };

        if let Some(summary) = summary {
            let points = summary.points;
            effects.push(Effect::RoundScored(summary));
            self.award(points, &mut effects);
        }
        effects
    }

    /// A dictionary answer arrived. Answers for any word but the pending one are dropped.
    pub fn dictionary_result_arrived(&mut self, word: &str, result: LookupResult) -> Vec<Effect> {
        if self.dictionary.resolve(word, result) {
            vec![Effect::LookupResolved(self.dictionary.clone())]
        } else {
            debug!(word, "Dictionary answer for a word no longer pending");
            Vec::new()
        }
    }
}
