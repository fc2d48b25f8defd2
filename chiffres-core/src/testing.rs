//! Testing utilities for the letters and numbers game.
//!
//! This module provides tools for integration testing:
//! - `ScriptedDraw` for deterministic letters, numbers and targets
//! - `MockDictionary` for lookups without network access
//! - `TestHarness` for scripted game scenarios
//! - Assertion helpers for verifying session state

use crate::dictionary::{DictionaryLookup, LookupError};
use crate::draw::{Draw, LetterKind, RandomDraw, NUMBERS_PER_ROUND, VOWELS};
use crate::letters::TILES_PER_ROUND;
use crate::numbers::Operator;
use crate::rules::{Effect, Phase};
use crate::session::{GameSession, IntentError, SessionConfig};
use futures::future::BoxFuture;
use rand::rngs::StdRng;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// A draw source that returns scripted values in order.
///
/// Once a queue runs dry it falls back to a seeded random draw.
pub struct ScriptedDraw {
    letters: VecDeque<char>,
    numbers: VecDeque<[i64; NUMBERS_PER_ROUND]>,
    targets: VecDeque<i64>,
    fallback: RandomDraw<StdRng>,
}

impl ScriptedDraw {
    pub fn new() -> Self {
        Self {
            letters: VecDeque::new(),
            numbers: VecDeque::new(),
            targets: VecDeque::new(),
            fallback: RandomDraw::seeded(0),
        }
    }

    /// Queue letters, returned regardless of the vowel/consonant request.
    pub fn with_letters(mut self, letters: impl IntoIterator<Item = char>) -> Self {
        self.letters.extend(letters);
        self
    }

    pub fn with_numbers(mut self, numbers: [i64; NUMBERS_PER_ROUND]) -> Self {
        self.numbers.push_back(numbers);
        self
    }

    pub fn with_target(mut self, target: i64) -> Self {
        self.targets.push_back(target);
        self
    }
}

impl Default for ScriptedDraw {
    fn default() -> Self {
        Self::new()
    }
}

impl Draw for ScriptedDraw {
    fn letter(&mut self, kind: LetterKind) -> char {
        match self.letters.pop_front() {
            Some(letter) => letter,
            None => self.fallback.letter(kind),
        }
    }

    fn six_numbers(&mut self) -> [i64; NUMBERS_PER_ROUND] {
        match self.numbers.pop_front() {
            Some(numbers) => numbers,
            None => self.fallback.six_numbers(),
        }
    }

    fn target(&mut self) -> i64 {
        match self.targets.pop_front() {
            Some(target) => target,
            None => self.fallback.target(),
        }
    }
}

/// A dictionary that knows a fixed word list.
#[derive(Clone, Default)]
pub struct MockDictionary {
    known: HashSet<String>,
    failing: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockDictionary {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            known: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
            ..Self::default()
        }
    }

    /// A dictionary whose every lookup fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Words looked up so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl DictionaryLookup for MockDictionary {
    fn check_word<'a>(&'a self, word: &'a str) -> BoxFuture<'a, Result<bool, LookupError>> {
        Box::pin(async move {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(word.to_string());
            }
            if self.failing {
                return Err(LookupError::Unavailable("mock dictionary is offline".to_string()));
            }
            Ok(self.known.contains(&word.to_lowercase()))
        })
    }
}

/// Test harness for running game scenarios.
pub struct TestHarness {
    pub session: GameSession,
}

impl TestHarness {
    /// A fresh session in the letters phase.
    pub fn new() -> Self {
        Self::with_draw(SessionConfig::new(), ScriptedDraw::new())
    }

    pub fn with_draw(config: SessionConfig, draw: ScriptedDraw) -> Self {
        Self {
            session: GameSession::with_draw(config, Box::new(draw)),
        }
    }

    /// A letters round with `tiles` drawn and the clock running.
    pub fn letters(tiles: &str) -> Self {
        Self::letters_with_config(tiles, SessionConfig::new())
    }

    pub fn letters_with_config(tiles: &str, config: SessionConfig) -> Self {
        let draw = ScriptedDraw::new().with_letters(tiles.chars());
        let mut harness = Self::with_draw(config, draw);
        for c in tiles.chars().take(TILES_PER_ROUND) {
            if harness.session.draw_letter(VOWELS.contains(&c)).is_err() {
                break;
            }
        }
        harness.skip_countdown();
        harness
    }

    /// A numbers round on `numbers` and `target` with the clock running.
    pub fn target(numbers: [i64; NUMBERS_PER_ROUND], target: i64) -> Self {
        Self::target_with_config(numbers, target, SessionConfig::new())
    }

    pub fn target_with_config(
        numbers: [i64; NUMBERS_PER_ROUND],
        target: i64,
        config: SessionConfig,
    ) -> Self {
        let draw = ScriptedDraw::new()
            .with_numbers(numbers)
            .with_target(target);
        let mut harness = Self::with_draw(config, draw);
        harness.session.reset_game(Phase::Target);
        harness.skip_countdown();
        harness
    }

    /// Tick the armed timer `n` times.
    pub fn tick(&mut self, n: u32) -> Vec<Effect> {
        let mut effects = Vec::new();
        for _ in 0..n {
            let Some(token) = self.session.timer_token() else {
                break;
            };
            effects.extend(self.session.tick(token));
        }
        effects
    }

    /// Tick through the countdown so the main clock runs.
    pub fn skip_countdown(&mut self) {
        while self.session.timer().is_countdown() {
            self.tick(1);
        }
    }

    /// Tick until the main clock expires.
    pub fn run_out_clock(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        while self.session.timer_token().is_some() {
            effects.extend(self.tick(1));
        }
        effects
    }

    /// Spell `word` from the first unused tile carrying each letter.
    pub fn spell(&mut self, word: &str) -> Result<(), IntentError> {
        for c in word.chars() {
            let index = self
                .session
                .word_round()
                .and_then(|round| {
                    round
                        .tiles()
                        .iter()
                        .position(|t| t.symbol == c && !t.used_in_word)
                })
                .unwrap_or(usize::MAX);
            self.session.append_to_word(index)?;
        }
        Ok(())
    }

    /// Click the first available token with `value`.
    pub fn pick(&mut self, value: i64) -> Result<Vec<Effect>, IntentError> {
        let id = self
            .session
            .arithmetic_round()
            .and_then(|round| round.token_with_value(value))
            .map(|t| t.id)
            .unwrap_or_default();
        self.session.append_number(id)
    }

    /// Build and commit `a op b = result` in one go.
    pub fn calculate(
        &mut self,
        a: i64,
        op: Operator,
        b: i64,
        result: i64,
    ) -> Result<Vec<Effect>, IntentError> {
        self.pick(a)?;
        self.session.append_operator(op)?;
        self.pick(b)?;
        self.session.set_pending_result(result.to_string())?;
        self.session.commit_step()
    }

    pub fn score(&self) -> u32 {
        self.session.score()
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn word(&self) -> String {
        self.session
            .word_round()
            .map(|round| round.word())
            .unwrap_or_default()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

#[track_caller]
pub fn assert_score(harness: &TestHarness, expected: u32) {
    assert_eq!(
        harness.score(),
        expected,
        "Expected score {expected}, got {}",
        harness.score()
    );
}

#[track_caller]
pub fn assert_phase(harness: &TestHarness, expected: Phase) {
    assert_eq!(
        harness.phase(),
        expected,
        "Expected {expected} phase, got {}",
        harness.phase()
    );
}

/// Assert the clock has run out (or was stopped by a submission).
#[track_caller]
pub fn assert_time_expired(harness: &TestHarness) {
    assert!(harness.session.time_expired(), "Expected time to be expired");
}

#[track_caller]
pub fn assert_time_running(harness: &TestHarness) {
    assert!(
        harness.session.timer().is_running(),
        "Expected the clock to be running, got {:?}",
        harness.session.timer()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_draw_then_fallback() {
        let mut draw = ScriptedDraw::new()
            .with_letters("AB".chars())
            .with_target(523);
        assert_eq!(draw.letter(LetterKind::Consonant), 'A');
        assert_eq!(draw.letter(LetterKind::Consonant), 'B');
        let fallback = draw.letter(LetterKind::Vowel);
        assert!(VOWELS.contains(&fallback));
        assert_eq!(draw.target(), 523);
    }

    #[test]
    fn test_harness_letters_round_ready() {
        let harness = TestHarness::letters("MAISONTRES");
        assert_phase(&harness, Phase::Letters);
        assert_time_running(&harness);
        assert_eq!(harness.session.word_round().unwrap().tiles().len(), 10);
    }

    #[test]
    fn test_harness_spell() {
        let mut harness = TestHarness::letters("MAISONTRES");
        harness.spell("SON").unwrap();
        assert_eq!(harness.word(), "SON");
    }

    #[test]
    fn test_harness_target_round_ready() {
        let mut harness = TestHarness::target([1, 2, 3, 4, 5, 100], 250);
        assert_phase(&harness, Phase::Target);
        assert_time_running(&harness);
        harness.calculate(100, Operator::Mul, 2, 200).unwrap();
        assert_eq!(harness.session.arithmetic_round().unwrap().ledger().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_dictionary() {
        let dictionary = MockDictionary::new(["maison"]);
        assert!(dictionary.check_word("MAISON").await.unwrap());
        assert!(!dictionary.check_word("XQZ").await.unwrap());
        assert_eq!(dictionary.calls(), vec!["MAISON", "XQZ"]);

        assert!(MockDictionary::failing().check_word("CHAT").await.is_err());
    }
}
