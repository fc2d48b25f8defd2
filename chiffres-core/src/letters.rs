//! The letters round: ten drawn tiles and the word built from them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tiles drawn per letters round.
pub const TILES_PER_ROUND: usize = 10;

/// Why a letters-round operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LettersError {
    #[error("All ten letters have already been drawn")]
    TilesFull,
    #[error("No tile at position {0}")]
    NoSuchTile(usize),
    #[error("Tile {0} is already part of the word")]
    TileUsed(usize),
    #[error("The word is locked")]
    Locked,
    #[error("The word is empty")]
    EmptyWord,
    #[error("A word has already been submitted this round")]
    AlreadySubmitted,
}

/// One drawn letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub symbol: char,
    pub used_in_word: bool,
}

impl Tile {
    pub fn new(symbol: char) -> Self {
        Self {
            symbol,
            used_in_word: false,
        }
    }
}

/// A submitted word and what it earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSubmission {
    pub word: String,
    pub points: u32,
    /// True if the clock had already run out when the word was submitted.
    pub late: bool,
}

/// State of the letters round.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordRound {
    tiles: Vec<Tile>,
    word: Vec<char>,
    locked: bool,
    submission: Option<WordSubmission>,
}

impl WordRound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a round from already-known tiles.
    pub fn with_tiles(symbols: impl IntoIterator<Item = char>) -> Self {
        Self {
            tiles: symbols
                .into_iter()
                .take(TILES_PER_ROUND)
                .map(Tile::new)
                .collect(),
            ..Self::default()
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// The word in progress.
    pub fn word(&self) -> String {
        self.word.iter().collect()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_full(&self) -> bool {
        self.tiles.len() >= TILES_PER_ROUND
    }

    pub fn submission(&self) -> Option<&WordSubmission> {
        self.submission.as_ref()
    }

    /// Add a drawn letter. Returns the new tile count.
    pub fn push_tile(&mut self, symbol: char) -> Result<usize, LettersError> {
        if self.is_full() {
            return Err(LettersError::TilesFull);
        }
        self.tiles.push(Tile::new(symbol));
        Ok(self.tiles.len())
    }

    /// Append the letter of an unused tile to the word.
    pub fn append_letter(&mut self, tile_index: usize) -> Result<char, LettersError> {
        if self.locked {
            return Err(LettersError::Locked);
        }
        let tile = self
            .tiles
            .get_mut(tile_index)
            .ok_or(LettersError::NoSuchTile(tile_index))?;
        if tile.used_in_word {
            return Err(LettersError::TileUsed(tile_index));
        }
        tile.used_in_word = true;
        self.word.push(tile.symbol);
        Ok(tile.symbol)
    }

    /// Drop the last letter of the word and free its tile.
    ///
    /// The freed tile is the last used tile (by position) carrying that
    /// letter, which matters when the draw holds duplicates.
    pub fn remove_last_letter(&mut self) -> Result<char, LettersError> {
        if self.locked {
            return Err(LettersError::Locked);
        }
        let last = *self.word.last().ok_or(LettersError::EmptyWord)?;

        if let Some(tile) = self
            .tiles
            .iter_mut()
            .rev()
            .find(|t| t.used_in_word && t.symbol == last)
        {
            tile.used_in_word = false;
        }
        self.word.pop();
        Ok(last)
    }

    /// Free every tile and empty the word.
    pub fn clear_word(&mut self) -> Result<(), LettersError> {
        if self.locked {
            return Err(LettersError::Locked);
        }
        for tile in &mut self.tiles {
            tile.used_in_word = false;
        }
        self.word.clear();
        Ok(())
    }

    /// Submit the word and lock the round.
    ///
    /// One point per letter, but only if the clock was still running.
    pub fn submit(&mut self, time_expired: bool) -> Result<WordSubmission, LettersError> {
        if self.submission.is_some() {
            return Err(LettersError::AlreadySubmitted);
        }
        if self.word.is_empty() {
            return Err(LettersError::EmptyWord);
        }

        let word = self.word();
        let points = if time_expired {
            0
        } else {
            crate::rules::word_points(&word)
        };
        let submission = WordSubmission {
            word,
            points,
            late: time_expired,
        };

        self.locked = true;
        self.submission = Some(submission.clone());
        Ok(submission)
    }

    /// Lock the word without submitting (clock ran out).
    pub fn lock(&mut self) {
        self.locked = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used(round: &WordRound) -> Vec<bool> {
        round.tiles().iter().map(|t| t.used_in_word).collect()
    }

    #[test]
    fn test_push_tile_caps_at_ten() {
        let mut round = WordRound::new();
        for (i, c) in "ABCDEFGHIJ".chars().enumerate() {
            assert_eq!(round.push_tile(c), Ok(i + 1));
        }
        assert!(round.is_full());
        assert_eq!(round.push_tile('K'), Err(LettersError::TilesFull));
    }

    #[test]
    fn test_append_marks_tile_used() {
        let mut round = WordRound::with_tiles("MAISON".chars());
        assert_eq!(round.append_letter(0), Ok('M'));
        assert_eq!(round.append_letter(1), Ok('A'));
        assert_eq!(round.word(), "MA");
        assert_eq!(used(&round), vec![true, true, false, false, false, false]);
    }

    #[test]
    fn test_append_used_tile_rejected() {
        let mut round = WordRound::with_tiles("AB".chars());
        round.append_letter(0).unwrap();
        assert_eq!(round.append_letter(0), Err(LettersError::TileUsed(0)));
        assert_eq!(round.append_letter(5), Err(LettersError::NoSuchTile(5)));
        assert_eq!(round.word(), "A");
    }

    #[test]
    fn test_remove_last_letter_frees_latest_matching_tile() {
        let mut round = WordRound::with_tiles("ABA".chars());
        round.append_letter(0).unwrap();
        round.append_letter(2).unwrap();
        round.append_letter(1).unwrap();
        assert_eq!(round.word(), "AAB");

        assert_eq!(round.remove_last_letter(), Ok('B'));
        assert_eq!(round.word(), "AA");
        assert_eq!(used(&round), vec![true, false, true]);
    }

    #[test]
    fn test_remove_last_duplicate_scans_by_position() {
        // Word built as A(idx2) then A(idx0): the scan frees idx2, not idx0.
        let mut round = WordRound::with_tiles("ABA".chars());
        round.append_letter(2).unwrap();
        round.append_letter(0).unwrap();

        round.remove_last_letter().unwrap();
        assert_eq!(used(&round), vec![true, false, false]);
        assert_eq!(round.word(), "A");
    }

    #[test]
    fn test_remove_on_empty_word() {
        let mut round = WordRound::with_tiles("AB".chars());
        assert_eq!(round.remove_last_letter(), Err(LettersError::EmptyWord));
    }

    #[test]
    fn test_clear_word() {
        let mut round = WordRound::with_tiles("ABC".chars());
        round.append_letter(2).unwrap();
        round.append_letter(0).unwrap();
        round.clear_word().unwrap();
        assert_eq!(round.word(), "");
        assert!(round.tiles().iter().all(|t| !t.used_in_word));
    }

    #[test]
    fn test_submit_scores_length() {
        let mut round = WordRound::with_tiles("MAISONXYZT".chars());
        for i in 0..6 {
            round.append_letter(i).unwrap();
        }
        let submission = round.submit(false).unwrap();
        assert_eq!(submission.word, "MAISON");
        assert_eq!(submission.points, 6);
        assert!(round.is_locked());
        assert_eq!(round.append_letter(7), Err(LettersError::Locked));
    }

    #[test]
    fn test_late_submission_scores_zero() {
        let mut round = WordRound::with_tiles("MAISON".chars());
        for i in 0..6 {
            round.append_letter(i).unwrap();
        }
        let submission = round.submit(true).unwrap();
        assert_eq!(submission.points, 0);
        assert!(submission.late);
    }

    #[test]
    fn test_submit_twice_rejected() {
        let mut round = WordRound::with_tiles("AB".chars());
        round.append_letter(0).unwrap();
        round.submit(false).unwrap();
        assert_eq!(round.submit(false), Err(LettersError::AlreadySubmitted));
    }

    #[test]
    fn test_submit_empty_rejected() {
        let mut round = WordRound::with_tiles("AB".chars());
        assert_eq!(round.submit(false), Err(LettersError::EmptyWord));
        assert!(!round.is_locked());
    }
}
