//! Letter and number draws.
//!
//! Letters are drawn with French letter-frequency weighting, numbers are drawn
//! without replacement from the classic plate pool, and targets are uniform
//! three-digit integers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Relative frequency of each letter in French text, in percent.
pub const LETTER_WEIGHTS: [(char, f64); 26] = [
    ('A', 8.15),
    ('B', 0.97),
    ('C', 3.15),
    ('D', 3.73),
    ('E', 17.39),
    ('F', 1.12),
    ('G', 0.97),
    ('H', 0.85),
    ('I', 7.31),
    ('J', 0.45),
    ('K', 0.02),
    ('L', 5.69),
    ('M', 2.87),
    ('N', 7.12),
    ('O', 5.28),
    ('P', 2.80),
    ('Q', 1.21),
    ('R', 6.64),
    ('S', 8.14),
    ('T', 7.22),
    ('U', 6.38),
    ('V', 1.64),
    ('W', 0.03),
    ('X', 0.41),
    ('Y', 0.28),
    ('Z', 0.15),
];

pub const VOWELS: [char; 6] = ['A', 'E', 'I', 'O', 'U', 'Y'];

pub const CONSONANTS: [char; 20] = [
    'B', 'C', 'D', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W', 'X',
    'Z',
];

/// The fourteen plates six numbers are drawn from.
pub const NUMBER_POOL: [i64; 14] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 25, 50, 75, 100];

/// How many numbers a numbers round draws.
pub const NUMBERS_PER_ROUND: usize = 6;

/// Inclusive bounds of the target number.
pub const TARGET_MIN: i64 = 100;
pub const TARGET_MAX: i64 = 999;

/// Which pool a letter is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterKind {
    Vowel,
    Consonant,
}

impl LetterKind {
    pub fn from_vowel_flag(is_vowel: bool) -> Self {
        if is_vowel {
            LetterKind::Vowel
        } else {
            LetterKind::Consonant
        }
    }

    /// The letters belonging to this pool, in table order.
    pub fn pool(&self) -> &'static [char] {
        match self {
            LetterKind::Vowel => &VOWELS,
            LetterKind::Consonant => &CONSONANTS,
        }
    }
}

/// Weight of a letter in [`LETTER_WEIGHTS`], zero if unknown.
pub fn letter_weight(letter: char) -> f64 {
    LETTER_WEIGHTS
        .iter()
        .find(|(l, _)| *l == letter)
        .map(|(_, w)| *w)
        .unwrap_or(0.0)
}

/// Source of raw tiles for the round engines.
///
/// The session draws through this trait so tests can script the tiles.
pub trait Draw: Send {
    fn letter(&mut self, kind: LetterKind) -> char;
    fn six_numbers(&mut self) -> [i64; NUMBERS_PER_ROUND];
    fn target(&mut self) -> i64;
}

/// Random draws backed by any rng.
#[derive(Debug, Clone)]
pub struct RandomDraw<R: Rng = StdRng> {
    rng: R,
}

impl RandomDraw<StdRng> {
    /// Random draws seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic draws for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomDraw<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> Draw for RandomDraw<R> {
    fn letter(&mut self, kind: LetterKind) -> char {
        draw_letter_with_rng(kind, &mut self.rng)
    }

    fn six_numbers(&mut self) -> [i64; NUMBERS_PER_ROUND] {
        draw_six_numbers_with_rng(&mut self.rng)
    }

    fn target(&mut self) -> i64 {
        draw_target_with_rng(&mut self.rng)
    }
}

/// Draw one letter from the vowel or consonant pool, weighted by frequency.
pub fn draw_letter_with_rng<R: Rng>(kind: LetterKind, rng: &mut R) -> char {
    let pool = kind.pool();
    let total: f64 = pool.iter().map(|&l| letter_weight(l)).sum();
    let roll = rng.gen::<f64>() * total;

    let mut cumulative = 0.0;
    for &letter in pool {
        cumulative += letter_weight(letter);
        if cumulative >= roll {
            return letter;
        }
    }

    // Float rounding can leave the roll just above the last cumulative weight.
    pool[0]
}

/// Draw six distinct plates; order is draw order.
pub fn draw_six_numbers_with_rng<R: Rng>(rng: &mut R) -> [i64; NUMBERS_PER_ROUND] {
    let mut remaining = NUMBER_POOL.to_vec();
    let mut drawn = [0; NUMBERS_PER_ROUND];
    for slot in drawn.iter_mut() {
        let index = rng.gen_range(0..remaining.len());
        *slot = remaining.remove(index);
    }
    drawn
}

/// Draw a target in `100..=999`.
pub fn draw_target_with_rng<R: Rng>(rng: &mut R) -> i64 {
    rng.gen_range(TARGET_MIN..=TARGET_MAX)
}

/// Convenience: draw a letter with the thread rng.
pub fn draw_letter(is_vowel: bool) -> char {
    draw_letter_with_rng(LetterKind::from_vowel_flag(is_vowel), &mut rand::thread_rng())
}

/// Convenience: draw six numbers with the thread rng.
pub fn draw_six_numbers() -> [i64; NUMBERS_PER_ROUND] {
    draw_six_numbers_with_rng(&mut rand::thread_rng())
}

/// Convenience: draw a target with the thread rng.
pub fn draw_target() -> i64 {
    draw_target_with_rng(&mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_pools_partition_alphabet() {
        let mut all: Vec<char> = VOWELS.iter().chain(CONSONANTS.iter()).copied().collect();
        all.sort();
        let alphabet: Vec<char> = ('A'..='Z').collect();
        assert_eq!(all, alphabet);
    }

    #[test]
    fn test_vowel_draws_stay_in_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let letter = draw_letter_with_rng(LetterKind::Vowel, &mut rng);
            assert!(VOWELS.contains(&letter), "{letter} is not a vowel");
        }
    }

    #[test]
    fn test_consonant_frequencies_converge() {
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 10_000;
        let mut counts: HashMap<char, usize> = HashMap::new();
        for _ in 0..draws {
            *counts
                .entry(draw_letter_with_rng(LetterKind::Consonant, &mut rng))
                .or_default() += 1;
        }

        let total: f64 = CONSONANTS.iter().map(|&c| letter_weight(c)).sum();
        for &letter in &CONSONANTS {
            let expected = letter_weight(letter) / total;
            let observed = *counts.get(&letter).unwrap_or(&0) as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.015,
                "{letter}: observed {observed:.4}, expected {expected:.4}"
            );
        }
    }

    #[test]
    fn test_six_numbers_distinct_from_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let numbers = draw_six_numbers_with_rng(&mut rng);
            let unique: HashSet<i64> = numbers.iter().copied().collect();
            assert_eq!(unique.len(), NUMBERS_PER_ROUND);
            assert!(numbers.iter().all(|n| NUMBER_POOL.contains(n)));
        }
    }

    #[test]
    fn test_seeded_draws_repeat() {
        let mut a = RandomDraw::seeded(99);
        let mut b = RandomDraw::seeded(99);
        assert_eq!(a.six_numbers(), b.six_numbers());
        assert_eq!(a.target(), b.target());
        assert_eq!(a.letter(LetterKind::Consonant), b.letter(LetterKind::Consonant));
    }

    #[test]
    fn test_target_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let target = draw_target_with_rng(&mut rng);
            assert!((TARGET_MIN..=TARGET_MAX).contains(&target));
        }
    }
}
