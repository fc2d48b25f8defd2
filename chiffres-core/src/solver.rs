//! Reference hint for the numbers round.
//!
//! This is a deliberately shallow search: each number alone, then every pair
//! combined by addition or multiplication. It never subtracts or divides and
//! never chains more than one operation, so it can miss exact solutions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Best candidate the shallow search found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approximation {
    pub best_value: i64,
    pub diff: i64,
    /// The one human-readable step that produced `best_value`.
    pub step: String,
}

/// One displayable line of a hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintStep {
    pub id: usize,
    pub expression: String,
    pub result: Option<i64>,
}

/// A formatted hint, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverHint {
    pub message: String,
    pub steps: Vec<HintStep>,
    pub result: Option<i64>,
    pub diff: Option<i64>,
}

impl fmt::Display for SolverHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for step in &self.steps {
            match step.result {
                Some(result) => write!(f, "\n  {} = {}", step.expression, result)?,
                None => write!(f, "\n  {}", step.expression)?,
            }
        }
        Ok(())
    }
}

/// Search singles and pairwise `+`/`*` for the value closest to `target`.
///
/// Ties keep the earliest candidate. Returns `None` for an empty slice.
pub fn solve_approx(numbers: &[i64], target: i64) -> Option<Approximation> {
    let mut best: Option<Approximation> = None;

    let mut consider = |value: i64, step: String| {
        let diff = (value - target).abs();
        if best.as_ref().map_or(true, |b| diff < b.diff) {
            best = Some(Approximation {
                best_value: value,
                diff,
                step,
            });
        }
    };

    for &n in numbers {
        consider(n, format!("{n} is already close to the target"));
    }

    for (i, &a) in numbers.iter().enumerate() {
        for &b in &numbers[i + 1..] {
            let sum = a + b;
            consider(sum, format!("{a} + {b} = {sum}"));
            let product = a * b;
            consider(product, format!("{a} × {b} = {product}"));
        }
    }

    best
}

/// Turn a search result into a display hint.
pub fn format_hint(approximation: Option<&Approximation>) -> SolverHint {
    let Some(found) = approximation else {
        return SolverHint {
            message: "No solution found".to_string(),
            steps: Vec::new(),
            result: None,
            diff: None,
        };
    };

    // Steps of the form "a op b = c" carry their result separately.
    let step = match found.step.split_once(" = ") {
        Some((expression, result)) => HintStep {
            id: 1,
            expression: expression.to_string(),
            result: result.parse().ok(),
        },
        None => HintStep {
            id: 1,
            expression: found.step.clone(),
            result: None,
        },
    };

    let message = if found.diff == 0 {
        format!("Found the exact number ({})!", found.best_value)
    } else {
        format!(
            "Found {}, {} away from the target.",
            found.best_value, found.diff
        )
    };

    SolverHint {
        message,
        steps: vec![step],
        result: Some(found.best_value),
        diff: Some(found.diff),
    }
}
