//! The numbers round: six numbers, a target, and a ledger of calculations.
//!
//! The player builds one expression at a time from available tokens and
//! operators, types its result, and commits it. A committed result becomes a
//! new token that can be used in later steps. The round ends when a final
//! answer is chosen or the clock runs out.

use crate::expression::evaluate_expression;
use crate::rules::{proximity_points, ProximityTier};
use crate::solver::{format_hint, solve_approx, SolverHint};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a number token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub Uuid);

impl TokenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a committed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(pub Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a numbers-round operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumbersError {
    #[error("No number with id {0}")]
    UnknownToken(TokenId),
    #[error("That number has already been used")]
    TokenConsumed,
    #[error("Choose an operator before the next number")]
    NumberAfterNumber,
    #[error("You must select a number first")]
    EmptyExpression,
    #[error("Enter the result of the calculation")]
    MissingResult,
    #[error("Please enter a valid numeric result (got '{0}')")]
    InvalidResult(String),
    #[error("Your result {typed} does not match the expression ({actual})")]
    ResultMismatch { typed: i64, actual: String },
    #[error("Enter a result or pick a number as your final answer")]
    NoFinalAnswer,
    #[error("The round is over")]
    Locked,
}

/// Arithmetic operator available to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

impl Operator {
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Sub),
            "*" | "×" | "x" => Ok(Operator::Mul),
            "/" | "÷" => Ok(Operator::Div),
            other => Err(format!("Unknown operator '{other}'")),
        }
    }
}

/// Where a token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenOrigin {
    /// One of the six drawn numbers.
    Initial,
    /// The typed result of a committed step.
    Derived,
}

/// A number the player can click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberToken {
    pub id: TokenId,
    pub value: i64,
    pub origin: TokenOrigin,
    pub consumed: bool,
}

impl NumberToken {
    pub fn new(value: i64, origin: TokenOrigin) -> Self {
        Self {
            id: TokenId::new(),
            value,
            origin,
            consumed: false,
        }
    }
}

/// A committed calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    pub expression: String,
    pub result: i64,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.expression, self.result)
    }
}

/// The expression under construction and the result typed for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationStep {
    pub expression: String,
    pub pending_input: String,
}

impl CalculationStep {
    /// The expression with runs of spaces collapsed.
    pub fn display(&self) -> String {
        self.expression.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Parse the typed result. `Ok(None)` when nothing has been typed.
    pub fn pending_value(&self) -> Result<Option<i64>, NumbersError> {
        let text = self.pending_input.trim();
        if text.is_empty() {
            return Ok(None);
        }
        text.parse::<i64>()
            .map(Some)
            .map_err(|_| NumbersError::InvalidResult(text.to_string()))
    }
}

/// The last thing appended to the expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastInput {
    Number,
    Operator,
}

/// The end-of-round result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub target: i64,
    pub final_result: i64,
    pub difference: i64,
    pub points: u32,
    pub tier: ProximityTier,
    pub message: String,
    /// The six drawn numbers, for the reference hint.
    pub initial_numbers: Vec<i64>,
}

impl RoundSummary {
    pub fn new(target: i64, final_result: i64, initial_numbers: Vec<i64>) -> Self {
        // Saturates when a typed result is near the ends of the i64 range.
        let difference = i64::try_from(target.abs_diff(final_result)).unwrap_or(i64::MAX);
        let tier = ProximityTier::for_difference(difference);
        Self {
            target,
            final_result,
            difference,
            points: proximity_points(difference),
            tier,
            message: tier.message(final_result, difference),
            initial_numbers,
        }
    }

    /// Reference hint computed from the drawn numbers.
    pub fn hint(&self) -> SolverHint {
        format_hint(solve_approx(&self.initial_numbers, self.target).as_ref())
    }
}

/// State of the numbers round once a target exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArithmeticRound {
    target: i64,
    tokens: Vec<NumberToken>,
    ledger: Vec<Operation>,
    step: CalculationStep,
    last_input: Option<LastInput>,
    last_clicked: Option<i64>,
    locked: bool,
    summary: Option<RoundSummary>,
}

impl ArithmeticRound {
    /// Start a round with the drawn numbers as initial tokens.
    pub fn new(target: i64, numbers: &[i64]) -> Self {
        Self {
            target,
            tokens: numbers
                .iter()
                .map(|&n| NumberToken::new(n, TokenOrigin::Initial))
                .collect(),
            ledger: Vec::new(),
            step: CalculationStep::default(),
            last_input: None,
            last_clicked: None,
            locked: false,
            summary: None,
        }
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn tokens(&self) -> &[NumberToken] {
        &self.tokens
    }

    /// Tokens still available to click.
    pub fn available(&self) -> impl Iterator<Item = &NumberToken> {
        self.tokens.iter().filter(|t| !t.consumed)
    }

    pub fn token(&self, id: TokenId) -> Option<&NumberToken> {
        self.tokens.iter().find(|t| t.id == id)
    }

    /// First available token carrying `value`.
    pub fn token_with_value(&self, value: i64) -> Option<&NumberToken> {
        self.available().find(|t| t.value == value)
    }

    pub fn ledger(&self) -> &[Operation] {
        &self.ledger
    }

    pub fn step(&self) -> &CalculationStep {
        &self.step
    }

    pub fn last_input(&self) -> Option<LastInput> {
        self.last_input
    }

    pub fn last_clicked(&self) -> Option<i64> {
        self.last_clicked
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn summary(&self) -> Option<&RoundSummary> {
        self.summary.as_ref()
    }

    fn initial_numbers(&self) -> Vec<i64> {
        self.tokens
            .iter()
            .filter(|t| t.origin == TokenOrigin::Initial)
            .map(|t| t.value)
            .collect()
    }

    fn ensure_open(&self) -> Result<(), NumbersError> {
        if self.locked {
            Err(NumbersError::Locked)
        } else {
            Ok(())
        }
    }

    /// Append an available token to the expression and consume it.
    pub fn append_number(&mut self, id: TokenId) -> Result<i64, NumbersError> {
        self.ensure_open()?;
        if self.last_input == Some(LastInput::Number) {
            return Err(NumbersError::NumberAfterNumber);
        }
        let token = self
            .tokens
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(NumbersError::UnknownToken(id))?;
        if token.consumed {
            return Err(NumbersError::TokenConsumed);
        }

        token.consumed = true;
        let value = token.value;
        self.step.expression.push_str(&format!(" {value}"));
        self.last_input = Some(LastInput::Number);
        self.last_clicked = Some(value);
        Ok(value)
    }

    /// Append an operator, replacing the previous one if it was an operator too.
    pub fn append_operator(&mut self, op: Operator) -> Result<(), NumbersError> {
        self.ensure_open()?;
        if self.step.expression.trim().is_empty() {
            return Err(NumbersError::EmptyExpression);
        }

        if self.last_input == Some(LastInput::Operator) {
            let trimmed = self.step.expression.trim();
            if let Some(space) = trimmed.rfind(' ') {
                self.step.expression = format!("{}{} ", &trimmed[..=space], op.symbol());
            }
        } else {
            self.step.expression.push_str(&format!(" {} ", op.symbol()));
        }
        self.last_input = Some(LastInput::Operator);
        Ok(())
    }

    /// Replace the typed result text.
    pub fn set_pending_input(&mut self, text: impl Into<String>) -> Result<(), NumbersError> {
        self.ensure_open()?;
        self.step.pending_input = text.into();
        Ok(())
    }

    /// Commit the current step to the ledger.
    ///
    /// The typed result becomes a new derived token. With `verify` set, the
    /// expression is evaluated and must equal the typed result.
    pub fn commit_step(&mut self, verify: bool) -> Result<Operation, NumbersError> {
        self.ensure_open()?;
        if self.step.expression.trim().is_empty() {
            return Err(NumbersError::EmptyExpression);
        }
        let result = self
            .step
            .pending_value()?
            .ok_or(NumbersError::MissingResult)?;

        let expression = self.step.display();
        if verify {
            match evaluate_expression(&expression) {
                Ok(actual) if actual == result as f64 => {}
                Ok(actual) => {
                    return Err(NumbersError::ResultMismatch {
                        typed: result,
                        actual: actual.to_string(),
                    })
                }
                Err(err) => {
                    return Err(NumbersError::ResultMismatch {
                        typed: result,
                        actual: err.to_string(),
                    })
                }
            }
        }

        let operation = Operation {
            id: OperationId::new(),
            expression,
            result,
        };
        self.ledger.push(operation.clone());
        self.tokens
            .push(NumberToken::new(result, TokenOrigin::Derived));
        self.step = CalculationStep::default();
        self.last_input = None;
        Ok(operation)
    }

    /// End the round with the typed result, or else the last clicked number.
    pub fn finalize(&mut self) -> Result<RoundSummary, NumbersError> {
        self.ensure_open()?;
        let final_result = match self.step.pending_value()? {
            Some(value) => value,
            None => self.last_clicked.ok_or(NumbersError::NoFinalAnswer)?,
        };
        Ok(self.close(final_result))
    }

    /// The clock ran out. Scores 0 as the final result unless already scored.
    pub fn expire(&mut self) -> Option<RoundSummary> {
        if self.summary.is_some() {
            self.locked = true;
            return None;
        }
        Some(self.close(0))
    }

    fn close(&mut self, final_result: i64) -> RoundSummary {
        let summary = RoundSummary::new(self.target, final_result, self.initial_numbers());
        self.locked = true;
        self.summary = Some(summary.clone());
        summary
    }
}
