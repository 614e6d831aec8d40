//! Operator commands and answer parsing
//!
//! Parsers return `InputParse` for structurally invalid answers (the prompt
//! is asked again) and `InvalidParameter` for well-formed answers that name
//! something that does not exist or is out of range.

use crate::error::{EtlError, EtlResult};

/// Smallest percent the operator may request
pub const MIN_PERCENT: f64 = 0.1;

/// Largest percent the operator may request
pub const MAX_PERCENT: f64 = 99.9;

/// Which relation a top-percent selection runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankScope {
    /// Most recent filter result
    Current,
    /// Whole base relation
    Whole,
}

/// Command accepted at `MainMenu`
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Filter { title_type: String },
    Unfiltered,
    TopPercent { scope: RankScope, percent: f64 },
    End,
}

/// Parsed main menu answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Type(String),
    Unfiltered,
    TopPercent,
    End,
}

/// `yes|y|1` or `no|n|0`, case-insensitive
pub fn parse_yes_no(input: &str) -> EtlResult<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "1" => Ok(true),
        "no" | "n" | "0" => Ok(false),
        other => Err(EtlError::InputParse(format!(
            "'{}' is not an answer, type yes or no",
            other
        ))),
    }
}

/// Menu answer: a 1-based type index, an exact type name, or a keyword
///
/// Keywords (`all`, `top`, `end`) are matched before type names.
pub fn parse_menu_choice(input: &str, title_types: &[String]) -> EtlResult<MenuChoice> {
    let answer = input.trim();
    if answer.is_empty() {
        return Err(EtlError::InputParse("Empty answer".to_string()));
    }

    match answer.to_ascii_lowercase().as_str() {
        "all" => return Ok(MenuChoice::Unfiltered),
        "top" => return Ok(MenuChoice::TopPercent),
        "end" | "quit" | "exit" => return Ok(MenuChoice::End),
        _ => {}
    }

    if let Ok(index) = answer.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| title_types.get(i))
            .map(|t| MenuChoice::Type(t.clone()))
            .ok_or_else(|| {
                EtlError::InvalidParameter(format!(
                    "No title type number {} (choose 1 to {})",
                    index,
                    title_types.len()
                ))
            });
    }

    title_types
        .iter()
        .find(|t| t.as_str() == answer)
        .map(|t| MenuChoice::Type(t.clone()))
        .ok_or_else(|| EtlError::InvalidParameter(format!("Unknown title type '{}'", answer)))
}

/// `1` / `current` or `2` / `whole`
pub fn parse_scope(input: &str) -> EtlResult<RankScope> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "current" => Ok(RankScope::Current),
        "2" | "whole" => Ok(RankScope::Whole),
        other => Err(EtlError::InputParse(format!(
            "'{}' is not a choice, type 1 or 2",
            other
        ))),
    }
}

/// Finite decimal number; range is checked separately
pub fn parse_percent(input: &str) -> EtlResult<f64> {
    let answer = input.trim();
    match answer.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(EtlError::InputParse(format!("'{}' is not a number", answer))),
    }
}

/// Operator-facing range `MIN_PERCENT..=MAX_PERCENT`
pub fn check_operator_percent(percent: f64) -> EtlResult<f64> {
    if (MIN_PERCENT..=MAX_PERCENT).contains(&percent) {
        Ok(percent)
    } else {
        Err(EtlError::InvalidParameter(format!(
            "Percent must be between {} and {}, got {}",
            MIN_PERCENT, MAX_PERCENT, percent
        )))
    }
}
