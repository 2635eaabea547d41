use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

static AMOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+(?:\.\d+)?$").expect("valid regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
  #[error("amount is not a number")]
  InvalidFormat,
  #[error("amount must be positive")]
  NotPositive,
}

/// Parses a withdrawal amount typed by the user.
pub fn parse_amount(input: &str) -> Result<Decimal, AmountError> {
  let trimmed = input.trim();
  if !AMOUNT_PATTERN.is_match(trimmed) {
    return Err(AmountError::InvalidFormat);
  }
  let value = Decimal::from_str(trimmed.trim_start_matches('+')).map_err(|_| AmountError::InvalidFormat)?;
  if value <= Decimal::ZERO {
    return Err(AmountError::NotPositive);
  }
  Ok(value)
}

/// Parses a balance cell. Blank cells count as zero.
pub fn parse_balance(raw: &str) -> Option<Decimal> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Some(Decimal::ZERO);
  }
  if !AMOUNT_PATTERN.is_match(trimmed) {
    return None;
  }
  Decimal::from_str(trimmed.trim_start_matches('+')).ok()
}

pub fn format_rupees(amount: impl std::fmt::Display) -> String {
  format!("₹{amount}")
}
