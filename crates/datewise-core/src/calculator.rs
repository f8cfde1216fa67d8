//! Deterministic date-expression calculator.
//!
//! Backs the `calculator` tool. Three expression families are recognised,
//! tried in order, each anchored at the start of the (lower-cased, trimmed)
//! input:
//!
//! 1. offset: `2025-11-21 + 3 weeks`, `2025-01-31 - 1 month`
//! 2. weekday navigation: `2025-11-21 next friday`, `... last monday`
//! 3. period navigation: `2025-11-21 next month`, `... previous week`
//!
//! Failures render as observation text via `Display`, so callers can hand
//! the error straight back to the reasoning engine.

use std::fmt;
use std::sync::OnceLock;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Calculator failure taxonomy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalcError {
    /// No expression family matched.
    #[error("Error: Cannot parse calculator input '{0}'")]
    Unparseable(String),

    /// Weekday navigation with a word that is not a weekday.
    #[error("Error: Unknown day '{0}'")]
    UnknownWeekday(String),

    /// Pattern matched but the date or the arithmetic is invalid.
    #[error("Calculator Error: {0}")]
    Calculation(String),
}

/// A valid calendar date, rendered `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResolvedDate(NaiveDate);

impl ResolvedDate {
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for ResolvedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for ResolvedDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetUnit {
    Days,
    Weeks,
    Months,
}

/// `next`, `this`, or `last`/`previous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    This,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
}

/// A parsed date expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateExpression {
    Offset {
        base: NaiveDate,
        sign: Sign,
        amount: u64,
        unit: OffsetUnit,
    },
    Weekday {
        base: NaiveDate,
        direction: Direction,
        weekday: Weekday,
    },
    Period {
        base: NaiveDate,
        direction: Direction,
        period: Period,
    },
}

fn offset_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2})\s*([+-])\s*([0-9]+)\s*(days?|weeks?|months?)")
            .expect("offset pattern is valid")
    })
}

fn weekday_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2})\s*(next|last|previous|this)\s*(\w+day)")
            .expect("weekday pattern is valid")
    })
}

fn period_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2})\s*(next|last|previous|this)\s*(week|month)")
            .expect("period pattern is valid")
    })
}

/// Years a `YYYY-MM-DD` date can spell.
const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

fn check_year(date: NaiveDate) -> Result<NaiveDate, CalcError> {
    if SUPPORTED_YEARS.contains(&date.year()) {
        Ok(date)
    } else {
        Err(CalcError::Calculation(format!(
            "year {} is out of range",
            date.year()
        )))
    }
}

fn parse_base(text: &str) -> Result<NaiveDate, CalcError> {
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| CalcError::Calculation(format!("invalid date '{text}': {e}")))?;
    check_year(date)
}

fn parse_direction(word: &str) -> Direction {
    match word {
        "next" => Direction::Next,
        "this" => Direction::This,
        _ => Direction::Last,
    }
}

fn parse_weekday(word: &str) -> Option<Weekday> {
    match word {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

impl DateExpression {
    /// Parse free text into an expression. The first matching family wins.
    pub fn parse(input: &str) -> Result<Self, CalcError> {
        let text = input.trim().to_lowercase();

        if let Some(caps) = offset_pattern().captures(&text) {
            let base = parse_base(&caps[1])?;
            let sign = if &caps[2] == "+" {
                Sign::Plus
            } else {
                Sign::Minus
            };
            let amount = caps[3]
                .parse::<u64>()
                .map_err(|e| CalcError::Calculation(format!("invalid amount '{}': {e}", &caps[3])))?;
            let unit = match &caps[4] {
                u if u.starts_with("day") => OffsetUnit::Days,
                u if u.starts_with("week") => OffsetUnit::Weeks,
                _ => OffsetUnit::Months,
            };
            return Ok(Self::Offset {
                base,
                sign,
                amount,
                unit,
            });
        }

        if let Some(caps) = weekday_pattern().captures(&text) {
            let base = parse_base(&caps[1])?;
            let direction = parse_direction(&caps[2]);
            let weekday = parse_weekday(&caps[3])
                .ok_or_else(|| CalcError::UnknownWeekday(caps[3].to_string()))?;
            return Ok(Self::Weekday {
                base,
                direction,
                weekday,
            });
        }

        if let Some(caps) = period_pattern().captures(&text) {
            let base = parse_base(&caps[1])?;
            let direction = parse_direction(&caps[2]);
            let period = if &caps[3] == "week" {
                Period::Week
            } else {
                Period::Month
            };
            return Ok(Self::Period {
                base,
                direction,
                period,
            });
        }

        Err(CalcError::Unparseable(text))
    }

    /// Evaluate to a concrete date.
    pub fn resolve(&self) -> Result<ResolvedDate, CalcError> {
        let date = match *self {
            Self::Offset {
                base,
                sign,
                amount,
                unit,
            } => match unit {
                OffsetUnit::Days => shift_days(base, sign, amount)?,
                OffsetUnit::Weeks => {
                    let days = amount
                        .checked_mul(7)
                        .ok_or_else(|| overflow(base, "weeks"))?;
                    shift_days(base, sign, days)?
                }
                OffsetUnit::Months => {
                    let months = u32::try_from(amount).map_err(|_| overflow(base, "months"))?;
                    shift_months(base, sign, months)?
                }
            },
            Self::Weekday {
                base,
                direction,
                weekday,
            } => navigate_weekday(base, direction, weekday)?,
            Self::Period {
                base,
                direction,
                period,
            } => {
                // `this` behaves like `next` for periods.
                let sign = match direction {
                    Direction::Next | Direction::This => Sign::Plus,
                    Direction::Last => Sign::Minus,
                };
                match period {
                    Period::Week => shift_days(base, sign, 7)?,
                    Period::Month => shift_months(base, sign, 1)?,
                }
            }
        };
        check_year(date).map(ResolvedDate)
    }
}

fn overflow(base: NaiveDate, what: &str) -> CalcError {
    CalcError::Calculation(format!("{what} offset from {base} is out of range"))
}

fn shift_days(base: NaiveDate, sign: Sign, days: u64) -> Result<NaiveDate, CalcError> {
    let shifted = match sign {
        Sign::Plus => base.checked_add_days(Days::new(days)),
        Sign::Minus => base.checked_sub_days(Days::new(days)),
    };
    shifted.ok_or_else(|| overflow(base, "day"))
}

/// Calendar-month shift; the day clamps to the target month's last day.
fn shift_months(base: NaiveDate, sign: Sign, months: u32) -> Result<NaiveDate, CalcError> {
    let shifted = match sign {
        Sign::Plus => base.checked_add_months(Months::new(months)),
        Sign::Minus => base.checked_sub_months(Months::new(months)),
    };
    shifted.ok_or_else(|| overflow(base, "month"))
}

fn navigate_weekday(
    base: NaiveDate,
    direction: Direction,
    target: Weekday,
) -> Result<NaiveDate, CalcError> {
    let current = i64::from(base.weekday().num_days_from_monday());
    let wanted = i64::from(target.num_days_from_monday());

    match direction {
        Direction::Next | Direction::This => {
            let mut ahead = wanted - current;
            if (direction == Direction::Next && ahead <= 0) || ahead < 0 {
                ahead += 7;
            }
            shift_days(base, Sign::Plus, ahead as u64)
        }
        Direction::Last => {
            let mut behind = current - wanted;
            if behind <= 0 {
                behind += 7;
            }
            shift_days(base, Sign::Minus, behind as u64)
        }
    }
}

/// Parse and evaluate `input`.
pub fn evaluate(input: &str) -> Result<ResolvedDate, CalcError> {
    DateExpression::parse(input)?.resolve()
}

/// Evaluate `input` into observation text: the date or the failure message.
pub fn calculate(input: &str) -> String {
    match evaluate(input) {
        Ok(date) => date.to_string(),
        Err(err) => err.to_string(),
    }
}
