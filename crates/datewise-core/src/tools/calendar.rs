//! `calendar_db`: month expansion, per-month queries, aggregation.

use datewise_calendar::{CalendarSource, Category};
use serde_json::Value;
use tracing::warn;

/// Observation when every queried month came back empty.
pub const NO_RESULTS: &str = "No special days found.";

pub const NOT_A_MAPPING: &str = "Error: Input for calendar_db must be a dictionary.";
pub const MISSING_YEAR_OR_MONTH: &str = "Error: 'year' and 'month' are required for calendar_db.";

/// A validated `calendar_db` input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarRequest {
    pub year: String,
    /// Two-digit months, in query order.
    pub months: Vec<String>,
    pub category: Category,
}

/// Non-empty text for a scalar; `None` for null, empty, zero, or non-scalars.
fn present_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Left-pad with zeros to two characters.
fn zero_pad(month: &str) -> String {
    format!("{month:0>2}")
}

/// `all` → 01..12; `a,b` → each entry; otherwise the single value.
pub fn expand_months(month: &str) -> Vec<String> {
    let month = month.trim();
    if month.eq_ignore_ascii_case("all") {
        (1..=12).map(|m| format!("{m:02}")).collect()
    } else if month.contains(',') {
        month
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(zero_pad)
            .collect()
    } else {
        vec![zero_pad(month)]
    }
}

impl CalendarRequest {
    /// Validate raw tool input. The error is the observation text.
    pub fn from_input(input: &Value) -> Result<Self, &'static str> {
        let map = input.as_object().ok_or(NOT_A_MAPPING)?;

        let (Some(year), Some(month)) = (
            present_text(map.get("year")),
            present_text(map.get("month")),
        ) else {
            return Err(MISSING_YEAR_OR_MONTH);
        };

        let category = map
            .get("category")
            .and_then(Value::as_str)
            .map(Category::from_label)
            .unwrap_or_default();

        Ok(Self {
            year,
            months: expand_months(&month),
            category,
        })
    }
}

/// Query every month in order and aggregate into observation text.
///
/// Per-month failures are kept inline; they never abort the remaining months.
pub async fn lookup(source: &dyn CalendarSource, input: &Value) -> String {
    let request = match CalendarRequest::from_input(input) {
        Ok(request) => request,
        Err(message) => return message.to_string(),
    };

    let mut results: Vec<Value> = Vec::new();
    for month in &request.months {
        match source
            .special_days(&request.year, month, request.category)
            .await
        {
            Ok(days) => {
                for day in days {
                    match serde_json::to_value(&day) {
                        Ok(v) => results.push(v),
                        Err(e) => results.push(Value::String(format!(
                            "API Error for {}-{}: {}",
                            request.year, month, e
                        ))),
                    }
                }
            }
            Err(e) => {
                warn!(year = %request.year, month = %month, error = %e, "calendar query failed");
                results.push(Value::String(format!(
                    "API Error for {}-{}: {}",
                    request.year, month, e
                )));
            }
        }
    }

    if results.is_empty() {
        NO_RESULTS.to_string()
    } else {
        Value::Array(results).to_string()
    }
}
