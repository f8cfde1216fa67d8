//! In-memory calendar source (testing only)

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CalendarError, Result};
use crate::types::{Category, SpecialDay};
use crate::CalendarSource;

/// A query seen by [`MemoryCalendar`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarQuery {
    pub year: String,
    pub month: String,
    pub category: Category,
}

/// Calendar backed by a `HashMap<(year, month), days>`; records every query.
///
/// Months listed in `failing` return [`CalendarError::Status`] 500.
#[derive(Debug, Default)]
pub struct MemoryCalendar {
    days: HashMap<(String, String), Vec<SpecialDay>>,
    failing: Vec<(String, String)>,
    queries: Mutex<Vec<CalendarQuery>>,
}

impl MemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_days(mut self, year: &str, month: &str, days: Vec<SpecialDay>) -> Self {
        self.days
            .insert((year.to_string(), month.to_string()), days);
        self
    }

    pub fn with_failure(mut self, year: &str, month: &str) -> Self {
        self.failing.push((year.to_string(), month.to_string()));
        self
    }

    pub fn queries(&self) -> Vec<CalendarQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarSource for MemoryCalendar {
    async fn special_days(
        &self,
        year: &str,
        month: &str,
        category: Category,
    ) -> Result<Vec<SpecialDay>> {
        self.queries.lock().unwrap().push(CalendarQuery {
            year: year.to_string(),
            month: month.to_string(),
            category,
        });

        let key = (year.to_string(), month.to_string());
        if self.failing.contains(&key) {
            return Err(CalendarError::Status(500));
        }
        Ok(self.days.get(&key).cloned().unwrap_or_default())
    }
}
