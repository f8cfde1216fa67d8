//! datewise-calendar: special-day lookups
//!
//! Backs the `calendar_db` tool. One call covers one (year, month,
//! category) triple; month expansion and result aggregation happen in the
//! dispatcher.

pub mod error;
pub mod fakes;
pub mod kasi;
pub mod types;

use async_trait::async_trait;

pub use error::{CalendarError, Result};
pub use kasi::{parse_items, KasiClient, KasiConfig, SERVICE_KEY_ENV};
pub use types::{date_kind_label, Category, SpecialDay};

/// Source of special days for a single solar month.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn special_days(
        &self,
        year: &str,
        month: &str,
        category: Category,
    ) -> Result<Vec<SpecialDay>>;
}

#[async_trait]
impl<T: CalendarSource + ?Sized> CalendarSource for std::sync::Arc<T> {
    async fn special_days(
        &self,
        year: &str,
        month: &str,
        category: Category,
    ) -> Result<Vec<SpecialDay>> {
        (**self).special_days(year, month, category).await
    }
}
