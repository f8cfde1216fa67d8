//! KASI special-day client
//!
//! Queries the Korea Astronomy and Space Science Institute special-day
//! service (`SpcdeInfoService`) one solar month at a time.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{CalendarError, Result};
use crate::types::{Category, SpecialDay};
use crate::CalendarSource;

/// Environment variable holding the service key.
pub const SERVICE_KEY_ENV: &str = "KASI_API_KEY";

const DEFAULT_BASE_URL: &str = "http://apis.data.go.kr";
const SERVICE_PATH: &str = "B090041/openapi/service/SpcdeInfoService";

/// KASI client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KasiConfig {
    /// Service host (without the service path)
    pub base_url: String,
    /// data.go.kr service key
    pub service_key: Option<String>,
    /// Rows per page; one month never exceeds this
    pub page_size: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for KasiConfig {
    fn default() -> Self {
        KasiConfig {
            base_url: std::env::var("KASI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            service_key: std::env::var(SERVICE_KEY_ENV).ok(),
            page_size: 50,
            timeout_secs: 10,
        }
    }
}

impl KasiConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific host
    pub fn new(base_url: &str) -> Self {
        KasiConfig {
            base_url: base_url.to_string(),
            service_key: None,
            page_size: 50,
            timeout_secs: 10,
        }
    }

    /// Set the service key
    pub fn with_service_key(mut self, key: &str) -> Self {
        self.service_key = Some(key.to_string());
        self
    }

    /// The configured key, unless it is empty or a placeholder.
    pub fn usable_key(&self) -> Option<&str> {
        self.service_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !is_placeholder(k))
    }

    fn operation_url(&self, category: Category) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            SERVICE_PATH,
            category.operation()
        )
    }
}

fn is_placeholder(key: &str) -> bool {
    let upper = key.to_ascii_uppercase();
    upper.starts_with("PUT YOUR") || upper.starts_with("YOUR_")
}

/// KASI client for special-day lookups
pub struct KasiClient {
    config: KasiConfig,
    http_client: reqwest::Client,
}

impl KasiClient {
    /// Create a new KASI client
    pub fn new(config: KasiConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("datewise-calendar/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        KasiClient {
            config,
            http_client,
        }
    }

    /// Create client from environment variables
    pub fn from_env() -> Self {
        Self::new(KasiConfig::from_env())
    }

    pub fn config(&self) -> &KasiConfig {
        &self.config
    }
}

#[async_trait]
impl CalendarSource for KasiClient {
    async fn special_days(
        &self,
        year: &str,
        month: &str,
        category: Category,
    ) -> Result<Vec<SpecialDay>> {
        let key = self
            .config
            .usable_key()
            .ok_or(CalendarError::MissingServiceKey)?;

        let page_size = self.config.page_size.to_string();
        let response = self
            .http_client
            .get(self.config.operation_url(category))
            .query(&[
                ("solYear", year),
                ("solMonth", month),
                ("ServiceKey", key),
                ("_type", "json"),
                ("numOfRows", page_size.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let document: Value = serde_json::from_str(&body)?;
        let days = parse_items(&document);
        debug!(year, month, %category, count = days.len(), "special days fetched");
        Ok(days)
    }
}

/// Extract `response.body.items.item`, which KASI sends as a single object,
/// a list, or an empty string when the month has nothing.
pub fn parse_items(document: &Value) -> Vec<SpecialDay> {
    let item = document
        .get("response")
        .and_then(|r| r.get("body"))
        .and_then(|b| b.get("items"))
        .and_then(|i| i.get("item"));

    match item {
        Some(Value::Array(items)) => items.iter().map(SpecialDay::from_item).collect(),
        Some(obj @ Value::Object(_)) => vec![SpecialDay::from_item(obj)],
        _ => Vec::new(),
    }
}
