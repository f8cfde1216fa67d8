//! Special-day categories and records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which special-day listing to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "holiday")]
    Holiday,
    /// Days off (public holidays + substitute holidays).
    #[default]
    #[serde(rename = "rest")]
    Rest,
    #[serde(rename = "anniversary")]
    Anniversary,
    #[serde(rename = "24divisions")]
    SolarTerms,
    #[serde(rename = "sundry")]
    Sundry,
}

impl Category {
    /// Parse a category label; anything unrecognized falls back to [`Category::Rest`].
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "holiday" => Self::Holiday,
            "rest" => Self::Rest,
            "anniversary" => Self::Anniversary,
            "24divisions" => Self::SolarTerms,
            "sundry" => Self::Sundry,
            _ => Self::default(),
        }
    }

    /// KASI operation name for this listing.
    pub fn operation(self) -> &'static str {
        match self {
            Self::Holiday => "getHoliDeInfo",
            Self::Rest => "getRestDeInfo",
            Self::Anniversary => "getAnniversaryInfo",
            Self::SolarTerms => "get24DivisionsInfo",
            Self::Sundry => "getSundryDayInfo",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Holiday => "holiday",
            Self::Rest => "rest",
            Self::Anniversary => "anniversary",
            Self::SolarTerms => "24divisions",
            Self::Sundry => "sundry",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Human label for a KASI `dateKind` code; unknown codes pass through.
pub fn date_kind_label(code: &str) -> String {
    match code {
        "01" => "국경일".to_string(),
        "02" => "기념일".to_string(),
        "03" => "24절기".to_string(),
        "04" => "잡절".to_string(),
        other => other.to_string(),
    }
}

/// One special day as exposed to the reasoning engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialDay {
    pub date_name: Option<String>,
    /// `YYYYMMDD` as text.
    pub locdate: String,
    pub is_holiday: String,
    pub date_kind: Option<String>,
}

impl SpecialDay {
    /// Build from a raw KASI item object.
    pub fn from_item(item: &Value) -> Self {
        let text = |key: &str| -> Option<String> {
            match item.get(key) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
            }
        };

        SpecialDay {
            date_name: text("dateName"),
            locdate: text("locdate").unwrap_or_else(|| "None".to_string()),
            is_holiday: text("isHoliday").unwrap_or_else(|| "N".to_string()),
            date_kind: text("dateKind").map(|code| date_kind_label(&code)),
        }
    }
}
