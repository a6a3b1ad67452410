use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(DocumentId);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentStatus {
    #[default]
    Draft,
    Sent,
    PartiallySigned,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown document status '{0}'")]
pub struct UnknownStatus(pub String);

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 5] = [
        DocumentStatus::Draft,
        DocumentStatus::Sent,
        DocumentStatus::PartiallySigned,
        DocumentStatus::Completed,
        DocumentStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Sent => "sent",
            DocumentStatus::PartiallySigned => "partially_signed",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a wire value, falling back to `Draft` for anything unrecognised.
    pub fn from_wire(raw: &str) -> Self {
        raw.parse().unwrap_or(DocumentStatus::Draft)
    }

    pub fn presentation(self) -> StatusPresentation {
        match self {
            DocumentStatus::Draft => StatusPresentation {
                label: "Draft",
                color: StatusColor::Gray,
                icon: "file-text",
            },
            DocumentStatus::Sent => StatusPresentation {
                label: "Sent",
                color: StatusColor::Blue,
                icon: "send",
            },
            DocumentStatus::PartiallySigned => StatusPresentation {
                label: "Partially Signed",
                color: StatusColor::Yellow,
                icon: "clock",
            },
            DocumentStatus::Completed => StatusPresentation {
                label: "Completed",
                color: StatusColor::Green,
                icon: "check-circle",
            },
            DocumentStatus::Cancelled => StatusPresentation {
                label: "Cancelled",
                color: StatusColor::Red,
                icon: "x-circle",
            },
        }
    }

    pub fn allowed_actions(self) -> &'static [DocumentAction] {
        use DocumentAction::*;
        match self {
            DocumentStatus::Draft => &[Edit, Preview, Duplicate, Delete],
            DocumentStatus::Sent | DocumentStatus::PartiallySigned => {
                &[Preview, LiveView, Duplicate, Cancel, Delete]
            }
            DocumentStatus::Completed => &[Preview, LiveView, Duplicate, Delete],
            DocumentStatus::Cancelled => &[Preview, Duplicate, Delete],
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(DocumentStatus::Draft),
            "sent" => Ok(DocumentStatus::Sent),
            "partially_signed" | "partially-signed" => Ok(DocumentStatus::PartiallySigned),
            "completed" => Ok(DocumentStatus::Completed),
            "cancelled" | "canceled" => Ok(DocumentStatus::Cancelled),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DocumentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DocumentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Nulls, numbers and unknown strings all read as a draft.
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(raw
            .as_str()
            .map(DocumentStatus::from_wire)
            .unwrap_or(DocumentStatus::Draft))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Gray,
    Blue,
    Yellow,
    Green,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPresentation {
    pub label: &'static str,
    pub color: StatusColor,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentAction {
    Edit,
    Preview,
    LiveView,
    Duplicate,
    Cancel,
    Delete,
}

impl DocumentAction {
    pub fn label(self) -> &'static str {
        match self {
            DocumentAction::Edit => "edit",
            DocumentAction::Preview => "preview",
            DocumentAction::LiveView => "live view",
            DocumentAction::Duplicate => "duplicate",
            DocumentAction::Cancel => "cancel",
            DocumentAction::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub signed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    #[serde(alias = "_id")]
    pub id: DocumentId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_name: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub signers: Vec<Signer>,
    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl DocumentSummary {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub draft: u64,
    #[serde(default)]
    pub sent: u64,
    #[serde(default)]
    pub partially_signed: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub cancelled: u64,
}

impl DashboardStats {
    pub fn count_for(&self, status: DocumentStatus) -> u64 {
        match status {
            DocumentStatus::Draft => self.draft,
            DocumentStatus::Sent => self.sent,
            DocumentStatus::PartiallySigned => self.partially_signed,
            DocumentStatus::Completed => self.completed,
            DocumentStatus::Cancelled => self.cancelled,
        }
    }
}

/// Every timestamp shape the document API has been seen to emit.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    Seconds {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    Text(String),
    Millis(f64),
}

impl WireTimestamp {
    fn normalize(self) -> Option<DateTime<Utc>> {
        match self {
            WireTimestamp::Seconds {
                seconds,
                nanoseconds,
            } => Utc.timestamp_opt(seconds, nanoseconds).single(),
            WireTimestamp::Text(text) => parse_timestamp_text(&text),
            WireTimestamp::Millis(millis) if millis.is_finite() => {
                Utc.timestamp_millis_opt(millis.round() as i64).single()
            }
            WireTimestamp::Millis(_) => None,
        }
    }
}

/// An explicit `null` reads the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339, naive ISO date-times (read as UTC) and bare dates.
pub fn parse_timestamp_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Normalizes any accepted timestamp shape; malformed input becomes `None`.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    // Buffer first so an unrecognised shape becomes `None` instead of failing the whole document.
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| WireTimestamp::deserialize(value).ok())
        .and_then(WireTimestamp::normalize))
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
