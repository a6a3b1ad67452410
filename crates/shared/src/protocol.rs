use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DashboardStats, DocumentId, DocumentStatus, DocumentSummary};

pub const DEFAULT_PAGE_SIZE: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort field '{0}'")]
pub struct UnknownSortField(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort order '{0}'")]
pub struct UnknownSortOrder(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "originalName")]
    OriginalName,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::CreatedAt => "createdAt",
            SortBy::OriginalName => "originalName",
        }
    }
}

impl FromStr for SortBy {
    type Err = UnknownSortField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "createdAt" | "created_at" | "created-at" | "date" => Ok(SortBy::CreatedAt),
            "originalName" | "original_name" | "name" => Ok(SortBy::OriginalName),
            other => Err(UnknownSortField(other.to_string())),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(UnknownSortOrder(other.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query string for `GET /api/documents`. `status` is omitted for "all".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsQuery {
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
}

impl Default for ListDocumentsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "one")]
    pub total_pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            total_pages: 1,
            page: None,
            limit: None,
            total: None,
        }
    }
}

fn one() -> u32 {
    1
}

// A 2xx body without an explicit `success` flag counts as success.
fn succeeded() -> bool {
    true
}

/// Fields every API envelope may carry when a call is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Rejection {
    pub fn reason(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .filter(|reason| !reason.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListResponse {
    #[serde(default = "succeeded")]
    pub success: bool,
    #[serde(default)]
    pub documents: Vec<DocumentSummary>,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(flatten)]
    pub rejection: Rejection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(default = "succeeded")]
    pub success: bool,
    #[serde(default)]
    pub stats: Option<DashboardStats>,
    #[serde(flatten)]
    pub rejection: Rejection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateResponse {
    #[serde(default = "succeeded")]
    pub success: bool,
    #[serde(default)]
    pub document_id: Option<DocumentId>,
    #[serde(flatten)]
    pub rejection: Rejection,
}

/// Body of delete and status-change responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    #[serde(default = "succeeded")]
    pub success: bool,
    #[serde(flatten)]
    pub rejection: Rejection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: DocumentStatus,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
