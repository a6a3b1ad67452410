//! Document API seam and its reqwest-backed implementation.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{DashboardStats, DocumentId, DocumentStatus, DocumentSummary},
    error::{ApiException, ErrorCode},
    protocol::{
        AckResponse, DocumentListResponse, DuplicateResponse, ListDocumentsQuery, Rejection,
        StatsResponse, UpdateStatusRequest,
    },
};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::notifications::NotificationCategory;

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("invalid document API base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("document API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("document API returned HTTP {status}: {error}")]
    Status { status: u16, error: ApiException },
    #[error("document API rejected the request: {0}")]
    Rejected(String),
    #[error("malformed document API response: {0}")]
    Decode(String),
}

impl ApiClientError {
    pub fn category(&self) -> NotificationCategory {
        match self {
            ApiClientError::InvalidBaseUrl { .. } => NotificationCategory::Validation,
            ApiClientError::Transport(_) => NotificationCategory::Transport,
            ApiClientError::Status { error, .. } => match error.code {
                ErrorCode::Unauthorized | ErrorCode::Forbidden => NotificationCategory::Auth,
                ErrorCode::NotFound => NotificationCategory::NotFound,
                ErrorCode::Validation => NotificationCategory::Validation,
                ErrorCode::RateLimited | ErrorCode::Internal => NotificationCategory::Server,
            },
            ApiClientError::Rejected(_) => NotificationCategory::Unknown,
            ApiClientError::Decode(_) => NotificationCategory::Server,
        }
    }
}

/// One page of the server-side document listing.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPage {
    pub documents: Vec<DocumentSummary>,
    pub total_pages: u32,
}

#[async_trait]
pub trait DocumentApi: Send + Sync {
    async fn list_documents(
        &self,
        query: &ListDocumentsQuery,
    ) -> Result<DocumentPage, ApiClientError>;
    async fn fetch_stats(&self) -> Result<DashboardStats, ApiClientError>;
    async fn duplicate_document(&self, id: &DocumentId) -> Result<DocumentId, ApiClientError>;
    async fn delete_document(&self, id: &DocumentId) -> Result<(), ApiClientError>;
    async fn update_status(
        &self,
        id: &DocumentId,
        status: DocumentStatus,
    ) -> Result<(), ApiClientError>;
}

pub struct HttpDocumentApi {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpDocumentApi {
    pub fn new(base_url: &str) -> Result<Self, ApiClientError> {
        let parsed = Url::parse(base_url.trim()).map_err(|err| ApiClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        Ok(Self {
            http: Client::new(),
            base_url: parsed,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then_some(token);
        self
    }

    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "url cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Rejection>(&body)
                .ok()
                .and_then(|rejection| rejection.reason().map(str::to_string))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(ApiClientError::Status {
                status: status.as_u16(),
                error: ApiException::from_http_status(status.as_u16(), message),
            });
        }

        // 204-style empty bodies read as an envelope with every field defaulted.
        let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &body
        };
        serde_json::from_slice(body).map_err(|err| ApiClientError::Decode(err.to_string()))
    }
}

fn rejected(rejection: &Rejection, fallback: &str) -> ApiClientError {
    ApiClientError::Rejected(rejection.reason().unwrap_or(fallback).to_string())
}

#[async_trait]
impl DocumentApi for HttpDocumentApi {
    async fn list_documents(
        &self,
        query: &ListDocumentsQuery,
    ) -> Result<DocumentPage, ApiClientError> {
        let url = self.endpoint(&["api", "documents"])?;
        debug!(%url, page = query.page, status = ?query.status, "listing documents");
        let body: DocumentListResponse = self
            .send_json(self.request(Method::GET, url).query(query))
            .await?;
        if !body.success {
            return Err(rejected(&body.rejection, "document listing was rejected"));
        }
        Ok(DocumentPage {
            documents: body.documents,
            total_pages: body.pagination.total_pages,
        })
    }

    async fn fetch_stats(&self) -> Result<DashboardStats, ApiClientError> {
        let url = self.endpoint(&["api", "documents", "stats"])?;
        let body: StatsResponse = self.send_json(self.request(Method::GET, url)).await?;
        if !body.success {
            return Err(rejected(&body.rejection, "stats request was rejected"));
        }
        body.stats
            .ok_or_else(|| ApiClientError::Decode("stats response is missing `stats`".to_string()))
    }

    async fn duplicate_document(&self, id: &DocumentId) -> Result<DocumentId, ApiClientError> {
        let url = self.endpoint(&["api", "documents", id.as_str(), "duplicate"])?;
        let body: DuplicateResponse = self.send_json(self.request(Method::POST, url)).await?;
        if !body.success {
            return Err(rejected(&body.rejection, "duplicate was rejected"));
        }
        body.document_id.ok_or_else(|| {
            ApiClientError::Decode("duplicate response is missing `documentId`".to_string())
        })
    }

    async fn delete_document(&self, id: &DocumentId) -> Result<(), ApiClientError> {
        let url = self.endpoint(&["api", "documents", id.as_str()])?;
        let body: AckResponse = self.send_json(self.request(Method::DELETE, url)).await?;
        if !body.success {
            return Err(rejected(&body.rejection, "delete was rejected"));
        }
        Ok(())
    }

    async fn update_status(
        &self,
        id: &DocumentId,
        status: DocumentStatus,
    ) -> Result<(), ApiClientError> {
        let url = self.endpoint(&["api", "documents", id.as_str(), "status"])?;
        let body: AckResponse = self
            .send_json(
                self.request(Method::PUT, url)
                    .json(&UpdateStatusRequest { status }),
            )
            .await?;
        if !body.success {
            return Err(rejected(&body.rejection, "status change was rejected"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
