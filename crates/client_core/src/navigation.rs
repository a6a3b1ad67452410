//! Collaborators outside the controller: the page router and the delete confirmation prompt.

use async_trait::async_trait;
use shared::domain::DocumentId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    CreateNew,
    Editor(DocumentId),
    Preview(DocumentId),
    LiveView(DocumentId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::CreateNew => "/".to_string(),
            Route::Editor(id) => format!("/editor/{id}"),
            Route::Preview(id) => format!("/preview/{id}"),
            Route::LiveView(id) => format!("/live/{id}"),
        }
    }

    /// Live view opens in a separate browsing context; everything else replaces the current one.
    pub fn opens_new_context(&self) -> bool {
        matches!(self, Route::LiveView(_))
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &Route);
}

pub struct DiscardNavigation;

impl Navigator for DiscardNavigation {
    fn navigate(&self, route: &Route) {
        tracing::debug!(path = %route.path(), "navigation requested without a router");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub document_id: DocumentId,
    pub document_name: Option<String>,
}

impl DeletePrompt {
    pub fn question(&self) -> String {
        match &self.document_name {
            Some(name) if !name.is_empty() => format!(
                "Are you sure you want to delete \"{name}\"? This action cannot be undone."
            ),
            _ => format!(
                "Are you sure you want to delete document {}? This action cannot be undone.",
                self.document_id
            ),
        }
    }
}

#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm_delete(&self, prompt: &DeletePrompt) -> bool;
}

/// Confirms every prompt, for non-interactive callers that already asked.
pub struct AssumeConfirmed;

#[async_trait]
impl Confirm for AssumeConfirmed {
    async fn confirm_delete(&self, _prompt: &DeletePrompt) -> bool {
        true
    }
}
