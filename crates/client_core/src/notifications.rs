//! Transient user-facing notifications published by the dashboard controller.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationContext {
    LoadDocuments,
    Duplicate,
    Delete,
    ChangeStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCategory {
    Auth,
    Transport,
    NotFound,
    Validation,
    Server,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    level: NotificationLevel,
    context: NotificationContext,
    category: Option<NotificationCategory>,
    message: String,
}

impl Notification {
    pub fn success(context: NotificationContext, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            context,
            category: None,
            message: message.into(),
        }
    }

    pub fn error(
        context: NotificationContext,
        category: NotificationCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level: NotificationLevel::Error,
            context,
            category: Some(category),
            message: message.into(),
        }
    }

    pub fn level(&self) -> NotificationLevel {
        self.level
    }

    pub fn context(&self) -> NotificationContext {
        self.context
    }

    pub fn category(&self) -> Option<NotificationCategory> {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == Some(NotificationCategory::Auth)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NotificationLevel::Success => write!(f, "✓ {}", self.message),
            NotificationLevel::Error => write!(f, "✗ {}", self.message),
        }
    }
}
