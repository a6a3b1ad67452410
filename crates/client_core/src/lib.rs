use std::{collections::HashSet, sync::Arc};

use shared::{
    domain::{DashboardStats, DocumentId, DocumentStatus, DocumentSummary},
    protocol::{ListDocumentsQuery, SortBy, SortOrder, DEFAULT_PAGE_SIZE},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

pub mod api;
pub mod display;
pub mod navigation;
pub mod notifications;

pub use api::{ApiClientError, DocumentApi, DocumentPage, HttpDocumentApi};
pub use display::{
    filter_documents, format_date, matches_search, relative_time, relative_time_now,
    signing_progress, SigningProgress,
};
pub use navigation::{AssumeConfirmed, Confirm, DeletePrompt, DiscardNavigation, Navigator, Route};
pub use notifications::{
    Notification, NotificationCategory, NotificationContext, NotificationLevel,
};

pub const PAGE_SIZE: u32 = DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub documents: Vec<DocumentSummary>,
    pub stats: Option<DashboardStats>,
    pub loading: bool,
    pub search_term: String,
    pub status_filter: Option<DocumentStatus>,
    pub current_page: u32,
    pub total_pages: u32,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub view_mode: ViewMode,
    pub open_menu: Option<DocumentId>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            stats: None,
            loading: false,
            search_term: String::new(),
            status_filter: None,
            current_page: 1,
            total_pages: 1,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            view_mode: ViewMode::default(),
            open_menu: None,
        }
    }
}

impl DashboardState {
    pub fn list_query(&self) -> ListDocumentsQuery {
        ListDocumentsQuery {
            page: self.current_page,
            limit: PAGE_SIZE,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            status: self.status_filter,
        }
    }

    pub fn visible_documents(&self) -> Vec<&DocumentSummary> {
        filter_documents(&self.documents, &self.search_term)
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Duplicate,
    Delete,
    ChangeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    Cancelled,
    AlreadyPending,
    Failed(Notification),
}

struct ListTicket {
    generation: u64,
    query: ListDocumentsQuery,
}

struct StatsTicket {
    generation: u64,
}

struct ControllerState {
    view: DashboardState,
    list_generation: u64,
    stats_generation: u64,
    pending_actions: HashSet<(DocumentId, ActionKind)>,
}

impl ControllerState {
    fn begin_list(&mut self) -> ListTicket {
        self.list_generation += 1;
        self.view.loading = true;
        ListTicket {
            generation: self.list_generation,
            query: self.view.list_query(),
        }
    }

    fn begin_stats(&mut self) -> StatsTicket {
        self.stats_generation += 1;
        StatsTicket {
            generation: self.stats_generation,
        }
    }
}

/// Owns the dashboard's document list and keeps it consistent with the document API.
pub struct DocumentListController {
    api: Arc<dyn DocumentApi>,
    navigator: Arc<dyn Navigator>,
    confirm: Arc<dyn Confirm>,
    inner: Mutex<ControllerState>,
    notifications: broadcast::Sender<Notification>,
}

impl DocumentListController {
    pub fn new(api: Arc<dyn DocumentApi>) -> Arc<Self> {
        Self::new_with_dependencies(api, Arc::new(DiscardNavigation), Arc::new(AssumeConfirmed))
    }

    pub fn new_with_dependencies(
        api: Arc<dyn DocumentApi>,
        navigator: Arc<dyn Navigator>,
        confirm: Arc<dyn Confirm>,
    ) -> Arc<Self> {
        let (notifications, _) = broadcast::channel(256);
        Arc::new(Self {
            api,
            navigator,
            confirm,
            inner: Mutex::new(ControllerState {
                view: DashboardState::default(),
                list_generation: 0,
                stats_generation: 0,
                pending_actions: HashSet::new(),
            }),
            notifications,
        })
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.inner.lock().await.view.clone()
    }

    /// Current page after the local search filter.
    pub async fn visible_documents(&self) -> Vec<DocumentSummary> {
        let guard = self.inner.lock().await;
        guard
            .view
            .visible_documents()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn mount(&self) {
        self.refresh().await;
    }

    /// Refetches the current page and the aggregate stats concurrently.
    pub async fn refresh(&self) {
        let (list, stats) = {
            let mut guard = self.inner.lock().await;
            (guard.begin_list(), guard.begin_stats())
        };
        self.run_refresh(list, stats).await;
    }

    pub async fn load_documents(&self) {
        let ticket = self.inner.lock().await.begin_list();
        self.run_list_request(ticket).await;
    }

    pub async fn load_stats(&self) {
        let ticket = self.inner.lock().await.begin_stats();
        self.run_stats_request(ticket).await;
    }

    async fn run_refresh(&self, list: ListTicket, stats: StatsTicket) {
        futures::join!(self.run_list_request(list), self.run_stats_request(stats));
    }

    async fn run_list_request(&self, ticket: ListTicket) {
        let mut ticket = ticket;
        loop {
            debug!(
                generation = ticket.generation,
                page = ticket.query.page,
                status = ?ticket.query.status,
                "loading documents"
            );
            let result = self.api.list_documents(&ticket.query).await;

            let mut guard = self.inner.lock().await;
            if ticket.generation != guard.list_generation {
                debug!(
                    generation = ticket.generation,
                    latest = guard.list_generation,
                    "discarding superseded document list response"
                );
                return;
            }
            guard.view.loading = false;

            match result {
                Ok(page) => {
                    guard.view.documents = page.documents;
                    guard.view.total_pages = page.total_pages.max(1);
                    if guard.view.current_page <= guard.view.total_pages {
                        return;
                    }
                    // The page shrank out from under us (e.g. last row deleted).
                    info!(
                        page = guard.view.current_page,
                        total_pages = guard.view.total_pages,
                        "current page past the end; moving to last page"
                    );
                    guard.view.current_page = guard.view.total_pages;
                    ticket = guard.begin_list();
                }
                Err(err) => {
                    drop(guard);
                    error!(page = ticket.query.page, error = %err, "failed to load documents");
                    self.publish(Notification::error(
                        NotificationContext::LoadDocuments,
                        err.category(),
                        format!("Failed to load documents: {err}"),
                    ));
                    return;
                }
            }
        }
    }

    async fn run_stats_request(&self, ticket: StatsTicket) {
        let result = self.api.fetch_stats().await;
        let mut guard = self.inner.lock().await;
        if ticket.generation != guard.stats_generation {
            debug!(
                generation = ticket.generation,
                latest = guard.stats_generation,
                "discarding superseded stats response"
            );
            return;
        }
        match result {
            Ok(stats) => guard.view.stats = Some(stats),
            Err(err) => warn!(error = %err, "failed to load dashboard stats"),
        }
    }

    /// Applies `change` and, when it reports a change, refetches under the new parameters.
    async fn update_and_refresh<F>(&self, change: F) -> bool
    where
        F: FnOnce(&mut DashboardState) -> bool,
    {
        let tickets = {
            let mut guard = self.inner.lock().await;
            if !change(&mut guard.view) {
                return false;
            }
            (guard.begin_list(), guard.begin_stats())
        };
        self.run_refresh(tickets.0, tickets.1).await;
        true
    }

    /// `None` shows every status. Always returns to the first page.
    pub async fn set_status_filter(&self, filter: Option<DocumentStatus>) -> bool {
        self.update_and_refresh(|view| {
            if view.status_filter == filter {
                return false;
            }
            view.status_filter = filter;
            view.current_page = 1;
            true
        })
        .await
    }

    pub async fn set_page(&self, page: u32) -> bool {
        self.update_and_refresh(|view| {
            if page < 1 || page > view.total_pages || page == view.current_page {
                return false;
            }
            view.current_page = page;
            true
        })
        .await
    }

    pub async fn next_page(&self) -> bool {
        let target = self.inner.lock().await.view.current_page.saturating_add(1);
        self.set_page(target).await
    }

    pub async fn previous_page(&self) -> bool {
        let target = self.inner.lock().await.view.current_page.saturating_sub(1);
        self.set_page(target).await
    }

    pub async fn set_sort(&self, sort_by: SortBy, sort_order: SortOrder) -> bool {
        self.update_and_refresh(|view| {
            if view.sort_by == sort_by && view.sort_order == sort_order {
                return false;
            }
            view.sort_by = sort_by;
            view.sort_order = sort_order;
            true
        })
        .await
    }

    pub async fn toggle_sort_order(&self) {
        self.update_and_refresh(|view| {
            view.sort_order = view.sort_order.reversed();
            true
        })
        .await;
    }

    /// Local filter only; never touches the network.
    pub async fn set_search_term(&self, term: impl Into<String>) {
        self.inner.lock().await.view.search_term = term.into();
    }

    pub async fn set_view_mode(&self, mode: ViewMode) {
        self.inner.lock().await.view.view_mode = mode;
    }

    pub async fn toggle_view_mode(&self) -> ViewMode {
        let mut guard = self.inner.lock().await;
        guard.view.view_mode = guard.view.view_mode.toggled();
        guard.view.view_mode
    }

    /// Opens the action menu for `id`, or closes it when it is already open.
    pub async fn toggle_menu(&self, id: &DocumentId) -> Option<DocumentId> {
        let mut guard = self.inner.lock().await;
        guard.view.open_menu = match guard.view.open_menu.take() {
            Some(open) if &open == id => None,
            _ => Some(id.clone()),
        };
        guard.view.open_menu.clone()
    }

    pub async fn close_menu(&self) {
        self.inner.lock().await.view.open_menu = None;
    }

    /// Opens the menu for `id` and hands back the listener scoped to that menu.
    pub async fn open_menu(self: &Arc<Self>, id: &DocumentId) -> MenuScope {
        self.inner.lock().await.view.open_menu = Some(id.clone());
        MenuScope {
            controller: Arc::clone(self),
            document_id: id.clone(),
        }
    }

    async fn close_menu_if(&self, id: &DocumentId) -> bool {
        let mut guard = self.inner.lock().await;
        if guard.view.open_menu.as_ref() == Some(id) {
            guard.view.open_menu = None;
            return true;
        }
        false
    }

    pub fn edit(&self, id: &DocumentId) {
        self.navigator.navigate(&Route::Editor(id.clone()));
    }

    pub fn preview(&self, id: &DocumentId) {
        self.navigator.navigate(&Route::Preview(id.clone()));
    }

    pub fn live_view(&self, id: &DocumentId) {
        self.navigator.navigate(&Route::LiveView(id.clone()));
    }

    pub fn create_new(&self) {
        self.navigator.navigate(&Route::CreateNew);
    }

    pub async fn duplicate(&self, id: &DocumentId) -> ActionOutcome {
        self.close_menu().await;
        if !self.begin_action(id, ActionKind::Duplicate).await {
            return ActionOutcome::AlreadyPending;
        }
        let result = self.api.duplicate_document(id).await;
        self.finish_action(id, ActionKind::Duplicate).await;

        match result {
            Ok(new_id) => {
                info!(document_id = %id, new_document_id = %new_id, "document duplicated");
                self.publish(Notification::success(
                    NotificationContext::Duplicate,
                    "Document duplicated successfully",
                ));
                self.refresh().await;
                self.navigator.navigate(&Route::Editor(new_id));
                ActionOutcome::Completed
            }
            Err(err) => self.action_failed(
                NotificationContext::Duplicate,
                id,
                "Failed to duplicate document",
                err,
            ),
        }
    }

    /// Asks for confirmation first; the row is only removed by the follow-up refetch.
    pub async fn delete(&self, id: &DocumentId) -> ActionOutcome {
        self.close_menu().await;
        let prompt = DeletePrompt {
            document_id: id.clone(),
            document_name: self.document_name(id).await,
        };
        if !self.confirm.confirm_delete(&prompt).await {
            debug!(document_id = %id, "delete declined");
            return ActionOutcome::Cancelled;
        }
        if !self.begin_action(id, ActionKind::Delete).await {
            return ActionOutcome::AlreadyPending;
        }
        let result = self.api.delete_document(id).await;
        self.finish_action(id, ActionKind::Delete).await;

        match result {
            Ok(()) => {
                info!(document_id = %id, "document deleted");
                self.publish(Notification::success(
                    NotificationContext::Delete,
                    "Document deleted successfully",
                ));
                self.refresh().await;
                ActionOutcome::Completed
            }
            Err(err) => {
                self.action_failed(NotificationContext::Delete, id, "Failed to delete document", err)
            }
        }
    }

    pub async fn change_status(&self, id: &DocumentId, status: DocumentStatus) -> ActionOutcome {
        self.close_menu().await;
        if !self.begin_action(id, ActionKind::ChangeStatus).await {
            return ActionOutcome::AlreadyPending;
        }
        let result = self.api.update_status(id, status).await;
        self.finish_action(id, ActionKind::ChangeStatus).await;

        match result {
            Ok(()) => {
                info!(document_id = %id, %status, "document status updated");
                self.publish(Notification::success(
                    NotificationContext::ChangeStatus,
                    format!(
                        "Document marked as {}",
                        status.presentation().label.to_lowercase()
                    ),
                ));
                self.refresh().await;
                ActionOutcome::Completed
            }
            Err(err) => self.action_failed(
                NotificationContext::ChangeStatus,
                id,
                "Failed to update document status",
                err,
            ),
        }
    }

    pub async fn is_action_pending(&self, id: &DocumentId, kind: ActionKind) -> bool {
        self.inner
            .lock()
            .await
            .pending_actions
            .contains(&(id.clone(), kind))
    }

    async fn begin_action(&self, id: &DocumentId, kind: ActionKind) -> bool {
        let inserted = self
            .inner
            .lock()
            .await
            .pending_actions
            .insert((id.clone(), kind));
        if !inserted {
            debug!(document_id = %id, action = ?kind, "action already in flight");
        }
        inserted
    }

    async fn finish_action(&self, id: &DocumentId, kind: ActionKind) {
        self.inner
            .lock()
            .await
            .pending_actions
            .remove(&(id.clone(), kind));
    }

    async fn document_name(&self, id: &DocumentId) -> Option<String> {
        let guard = self.inner.lock().await;
        guard
            .view
            .documents
            .iter()
            .find(|document| &document.id == id)
            .map(|document| document.original_name.clone())
    }

    fn action_failed(
        &self,
        context: NotificationContext,
        id: &DocumentId,
        summary: &str,
        err: ApiClientError,
    ) -> ActionOutcome {
        error!(document_id = %id, ?context, error = %err, "{summary}");
        let notification =
            Notification::error(context, err.category(), format!("{summary}: {err}"));
        self.publish(notification.clone());
        ActionOutcome::Failed(notification)
    }

    fn publish(&self, notification: Notification) {
        let _ = self.notifications.send(notification);
    }
}

/// Outside-click listener for one open action menu.
pub struct MenuScope {
    controller: Arc<DocumentListController>,
    document_id: DocumentId,
}

impl MenuScope {
    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    /// A click landing on `target` (or on nothing) closes this menu unless it targets the menu's own row.
    pub async fn outside_click(&self, target: Option<&DocumentId>) -> bool {
        if target == Some(&self.document_id) {
            return false;
        }
        self.controller.close_menu_if(&self.document_id).await
    }

    /// Unregisters the listener, closing the menu if it is still the open one.
    pub async fn unmount(self) {
        self.controller.close_menu_if(&self.document_id).await;
    }
}

impl Drop for MenuScope {
    // Best effort: a contended lock leaves the menu as it is. `unmount` is the awaited path.
    fn drop(&mut self) {
        if let Ok(mut guard) = self.controller.inner.try_lock() {
            if guard.view.open_menu.as_ref() == Some(&self.document_id) {
                guard.view.open_menu = None;
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
