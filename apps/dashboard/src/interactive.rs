use std::{
    io::{self, Write},
    str::FromStr,
    sync::Arc,
};

use client_core::{ActionOutcome, DocumentListController, MenuScope};
use shared::{
    domain::{DocumentId, DocumentStatus, UnknownStatus},
    protocol::{SortBy, SortOrder, UnknownSortField, UnknownSortOrder},
};
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::{
    render::{render_dashboard, RenderOptions},
    terminal::{print_notification, LineReceiver},
};

/// `all` or a single status; what the status filter accepts on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFilter(pub Option<DocumentStatus>);

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter(None));
        }
        s.parse::<DocumentStatus>()
            .map(|status| StatusFilter(Some(status)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown target '{0}' (editor, preview, live)")]
pub struct UnknownOpenTarget(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenTarget {
    Editor,
    Preview,
    Live,
}

impl FromStr for OpenTarget {
    type Err = UnknownOpenTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "editor" | "edit" => Ok(OpenTarget::Editor),
            "preview" => Ok(OpenTarget::Preview),
            "live" | "live-view" => Ok(OpenTarget::Live),
            other => Err(UnknownOpenTarget(other.to_string())),
        }
    }
}

pub fn open_document(controller: &DocumentListController, target: OpenTarget, id: &DocumentId) {
    match target {
        OpenTarget::Editor => controller.edit(id),
        OpenTarget::Preview => controller.preview(id),
        OpenTarget::Live => controller.live_view(id),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Show,
    Next,
    Prev,
    Page(u32),
    Filter(StatusFilter),
    Sort(SortBy, Option<SortOrder>),
    ToggleOrder,
    Search(String),
    View,
    Menu(DocumentId),
    CloseMenu,
    Open(OpenTarget, DocumentId),
    New,
    Duplicate(DocumentId),
    Delete(DocumentId),
    Status(DocumentId, DocumentStatus),
    Refresh,
    Help,
    Quit,
}

impl ReplCommand {
    /// The row a command acts on; used to decide whether it counts as a click outside an open menu.
    fn target(&self) -> Option<&DocumentId> {
        match self {
            ReplCommand::Menu(id)
            | ReplCommand::Open(_, id)
            | ReplCommand::Duplicate(id)
            | ReplCommand::Delete(id)
            | ReplCommand::Status(id, _) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
    #[error(transparent)]
    Status(#[from] UnknownStatus),
    #[error(transparent)]
    SortField(#[from] UnknownSortField),
    #[error(transparent)]
    SortOrder(#[from] UnknownSortOrder),
    #[error(transparent)]
    Target(#[from] UnknownOpenTarget),
}

fn usage(text: &'static str) -> ParseError {
    ParseError::Usage(text)
}

fn document_id(arg: Option<&str>, text: &'static str) -> Result<DocumentId, ParseError> {
    arg.map(DocumentId::from).ok_or_else(|| usage(text))
}

/// Blank lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<ReplCommand>, ParseError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "show" | "ls" => ReplCommand::Show,
        "next" | "n" => ReplCommand::Next,
        "prev" | "p" => ReplCommand::Prev,
        "page" => {
            let page = args
                .next()
                .and_then(|raw| raw.parse::<u32>().ok())
                .ok_or_else(|| usage("page <number>"))?;
            ReplCommand::Page(page)
        }
        "filter" => {
            let raw = args.next().ok_or_else(|| usage("filter <status|all>"))?;
            ReplCommand::Filter(raw.parse()?)
        }
        "sort" => {
            let field = args
                .next()
                .ok_or_else(|| usage("sort <created-at|name> [asc|desc]"))?
                .parse::<SortBy>()?;
            let order = args.next().map(SortOrder::from_str).transpose()?;
            ReplCommand::Sort(field, order)
        }
        "order" => ReplCommand::ToggleOrder,
        // The whole remainder is the term, spaces included.
        "search" => ReplCommand::Search(rest.to_string()),
        "view" => ReplCommand::View,
        "menu" => ReplCommand::Menu(document_id(args.next(), "menu <id>")?),
        "close" => ReplCommand::CloseMenu,
        "open" => {
            let target = args
                .next()
                .ok_or_else(|| usage("open <editor|preview|live> <id>"))?
                .parse::<OpenTarget>()?;
            ReplCommand::Open(
                target,
                document_id(args.next(), "open <editor|preview|live> <id>")?,
            )
        }
        "new" => ReplCommand::New,
        "duplicate" | "dup" => ReplCommand::Duplicate(document_id(args.next(), "duplicate <id>")?),
        "delete" | "rm" => ReplCommand::Delete(document_id(args.next(), "delete <id>")?),
        "status" => {
            let id = document_id(args.next(), "status <id> <status>")?;
            let status = args
                .next()
                .ok_or_else(|| usage("status <id> <status>"))?
                .parse::<DocumentStatus>()?;
            ReplCommand::Status(id, status)
        }
        "refresh" | "r" => ReplCommand::Refresh,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

const HELP: &str = "\
commands:
  show                         redraw the dashboard
  next | prev | page <n>       move between pages
  filter <status|all>          filter by status (returns to page 1)
  sort <created-at|name> [asc|desc]
  order                        flip the sort order
  search [term]                filter the current page locally
  view                         toggle grid/list
  menu <id> | close            open or close a document's action menu
  open <editor|preview|live> <id>
  new                          start a new document
  duplicate <id> | delete <id> | status <id> <status>
  refresh                      refetch documents and stats
  quit";

fn report(outcome: ActionOutcome) {
    match outcome {
        ActionOutcome::Completed | ActionOutcome::Failed(_) => {}
        ActionOutcome::Cancelled => println!("Cancelled"),
        ActionOutcome::AlreadyPending => println!("That action is already in progress"),
    }
}

struct Session {
    controller: Arc<DocumentListController>,
    menu: Option<MenuScope>,
    color: bool,
}

impl Session {
    async fn redraw(&self) {
        let state = self.controller.snapshot().await;
        let options = RenderOptions {
            color: self.color,
            now: chrono::Utc::now(),
        };
        print!("{}", render_dashboard(&state, &options));
    }

    async fn toggle_menu(&mut self, id: DocumentId) {
        let already_open = self.controller.snapshot().await.open_menu.as_ref() == Some(&id);
        if let Some(scope) = self.menu.take() {
            scope.unmount().await;
        }
        if !already_open {
            self.menu = Some(self.controller.open_menu(&id).await);
        }
    }

    /// Returns whether the dashboard should be redrawn.
    async fn execute(&mut self, command: ReplCommand) -> bool {
        if !matches!(command, ReplCommand::Menu(_)) {
            if let Some(scope) = self.menu.take() {
                if !scope.outside_click(command.target()).await {
                    self.menu = Some(scope);
                }
            }
        }

        let controller = Arc::clone(&self.controller);
        match command {
            ReplCommand::Show => true,
            ReplCommand::Next => {
                if !controller.next_page().await {
                    println!("Already on the last page");
                }
                true
            }
            ReplCommand::Prev => {
                if !controller.previous_page().await {
                    println!("Already on the first page");
                }
                true
            }
            ReplCommand::Page(page) => {
                let state = controller.snapshot().await;
                if !controller.set_page(page).await && page != state.current_page {
                    println!("Page {page} is out of range (1-{})", state.total_pages);
                }
                true
            }
            ReplCommand::Filter(StatusFilter(filter)) => {
                controller.set_status_filter(filter).await;
                true
            }
            ReplCommand::Sort(sort_by, order) => {
                let order = match order {
                    Some(order) => order,
                    None => controller.snapshot().await.sort_order,
                };
                controller.set_sort(sort_by, order).await;
                true
            }
            ReplCommand::ToggleOrder => {
                controller.toggle_sort_order().await;
                true
            }
            ReplCommand::Search(term) => {
                controller.set_search_term(term).await;
                true
            }
            ReplCommand::View => {
                controller.toggle_view_mode().await;
                true
            }
            ReplCommand::Menu(id) => {
                self.toggle_menu(id).await;
                true
            }
            ReplCommand::CloseMenu => {
                if let Some(scope) = self.menu.take() {
                    scope.unmount().await;
                }
                controller.close_menu().await;
                true
            }
            ReplCommand::Open(target, id) => {
                open_document(&controller, target, &id);
                false
            }
            ReplCommand::New => {
                controller.create_new();
                false
            }
            ReplCommand::Duplicate(id) => {
                report(controller.duplicate(&id).await);
                true
            }
            ReplCommand::Delete(id) => {
                report(controller.delete(&id).await);
                true
            }
            ReplCommand::Status(id, status) => {
                report(controller.change_status(&id, status).await);
                true
            }
            ReplCommand::Refresh => {
                controller.refresh().await;
                true
            }
            ReplCommand::Help => {
                println!("{HELP}");
                false
            }
            ReplCommand::Quit => false,
        }
    }
}

/// Line-oriented dashboard over one long-lived controller.
pub async fn run(
    controller: Arc<DocumentListController>,
    lines: LineReceiver,
    color: bool,
) -> anyhow::Result<()> {
    let mut notifications = controller.subscribe_notifications();
    let printer = tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(notification) => print_notification(&notification),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "notifications dropped"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut session = Session {
        controller,
        menu: None,
        color,
    };
    session.controller.mount().await;
    session.redraw().await;
    println!("Type 'help' for commands.");

    loop {
        print!("> ");
        io::stdout().flush()?;
        // Released before executing so a delete confirmation can read the next line.
        let line = lines.lock().await.recv().await;
        let Some(line) = line else {
            debug!("stdin closed");
            break;
        };

        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(ReplCommand::Quit)) => break,
            Ok(Some(command)) => {
                if session.execute(command).await {
                    session.redraw().await;
                }
            }
            Err(err) => println!("{err}"),
        }
    }

    if let Some(scope) = session.menu.take() {
        scope.unmount().await;
    }
    printer.abort();
    Ok(())
}

#[cfg(test)]
#[path = "tests/interactive_tests.rs"]
mod tests;
