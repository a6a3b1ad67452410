use std::{
    io::{self, IsTerminal},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    ActionOutcome, AssumeConfirmed, Confirm, DocumentApi, DocumentListController, HttpDocumentApi,
    NotificationContext, ViewMode,
};
use shared::{
    domain::{DocumentId, DocumentStatus},
    protocol::{SortBy, SortOrder},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod interactive;
mod render;
mod terminal;

use config::{load_settings, prepare_base_url};
use interactive::{open_document, OpenTarget, StatusFilter};
use render::{render_dashboard, render_stats, RenderOptions};
use terminal::{drain_notifications, spawn_stdin_lines, LineConfirm, PrintNavigator};

#[derive(Parser, Debug)]
#[command(name = "dashboard", about = "Browse and manage signing documents")]
struct Args {
    /// Document API base url (overrides config and environment).
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Bearer token sent with every API request.
    #[arg(long, global = true)]
    token: Option<String>,
    /// TOML config file; defaults to ./dashboard.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one page of documents with the stats header.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// A status, or `all`.
        #[arg(long)]
        status: Option<StatusFilter>,
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        #[arg(long, value_enum)]
        order: Option<OrderArg>,
        /// Filters the fetched page by name, signer name or signer email.
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = ViewArg::Grid)]
        view: ViewArg,
    },
    /// Print aggregate counts per status.
    Stats,
    Duplicate {
        id: String,
    },
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Change a document's status.
    Status {
        id: String,
        status: DocumentStatus,
    },
    /// Print the url of a document page.
    Open {
        target: OpenTarget,
        id: String,
    },
    /// Print the url for starting a new document.
    New,
    /// Line-oriented dashboard session.
    Interactive,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    CreatedAt,
    Name,
}

impl From<SortArg> for SortBy {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::CreatedAt => SortBy::CreatedAt,
            SortArg::Name => SortBy::OriginalName,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ViewArg {
    Grid,
    List,
}

impl From<ViewArg> for ViewMode {
    fn from(value: ViewArg) -> Self {
        match value {
            ViewArg::Grid => ViewMode::Grid,
            ViewArg::List => ViewMode::List,
        }
    }
}

fn use_color() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Maps a finished action to the process result; success notifications were already printed.
fn finish_action(outcome: ActionOutcome) -> Result<()> {
    match outcome {
        ActionOutcome::Completed => Ok(()),
        ActionOutcome::Cancelled => {
            println!("Cancelled");
            Ok(())
        }
        ActionOutcome::AlreadyPending => bail!("action already in progress"),
        ActionOutcome::Failed(notification) => bail!("{}", notification.message()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let settings = load_settings(args.config.as_deref())?.with_overrides(args.api_url, args.token);
    let api_url = prepare_base_url(&settings.api_url).context("invalid document API url")?;
    let site_url = prepare_base_url(&settings.site_url).context("invalid site url")?;
    info!(%api_url, authenticated = settings.api_token.is_some(), "document dashboard starting");

    let mut http = HttpDocumentApi::new(&api_url)?;
    if let Some(token) = settings.api_token {
        http = http.with_token(token);
    }
    let api: Arc<dyn DocumentApi> = Arc::new(http);
    let navigator = Arc::new(PrintNavigator::new(site_url));

    let needs_stdin = matches!(
        args.command,
        Command::Interactive | Command::Delete { yes: false, .. }
    );
    let lines = needs_stdin.then(spawn_stdin_lines);
    let confirm: Arc<dyn Confirm> = match &lines {
        Some(lines) => Arc::new(LineConfirm::new(Arc::clone(lines))),
        None => Arc::new(AssumeConfirmed),
    };
    let controller =
        DocumentListController::new_with_dependencies(Arc::clone(&api), navigator, confirm);

    match args.command {
        Command::List {
            page,
            status,
            sort,
            order,
            search,
            view,
        } => {
            let mut notifications = controller.subscribe_notifications();
            let defaults = controller.snapshot().await;
            let sort_by = sort.map(SortBy::from).unwrap_or(defaults.sort_by);
            let sort_order = order.map(SortOrder::from).unwrap_or(defaults.sort_order);

            // Each setter refetches only when it changes something.
            let mut fetched = controller.set_sort(sort_by, sort_order).await;
            if let Some(StatusFilter(filter)) = status {
                fetched |= controller.set_status_filter(filter).await;
            }
            if !fetched {
                controller.mount().await;
            }
            if page != 1 && !controller.set_page(page).await {
                let total = controller.snapshot().await.total_pages;
                bail!("page {page} is out of range (1-{total})");
            }
            if let Some(term) = search {
                controller.set_search_term(term).await;
            }
            controller.set_view_mode(view.into()).await;

            let failed = drain_notifications(&mut notifications)
                .iter()
                .any(|notification| notification.context() == NotificationContext::LoadDocuments);
            if failed {
                bail!("failed to load documents");
            }
            let state = controller.snapshot().await;
            let options = RenderOptions {
                color: use_color(),
                now: chrono::Utc::now(),
            };
            print!("{}", render_dashboard(&state, &options));
        }
        Command::Stats => {
            let stats = api
                .fetch_stats()
                .await
                .context("failed to load dashboard stats")?;
            println!("{}", render_stats(Some(&stats)));
        }
        Command::Duplicate { id } => {
            let mut notifications = controller.subscribe_notifications();
            let outcome = controller.duplicate(&DocumentId::new(id)).await;
            drain_notifications(&mut notifications);
            finish_action(outcome)?;
        }
        Command::Delete { id, .. } => {
            let mut notifications = controller.subscribe_notifications();
            // Loads the first page so the prompt can name the document.
            controller.load_documents().await;
            let outcome = controller.delete(&DocumentId::new(id)).await;
            drain_notifications(&mut notifications);
            finish_action(outcome)?;
        }
        Command::Status { id, status } => {
            let mut notifications = controller.subscribe_notifications();
            let outcome = controller.change_status(&DocumentId::new(id), status).await;
            drain_notifications(&mut notifications);
            finish_action(outcome)?;
        }
        Command::Open { target, id } => open_document(&controller, target, &DocumentId::new(id)),
        Command::New => controller.create_new(),
        Command::Interactive => {
            let Some(lines) = lines else {
                bail!("interactive mode needs stdin");
            };
            interactive::run(controller, lines, use_color()).await?;
        }
    }

    Ok(())
}
