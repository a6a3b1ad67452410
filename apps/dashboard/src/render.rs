//! Plain-text rendering of the dashboard state.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use client_core::{relative_time, signing_progress, DashboardState, ViewMode};
use shared::domain::{DashboardStats, DocumentStatus, DocumentSummary, StatusColor};

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub color: bool,
    pub now: DateTime<Utc>,
}

impl RenderOptions {
    pub fn plain(now: DateTime<Utc>) -> Self {
        Self { color: false, now }
    }
}

fn paint(text: &str, color: StatusColor, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    let code = match color {
        StatusColor::Gray => "90",
        StatusColor::Blue => "34",
        StatusColor::Yellow => "33",
        StatusColor::Green => "32",
        StatusColor::Red => "31",
    };
    format!("\x1b[{code}m{text}\x1b[0m")
}

fn status_badge(status: DocumentStatus, options: &RenderOptions) -> String {
    let presentation = status.presentation();
    paint(presentation.label, presentation.color, options.color)
}

pub fn render_stats(stats: Option<&DashboardStats>) -> String {
    let Some(stats) = stats else {
        return "Stats unavailable".to_string();
    };
    let mut out = format!("Total {}", stats.total);
    for status in DocumentStatus::ALL {
        let _ = write!(
            out,
            " | {} {}",
            status.presentation().label,
            stats.count_for(status)
        );
    }
    out
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn created(document: &DocumentSummary, options: &RenderOptions) -> String {
    document
        .created_at
        .map(|ts| relative_time(&ts, options.now))
        .unwrap_or_else(|| "unknown".to_string())
}

fn actions_line(status: DocumentStatus) -> String {
    status
        .allowed_actions()
        .iter()
        .map(|action| action.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_card(
    out: &mut String,
    document: &DocumentSummary,
    state: &DashboardState,
    options: &RenderOptions,
) {
    let progress = signing_progress(&document.signers);
    let _ = writeln!(
        out,
        "+ {} [{}]",
        document.original_name,
        status_badge(document.status, options)
    );
    let _ = writeln!(
        out,
        "| id {} | {} | {} | {}",
        document.id,
        plural(document.file_count(), "file"),
        plural(document.field_count(), "field"),
        created(document, options)
    );
    let _ = writeln!(
        out,
        "| signed {}/{} ({}%)",
        progress.signed, progress.total, progress.percentage
    );
    if state.open_menu.as_ref() == Some(&document.id) {
        let _ = writeln!(out, "| actions: {}", actions_line(document.status));
    }
}

fn render_row(
    out: &mut String,
    document: &DocumentSummary,
    state: &DashboardState,
    options: &RenderOptions,
) {
    let progress = signing_progress(&document.signers);
    let marker = if state.open_menu.as_ref() == Some(&document.id) {
        '>'
    } else {
        ' '
    };
    // Pad the label before painting so escape codes do not skew the columns.
    let label = format!("{:<16}", document.status.presentation().label);
    let signed = format!("{}/{}", progress.signed, progress.total);
    let _ = writeln!(
        out,
        "{marker} {:<24} {:<32} {} {:>6} {:>5} {:>6} {}",
        document.id.as_str(),
        document.original_name,
        paint(&label, document.status.presentation().color, options.color),
        signed,
        document.file_count(),
        document.field_count(),
        created(document, options)
    );
    if marker == '>' {
        let _ = writeln!(out, "    actions: {}", actions_line(document.status));
    }
}

/// Current page after the local search filter, as cards or table rows.
pub fn render_documents(state: &DashboardState, options: &RenderOptions) -> String {
    let visible = state.visible_documents();
    if visible.is_empty() {
        let term = state.search_term.trim();
        return if term.is_empty() {
            "No documents found\n".to_string()
        } else {
            format!("No documents match \"{term}\"\n")
        };
    }

    let mut out = String::new();
    match state.view_mode {
        ViewMode::Grid => {
            for document in visible {
                render_card(&mut out, document, state, options);
                out.push('\n');
            }
        }
        ViewMode::List => {
            let _ = writeln!(
                out,
                "  {:<24} {:<32} {:<16} {:>6} {:>5} {:>6} {}",
                "ID", "NAME", "STATUS", "SIGNED", "FILES", "FIELDS", "CREATED"
            );
            for document in visible {
                render_row(&mut out, document, state, options);
            }
        }
    }
    out
}

pub fn render_pagination(state: &DashboardState) -> String {
    let mut out = format!("Page {} of {}", state.current_page, state.total_pages);
    if state.has_previous_page() {
        out.push_str("  < prev");
    }
    if state.has_next_page() {
        out.push_str("  next >");
    }
    out
}

fn render_filters(state: &DashboardState) -> String {
    let status = state
        .status_filter
        .map(|status| status.presentation().label)
        .unwrap_or("All");
    format!(
        "Status: {status} | Sort: {} {} | View: {}",
        state.sort_by,
        state.sort_order,
        match state.view_mode {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    )
}

pub fn render_dashboard(state: &DashboardState, options: &RenderOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", render_stats(state.stats.as_ref()));
    let _ = writeln!(out, "{}", render_filters(state));
    if !state.search_term.trim().is_empty() {
        let _ = writeln!(out, "Search: \"{}\"", state.search_term.trim());
    }
    out.push('\n');
    out.push_str(&render_documents(state, options));
    let _ = writeln!(out, "{}", render_pagination(state));
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
