use super::*;
use chrono::{Duration, TimeZone};
use shared::domain::{DocumentId, Signer};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn document(id: &str, name: &str, status: DocumentStatus, signed: &[bool]) -> DocumentSummary {
    DocumentSummary {
        id: DocumentId::new(id),
        original_name: name.to_string(),
        status,
        files: vec![Default::default()],
        fields: Vec::new(),
        signers: signed
            .iter()
            .enumerate()
            .map(|(index, signed)| Signer {
                name: format!("Signer {index}"),
                email: format!("signer{index}@example.com"),
                signed: *signed,
            })
            .collect(),
        created_at: Some(now() - Duration::hours(5)),
    }
}

fn state_with(documents: Vec<DocumentSummary>) -> DashboardState {
    DashboardState {
        documents,
        total_pages: 3,
        current_page: 2,
        ..DashboardState::default()
    }
}

#[test]
fn stats_line_lists_every_status() {
    let stats = DashboardStats {
        total: 10,
        draft: 1,
        sent: 2,
        partially_signed: 3,
        completed: 4,
        cancelled: 0,
    };
    assert_eq!(
        render_stats(Some(&stats)),
        "Total 10 | Draft 1 | Sent 2 | Partially Signed 3 | Completed 4 | Cancelled 0"
    );
    assert_eq!(render_stats(None), "Stats unavailable");
}

#[test]
fn grid_card_shows_progress_counts_and_relative_time() {
    let state = state_with(vec![document(
        "doc-1",
        "Lease.pdf",
        DocumentStatus::PartiallySigned,
        &[true, false, true],
    )]);
    let out = render_documents(&state, &RenderOptions::plain(now()));

    assert!(out.contains("+ Lease.pdf [Partially Signed]"), "{out}");
    assert!(out.contains("| id doc-1 | 1 file | 0 fields | 5h ago"), "{out}");
    assert!(out.contains("| signed 2/3 (67%)"), "{out}");
    assert!(!out.contains("actions:"), "{out}");
}

#[test]
fn open_menu_lists_actions_allowed_for_the_status() {
    let mut state = state_with(vec![
        document("draft-1", "Draft.pdf", DocumentStatus::Draft, &[]),
        document("sent-1", "Sent.pdf", DocumentStatus::Sent, &[false]),
    ]);
    state.open_menu = Some(DocumentId::new("sent-1"));

    let out = render_documents(&state, &RenderOptions::plain(now()));
    assert!(
        out.contains("actions: preview, live view, duplicate, cancel, delete"),
        "{out}"
    );
    assert!(!out.contains("actions: edit"), "{out}");
}

#[test]
fn list_view_renders_a_table() {
    let mut state = state_with(vec![document(
        "doc-1",
        "Lease.pdf",
        DocumentStatus::Completed,
        &[true],
    )]);
    state.view_mode = ViewMode::List;

    let out = render_documents(&state, &RenderOptions::plain(now()));
    let mut lines = out.lines();
    assert!(lines.next().expect("header").contains("STATUS"));
    let row = lines.next().expect("row");
    assert!(row.contains("doc-1"), "{row}");
    assert!(row.contains("Completed"), "{row}");
    assert!(row.contains("1/1"), "{row}");
}

#[test]
fn empty_results_mention_the_search_term() {
    let mut state = state_with(vec![document(
        "doc-1",
        "Lease.pdf",
        DocumentStatus::Draft,
        &[],
    )]);
    state.search_term = "  invoice ".into();
    assert_eq!(
        render_documents(&state, &RenderOptions::plain(now())),
        "No documents match \"invoice\"\n"
    );

    let empty = state_with(Vec::new());
    assert_eq!(
        render_documents(&empty, &RenderOptions::plain(now())),
        "No documents found\n"
    );
}

#[test]
fn pagination_shows_available_directions() {
    let mut state = state_with(Vec::new());
    assert_eq!(render_pagination(&state), "Page 2 of 3  < prev  next >");
    state.current_page = 1;
    assert_eq!(render_pagination(&state), "Page 1 of 3  next >");
    state.current_page = 3;
    assert_eq!(render_pagination(&state), "Page 3 of 3  < prev");
}

#[test]
fn colored_badges_wrap_labels_in_escape_codes() {
    let options = RenderOptions {
        color: true,
        now: now(),
    };
    assert_eq!(
        status_badge(DocumentStatus::Completed, &options),
        "\x1b[32mCompleted\x1b[0m"
    );
}

#[test]
fn dashboard_header_shows_filters_and_search() {
    let mut state = state_with(Vec::new());
    state.status_filter = Some(DocumentStatus::Completed);
    state.search_term = "nda".into();

    let out = render_dashboard(&state, &RenderOptions::plain(now()));
    assert!(out.starts_with("Stats unavailable\n"), "{out}");
    assert!(
        out.contains("Status: Completed | Sort: createdAt desc | View: grid"),
        "{out}"
    );
    assert!(out.contains("Search: \"nda\""), "{out}");
}
