use super::*;
use serde_json::json;

#[test]
fn list_query_uses_camel_case_and_omits_missing_status() {
    let query = ListDocumentsQuery::default();
    assert_eq!(
        serde_json::to_value(&query).expect("encode"),
        json!({ "page": 1, "limit": 12, "sortBy": "createdAt", "sortOrder": "desc" })
    );

    let filtered = ListDocumentsQuery {
        page: 2,
        sort_by: SortBy::OriginalName,
        sort_order: SortOrder::Asc,
        status: Some(DocumentStatus::PartiallySigned),
        ..ListDocumentsQuery::default()
    };
    assert_eq!(
        serde_json::to_value(&filtered).expect("encode"),
        json!({
            "page": 2,
            "limit": 12,
            "sortBy": "originalName",
            "sortOrder": "asc",
            "status": "partially_signed"
        })
    );
}

#[test]
fn list_response_defaults_pagination_to_single_page() {
    let response: DocumentListResponse =
        serde_json::from_value(json!({ "success": true, "documents": [] })).expect("decode");
    assert_eq!(response.pagination.total_pages, 1);
    assert!(response.rejection.reason().is_none());
}

#[test]
fn rejection_prefers_error_over_message_and_ignores_blank() {
    let rejection: Rejection =
        serde_json::from_value(json!({ "error": "boom", "message": "ignored" })).expect("decode");
    assert_eq!(rejection.reason(), Some("boom"));

    let blank: Rejection = serde_json::from_value(json!({ "error": "  " })).expect("decode");
    assert_eq!(blank.reason(), None);

    let ack: AckResponse =
        serde_json::from_value(json!({ "success": false, "message": "locked" })).expect("decode");
    assert!(!ack.success);
    assert_eq!(ack.rejection.reason(), Some("locked"));
}

#[test]
fn duplicate_response_reads_document_id() {
    let response: DuplicateResponse =
        serde_json::from_value(json!({ "success": true, "documentId": "copy-1" })).expect("decode");
    assert_eq!(response.document_id, Some(DocumentId::new("copy-1")));
}

#[test]
fn sort_parameters_parse_cli_spellings() {
    assert_eq!("name".parse::<SortBy>(), Ok(SortBy::OriginalName));
    assert_eq!("created-at".parse::<SortBy>(), Ok(SortBy::CreatedAt));
    assert_eq!("ASC".parse::<SortOrder>(), Ok(SortOrder::Asc));
    assert_eq!(SortOrder::Asc.reversed(), SortOrder::Desc);
    assert!("sideways".parse::<SortOrder>().is_err());
}

#[test]
fn unknown_sort_parameters_report_the_value() {
    assert_eq!("size".parse::<SortBy>(), Err(UnknownSortField("size".into())));
    assert_eq!(
        "sideways".parse::<SortOrder>().map_err(|err| err.to_string()),
        Err("unknown sort order 'sideways'".to_string())
    );
}
