use super::*;
use chrono::TimeZone;
use serde_json::json;
use shared::domain::DocumentId;

fn signer(name: &str, email: &str, signed: bool) -> Signer {
    Signer {
        name: name.to_string(),
        email: email.to_string(),
        signed,
    }
}

fn document(name: &str, signers: Vec<Signer>) -> DocumentSummary {
    DocumentSummary {
        id: DocumentId::new(name.to_lowercase()),
        original_name: name.to_string(),
        status: Default::default(),
        files: Vec::new(),
        fields: Vec::new(),
        signers,
        created_at: None,
    }
}

#[test]
fn progress_without_signers_is_zero() {
    assert_eq!(
        signing_progress(&[]),
        SigningProgress {
            signed: 0,
            total: 0,
            percentage: 0
        }
    );
}

#[test]
fn two_of_three_signers_round_to_sixty_seven_percent() {
    let signers = vec![
        signer("a", "a@x.io", true),
        signer("b", "b@x.io", false),
        signer("c", "c@x.io", true),
    ];
    assert_eq!(
        signing_progress(&signers),
        SigningProgress {
            signed: 2,
            total: 3,
            percentage: 67
        }
    );
}

#[test]
fn progress_percentage_matches_rounded_ratio() {
    for total in 1..=9usize {
        for signed in 0..=total {
            let signers: Vec<Signer> = (0..total)
                .map(|index| signer("s", "s@x.io", index < signed))
                .collect();
            let expected = (100.0 * signed as f64 / total as f64).round() as u32;
            assert_eq!(
                signing_progress(&signers).percentage,
                expected,
                "{signed}/{total}"
            );
        }
    }
}

#[test]
fn formats_absolute_date() {
    let ts = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
    assert_eq!(format_date(&ts), "Nov 14, 2023");
    let early = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
    assert_eq!(format_date(&early), "Mar 5, 2024");
}

#[test]
fn relative_time_buckets() {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let ago = |duration: Duration| now - duration;

    assert_eq!(relative_time(&ago(Duration::minutes(59)), now), "just now");
    assert_eq!(relative_time(&(now + Duration::hours(3)), now), "just now");
    assert_eq!(relative_time(&ago(Duration::hours(1)), now), "1h ago");
    assert_eq!(relative_time(&ago(Duration::minutes(23 * 60 + 59)), now), "23h ago");
    assert_eq!(relative_time(&ago(Duration::hours(24)), now), "1d ago");
    assert_eq!(relative_time(&ago(Duration::days(6)), now), "6d ago");
    assert_eq!(relative_time(&ago(Duration::days(7)), now), "Jun 8, 2024");
}

#[test]
fn seconds_wrapper_and_iso_format_identically() {
    let from_seconds: DocumentSummary = serde_json::from_value(json!({
        "id": "a",
        "createdAt": { "seconds": 1_700_000_000 }
    }))
    .expect("decode");
    let from_iso: DocumentSummary = serde_json::from_value(json!({
        "id": "b",
        "createdAt": "2023-11-14T22:13:20.000Z"
    }))
    .expect("decode");
    let now = Utc.with_ymd_and_hms(2023, 11, 15, 3, 0, 0).unwrap();

    let a = from_seconds.created_at.expect("seconds");
    let b = from_iso.created_at.expect("iso");
    assert_eq!(format_date(&a), format_date(&b));
    assert_eq!(relative_time(&a, now), relative_time(&b, now));
    assert_eq!(relative_time(&a, now), "4h ago");
}

#[test]
fn search_matches_name_signer_name_and_email_case_insensitively() {
    let documents = vec![
        document("Lease Agreement", vec![signer("Alice Doe", "alice@corp.io", false)]),
        document("NDA", vec![signer("Bob", "bob@EXAMPLE.com", true)]),
        document("Invoice", Vec::new()),
    ];

    let names = |term: &str| -> Vec<String> {
        filter_documents(&documents, term)
            .into_iter()
            .map(|doc| doc.original_name.clone())
            .collect()
    };

    assert_eq!(names("lease"), vec!["Lease Agreement"]);
    assert_eq!(names("ALICE"), vec!["Lease Agreement"]);
    assert_eq!(names("example.com"), vec!["NDA"]);
    assert_eq!(names("   "), vec!["Lease Agreement", "NDA", "Invoice"]);
    assert!(names("zzz").is_empty());
}

#[test]
fn search_filter_is_idempotent() {
    let documents = vec![
        document("Alpha", vec![signer("x", "x@y.z", false)]),
        document("Beta", Vec::new()),
    ];
    let once: Vec<DocumentSummary> = filter_documents(&documents, "a")
        .into_iter()
        .cloned()
        .collect();
    let twice: Vec<DocumentSummary> = filter_documents(&once, "a").into_iter().cloned().collect();
    assert_eq!(once, twice);
    assert_eq!(filter_documents(&documents, "a"), filter_documents(&documents, "a"));
}
