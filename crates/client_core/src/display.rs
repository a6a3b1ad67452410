//! Pure display helpers over document summaries.

use chrono::{DateTime, Duration, Utc};
use shared::domain::{DocumentSummary, Signer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningProgress {
    pub signed: usize,
    pub total: usize,
    pub percentage: u32,
}

pub fn signing_progress(signers: &[Signer]) -> SigningProgress {
    let total = signers.len();
    let signed = signers.iter().filter(|signer| signer.signed).count();
    let percentage = if total == 0 {
        0
    } else {
        // round-half-up of 100 * signed / total in integer arithmetic
        ((signed * 200 + total) / (total * 2)) as u32
    };
    SigningProgress {
        signed,
        total,
        percentage,
    }
}

pub fn format_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %Y").to_string()
}

pub fn relative_time(timestamp: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(*timestamp);
    if elapsed < Duration::hours(1) {
        return "just now".to_string();
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{hours}h ago");
    }
    let days = hours / 24;
    if days < 7 {
        return format!("{days}d ago");
    }
    format_date(timestamp)
}

pub fn relative_time_now(timestamp: &DateTime<Utc>) -> String {
    relative_time(timestamp, Utc::now())
}

/// Case-insensitive substring match over the name and every signer's name and email.
pub fn matches_search(document: &DocumentSummary, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    document.original_name.to_lowercase().contains(&needle)
        || document.signers.iter().any(|signer| {
            signer.name.to_lowercase().contains(&needle)
                || signer.email.to_lowercase().contains(&needle)
        })
}

pub fn filter_documents<'a>(
    documents: &'a [DocumentSummary],
    term: &str,
) -> Vec<&'a DocumentSummary> {
    documents
        .iter()
        .filter(|document| matches_search(document, term))
        .collect()
}

#[cfg(test)]
#[path = "tests/display_tests.rs"]
mod tests;
