//! Terminal-side collaborators for the controller: URL printing, stdin prompts and notification output.

use std::{
    io::{self, BufRead, Write},
    sync::Arc,
    thread,
};

use async_trait::async_trait;
use client_core::{Confirm, DeletePrompt, Navigator, Notification, Route};
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{info, warn};

pub type LineReceiver = Arc<Mutex<mpsc::Receiver<String>>>;

/// Forwards stdin lines from a plain thread so a pending read never holds up runtime shutdown.
pub fn spawn_stdin_lines() -> LineReceiver {
    let (tx, rx) = mpsc::channel(16);
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    Arc::new(Mutex::new(rx))
}

pub fn route_url(site_url: &str, route: &Route) -> String {
    format!("{site_url}{}", route.path())
}

pub struct PrintNavigator {
    site_url: String,
}

impl PrintNavigator {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
        }
    }
}

impl Navigator for PrintNavigator {
    fn navigate(&self, route: &Route) {
        let url = route_url(&self.site_url, route);
        info!(%url, "navigating");
        if route.opens_new_context() {
            println!("Open in a new window: {url}");
        } else {
            println!("Open: {url}");
        }
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Asks on stdout and reads the answer from the shared line stream; EOF declines.
pub struct LineConfirm {
    lines: LineReceiver,
}

impl LineConfirm {
    pub fn new(lines: LineReceiver) -> Self {
        Self { lines }
    }
}

#[async_trait]
impl Confirm for LineConfirm {
    async fn confirm_delete(&self, prompt: &DeletePrompt) -> bool {
        print!("{} [y/N] ", prompt.question());
        let _ = io::stdout().flush();
        let answer = self.lines.lock().await.recv().await;
        answer.as_deref().is_some_and(is_affirmative)
    }
}

pub fn print_notification(notification: &Notification) {
    if notification.is_error() {
        eprintln!("{notification}");
        if notification.requires_reauth() {
            eprintln!("  (check the API token: --token, DASHBOARD_API_TOKEN or api_token in the config file)");
        }
    } else {
        println!("{notification}");
    }
}

/// Prints whatever is already queued; returns the error notifications seen.
pub fn drain_notifications(receiver: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut errors = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(notification) => {
                print_notification(&notification);
                if notification.is_error() {
                    errors.push(notification);
                }
            }
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "notifications dropped");
            }
            Err(_) => return errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::NotificationContext;
    use shared::domain::DocumentId;

    #[test]
    fn route_urls_append_paths_to_the_site() {
        let site = "https://sign.example.com";
        assert_eq!(route_url(site, &Route::CreateNew), "https://sign.example.com/");
        assert_eq!(
            route_url(site, &Route::LiveView(DocumentId::new("abc"))),
            "https://sign.example.com/live/abc"
        );
    }

    #[test]
    fn only_yes_answers_confirm() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative(" YES \n"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yep"));
    }

    #[tokio::test]
    async fn line_confirm_reads_the_next_line_and_declines_on_eof() {
        let (tx, rx) = mpsc::channel(4);
        let confirm = LineConfirm::new(Arc::new(Mutex::new(rx)));
        let prompt = DeletePrompt {
            document_id: DocumentId::new("doc-1"),
            document_name: Some("Lease.pdf".into()),
        };

        tx.send("yes".into()).await.expect("send");
        assert!(confirm.confirm_delete(&prompt).await);
        tx.send("no".into()).await.expect("send");
        assert!(!confirm.confirm_delete(&prompt).await);
        drop(tx);
        assert!(!confirm.confirm_delete(&prompt).await);
    }

    #[test]
    fn draining_collects_only_errors() {
        let (tx, mut rx) = broadcast::channel(8);
        tx.send(Notification::success(NotificationContext::Delete, "done"))
            .expect("send");
        tx.send(Notification::error(
            NotificationContext::Delete,
            client_core::NotificationCategory::Transport,
            "boom",
        ))
        .expect("send");

        let errors = drain_notifications(&mut rx);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "boom");
    }
}
