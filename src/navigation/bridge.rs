use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::location::Location;
use super::query::Query;

/// First path segment owned by the customize-store wizard
pub const WIZARD_ROOT: &str = "customize-store";

/// Receives the synthetic event produced for each history change
pub trait HistoryListener: Send + 'static {
    /// Returns false once the receiving side is gone
    fn on_history_change(&self) -> bool;
}

/// Forwards history notifications from a [`Location`] to a listener.
///
/// The subscription lives as long as the bridge; dropping it unsubscribes.
#[derive(Debug)]
pub struct UrlBridge {
    task: JoinHandle<()>,
}

impl UrlBridge {
    pub fn attach<L>(location: Arc<dyn Location>, listener: L) -> Self
    where
        L: HistoryListener,
    {
        let mut changes = location.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        debug!(url = %change.url, "External navigation");
                        if !listener.on_history_change() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Each missed change would only re-read the same url
                        warn!(skipped, "History notifications lagged");
                        if !listener.on_history_change() {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Self { task }
    }

    /// Stop forwarding notifications
    pub fn detach(self) {}
}

impl Drop for UrlBridge {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// `hasStepInUrl`: does path segment 2 name `step`?
pub fn has_step_in_url(query: &Query, step: &str) -> bool {
    query.path_segment(2) == Some(step)
}

/// Write the wizard step back into the location.
///
/// Only paths under the wizard root are touched, and only segment 2 is compared; deeper
/// segments belong to the nested screens. Returns whether the location changed.
pub fn update_query_step(location: &dyn Location, step: &str) -> bool {
    let query = location.query();
    if query.path_segment(1) != Some(WIZARD_ROOT) {
        return false;
    }
    if query.path_segment(2) == Some(step) {
        return false;
    }

    let path = format!("/{WIZARD_ROOT}/{step}");
    debug!(path = %path, "Updating wizard step in url");
    location.update_query_string(&[], &path);
    true
}
