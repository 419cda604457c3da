use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::debug;
use url::Url;

use super::query::Query;

/// Emitted when the location changes under us (history back/forward)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationChange {
    pub url: Url,
}

/// The navigable location the admin pages are bound to
pub trait Location: Send + Sync {
    fn current_url(&self) -> Url;

    fn query(&self) -> Query {
        Query::parse(&self.current_url())
    }

    /// Replace the location with `query`. Does not notify subscribers.
    fn push(&self, query: &Query);

    /// Subscribe to externally driven changes
    fn subscribe(&self) -> broadcast::Receiver<NavigationChange>;

    /// `updateQueryString(params, path)`: new path, `page` kept, `params` added
    fn update_query_string(&self, params: &[(&str, &str)], path: &str) {
        let next = self.query().with_path(params, path);
        self.push(&next);
    }

    /// `getNewPath` + `navigateTo`: overwrite `params`, keep the path
    fn navigate_to_params(&self, params: &[(&str, &str)]) {
        let next = self.query().with_params(params);
        self.push(&next);
    }
}

#[derive(Debug)]
struct HistoryStack {
    entries: Vec<Url>,
    index: usize,
}

/// In-process history with back/forward, standing in for the browser history
#[derive(Debug)]
pub struct MemoryHistory {
    stack: Mutex<HistoryStack>,
    changes: broadcast::Sender<NavigationChange>,
}

impl MemoryHistory {
    pub fn new(initial: Url) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            stack: Mutex::new(HistoryStack {
                entries: vec![initial],
                index: 0,
            }),
            changes,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HistoryStack> {
        // A poisoned stack still holds valid urls
        self.stack.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Go back one entry. Returns false at the start of history.
    pub fn back(&self) -> bool {
        self.go(-1)
    }

    /// Go forward one entry. Returns false at the end of history.
    pub fn forward(&self) -> bool {
        self.go(1)
    }

    fn go(&self, delta: isize) -> bool {
        let url = {
            let mut stack = self.lock();
            let Some(target) = stack.index.checked_add_signed(delta) else {
                return false;
            };
            if target >= stack.entries.len() {
                return false;
            }
            stack.index = target;
            stack.entries[target].clone()
        };

        debug!(url = %url, "History traversal");
        // No subscribers is fine
        let _ = self.changes.send(NavigationChange { url });
        true
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Always false: history holds at least the initial entry
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Location for MemoryHistory {
    fn current_url(&self) -> Url {
        let stack = self.lock();
        stack.entries[stack.index].clone()
    }

    fn push(&self, query: &Query) {
        let mut stack = self.lock();
        let url = query.to_url(&stack.entries[stack.index]);
        let keep = stack.index + 1;
        stack.entries.truncate(keep);
        stack.entries.push(url);
        stack.index = keep;
    }

    fn subscribe(&self) -> broadcast::Receiver<NavigationChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(path: &str) -> MemoryHistory {
        let base = Url::parse("https://shop.test/wp-admin/admin.php").unwrap();
        MemoryHistory::new(Query::for_path(path).to_url(&base))
    }

    #[test]
    fn test_push_then_back_and_forward() {
        let history = history("/customize-store/intro");
        history.update_query_string(&[], "/customize-store/assembler-hub");
        assert_eq!(history.query().path(), "/customize-store/assembler-hub");

        assert!(history.back());
        assert_eq!(history.query().path(), "/customize-store/intro");
        assert!(!history.back());

        assert!(history.forward());
        assert_eq!(history.query().path(), "/customize-store/assembler-hub");
        assert!(!history.forward());
    }

    #[test]
    fn test_push_discards_forward_entries() {
        let history = history("/customize-store/intro");
        history.update_query_string(&[], "/customize-store/design-with-ai");
        history.back();
        history.update_query_string(&[], "/customize-store/assembler-hub");

        assert_eq!(history.len(), 2);
        assert!(!history.forward());
    }

    #[test]
    fn test_fresh_history_holds_initial_entry() {
        let history = history("/extensions");
        assert_eq!(history.len(), 1);
        assert!(!history.is_empty());
        assert!(!history.back());
    }

    #[tokio::test]
    async fn test_only_traversal_notifies() {
        let history = history("/customize-store/intro");
        let mut changes = history.subscribe();

        history.update_query_string(&[], "/customize-store/assembler-hub");
        assert!(changes.try_recv().is_err());

        history.back();
        let change = changes.recv().await.unwrap();
        assert_eq!(Query::parse(&change.url).path(), "/customize-store/intro");
    }

    #[test]
    fn test_navigate_to_params_keeps_path() {
        let history = history("/extensions");
        history.navigate_to_params(&[("category", "shipping")]);
        let query = history.query();
        assert_eq!(query.path(), "/extensions");
        assert_eq!(query.get("category"), Some("shipping"));
    }
}
