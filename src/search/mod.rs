//! Debounced search-box autocomplete.
//!
//! Keystrokes are debounced before hitting the suggestions endpoint, and
//! every keystroke supersedes any fetch still pending for an older one, so
//! suggestions for an abandoned query are never delivered. Queries under
//! two characters clear the dropdown without a request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::sync::mpsc;

use crate::api::TreeHoleApi;
use crate::models::SearchSuggestions;

pub const MIN_QUERY_LEN: usize = 2;
pub const DEBOUNCE_MS: u64 = 500;

/// What the search dropdown should show next.
#[derive(Debug)]
pub enum SearchUpdate {
    Suggestions {
        query: String,
        suggestions: SearchSuggestions,
    },
    Cleared,
}

pub struct SearchBox {
    api: Arc<dyn TreeHoleApi>,
    updates: mpsc::UnboundedSender<SearchUpdate>,
    generation: Arc<AtomicU64>,
    debounce: Duration,
}

impl SearchBox {
    pub fn new(api: Arc<dyn TreeHoleApi>, updates: mpsc::UnboundedSender<SearchUpdate>) -> Self {
        Self::with_debounce(api, updates, Duration::from_millis(DEBOUNCE_MS))
    }

    pub fn with_debounce(
        api: Arc<dyn TreeHoleApi>,
        updates: mpsc::UnboundedSender<SearchUpdate>,
        debounce: Duration,
    ) -> Self {
        Self {
            api,
            updates,
            generation: Arc::new(AtomicU64::new(0)),
            debounce,
        }
    }

    /// Register an edited query. Schedules a debounced fetch; a later call
    /// supersedes it.
    pub fn keystroke(&self, query: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim().to_string();

        if query.chars().count() < MIN_QUERY_LEN {
            let _ = self.updates.send(SearchUpdate::Cleared);
            return;
        }

        let api = Arc::clone(&self.api);
        let updates = self.updates.clone();
        let counter = Arc::clone(&self.generation);
        let debounce = self.debounce;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if counter.load(Ordering::SeqCst) != generation {
                return;
            }
            match api.search_suggestions(&query).await {
                Ok(suggestions) => {
                    // Re-check: the user may have typed while we fetched.
                    if counter.load(Ordering::SeqCst) != generation {
                        return;
                    }
                    let _ = updates.send(SearchUpdate::Suggestions { query, suggestions });
                }
                Err(err) => {
                    debug!("search suggestions failed: {}", err);
                }
            }
        });
    }

    /// Close the dropdown and cancel anything pending (escape / focus lost).
    pub fn dismiss(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let _ = self.updates.send(SearchUpdate::Cleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApi;
    use crate::models::{RecentPost, TagSuggestion};

    fn suggestions_for(tag: &str) -> SearchSuggestions {
        SearchSuggestions {
            tags: vec![TagSuggestion {
                name: tag.to_string(),
                count: 3,
            }],
            recent_posts: vec![RecentPost {
                title: format!("About {}", tag),
            }],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_fetch_delivers_suggestions() {
        let api = Arc::new(MockApi::new());
        api.register_suggestions("rust", suggestions_for("rust"));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let search = SearchBox::new(api, tx);

        search.keystroke("rust");

        match rx.recv().await.unwrap() {
            SearchUpdate::Suggestions { query, suggestions } => {
                assert_eq!(query, "rust");
                assert_eq!(suggestions.tags[0].name, "rust");
            }
            other => panic!("expected suggestions, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_clears_without_fetch() {
        let api = Arc::new(MockApi::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let search = SearchBox::new(api, tx);

        search.keystroke("r");

        assert!(matches!(rx.recv().await.unwrap(), SearchUpdate::Cleared));
    }

    #[tokio::test(start_paused = true)]
    async fn single_multibyte_character_is_still_short() {
        let api = Arc::new(MockApi::new());
        api.register_suggestions("树洞", suggestions_for("树洞"));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let search = SearchBox::new(api, tx);

        // One CJK character is 3 bytes but only 1 character: no request.
        search.keystroke("树");
        assert!(matches!(rx.recv().await.unwrap(), SearchUpdate::Cleared));

        // Two characters clear the minimum and fetch.
        search.keystroke("树洞");
        match rx.recv().await.unwrap() {
            SearchUpdate::Suggestions { query, .. } => assert_eq!(query, "树洞"),
            other => panic!("expected suggestions, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn newer_keystroke_supersedes_pending_fetch() {
        let api = Arc::new(MockApi::new());
        api.register_suggestions("ru", suggestions_for("ru"));
        api.register_suggestions("rust", suggestions_for("rust"));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let search = SearchBox::new(api, tx);

        search.keystroke("ru");
        search.keystroke("rust");

        // Only the newest query's suggestions arrive.
        match rx.recv().await.unwrap() {
            SearchUpdate::Suggestions { query, .. } => assert_eq!(query, "rust"),
            other => panic!("expected suggestions, got {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_cancels_pending_fetch() {
        let api = Arc::new(MockApi::new());
        api.register_suggestions("rust", suggestions_for("rust"));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let search = SearchBox::new(api, tx);

        search.keystroke("rust");
        search.dismiss();

        assert!(matches!(rx.recv().await.unwrap(), SearchUpdate::Cleared));
        // Let the debounce elapse; the superseded fetch must stay silent.
        tokio::time::sleep(Duration::from_millis(DEBOUNCE_MS * 2)).await;
        assert!(rx.try_recv().is_err());
    }
}
