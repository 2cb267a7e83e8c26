use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::debug;
use tokio::task::JoinHandle;

use crate::client::SuggestionBackend;
use crate::trip::Suggestion;

/// Idle time after the last edit before a lookup is allowed to fire.
pub const SUGGEST_QUIESCENCE: Duration = Duration::from_millis(300);
/// Queries shorter than this never reach the network.
pub const MIN_QUERY_CHARS: usize = 3;
/// Display cap for a suggestion list.
pub const MAX_SUGGESTIONS: usize = 8;

/// Advisory suggestion state, owned exclusively by the fetcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionState {
    pub suggestions: Vec<Suggestion>,
    /// Whether a suggestion list is currently available for display.
    pub open: bool,
    pub loading: bool,
}

/// Debounced, cancelable address-suggestion lookup.
///
/// Every edit bumps a generation counter. The task spawned for an edit
/// sleeps through the quiescence window, then checks the counter before
/// issuing the network call and again before publishing the result, so
/// superseded keystrokes never hit the network and out-of-order responses
/// are discarded silently.
pub struct SuggestionFetcher<B> {
    backend: Arc<B>,
    state: Arc<Mutex<SuggestionState>>,
    generation: Arc<AtomicU64>,
}

impl<B: SuggestionBackend + 'static> SuggestionFetcher<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(SuggestionState::default())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current advisory state. Reflects only the most recent settled input.
    pub fn snapshot(&self) -> SuggestionState {
        lock(&self.state).clone()
    }

    /// Feeds one edit of the address field into the debounce pipeline.
    ///
    /// Short queries clear the list immediately and schedule nothing. The
    /// returned handle completes when this edit's cycle is over (whether it
    /// published or was superseded); callers driving a UI can ignore it.
    pub fn on_input_change(&self, text: &str) -> Option<JoinHandle<()>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = text.trim().to_string();

        if query.chars().count() < MIN_QUERY_CHARS {
            *lock(&self.state) = SuggestionState::default();
            return None;
        }

        {
            let mut state = lock(&self.state);
            state.open = true;
        }

        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);
        let counter = Arc::clone(&self.generation);

        Some(tokio::spawn(async move {
            tokio::time::sleep(SUGGEST_QUIESCENCE).await;
            if counter.load(Ordering::SeqCst) != generation {
                // Superseded during the quiescence window; no network call.
                return;
            }

            lock(&state).loading = true;

            let outcome = backend.suggest_places(&query).await;

            if counter.load(Ordering::SeqCst) != generation {
                debug!(
                    "discarding stale suggestion response — query={} generation={}",
                    query, generation
                );
                return;
            }

            let mut suggestions = match outcome {
                Ok(list) => list,
                Err(e) => {
                    // Advisory degradation: never surfaced as an error.
                    debug!("suggestion lookup failed — query={} error={}", query, e);
                    Vec::new()
                }
            };
            suggestions.truncate(MAX_SUGGESTIONS);

            debug!(
                "suggestion lookup settled — query={} count={} generation={}",
                query,
                suggestions.len(),
                generation
            );

            let mut state = lock(&state);
            state.suggestions = suggestions;
            state.open = true;
            state.loading = false;
        }))
    }
}

/// One-shot suggestion lookup with the same floor, cap and degradation as
/// the debounced pipeline, for callers without an edit stream to settle.
pub async fn lookup_once<B: SuggestionBackend>(backend: &B, query: &str) -> Vec<Suggestion> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    let mut suggestions = match backend.suggest_places(query).await {
        Ok(list) => list,
        Err(e) => {
            debug!("suggestion lookup failed — query={} error={}", query, e);
            Vec::new()
        }
    };
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
