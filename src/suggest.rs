//! Location autocomplete with debouncing.
//!
//! Every call to [`LocationSuggester::input`] takes a new request token and
//! restarts the quiet-period timer. When the timer fires, one lookup is
//! issued; its results are published only if its token is still the latest,
//! so a slow lookup can never overwrite a fresher one. Lookups already in
//! flight are not cancelled, their results are just dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::SuggestionConfig;
use crate::models::LocationCandidate;
use crate::provider::Geocoder;

/// What the suggestion list currently shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuggestionState {
    /// Token of the request these candidates belong to
    pub token: u64,
    /// Query the candidates were looked up for, empty when cleared
    pub query: String,
    pub candidates: Vec<LocationCandidate>,
}

/// Debounced location search
pub struct LocationSuggester<G> {
    inner: Arc<Inner<G>>,
}

struct Inner<G> {
    geocoder: G,
    debounce: Duration,
    min_query_len: usize,
    max_results: usize,
    latest: AtomicU64,
    pending: Mutex<Option<JoinHandle<()>>>,
    state: watch::Sender<SuggestionState>,
}

impl<G: Geocoder + 'static> LocationSuggester<G> {
    pub fn new(geocoder: G, config: &SuggestionConfig) -> Self {
        let (state, _) = watch::channel(SuggestionState::default());
        Self {
            inner: Arc::new(Inner {
                geocoder,
                debounce: config.debounce(),
                min_query_len: config.min_query_len,
                max_results: config.max_results,
                latest: AtomicU64::new(0),
                pending: Mutex::new(None),
                state,
            }),
        }
    }

    /// Handle a keystroke. Must be called from within a tokio runtime.
    ///
    /// Queries shorter than the minimum length clear the list right away and
    /// never reach the network. Returns the request token taken.
    pub fn input(&self, query: &str) -> u64 {
        let query = query.trim();
        let mut pending = self.inner.lock_pending();
        if let Some(timer) = pending.take() {
            timer.abort();
        }
        let token = self.inner.next_token();

        if query.chars().count() < self.inner.min_query_len {
            debug!("Query '{}' too short, clearing suggestions", query);
            self.inner.publish(token, String::new(), Vec::new());
            return token;
        }

        let inner = Arc::clone(&self.inner);
        let query = query.to_string();
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            if inner.latest.load(Ordering::SeqCst) != token {
                return;
            }
            // Detached so a later keystroke cancels only the timer, not the lookup
            tokio::spawn(Inner::lookup(inner, token, query));
        }));
        token
    }

    /// Drop the pending timer and clear the list
    pub fn clear(&self) {
        let mut pending = self.inner.lock_pending();
        if let Some(timer) = pending.take() {
            timer.abort();
        }
        let token = self.inner.next_token();
        self.inner.publish(token, String::new(), Vec::new());
    }

    /// Pick a candidate from the visible list, clearing the list
    pub fn select(&self, id: &str) -> Option<LocationCandidate> {
        let chosen = self
            .inner
            .state
            .borrow()
            .candidates
            .iter()
            .find(|c| c.id == id)
            .cloned();
        if chosen.is_some() {
            self.clear();
        }
        chosen
    }

    /// Currently visible candidates
    #[must_use]
    pub fn suggestions(&self) -> Vec<LocationCandidate> {
        self.inner.state.borrow().candidates.clone()
    }

    #[must_use]
    pub fn state(&self) -> SuggestionState {
        self.inner.state.borrow().clone()
    }

    /// Watch the visible state
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.inner.state.subscribe()
    }
}

impl<G> Drop for LocationSuggester<G> {
    fn drop(&mut self) {
        if let Some(timer) = self.inner.lock_pending().take() {
            timer.abort();
        }
        // Anything still in flight is now stale
        self.inner.latest.fetch_add(1, Ordering::SeqCst);
    }
}

impl<G> Inner<G> {
    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_token(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish results if `token` is still the latest request
    fn publish(&self, token: u64, query: String, candidates: Vec<LocationCandidate>) -> bool {
        self.state.send_if_modified(|state| {
            if token != self.latest.load(Ordering::SeqCst) || token < state.token {
                return false;
            }
            *state = SuggestionState {
                token,
                query,
                candidates,
            };
            true
        })
    }
}

impl<G: Geocoder> Inner<G> {
    async fn lookup(self: Arc<Self>, token: u64, query: String) {
        debug!("Looking up suggestions for '{}' (token {})", query, token);

        let candidates = match self.geocoder.search(&query, self.max_results).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Suggestion lookup for '{}' failed: {}", query, e);
                Vec::new()
            }
        };

        let count = candidates.len();
        if self.publish(token, query, candidates) {
            debug!("Showing {} suggestions (token {})", count, token);
        } else {
            debug!("Discarding stale suggestions (token {})", token);
        }
    }
}

/// Undebounced lookup for callers that send one complete query.
///
/// Follows the same rules as the suggester: short queries and failed
/// lookups both yield an empty list.
pub async fn suggest_once<G: Geocoder + ?Sized>(
    geocoder: &G,
    config: &SuggestionConfig,
    query: &str,
) -> Vec<LocationCandidate> {
    let query = query.trim();
    if query.chars().count() < config.min_query_len {
        return Vec::new();
    }
    geocoder
        .search(query, config.max_results)
        .await
        .unwrap_or_else(|e| {
            warn!("Suggestion lookup for '{}' failed: {}", query, e);
            Vec::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use crate::{Result, TrafficPulseError};
    use async_trait::async_trait;

    /// Answers with one candidate named after the query, after a per-query delay
    #[derive(Default)]
    struct SlowGeocoder {
        delays: Vec<(&'static str, Duration)>,
        calls: Mutex<Vec<(String, usize)>>,
    }

    impl SlowGeocoder {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(q, _)| q.clone()).collect()
        }
    }

    #[async_trait]
    impl Geocoder for SlowGeocoder {
        async fn search(&self, query: &str, limit: usize) -> Result<Vec<LocationCandidate>> {
            self.calls.lock().unwrap().push((query.to_string(), limit));
            let delay = self
                .delays
                .iter()
                .find(|(q, _)| *q == query)
                .map_or(Duration::from_millis(20), |(_, d)| *d);
            tokio::time::sleep(delay).await;

            if query == "fail" {
                return Err(TrafficPulseError::api("boom"));
            }
            Ok(vec![
                LocationCandidate::new(
                    format!("{query}-1"),
                    query.to_string(),
                    format!("{query}, India"),
                    Coordinates::new(77.0, 28.0),
                )
                .unwrap(),
            ])
        }
    }

    fn suggester(geocoder: &Arc<SlowGeocoder>) -> LocationSuggester<Arc<SlowGeocoder>> {
        LocationSuggester::new(Arc::clone(geocoder), &SuggestionConfig::default())
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_secs(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_never_hits_network() {
        let geocoder = Arc::new(SlowGeocoder::default());
        let suggester = suggester(&geocoder);

        for query in ["", "a", "ab", "  ab  "] {
            suggester.input(query);
        }
        settle().await;

        assert!(geocoder.calls().is_empty());
        assert!(suggester.suggestions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_clears_previous_results() {
        let geocoder = Arc::new(SlowGeocoder::default());
        let suggester = suggester(&geocoder);

        suggester.input("Pune");
        settle().await;
        assert_eq!(suggester.suggestions().len(), 1);

        suggester.input("Pu");
        assert!(suggester.suggestions().is_empty());
        settle().await;
        assert_eq!(geocoder.calls(), vec!["Pune"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_keystrokes_issue_one_lookup() {
        let geocoder = Arc::new(SlowGeocoder::default());
        let suggester = suggester(&geocoder);

        suggester.input("Del");
        tokio::time::sleep(Duration::from_millis(100)).await;
        suggester.input("Delh");
        tokio::time::sleep(Duration::from_millis(299)).await;
        suggester.input("Delhi");
        settle().await;

        assert_eq!(geocoder.calls(), vec!["Delhi"]);
        assert_eq!(geocoder.calls.lock().unwrap()[0].1, 5);
        let state = suggester.state();
        assert_eq!(state.query, "Delhi");
        assert_eq!(state.candidates[0].name, "Delhi");
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_waits_for_quiet_period() {
        let geocoder = Arc::new(SlowGeocoder::default());
        let suggester = suggester(&geocoder);

        suggester.input("Chennai");
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(geocoder.calls().is_empty());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(geocoder.calls(), vec!["Chennai"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_earlier_lookup_does_not_overwrite_newer() {
        let geocoder = Arc::new(SlowGeocoder {
            delays: vec![
                ("Mumbai", Duration::from_secs(2)),
                ("Mumbai Central", Duration::from_millis(10)),
            ],
            ..SlowGeocoder::default()
        });
        let suggester = suggester(&geocoder);

        suggester.input("Mumbai");
        // first lookup fires at 300ms and resolves at 2300ms
        tokio::time::sleep(Duration::from_millis(400)).await;
        suggester.input("Mumbai Central");
        // second fires at 700ms and resolves at 710ms
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(suggester.state().query, "Mumbai Central");

        settle().await;
        assert_eq!(geocoder.calls(), vec!["Mumbai", "Mumbai Central"]);
        let state = suggester.state();
        assert_eq!(state.query, "Mumbai Central");
        assert_eq!(state.candidates[0].name, "Mumbai Central");
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_lookup_discarded_after_clear() {
        let geocoder = Arc::new(SlowGeocoder {
            delays: vec![("Kolkata", Duration::from_secs(1))],
            ..SlowGeocoder::default()
        });
        let suggester = suggester(&geocoder);

        suggester.input("Kolkata");
        tokio::time::sleep(Duration::from_millis(500)).await;
        suggester.input("Ko");
        settle().await;

        assert_eq!(geocoder.calls(), vec!["Kolkata"]);
        assert!(suggester.suggestions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_errors_become_empty_list() {
        let geocoder = Arc::new(SlowGeocoder::default());
        let suggester = suggester(&geocoder);

        suggester.input("Jaipur");
        settle().await;
        assert_eq!(suggester.suggestions().len(), 1);

        suggester.input("fail");
        settle().await;
        assert!(suggester.suggestions().is_empty());
        assert_eq!(suggester.state().query, "fail");
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_returns_candidate_and_clears() {
        let geocoder = Arc::new(SlowGeocoder::default());
        let suggester = suggester(&geocoder);

        suggester.input("Lucknow");
        settle().await;

        assert!(suggester.select("missing").is_none());
        let chosen = suggester.select("Lucknow-1").unwrap();
        assert_eq!(chosen.address, "Lucknow, India");
        assert!(suggester.suggestions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_updates() {
        let geocoder = Arc::new(SlowGeocoder::default());
        let suggester = suggester(&geocoder);
        let mut rx = suggester.subscribe();

        let token = suggester.input("Hyderabad");
        rx.changed().await.unwrap();

        let state = rx.borrow_and_update().clone();
        assert_eq!(state.token, token);
        assert_eq!(state.candidates.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_timer() {
        let geocoder = Arc::new(SlowGeocoder::default());
        let suggester = suggester(&geocoder);

        suggester.input("Ahmedabad");
        drop(suggester);
        settle().await;

        assert!(geocoder.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggest_once() {
        let geocoder = SlowGeocoder::default();
        let config = SuggestionConfig::default();

        assert!(suggest_once(&geocoder, &config, "Ko").await.is_empty());
        assert!(suggest_once(&geocoder, &config, "fail").await.is_empty());
        let found = suggest_once(&geocoder, &config, " Kolkata ").await;
        assert_eq!(found[0].name, "Kolkata");
        assert_eq!(*geocoder.calls.lock().unwrap(), vec![
            ("fail".to_string(), 5),
            ("Kolkata".to_string(), 5),
        ]);
    }
}
