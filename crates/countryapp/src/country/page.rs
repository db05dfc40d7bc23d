//! By-capital search page orchestration
//!
//! Drives the pure [`PageState`] machine around the asynchronous search call
//! and publishes every change through a `watch` channel.

use countryapp_core::page::{PageState, FETCH_ERROR_MESSAGE};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use super::service::CountrySearch;

/// What happened to a query handed to [`ByCapitalPage::on_change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SearchOutcome {
    /// The search finished and `count` countries were applied.
    Completed { count: usize },
    /// The search failed and the error message was applied.
    Failed,
    /// A search was already in flight, or the page is disposed.
    Ignored,
    /// The search finished after the page was disposed.
    Discarded,
}

/// Fails the in-flight search when `on_change` is dropped before the
/// service answers, so the page never stays stuck in `Searching`.
struct InFlight<'a> {
    state: &'a watch::Sender<PageState>,
    disposed: &'a AtomicBool,
    query: &'a str,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        log::warn!("Search for capital {:?} was cancelled", self.query);
        self.state.send_if_modified(|state| {
            if self.disposed.load(Ordering::SeqCst) {
                return false;
            }
            state.complete_failure(FETCH_ERROR_MESSAGE);
            true
        });
    }
}

/// Search page holding the loading flag, error message and results
pub struct ByCapitalPage<S> {
    service: Arc<S>,
    state: Arc<watch::Sender<PageState>>,
    disposed: Arc<AtomicBool>,
}

impl<S> Clone for ByCapitalPage<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            state: Arc::clone(&self.state),
            disposed: Arc::clone(&self.disposed),
        }
    }
}

impl<S: CountrySearch> ByCapitalPage<S> {
    pub fn new(service: Arc<S>) -> Self {
        let (state, _) = watch::channel(PageState::new());
        Self {
            service,
            state: Arc::new(state),
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> PageState {
        self.state.borrow().clone()
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> watch::Receiver<PageState> {
        self.state.subscribe()
    }

    /// Run a search for `query`
    ///
    /// Dropped without touching the service while another search is in
    /// flight. Service errors never escape: they become the page error.
    /// Dropping the future mid-search applies the error as well.
    pub async fn on_change(&self, query: &str) -> SearchOutcome {
        let mut started = false;
        self.state.send_if_modified(|state| {
            if self.disposed.load(Ordering::SeqCst) {
                return false;
            }
            started = state.begin_search();
            started
        });

        if !started {
            if self.is_disposed() {
                log::warn!("Ignoring search for {query:?}: page was disposed");
            } else {
                log::warn!("Ignoring search for {query:?}: a search is already in flight");
            }
            return SearchOutcome::Ignored;
        }

        let mut in_flight = InFlight {
            state: &self.state,
            disposed: &self.disposed,
            query,
            armed: true,
        };
        let result = self.service.search_by_capital(query).await;
        in_flight.armed = false;

        let outcome = match &result {
            Ok(countries) => {
                log::info!("Found {} countries for capital {query:?}", countries.len());
                SearchOutcome::Completed {
                    count: countries.len(),
                }
            }
            Err(e) => {
                log::error!("Search for capital {query:?} failed: {e}");
                SearchOutcome::Failed
            }
        };

        let mut applied = false;
        self.state.send_if_modified(|state| {
            if self.disposed.load(Ordering::SeqCst) {
                return false;
            }
            match result {
                Ok(countries) => state.complete_success(countries),
                Err(_) => state.complete_failure(FETCH_ERROR_MESSAGE),
            }
            applied = true;
            true
        });

        if !applied {
            log::debug!("Discarding result for {query:?}: page was disposed");
            return SearchOutcome::Discarded;
        }

        outcome
    }

    /// Stop applying results; the state is frozen from here on
    pub fn dispose(&self) {
        self.state.send_if_modified(|_| {
            self.disposed.store(true, Ordering::SeqCst);
            false
        });
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use countryapp_core::country::Country;
    use countryapp_core::page::SearchPhase;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Search backend returning queued results, optionally held by a gate
    struct FakeSearch {
        calls: AtomicUsize,
        queries: Mutex<Vec<String>>,
        results: Mutex<VecDeque<Result<Vec<Country>, Error>>>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeSearch {
        fn new(results: Vec<Result<Vec<Country>, Error>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                queries: Mutex::new(Vec::new()),
                results: Mutex::new(results.into()),
                gate: None,
            }
        }

        fn gated(results: Vec<Result<Vec<Country>, Error>>, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(results)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CountrySearch for FakeSearch {
        async fn search_by_capital(&self, query: &str) -> Result<Vec<Country>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());

            if let Some(gate) = &self.gate {
                gate.notified().await;
            }

            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn create_france() -> Country {
        Country {
            capital: "Paris".to_string(),
            cca2: "FR".to_string(),
            flag_svg: "fr.svg".to_string(),
            flag: "🇫🇷".to_string(),
            population: 67_000_000,
            region: "Europe".to_string(),
            sub_region: "Western Europe".to_string(),
            name: "Francia".to_string(),
        }
    }

    fn network_error() -> Error {
        Error::Network("connection refused".to_string())
    }

    #[tokio::test]
    async fn test_on_change_success() {
        let service = Arc::new(FakeSearch::new(vec![Ok(vec![create_france()])]));
        let page = ByCapitalPage::new(service.clone());

        let outcome = page.on_change("Paris").await;

        assert_eq!(outcome, SearchOutcome::Completed { count: 1 });
        let state = page.state();
        assert!(!state.is_loading());
        assert!(state.is_error().is_none());
        assert_eq!(state.countries(), &[create_france()]);
        assert_eq!(state.phase(), SearchPhase::Success);
        assert_eq!(*service.queries.lock().unwrap(), vec!["Paris".to_string()]);
    }

    #[tokio::test]
    async fn test_on_change_empty_result_is_not_an_error() {
        let service = Arc::new(FakeSearch::new(vec![Ok(vec![])]));
        let page = ByCapitalPage::new(service);

        let outcome = page.on_change("Nowhere").await;

        assert_eq!(outcome, SearchOutcome::Completed { count: 0 });
        let state = page.state();
        assert!(state.countries().is_empty());
        assert!(state.is_error().is_none());
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_on_change_failure_keeps_previous_countries() {
        let service = Arc::new(FakeSearch::new(vec![
            Ok(vec![create_france()]),
            Err(network_error()),
        ]));
        let page = ByCapitalPage::new(service);

        page.on_change("Paris").await;
        let outcome = page.on_change("Paris").await;

        assert_eq!(outcome, SearchOutcome::Failed);
        let state = page.state();
        assert!(!state.is_loading());
        assert_eq!(state.is_error(), Some(FETCH_ERROR_MESSAGE));
        assert_eq!(state.countries(), &[create_france()]);
        assert_eq!(state.phase(), SearchPhase::Failed);
    }

    #[tokio::test]
    async fn test_on_change_after_failure_clears_error() {
        let service = Arc::new(FakeSearch::new(vec![
            Err(network_error()),
            Ok(vec![create_france()]),
        ]));
        let page = ByCapitalPage::new(service);

        page.on_change("Paris").await;
        assert!(page.state().is_error().is_some());

        page.on_change("Paris").await;
        assert!(page.state().is_error().is_none());
        assert_eq!(page.state().countries().len(), 1);
    }

    #[tokio::test]
    async fn test_on_change_ignored_while_searching() {
        let gate = Arc::new(Notify::new());
        let service = Arc::new(FakeSearch::gated(
            vec![Ok(vec![create_france()])],
            gate.clone(),
        ));
        let page = ByCapitalPage::new(service.clone());
        let mut rx = page.subscribe();

        let first = tokio::spawn({
            let page = page.clone();
            async move { page.on_change("a").await }
        });

        rx.wait_for(|state| state.is_loading()).await.unwrap();

        assert_eq!(page.on_change("b").await, SearchOutcome::Ignored);
        assert!(page.state().is_loading());

        gate.notify_one();
        assert_eq!(first.await.unwrap(), SearchOutcome::Completed { count: 1 });

        assert_eq!(service.calls(), 1);
        assert_eq!(*service.queries.lock().unwrap(), vec!["a".to_string()]);
        assert!(!page.state().is_loading());
    }

    #[tokio::test]
    async fn test_dropped_search_releases_the_page() {
        let gate = Arc::new(Notify::new());
        let service = Arc::new(FakeSearch::gated(
            vec![Ok(vec![create_france()])],
            gate.clone(),
        ));
        let page = ByCapitalPage::new(service.clone());

        let dropped = tokio::time::timeout(Duration::from_millis(50), page.on_change("a")).await;
        assert!(dropped.is_err());

        let state = page.state();
        assert!(!state.is_loading());
        assert_eq!(state.phase(), SearchPhase::Failed);
        assert_eq!(state.is_error(), Some(FETCH_ERROR_MESSAGE));

        gate.notify_one();
        assert_eq!(
            page.on_change("Paris").await,
            SearchOutcome::Completed { count: 1 }
        );
        assert_eq!(service.calls(), 2);
        assert_eq!(page.state().phase(), SearchPhase::Success);
    }

    #[tokio::test]
    async fn test_dropped_search_after_dispose_keeps_state_frozen() {
        let gate = Arc::new(Notify::new());
        let service = Arc::new(FakeSearch::gated(vec![], gate));
        let page = ByCapitalPage::new(service);
        let mut rx = page.subscribe();

        let pending = tokio::spawn({
            let page = page.clone();
            async move { page.on_change("Paris").await }
        });

        rx.wait_for(|state| state.is_loading()).await.unwrap();
        page.dispose();
        let frozen = page.state();

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());
        assert_eq!(page.state(), frozen);
    }

    #[tokio::test]
    async fn test_subscribers_observe_loading_then_result() {
        let service = Arc::new(FakeSearch::new(vec![Ok(vec![create_france()])]));
        let page = ByCapitalPage::new(service);
        let mut rx = page.subscribe();

        page.on_change("Paris").await;

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.phase(), SearchPhase::Success);
        assert_eq!(state.countries().len(), 1);
    }

    #[tokio::test]
    async fn test_dispose_discards_pending_result() {
        let gate = Arc::new(Notify::new());
        let service = Arc::new(FakeSearch::gated(
            vec![Ok(vec![create_france()])],
            gate.clone(),
        ));
        let page = ByCapitalPage::new(service);
        let mut rx = page.subscribe();

        let pending = tokio::spawn({
            let page = page.clone();
            async move { page.on_change("Paris").await }
        });

        rx.wait_for(|state| state.is_loading()).await.unwrap();
        page.dispose();
        let frozen = page.state();

        gate.notify_one();
        assert_eq!(pending.await.unwrap(), SearchOutcome::Discarded);
        assert_eq!(page.state(), frozen);
        assert!(page.state().countries().is_empty());
    }

    #[tokio::test]
    async fn test_on_change_after_dispose_is_ignored() {
        let service = Arc::new(FakeSearch::new(vec![Ok(vec![create_france()])]));
        let page = ByCapitalPage::new(service.clone());

        page.dispose();

        assert!(page.is_disposed());
        assert_eq!(page.on_change("Paris").await, SearchOutcome::Ignored);
        assert_eq!(service.calls(), 0);
        assert_eq!(page.state().phase(), SearchPhase::Idle);
    }
}
