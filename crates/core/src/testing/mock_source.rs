//! Mock candidate source for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::searcher::{CandidateSource, RawCandidate, SearchError, SearchRequest};

/// A request handler that produces results dynamically.
type RequestHandler = Box<dyn Fn(&SearchRequest) -> Vec<RawCandidate> + Send + Sync>;

/// Mock implementation of the CandidateSource trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable candidates
/// - Track search requests for assertions
/// - Simulate failures and slow responses
///
/// # Example
///
/// ```rust,ignore
/// use tvwatch_core::testing::{MockCandidateSource, fixtures};
///
/// let source = MockCandidateSource::new();
/// source.set_results(vec![fixtures::sd_candidate("Lost", "S01E01")]).await;
/// source.queue_error(SearchError::Timeout).await;
///
/// // First search fails, second returns the candidate
/// assert!(source.search(&request).await.is_err());
/// assert_eq!(source.search(&request).await?.len(), 1);
/// assert_eq!(source.search_count().await, 2);
/// ```
pub struct MockCandidateSource {
    /// Candidates returned for every request when no handler is set.
    results: Arc<RwLock<Vec<RawCandidate>>>,
    /// Recorded requests, failed ones included.
    searches: Arc<RwLock<Vec<SearchRequest>>>,
    /// Errors returned by the next searches, in order.
    errors: Arc<RwLock<VecDeque<SearchError>>>,
    /// Sleep before answering.
    delay: Arc<RwLock<Option<Duration>>>,
    handler: Arc<RwLock<Option<RequestHandler>>>,
}

impl std::fmt::Debug for MockCandidateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCandidateSource")
            .field("results", &"<results>")
            .field("searches", &"<searches>")
            .field("errors", &"<errors>")
            .field("handler", &"<handler>")
            .finish()
    }
}

impl Default for MockCandidateSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCandidateSource {
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(Vec::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            errors: Arc::new(RwLock::new(VecDeque::new())),
            delay: Arc::new(RwLock::new(None)),
            handler: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the candidates returned for subsequent searches.
    pub async fn set_results(&self, results: Vec<RawCandidate>) {
        *self.results.write().await = results;
    }

    /// Produce results per request instead of the fixed list.
    pub async fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&SearchRequest) -> Vec<RawCandidate> + Send + Sync + 'static,
    {
        *self.handler.write().await = Some(Box::new(handler));
    }

    /// Make the next unanswered search fail with `error`. Errors queue up.
    pub async fn queue_error(&self, error: SearchError) {
        self.errors.write().await.push_back(error);
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn recorded_searches(&self) -> Vec<SearchRequest> {
        self.searches.read().await.clone()
    }

    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }
}

#[async_trait]
impl CandidateSource for MockCandidateSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawCandidate>, SearchError> {
        self.searches.write().await.push(request.clone());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.errors.write().await.pop_front() {
            return Err(error);
        }

        if let Some(handler) = self.handler.read().await.as_ref() {
            return Ok(handler(request));
        }

        Ok(self.results.read().await.clone())
    }
}
