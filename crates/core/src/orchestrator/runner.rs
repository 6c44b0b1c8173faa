//! Retrieval orchestrator implementation.
//!
//! For every downloadable series:
//! - search the next episode, then episode 1 of the next season
//! - retry the pair up to the configured number of attempts
//! - advance the watchlist on the first acceptable release

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::searcher::{CandidateSource, SearchError, SearchRequest};
use crate::selector::{CandidateSelector, ResolvedDownload};
use crate::watchlist::{DownloadableEntry, WatchlistStore};

use super::config::OrchestratorConfig;
use super::miss_log::{not_found_line, MissLog};
use super::types::{OrchestratorError, RunReport, SearchPhase, SeriesOutcome};

/// Drives every downloadable series from search to resolution.
pub struct RetrievalOrchestrator {
    config: OrchestratorConfig,
    store: Arc<dyn WatchlistStore>,
    source: Arc<dyn CandidateSource>,
    selector: CandidateSelector,
    miss_log: Arc<dyn MissLog>,
}

impl RetrievalOrchestrator {
    /// Create a new orchestrator with the default candidate selector.
    pub fn new(
        config: OrchestratorConfig,
        store: Arc<dyn WatchlistStore>,
        source: Arc<dyn CandidateSource>,
        miss_log: Arc<dyn MissLog>,
    ) -> Self {
        Self {
            config,
            store,
            source,
            selector: CandidateSelector::new(),
            miss_log,
        }
    }

    /// Replace the candidate selector (e.g. custom quality rules).
    pub fn with_selector(mut self, selector: CandidateSelector) -> Self {
        self.selector = selector;
        self
    }

    /// One pass over the watchlist.
    ///
    /// Only watchlist failures end the run early; search failures and
    /// missing releases are reported through `RunReport::not_found`.
    pub async fn run(&self) -> Result<RunReport, OrchestratorError> {
        let entries = self.store.downloadable_entries()?;
        info!(
            series = entries.len(),
            retries = self.config.retries,
            source = self.source.name(),
            "Starting retrieval run"
        );

        let outcomes: Vec<Result<SeriesOutcome, OrchestratorError>> = stream::iter(entries)
            .map(|entry| self.resolve_series(entry))
            .buffer_unordered(self.config.max_concurrent_series.max(1))
            .collect()
            .await;

        let mut report = RunReport::default();
        for outcome in outcomes {
            let outcome = outcome?;
            debug!(phase = outcome.phase().as_str(), "Series finished");
            match outcome {
                SeriesOutcome::Resolved(download) => report.resolved.push(download),
                SeriesOutcome::Exhausted {
                    series, episode, ..
                } => report.not_found.push((series, episode)),
            }
        }

        info!(
            resolved = report.resolved.len(),
            not_found = report.not_found.len(),
            "Retrieval run complete"
        );
        Ok(report)
    }

    /// Retry loop for a single series.
    async fn resolve_series(&self, entry: DownloadableEntry) -> Result<SeriesOutcome, OrchestratorError> {
        for attempt in 1..=self.config.retries {
            match self.attempt(&entry).await {
                Ok(Some(download)) => {
                    self.store.record_download(&entry.name, download.episode)?;
                    info!(
                        series = %entry.name,
                        episode = %download.episode,
                        attempt,
                        "Resolved"
                    );
                    return Ok(SeriesOutcome::Resolved(download));
                }
                Ok(None) => {
                    debug!(series = %entry.name, attempt, "No acceptable release");
                }
                Err(e) => {
                    warn!(
                        series = %entry.name,
                        attempt,
                        kind = e.kind(),
                        error = %e,
                        "Search attempt failed"
                    );
                }
            }
        }

        let line = not_found_line(&entry.name, entry.next_episode);
        warn!(series = %entry.name, episode = %entry.next_episode, "{}", line);
        self.miss_log.record(&line);

        Ok(SeriesOutcome::Exhausted {
            series: entry.name,
            episode: entry.next_episode,
            attempts: self.config.retries,
        })
    }

    /// Current-season search, then next-season opener. A failing search
    /// ends the attempt.
    async fn attempt(&self, entry: &DownloadableEntry) -> Result<Option<ResolvedDownload>, SearchError> {
        let current = SearchRequest::new(&entry.name, entry.next_episode);
        if let Some(download) = self
            .search_and_select(&current, &entry.quality, SearchPhase::SearchingCurrent)
            .await?
        {
            return Ok(Some(download));
        }

        let next_season = SearchRequest::new(&entry.name, entry.next_season_opener);
        self.search_and_select(&next_season, &entry.quality, SearchPhase::SearchingNextSeason)
            .await
    }

    async fn search_and_select(
        &self,
        request: &SearchRequest,
        quality: &str,
        phase: SearchPhase,
    ) -> Result<Option<ResolvedDownload>, SearchError> {
        debug!(
            series = %request.series,
            episode = %request.episode,
            phase = phase.as_str(),
            "Searching"
        );

        let candidates = tokio::time::timeout(self.config.search_timeout(), self.source.search(request))
            .await
            .map_err(|_| SearchError::Timeout)??;

        Ok(self.selector.select(request, candidates, quality))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode::EpisodeCode;
    use crate::selector::{QualityInference, SizeBandRule};
    use crate::testing::{fixtures, MemoryMissLog, MemoryWatchlistStore, MockCandidateSource};
    use crate::watchlist::{WatchlistEntry, WatchlistError};
    use std::time::Duration;

    struct Harness {
        store: Arc<MemoryWatchlistStore>,
        source: Arc<MockCandidateSource>,
        miss_log: Arc<MemoryMissLog>,
    }

    impl Harness {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            let store = MemoryWatchlistStore::new();
            for (name, quality, latest) in entries {
                store.insert(
                    name,
                    WatchlistEntry {
                        download_enabled: true,
                        desired_quality: quality.to_string(),
                        latest_downloaded_episode: EpisodeCode::parse(latest).unwrap(),
                    },
                );
            }
            Self {
                store: Arc::new(store),
                source: Arc::new(MockCandidateSource::new()),
                miss_log: Arc::new(MemoryMissLog::new()),
            }
        }

        fn orchestrator(&self, retries: u32) -> RetrievalOrchestrator {
            RetrievalOrchestrator::new(
                OrchestratorConfig {
                    retries,
                    ..Default::default()
                },
                Arc::clone(&self.store) as Arc<dyn WatchlistStore>,
                Arc::clone(&self.source) as Arc<dyn CandidateSource>,
                Arc::clone(&self.miss_log) as Arc<dyn MissLog>,
            )
        }

        fn latest(&self, name: &str) -> String {
            self.store
                .snapshot()
                .unwrap()
                .get(name)
                .unwrap()
                .latest_downloaded_episode
                .to_string()
        }
    }

    #[tokio::test]
    async fn test_resolves_next_episode() {
        let h = Harness::new(&[("Breaking.Bad", "SD", "S01E00")]);
        h.source
            .set_results(vec![fixtures::sd_candidate("Breaking.Bad", "S01E01")])
            .await;

        let report = h.orchestrator(3).run().await.unwrap();

        assert_eq!(report.resolved.len(), 1);
        assert_eq!(report.resolved[0].episode.to_string(), "S01E01");
        assert!(report.not_found.is_empty());
        assert_eq!(h.latest("Breaking.Bad"), "S01E01");
        assert_eq!(h.source.search_count().await, 1);
        assert!(h.miss_log.lines().is_empty());
    }

    #[tokio::test]
    async fn test_season_rollover_in_same_attempt() {
        let h = Harness::new(&[("Lost", "SD", "S01E30")]);
        h.source
            .set_results(vec![fixtures::sd_candidate("Lost", "S02E01")])
            .await;

        let report = h.orchestrator(1).run().await.unwrap();

        assert_eq!(report.resolved.len(), 1);
        assert_eq!(h.latest("Lost"), "S02E01");
        let searched: Vec<String> = h
            .source
            .recorded_searches()
            .await
            .iter()
            .map(|r| r.episode.to_string())
            .collect();
        assert_eq!(searched, vec!["S01E31", "S02E01"]);
    }

    #[tokio::test]
    async fn test_exhausted_leaves_watchlist_untouched() {
        let h = Harness::new(&[("Breaking.Bad", "SD", "S01E00")]);
        h.source
            .set_results(vec![fixtures::hd_candidate("Breaking.Bad", "S01E01", "720p")])
            .await;

        let report = h.orchestrator(3).run().await.unwrap();

        assert!(report.resolved.is_empty());
        assert_eq!(report.not_found.len(), 1);
        assert_eq!(h.latest("Breaking.Bad"), "S01E00");
        assert_eq!(h.store.write_count(), 0);
        // Two searches per attempt
        assert_eq!(h.source.search_count().await, 6);
        assert_eq!(
            h.miss_log.lines(),
            vec!["Breaking.Bad - S01E01 (may be quality) not found".to_string()]
        );
    }

    #[tokio::test]
    async fn test_search_errors_consume_attempts() {
        let h = Harness::new(&[("Dark", "SD", "S01E03")]);
        h.source.set_results(vec![fixtures::sd_candidate("Dark", "S01E04")]).await;
        h.source
            .queue_error(SearchError::ConnectionFailed("refused".into()))
            .await;
        h.source.queue_error(SearchError::Parse("no table".into())).await;

        let report = h.orchestrator(3).run().await.unwrap();

        assert_eq!(report.resolved.len(), 1);
        assert_eq!(h.latest("Dark"), "S01E04");
        // Failed attempts stop before the rollover search
        assert_eq!(h.source.search_count().await, 3);
    }

    #[tokio::test]
    async fn test_errors_on_every_attempt_exhaust() {
        let h = Harness::new(&[("Dark", "SD", "S01E03")]);
        h.source.set_results(vec![fixtures::sd_candidate("Dark", "S01E04")]).await;
        for _ in 0..2 {
            h.source.queue_error(SearchError::Timeout).await;
        }

        let report = h.orchestrator(2).run().await.unwrap();

        assert!(report.resolved.is_empty());
        assert_eq!(report.not_found, vec![("Dark".to_string(), EpisodeCode::parse("S01E04").unwrap())]);
        assert_eq!(h.miss_log.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_searches_nothing() {
        let h = Harness::new(&[("Dark", "SD", "S01E03")]);
        h.source.set_results(vec![fixtures::sd_candidate("Dark", "S01E04")]).await;

        let report = h.orchestrator(0).run().await.unwrap();

        assert!(report.resolved.is_empty());
        assert_eq!(h.source.search_count().await, 0);
        assert_eq!(h.miss_log.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_slow_search_times_out() {
        let h = Harness::new(&[("Dark", "SD", "S01E03")]);
        h.source.set_results(vec![fixtures::sd_candidate("Dark", "S01E04")]).await;
        h.source.set_delay(Duration::from_millis(200)).await;

        let orchestrator = RetrievalOrchestrator::new(
            OrchestratorConfig {
                retries: 1,
                search_timeout_ms: 20,
                ..Default::default()
            },
            Arc::clone(&h.store) as Arc<dyn WatchlistStore>,
            Arc::clone(&h.source) as Arc<dyn CandidateSource>,
            Arc::clone(&h.miss_log) as Arc<dyn MissLog>,
        );
        let report = orchestrator.run().await.unwrap();

        assert!(report.resolved.is_empty());
        assert_eq!(h.latest("Dark"), "S01E03");
    }

    #[tokio::test]
    async fn test_disabled_series_skipped() {
        let h = Harness::new(&[("Dark", "SD", "S01E03")]);
        h.store.insert(
            "Lost",
            WatchlistEntry {
                download_enabled: false,
                ..Default::default()
            },
        );
        h.source.set_results(vec![fixtures::sd_candidate("Lost", "S01E01")]).await;

        let report = h.orchestrator(1).run().await.unwrap();

        assert!(report.resolved.is_empty());
        assert_eq!(report.not_found.len(), 1);
        assert_eq!(report.not_found[0].0, "Dark");
    }

    #[tokio::test]
    async fn test_concurrent_series_each_recorded_once() {
        let h = Harness::new(&[
            ("Breaking.Bad", "SD", "S01E00"),
            ("Dark", "720p", "S02E05"),
            ("Lost", "SD", "S03E22"),
        ]);
        h.source
            .set_results(vec![
                fixtures::sd_candidate("Breaking.Bad", "S01E01"),
                fixtures::hd_candidate("Dark", "S02E06", "720p"),
                fixtures::sd_candidate("Lost", "S04E01"),
            ])
            .await;

        let orchestrator = RetrievalOrchestrator::new(
            OrchestratorConfig {
                retries: 2,
                max_concurrent_series: 3,
                ..Default::default()
            },
            Arc::clone(&h.store) as Arc<dyn WatchlistStore>,
            Arc::clone(&h.source) as Arc<dyn CandidateSource>,
            Arc::clone(&h.miss_log) as Arc<dyn MissLog>,
        );
        let report = orchestrator.run().await.unwrap();

        assert_eq!(report.resolved.len(), 3);
        assert_eq!(h.store.write_count(), 3);
        assert_eq!(h.latest("Breaking.Bad"), "S01E01");
        assert_eq!(h.latest("Dark"), "S02E06");
        assert_eq!(h.latest("Lost"), "S04E01");
    }

    #[tokio::test]
    async fn test_custom_quality_rules_decide_selection() {
        let h = Harness::new(&[("Dark", "720p", "S01E03")]);
        // No resolution token in the link, only a large size
        let mut release = fixtures::sd_candidate("Dark", "S01E04");
        release.size_mb = 1200.0;
        h.source.set_results(vec![release]).await;

        let report = h.orchestrator(1).run().await.unwrap();
        assert!(report.resolved.is_empty());

        let selector = CandidateSelector::with_inference(
            QualityInference::empty().with_rule(SizeBandRule::new(1000.0..=1500.0, "720p")),
        );
        let report = h.orchestrator(1).with_selector(selector).run().await.unwrap();

        assert_eq!(report.resolved.len(), 1);
        assert_eq!(h.latest("Dark"), "S01E04");
    }

    #[tokio::test]
    async fn test_watchlist_failure_aborts_run() {
        let h = Harness::new(&[("Dark", "SD", "S01E03")]);
        h.source.set_results(vec![fixtures::sd_candidate("Dark", "S01E04")]).await;
        h.store.fail_writes(true);

        let result = h.orchestrator(1).run().await;

        assert!(matches!(
            result,
            Err(OrchestratorError::Watchlist(WatchlistError::Io { .. }))
        ));
    }
}
