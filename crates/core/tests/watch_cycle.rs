//! Watch cycle integration tests.
//!
//! These tests run complete passes over a JSON watchlist on disk:
//! watchlist -> search -> selection -> watchlist update -> action

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use tvwatch_core::{
    dispatcher::show_magnets,
    searcher::parse_results_page,
    testing::{fixtures, MockCandidateSource, MockTorrentClient, MockTorrentFetcher},
    Action, ActionDispatcher, CandidateSource, DispatchOutcome, FileMissLog, JsonWatchlistStore,
    MissLog, OrchestratorConfig, RetrievalOrchestrator, SearchError, TorrentClient,
    WatchlistStore,
};

/// Test helper owning the on-disk state of one watch cycle.
struct TestHarness {
    watchlist_path: PathBuf,
    miss_log_path: PathBuf,
    store: Arc<JsonWatchlistStore>,
    source: Arc<MockCandidateSource>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new(watchlist_json: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let watchlist_path = temp_dir.path().join("watchlist.json");
        let miss_log_path = temp_dir.path().join("log.txt");
        fs::write(&watchlist_path, watchlist_json).expect("Failed to write watchlist");

        let no_seeds: &[&str] = &[];
        let store = Arc::new(
            JsonWatchlistStore::open(&watchlist_path, no_seeds).expect("Failed to open watchlist"),
        );

        Self {
            watchlist_path,
            miss_log_path,
            store,
            source: Arc::new(MockCandidateSource::new()),
            _temp_dir: temp_dir,
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
            Arc::new(FileMissLog::new(&self.miss_log_path)) as Arc<dyn MissLog>,
        )
    }

    fn persisted_latest(&self, name: &str) -> String {
        read_json(&self.watchlist_path)[name]["latest-downloaded-episode"]
            .as_str()
            .expect("episode is a string")
            .to_string()
    }

    fn miss_log(&self) -> String {
        fs::read_to_string(&self.miss_log_path).unwrap_or_default()
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn entry_json(name: &str, quality: &str, latest: &str) -> String {
    format!(
        r#"{{"{name}": {{"download": true, "quality": "{quality}", "latest-downloaded-episode": "{latest}"}}}}"#
    )
}

#[tokio::test]
async fn test_next_episode_resolved_and_persisted() {
    let harness = TestHarness::new(&entry_json("Breaking.Bad", "SD", "S01E00"));
    harness
        .source
        .set_results(vec![fixtures::sd_candidate("Breaking.Bad", "S01E01")])
        .await;

    let report = assert_ok!(harness.orchestrator(3).run().await);

    assert_eq!(report.resolved.len(), 1);
    assert_eq!(harness.persisted_latest("Breaking.Bad"), "S01E01");
    assert!(harness.miss_log().is_empty());
}

#[tokio::test]
async fn test_wrong_quality_leaves_watchlist_unchanged() {
    let harness = TestHarness::new(&entry_json("Breaking.Bad", "SD", "S01E00"));
    let before = fs::read_to_string(&harness.watchlist_path).unwrap();
    harness
        .source
        .set_results(vec![fixtures::hd_candidate("Breaking.Bad", "S01E01", "720p")])
        .await;

    let report = assert_ok!(harness.orchestrator(3).run().await);

    assert!(report.resolved.is_empty());
    assert_eq!(fs::read_to_string(&harness.watchlist_path).unwrap(), before);

    let log = harness.miss_log();
    assert_eq!(log.lines().count(), 1);
    assert_eq!(log.matches("not found").count(), 1);
    assert!(log.starts_with("Breaking.Bad - S01E01 (may be quality) not found - "));
}

#[tokio::test]
async fn test_season_rollover() {
    let harness = TestHarness::new(&entry_json("Lost", "SD", "S01E30"));
    harness
        .source
        .set_results(vec![fixtures::sd_candidate("Lost", "S02E01")])
        .await;

    let report = assert_ok!(harness.orchestrator(3).run().await);

    assert_eq!(report.resolved.len(), 1);
    assert_eq!(report.resolved[0].series_key(), "Lost.S02E01");
    assert_eq!(harness.persisted_latest("Lost"), "S02E01");
}

#[tokio::test]
async fn test_second_run_continues_from_new_cursor() {
    let harness = TestHarness::new(&entry_json("Dark", "SD", "S01E01"));
    harness
        .source
        .set_results(vec![
            fixtures::sd_candidate("Dark", "S01E02"),
            fixtures::sd_candidate("Dark", "S01E03"),
        ])
        .await;

    assert_ok!(harness.orchestrator(1).run().await);
    assert_eq!(harness.persisted_latest("Dark"), "S01E02");

    assert_ok!(harness.orchestrator(1).run().await);
    assert_eq!(harness.persisted_latest("Dark"), "S01E03");

    let report = assert_ok!(harness.orchestrator(1).run().await);
    assert!(report.resolved.is_empty());
    assert_eq!(harness.persisted_latest("Dark"), "S01E03");
    assert!(harness.miss_log().contains("Dark - S01E04"));
}

#[tokio::test]
async fn test_transient_failures_then_success() {
    let harness = TestHarness::new(&entry_json("Dark", "SD", "S01E01"));
    harness
        .source
        .set_results(vec![fixtures::sd_candidate("Dark", "S01E02")])
        .await;
    harness
        .source
        .queue_error(SearchError::HttpStatus { status: 503 })
        .await;
    harness.source.queue_error(SearchError::Timeout).await;

    let report = assert_ok!(harness.orchestrator(3).run().await);

    assert_eq!(report.resolved.len(), 1);
    assert_eq!(harness.source.search_count().await, 3);
}

#[tokio::test]
async fn test_results_page_through_selection() {
    let harness = TestHarness::new(&entry_json("Breaking.Bad", "720p", "S01E00"));
    let page = r#"<html><body>
        <table><tr><td>nav</td></tr></table>
        <table>
          <tr><th>name</th><th>size</th><th>files</th><th>age</th><th>seed</th><th>leech</th></tr>
          <tr>
            <td>
              <a title="Torrent magnet link" href="magnet:?xt=urn:btih:AAA&amp;dn=breaking+bad+s01e01+hdtv">m</a>
              <a title="Download torrent file" href="//torcache.net/torrent/AAA.torrent">t</a>
              <a class="cellMainLink" href="/a.html">Breaking Bad S01E01 HDTV</a>
            </td>
            <td>350 <span>MB</span></td><td>1</td><td>1 day</td><td>900</td><td>12</td>
          </tr>
          <tr>
            <td>
              <a title="Torrent magnet link" href="magnet:?xt=urn:btih:BBB&amp;dn=breaking+bad+s01e01+720p+hdtv">m</a>
              <a title="Download torrent file" href="//torcache.net/torrent/BBB.torrent">t</a>
              <a class="cellMainLink" href="/b.html">Breaking Bad S01E01 720p HDTV</a>
            </td>
            <td>1100 <span>MB</span></td><td>1</td><td>1 day</td><td>400</td><td>8</td>
          </tr>
        </table>
    </body></html>"#
        .to_string();
    harness
        .source
        .set_handler(move |request| parse_results_page(&page, request, 5).unwrap_or_default())
        .await;

    let report = assert_ok!(harness.orchestrator(1).run().await);

    assert_eq!(report.resolved.len(), 1);
    let download = &report.resolved[0];
    assert!(download.magnet_link.contains("BBB"));
    assert_eq!(download.torrent_url, "http://torcache.net/torrent/BBB.torrent");
}

#[tokio::test]
async fn test_run_then_save_torrent_files() {
    let harness = TestHarness::new(
        r#"{
            "Breaking.Bad": {"download": true, "quality": "SD", "latest-downloaded-episode": "S01E00"},
            "Lost": {"download": true, "quality": "SD", "latest-downloaded-episode": "S01E30"},
            "The.Wire": {"download": false, "quality": "SD", "latest-downloaded-episode": "S01E01"}
        }"#,
    );
    harness
        .source
        .set_results(vec![
            fixtures::sd_candidate("Breaking.Bad", "S01E01"),
            fixtures::sd_candidate("Lost", "S02E01"),
            fixtures::sd_candidate("The.Wire", "S01E02"),
        ])
        .await;
    let report = assert_ok!(harness.orchestrator(1).run().await);
    assert_eq!(report.resolved.len(), 2);

    let fetcher = Arc::new(MockTorrentFetcher::new());
    for download in &report.resolved {
        fetcher
            .set_content(&download.torrent_url, download.series_key().into_bytes())
            .await;
    }
    let target = TempDir::new().unwrap();
    let dispatcher = ActionDispatcher::new(
        Action::DownloadTorrentFiles,
        Arc::new(MockTorrentClient::new()) as Arc<dyn TorrentClient>,
        Arc::clone(&fetcher) as _,
        Some(target.path().join("torrents")),
    );

    let outcome = assert_ok!(dispatcher.dispatch(&report.resolved).await);

    let DispatchOutcome::Saved(paths) = outcome else {
        panic!("expected saved files");
    };
    assert_eq!(paths.len(), 2);
    let saved = fs::read(target.path().join("torrents/Lost.S02E01.torrent")).unwrap();
    assert_eq!(saved, b"Lost.S02E01");
    assert_eq!(harness.persisted_latest("The.Wire"), "S01E01");
}

#[tokio::test]
async fn test_push_magnets_to_remote_client() {
    let client = Arc::new(MockTorrentClient::new());
    let downloads = vec![
        fixtures::resolved_download("Breaking.Bad", "S01E01"),
        fixtures::resolved_download("Lost", "S02E01"),
    ];
    let dispatcher = ActionDispatcher::new(
        Action::DownloadFromMagnets,
        Arc::clone(&client) as Arc<dyn TorrentClient>,
        Arc::new(MockTorrentFetcher::new()) as _,
        None,
    );

    let outcome = assert_ok!(dispatcher.dispatch(&downloads).await);

    assert_eq!(outcome, DispatchOutcome::Pushed(2));
    assert_eq!(client.added().await.len(), 2);
}

#[tokio::test]
async fn test_remote_rejection_fails_dispatch() {
    let client = Arc::new(MockTorrentClient::new());
    client
        .set_next_error(tvwatch_core::TorrentClientError::AuthenticationFailed(
            "digest rejected".into(),
        ))
        .await;
    let dispatcher = ActionDispatcher::new(
        Action::DownloadFromMagnets,
        Arc::clone(&client) as Arc<dyn TorrentClient>,
        Arc::new(MockTorrentFetcher::new()) as _,
        None,
    );

    assert_err!(
        dispatcher
            .dispatch(&[fixtures::resolved_download("Lost", "S02E01")])
            .await
    );
    assert!(client.added().await.is_empty());
}

#[test]
fn test_show_magnets_two_downloads() {
    let text = show_magnets(&[
        fixtures::resolved_download("Breaking.Bad", "S01E01"),
        fixtures::resolved_download("Lost", "S02E01"),
    ]);

    let tokens: Vec<&str> = text.split('\n').collect();
    assert_eq!(tokens.len(), 2);
    assert!(tokens.iter().all(|t| t.starts_with("magnet:")));
    assert_eq!(text.matches("magnet:").count(), 2);
}
