//! Results-page search backend.
//!
//! Understands the classic torrent index layout: the second `<table>` of the
//! page lists releases, one per row, after a header row.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{CandidateSource, RawCandidate, SearchError, SearchRequest};

/// Browser-like User-Agent; some indexes reject unknown clients.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 6.0; WOW64; rv:24.0) Gecko/20100101 Firefox/24.0";

/// Search backend scraping an HTML results page.
pub struct HtmlSearcher {
    client: Client,
    base_url: String,
    result_limit: usize,
}

impl HtmlSearcher {
    /// Create a new searcher. `base_url` is the search prefix, e.g.
    /// `http://kat.cr/usearch/`.
    pub fn new(base_url: impl Into<String>, timeout_secs: u32, result_limit: usize) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            result_limit,
        }
    }

    /// Build the results page URL for a search.
    fn build_search_url(&self, request: &SearchRequest) -> String {
        format!(
            "{}{}/",
            self.base_url,
            urlencoding::encode(&request.query())
        )
    }
}

#[async_trait]
impl CandidateSource for HtmlSearcher {
    fn name(&self) -> &str {
        "html"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawCandidate>, SearchError> {
        let url = self.build_search_url(request);
        debug!(series = %request.series, episode = %request.episode, %url, "Searching");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let candidates = parse_results_page(&body, request, self.result_limit)?;

        debug!(
            series = %request.series,
            episode = %request.episode,
            results = candidates.len(),
            "Search complete"
        );

        Ok(candidates)
    }
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse(e.to_string()))
}

struct RowSelectors {
    cell: Selector,
    magnet: Selector,
    torrent_file: Selector,
    page: Selector,
}

/// Parse up to `limit` release rows out of a results page.
///
/// Rows lacking any of the expected links or numbers are skipped; a page
/// without a results table is an error.
pub fn parse_results_page(
    html: &str,
    request: &SearchRequest,
    limit: usize,
) -> Result<Vec<RawCandidate>, SearchError> {
    let document = Html::parse_document(html);
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;
    let selectors = RowSelectors {
        cell: selector("td")?,
        magnet: selector(r#"a[title="Torrent magnet link"]"#)?,
        torrent_file: selector(r#"a[title="Download torrent file"]"#)?,
        page: selector("a.cellMainLink")?,
    };

    let table = document
        .select(&table_selector)
        .nth(1)
        .ok_or_else(|| SearchError::Parse("results table not found".to_string()))?;

    let episode_token = request.episode.to_string();
    let mut candidates = Vec::new();
    for (idx, row) in table.select(&row_selector).skip(1).take(limit).enumerate() {
        match parse_row(row, &selectors) {
            Some(parsed) => candidates.push(RawCandidate {
                matched_name: request.series.clone(),
                matched_episode: episode_token.clone(),
                magnet_link: parsed.magnet_link,
                torrent_file_link: parsed.torrent_file_link,
                page_link: parsed.page_link,
                size_mb: parsed.size_mb,
                seeds: parsed.seeds,
                inferred_quality: None,
            }),
            None => debug!(row = idx + 1, "Skipping malformed result row"),
        }
    }

    Ok(candidates)
}

struct ParsedRow {
    magnet_link: String,
    torrent_file_link: String,
    page_link: String,
    size_mb: f64,
    seeds: u32,
}

fn parse_row(row: ElementRef<'_>, selectors: &RowSelectors) -> Option<ParsedRow> {
    let cells: Vec<ElementRef<'_>> = row.select(&selectors.cell).collect();
    if cells.len() < 5 {
        return None;
    }

    let first = cells[0];
    let href = |sel: &Selector| {
        first
            .select(sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string)
    };

    Some(ParsedRow {
        magnet_link: href(&selectors.magnet)?,
        torrent_file_link: href(&selectors.torrent_file)?,
        page_link: href(&selectors.page)?,
        size_mb: leading_text(cells[cells.len() - 5])?.parse().ok()?,
        seeds: leading_text(cells[cells.len() - 2])?.parse().ok()?,
    })
}

/// First non-blank text node of a cell ("350.2" out of `350.2 <span>MB</span>`).
fn leading_text(cell: ElementRef<'_>) -> Option<&str> {
    cell.text().map(str::trim).find(|t| !t.is_empty())
}
