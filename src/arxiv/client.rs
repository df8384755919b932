//! Acquisition Engine: fetches papers from the upstream article API with
//! page-size auto-degradation and date-window batching.

use std::collections::HashSet;
use std::pin::Pin;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::models::{BatchConfig, Paper, RetryConfig};
use crate::query::{build_query, DateWindow};
use crate::retry::{ArxivErrorClassifier, RetryExecutor};

use super::atom::parse_feed;
use super::ArxivError;

const PAGE_SIZE_LADDER: [usize; 5] = [500, 250, 100, 50, 10];
const EMPTY_PAGE_ABORT_STREAK: u32 = 3;
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(3);

const ENDPOINT: &str = "http://export.arxiv.org/api/query";

pub struct AcquisitionClient {
    http: reqwest::Client,
    executor: RetryExecutor<ArxivError>,
}

impl Default for AcquisitionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AcquisitionClient {
    pub fn new() -> Self {
        Self::with_retry_config(RetryConfig::default())
    }

    pub fn with_retry_config(retry_config: RetryConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("paper-radar/0.1")
            .build()
            .expect("static client configuration is valid");
        let executor = RetryExecutor::new(retry_config, Box::new(ArxivErrorClassifier));
        Self { http, executor }
    }

    /// Papers submitted in the last `days` days, newest-first.
    pub async fn get_recent(
        &self,
        days: i64,
        max_results: usize,
        categories: &[String],
    ) -> Vec<Paper> {
        let to = Utc::now().date_naive();
        let from = to - ChronoDuration::days(days);
        self.get_range(from, to, max_results, categories, &BatchConfig::default()).await
    }

    /// Papers submitted within `[from, to]`, newest-first, deduped by
    /// `paper_id` across any date sub-windows the batcher splits the
    /// range into.
    pub async fn get_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        max_results: usize,
        categories: &[String],
        batch_cfg: &BatchConfig,
    ) -> Vec<Paper> {
        let windows = split_windows(from, to, batch_cfg);
        let mut seen = HashSet::new();
        let mut papers = Vec::new();

        for (i, window) in windows.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(Duration::from_secs_f64(batch_cfg.min_batch_interval_secs)).await;
            }

            let query = build_query(
                None,
                categories,
                Some(DateWindow { from: Some(window.0), to: Some(window.1) }),
            );

            match self.fetch_with_degradation(&query, max_results).await {
                Ok(fetched) => {
                    for paper in fetched {
                        if seen.insert(paper.paper_id.clone()) {
                            papers.push(paper);
                        }
                    }
                }
                Err(e) => {
                    warn!(window = ?window, error = %e, "sub-window fetch failed, skipping");
                }
            }
        }

        papers
    }

    /// Try the descending page-size ladder until one size yields at
    /// least one record.
    async fn fetch_with_degradation(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Paper>, ArxivError> {
        let mut last_err = None;

        for &page_size in PAGE_SIZE_LADDER.iter() {
            match self.fetch_all_pages(query, max_results, page_size).await {
                Ok(papers) if !papers.is_empty() => return Ok(papers),
                Ok(_) => {
                    debug!(page_size, "page size produced zero records, degrading");
                    continue;
                }
                Err(e) => {
                    last_err = Some(e);
                    continue;
                }
            }
        }

        match last_err {
            Some(e) => Err(e),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_all_pages(
        &self,
        query: &str,
        max_results: usize,
        page_size: usize,
    ) -> Result<Vec<Paper>, ArxivError> {
        let mut start = 0usize;
        let mut papers = Vec::new();
        let mut empty_streak = 0u32;

        while papers.len() < max_results {
            let batch_size = page_size.min(max_results - papers.len());
            let page = self.fetch_page(query, start, batch_size).await?;

            if page.is_empty() {
                empty_streak += 1;
                if papers.is_empty() && empty_streak >= EMPTY_PAGE_ABORT_STREAK {
                    break;
                }
                if !papers.is_empty() {
                    break;
                }
            } else {
                empty_streak = 0;
                let page_len = page.len();
                for entry in page {
                    match entry.into_paper() {
                        Ok(paper) => papers.push(paper),
                        Err(e) => warn!(error = %e, "dropping malformed record"),
                    }
                }
                if page_len < batch_size {
                    break;
                }
            }

            start += batch_size;
        }

        Ok(papers)
    }

    async fn fetch_page(
        &self,
        query: &str,
        start: usize,
        page_size: usize,
    ) -> Result<Vec<super::atom::AtomEntry>, ArxivError> {
        let url = format!(
            "{}?search_query={}&start={}&max_results={}&sortBy=submittedDate&sortOrder=descending",
            ENDPOINT,
            urlencoding::encode(query),
            start,
            page_size,
        );

        let http = self.http.clone();
        let body = self
            .executor
            .execute(
                move || {
                    let http = http.clone();
                    let url = url.clone();
                    Box::pin(async move {
                        tokio::time::sleep(MIN_REQUEST_INTERVAL).await;
                        let resp = http.get(&url).send().await?.error_for_status()?;
                        resp.text().await.map_err(ArxivError::RequestError)
                    }) as Pin<Box<dyn std::future::Future<Output = Result<String, ArxivError>> + Send>>
                },
                "fetch_page",
            )
            .await?;

        parse_feed(&body)
    }
}

/// Split `[from, to]` into consecutive sub-windows no longer than
/// `max_days_per_batch`, with `batch_overlap_days` overlap between
/// adjacent windows.
fn split_windows(from: NaiveDate, to: NaiveDate, cfg: &BatchConfig) -> Vec<(NaiveDate, NaiveDate)> {
    if from > to {
        return Vec::new();
    }

    let span_days = (to - from).num_days();
    if span_days <= cfg.max_days_per_batch {
        return vec![(from, to)];
    }

    let mut windows = Vec::new();
    let mut window_start = from;
    loop {
        let window_end = (window_start + ChronoDuration::days(cfg.max_days_per_batch - 1)).min(to);
        windows.push((window_start, window_end));
        if window_end >= to {
            break;
        }
        window_start = window_end + ChronoDuration::days(1) - ChronoDuration::days(cfg.batch_overlap_days);
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_window_when_within_budget() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let windows = split_windows(from, to, &BatchConfig::default());
        assert_eq!(windows, vec![(from, to)]);
    }

    #[test]
    fn splits_into_four_sub_windows() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 22).unwrap();
        let windows = split_windows(from, to, &BatchConfig::default());
        assert_eq!(
            windows,
            vec![
                (from, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()),
                (NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(), NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()),
                (NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), NaiveDate::from_ymd_opt(2024, 1, 21).unwrap()),
                (NaiveDate::from_ymd_opt(2024, 1, 22).unwrap(), to),
            ]
        );
    }

    #[test]
    fn overlap_extends_sub_window_start_backwards() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let cfg = BatchConfig { batch_overlap_days: 1, ..BatchConfig::default() };
        let windows = split_windows(from, to, &cfg);
        assert!(windows[1].0 < windows[0].1);
    }
}
