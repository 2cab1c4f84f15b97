//! URL inspection orchestration
//!
//! Single-URL inspection summaries plus the bounded-concurrency batch
//! orchestrator. A batch preserves input order in its output, and one URL's
//! failure never aborts the rest; partial failure is reported as data.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::gsc::INSPECTION_FANOUT;
use crate::error::Result;
use crate::gsc::client::GscClient;
use crate::gsc::types::InspectUrlResponse;

/// Analysis-ready summary of one URL's inspection
#[derive(Debug, Clone, Serialize)]
pub struct UrlInspectionSummary {
    pub page_url: String,

    /// PASS, FAIL, NEUTRAL, or UNKNOWN
    pub verdict: String,

    pub coverage_state: Option<String>,

    /// Null when the URL has never been crawled
    pub last_crawl_time: Option<String>,

    pub indexing_allowed: bool,

    pub robots_txt_state: Option<String>,
    pub page_fetch_state: Option<String>,

    /// Canonical declared by the site
    pub user_canonical: Option<String>,

    /// Canonical selected by Google
    pub google_canonical: Option<String>,

    pub referring_sitemaps: Vec<String>,

    /// Detected rich result types
    pub rich_result_types: Vec<String>,

    /// Raw issue messages, passed through from upstream
    pub issues: Vec<String>,

    /// Link to the result in the Search Console UI
    pub inspection_link: Option<String>,
}

impl UrlInspectionSummary {
    /// Reshape the wire response. Missing upstream fields stay null; nothing
    /// is fabricated.
    pub fn from_response(page_url: &str, response: InspectUrlResponse) -> Self {
        let result = response.inspection_result.unwrap_or_default();
        let status = result.index_status_result.unwrap_or_default();
        let rich = result.rich_results_result.unwrap_or_default();

        let rich_result_types = rich
            .detected_items
            .iter()
            .filter_map(|item| item.rich_result_type.clone())
            .collect();

        let issues = rich
            .detected_items
            .iter()
            .flat_map(|item| item.items.iter())
            .flat_map(|item| item.issues.iter())
            .filter_map(|issue| {
                issue.issue_message.as_ref().map(|message| {
                    match issue.severity.as_deref() {
                        Some(severity) => format!("[{}] {}", severity, message),
                        None => message.clone(),
                    }
                })
            })
            .collect();

        Self {
            page_url: page_url.to_string(),
            verdict: status.verdict.unwrap_or_else(|| "UNKNOWN".to_string()),
            coverage_state: status.coverage_state,
            last_crawl_time: status.last_crawl_time,
            indexing_allowed: status.indexing_state.as_deref() == Some("INDEXING_ALLOWED"),
            robots_txt_state: status.robots_txt_state,
            page_fetch_state: status.page_fetch_state,
            user_canonical: status.user_canonical,
            google_canonical: status.google_canonical,
            referring_sitemaps: status.sitemap,
            rich_result_types,
            issues,
            inspection_link: result.inspection_result_link,
        }
    }

    /// True when Google declared a different canonical than the site did
    pub fn canonical_mismatch(&self) -> bool {
        match (&self.user_canonical, &self.google_canonical) {
            (Some(user), Some(google)) => user != google,
            _ => false,
        }
    }
}

/// Outcome for one URL within a batch
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchItemOutcome {
    Inspected(UrlInspectionSummary),
    Failed { page_url: String, reason: String },
}

impl BatchItemOutcome {
    pub fn page_url(&self) -> &str {
        match self {
            Self::Inspected(summary) => &summary.page_url,
            Self::Failed { page_url, .. } => page_url,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Report for a whole inspection batch, entries in input order
#[derive(Debug, Clone, Serialize)]
pub struct BatchInspectionReport {
    pub site_url: String,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<BatchItemOutcome>,
}

impl BatchInspectionReport {
    fn from_items(site_url: &str, items: Vec<BatchItemOutcome>) -> Self {
        let attempted = items.len();
        let failed = items.iter().filter(|item| item.is_failure()).count();
        Self {
            site_url: site_url.to_string(),
            attempted,
            succeeded: attempted - failed,
            failed,
            items,
        }
    }
}

/// Fans out per-URL inspection calls with bounded concurrency
pub struct InspectionOrchestrator {
    client: Arc<GscClient>,
}

impl InspectionOrchestrator {
    pub fn new(client: Arc<GscClient>) -> Self {
        Self { client }
    }

    /// Inspect a single URL
    pub async fn inspect_one(&self, site_url: &str, page_url: &str) -> Result<UrlInspectionSummary> {
        let response = self.client.inspect_url(site_url, page_url).await?;
        Ok(UrlInspectionSummary::from_response(page_url, response))
    }

    /// Inspect up to the batch cap of URLs concurrently.
    ///
    /// The caller has already validated and capped the list. Results are
    /// slotted back by input index, so output order matches input order
    /// regardless of completion order.
    pub async fn inspect_batch(
        &self,
        site_url: &str,
        urls: Vec<String>,
    ) -> Result<BatchInspectionReport> {
        let client = self.client.clone();
        let site = site_url.to_string();

        let items = fan_out(urls, INSPECTION_FANOUT, move |page_url| {
            let client = client.clone();
            let site = site.clone();
            async move {
                let response = client.inspect_url(&site, &page_url).await?;
                Ok(UrlInspectionSummary::from_response(&page_url, response))
            }
        })
        .await;

        Ok(BatchInspectionReport::from_items(site_url, items))
    }
}

/// Run one inspection per URL with at most `limit` in flight. Outcomes are
/// slotted back by input index, so output order matches input order even
/// when tasks complete out of order; a per-URL error becomes a `Failed`
/// entry, never an early return.
async fn fan_out<F, Fut>(urls: Vec<String>, limit: usize, inspect: F) -> Vec<BatchItemOutcome>
where
    F: Fn(String) -> Fut + Clone + Send + 'static,
    Fut: std::future::Future<Output = Result<UrlInspectionSummary>> + Send + 'static,
{
    let attempted = urls.len();
    let semaphore = Arc::new(Semaphore::new(limit));
    let mut tasks: JoinSet<(usize, BatchItemOutcome)> = JoinSet::new();

    for (index, page_url) in urls.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let inspect = inspect.clone();

        tasks.spawn(async move {
            // Closed only if the semaphore is dropped, which it isn't.
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");

            let outcome = match inspect(page_url.clone()).await {
                Ok(summary) => BatchItemOutcome::Inspected(summary),
                Err(e) => BatchItemOutcome::Failed {
                    page_url,
                    reason: e.to_string(),
                },
            };
            (index, outcome)
        });
    }

    let mut slots: Vec<Option<BatchItemOutcome>> = (0..attempted).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            Err(e) => tracing::error!("inspection task panicked: {}", e),
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or(BatchItemOutcome::Failed {
                page_url: format!("(item {})", index),
                reason: "inspection task aborted".to_string(),
            })
        })
        .collect()
}

/// Indexing issues bucketed across a batch of URLs
#[derive(Debug, Clone, Serialize, Default)]
pub struct IndexingIssuesReport {
    pub site_url: String,
    pub total_checked: usize,
    pub indexed: Vec<String>,
    pub not_indexed: Vec<String>,
    pub canonical_issues: Vec<String>,
    pub robots_blocked: Vec<String>,
    pub fetch_issues: Vec<String>,
}

/// Bucket batch outcomes into issue categories
pub fn classify_issues(site_url: &str, items: &[BatchItemOutcome]) -> IndexingIssuesReport {
    let mut report = IndexingIssuesReport {
        site_url: site_url.to_string(),
        total_checked: items.len(),
        ..Default::default()
    };

    for item in items {
        let summary = match item {
            BatchItemOutcome::Inspected(summary) => summary,
            BatchItemOutcome::Failed { page_url, reason } => {
                report
                    .not_indexed
                    .push(format!("{} - Error: {}", page_url, reason));
                continue;
            }
        };

        let coverage = summary.coverage_state.clone().unwrap_or_default();
        let coverage_lower = coverage.to_lowercase();

        if summary.verdict != "PASS"
            || coverage_lower.contains("not indexed")
            || coverage_lower.contains("excluded")
        {
            report
                .not_indexed
                .push(format!("{} - {}", summary.page_url, coverage));
        } else {
            report.indexed.push(summary.page_url.clone());
        }

        if summary.canonical_mismatch() {
            report.canonical_issues.push(format!(
                "{} - Google chose {} instead of declared {}",
                summary.page_url,
                summary.google_canonical.as_deref().unwrap_or("(none)"),
                summary.user_canonical.as_deref().unwrap_or("(none)"),
            ));
        }

        if summary.robots_txt_state.as_deref() == Some("BLOCKED") {
            report.robots_blocked.push(summary.page_url.clone());
        }

        if let Some(fetch) = summary.page_fetch_state.as_deref() {
            if fetch != "SUCCESSFUL" {
                report
                    .fetch_issues
                    .push(format!("{} - {}", summary.page_url, fetch));
            }
        }
    }

    report
}
