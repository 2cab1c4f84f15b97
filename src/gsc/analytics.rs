//! Search analytics engines
//!
//! The pagination engine drives multi-page searchanalytics.query calls with
//! deterministic ordering and row-limit enforcement; the comparison engine
//! joins two periods' results and ranks movers. CTR is always recomputed
//! locally from clicks/impressions, never taken verbatim from upstream.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::gsc::{ANALYTICS_PAGE_SIZE, MAX_ANALYTICS_PAGES};
use crate::error::{GscApiError, GscMcpError, Result};
use crate::gsc::client::GscClient;
use crate::gsc::params::{DateRange, Dimension, FilterOperator, SearchType, SortMetric};
use crate::gsc::types::{
    ApiDataRow, DimensionFilter, DimensionFilterGroup, OrderBy, SearchAnalyticsQueryRequest,
    SearchAnalyticsQueryResponse,
};

/// A filter on one dimension, passed through upstream
#[derive(Debug, Clone)]
pub struct QueryFilter {
    pub dimension: Dimension,
    pub operator: FilterOperator,
    pub expression: String,
}

/// Sort direction for analytics results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Descending,
    Ascending,
}

impl SortDirection {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "descending" => Ok(Self::Descending),
            "ascending" => Ok(Self::Ascending),
            other => Err(crate::error::ValidationError::invalid(
                "sort_direction",
                format!("unknown direction '{}'", other),
            )),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Descending => "descending",
            Self::Ascending => "ascending",
        }
    }
}

/// A validated analytics query, ready for execution
#[derive(Debug, Clone)]
pub struct AnalyticsQuery {
    pub site_url: String,
    pub range: DateRange,
    pub dimensions: Vec<Dimension>,
    pub search_type: SearchType,
    pub filters: Vec<QueryFilter>,
    pub sort_by: SortMetric,
    pub sort_direction: SortDirection,
    /// Total rows the caller wants
    pub limit: u32,
    /// Pagination offset into the upstream result set
    pub offset: u32,
}

impl AnalyticsQuery {
    /// A simple grouped query with default sort (clicks descending)
    pub fn simple(site_url: &str, range: DateRange, dimensions: Vec<Dimension>, limit: u32) -> Self {
        Self {
            site_url: site_url.to_string(),
            range,
            dimensions,
            search_type: SearchType::default(),
            filters: Vec::new(),
            sort_by: SortMetric::default(),
            sort_direction: SortDirection::default(),
            limit,
            offset: 0,
        }
    }

    /// Build the wire request for one page
    fn page_request(&self, start_row: u32, page_size: u32) -> SearchAnalyticsQueryRequest {
        let filter_groups = if self.filters.is_empty() {
            None
        } else {
            Some(vec![DimensionFilterGroup {
                filters: self
                    .filters
                    .iter()
                    .map(|f| DimensionFilter {
                        dimension: f.dimension.as_str().to_string(),
                        operator: f.operator.as_str().to_string(),
                        expression: f.expression.clone(),
                    })
                    .collect(),
            }])
        };

        SearchAnalyticsQueryRequest {
            start_date: self.range.start_str(),
            end_date: self.range.end_str(),
            dimensions: self.dimensions.iter().map(|d| d.as_str().to_string()).collect(),
            search_type: Some(self.search_type.as_str().to_string()),
            dimension_filter_groups: filter_groups,
            order_by: Some(vec![OrderBy {
                metric: self.sort_by.api_metric().to_string(),
                direction: self.sort_direction.as_str().to_string(),
            }]),
            row_limit: page_size,
            start_row: Some(start_row),
        }
    }
}

/// One analysis-ready analytics row
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalyticsRow {
    /// Dimension values, in query dimension order
    pub keys: Vec<String>,
    pub clicks: f64,
    pub impressions: f64,
    /// Recomputed as clicks/impressions; 0 when impressions is 0
    pub ctr: f64,
    /// Average position, 1-indexed, lower is better
    pub position: f64,
}

impl AnalyticsRow {
    pub fn from_api(row: ApiDataRow) -> Self {
        let ctr = if row.impressions > 0.0 {
            row.clicks / row.impressions
        } else {
            0.0
        };
        Self {
            keys: row.keys,
            clicks: row.clicks,
            impressions: row.impressions,
            ctr,
            position: row.position,
        }
    }

    /// A row with all metrics zero, used for one-sided comparison keys
    pub fn zero(keys: Vec<String>) -> Self {
        Self {
            keys,
            clicks: 0.0,
            impressions: 0.0,
            ctr: 0.0,
            position: 0.0,
        }
    }

    pub fn metric(&self, metric: SortMetric) -> f64 {
        match metric {
            SortMetric::Clicks => self.clicks,
            SortMetric::Impressions => self.impressions,
            SortMetric::Ctr => self.ctr,
            SortMetric::Position => self.position,
        }
    }
}

/// Order rows deterministically: requested metric first, lexicographic
/// dimension tuple as the tie-break, so identical queries return identical
/// ordering.
pub fn sort_rows(rows: &mut [AnalyticsRow], metric: SortMetric, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let by_metric = match direction {
            SortDirection::Descending => b.metric(metric).total_cmp(&a.metric(metric)),
            SortDirection::Ascending => a.metric(metric).total_cmp(&b.metric(metric)),
        };
        by_metric.then_with(|| a.keys.cmp(&b.keys))
    });
}

/// Pagination engine and period comparison over the API client
pub struct AnalyticsEngine<'a> {
    client: &'a GscClient,
}

impl<'a> AnalyticsEngine<'a> {
    pub fn new(client: &'a GscClient) -> Self {
        Self { client }
    }

    /// Fetch up to `query.limit` rows, advancing the page offset until the
    /// limit is reached, a short page signals exhaustion, or the page safety
    /// cap trips.
    pub async fn fetch_rows(&self, query: &AnalyticsQuery) -> Result<Vec<AnalyticsRow>> {
        run_paged(query, ANALYTICS_PAGE_SIZE, |request| async move {
            self.client.query_analytics(&query.site_url, &request).await
        })
        .await
    }

    /// Aggregate totals plus a daily trend series for one property
    pub async fn performance_overview(
        &self,
        site_url: &str,
        range: DateRange,
    ) -> Result<PerformanceOverview> {
        // Totals: no dimensions, single row.
        let totals_query = AnalyticsQuery {
            dimensions: Vec::new(),
            ..AnalyticsQuery::simple(site_url, range, Vec::new(), 1)
        };
        let totals = self
            .fetch_rows(&totals_query)
            .await?
            .into_iter()
            .next();

        // Trend: one row per date in the window, ordered chronologically.
        let trend_query = AnalyticsQuery::simple(
            site_url,
            range,
            vec![Dimension::Date],
            range.len_days().max(1) as u32,
        );
        let mut daily = self.fetch_rows(&trend_query).await?;
        daily.sort_by(|a, b| a.keys.cmp(&b.keys));

        Ok(PerformanceOverview {
            site_url: site_url.to_string(),
            start_date: range.start_str(),
            end_date: range.end_str(),
            totals,
            daily,
        })
    }

    /// Run two analytics executions and join them by dimension tuple.
    ///
    /// Keys present in only one period get zeroed metrics for the other, so
    /// a brand-new query shows as pure gain and a vanished one as pure loss.
    pub async fn compare_periods(
        &self,
        site_url: &str,
        period1: DateRange,
        period2: DateRange,
        dimensions: Vec<Dimension>,
        rank_by: SortMetric,
        top_n: usize,
    ) -> Result<PeriodComparison> {
        // Wide limits so keys can be matched across periods.
        let query1 = AnalyticsQuery::simple(site_url, period1, dimensions.clone(), 1000);
        let query2 = AnalyticsQuery::simple(site_url, period2, dimensions, 1000);

        let rows1 = self.fetch_rows(&query1).await?;
        let rows2 = self.fetch_rows(&query2).await?;

        let map1: HashMap<Vec<String>, AnalyticsRow> =
            rows1.into_iter().map(|r| (r.keys.clone(), r)).collect();
        let map2: HashMap<Vec<String>, AnalyticsRow> =
            rows2.into_iter().map(|r| (r.keys.clone(), r)).collect();

        let mut all_keys: Vec<Vec<String>> = map1.keys().chain(map2.keys()).cloned().collect();
        all_keys.sort();
        all_keys.dedup();

        let mut rows: Vec<ComparisonRow> = all_keys
            .into_iter()
            .map(|keys| {
                let p1 = map1
                    .get(&keys)
                    .cloned()
                    .unwrap_or_else(|| AnalyticsRow::zero(keys.clone()));
                let p2 = map2
                    .get(&keys)
                    .cloned()
                    .unwrap_or_else(|| AnalyticsRow::zero(keys.clone()));
                ComparisonRow::between(keys, p1, p2)
            })
            .collect();

        // Most movement first, regardless of direction.
        rows.sort_by(|a, b| {
            b.delta(rank_by)
                .absolute
                .abs()
                .total_cmp(&a.delta(rank_by).absolute.abs())
                .then_with(|| a.keys.cmp(&b.keys))
        });

        let gainers = rank(&rows, rank_by, top_n, RankOrder::Gainers);
        let losers = rank(&rows, rank_by, top_n, RankOrder::Losers);

        Ok(PeriodComparison {
            site_url: site_url.to_string(),
            period1_start: period1.start_str(),
            period1_end: period1.end_str(),
            period2_start: period2.start_str(),
            period2_end: period2.end_str(),
            ranked_by: rank_by.as_str().to_string(),
            rows,
            gainers,
            losers,
        })
    }
}

/// Drive the page loop for one query: advance the start row until the limit
/// is reached or a short page signals exhaustion, and fail once the page
/// safety cap trips. `max_page_size` bounds how many rows one page may ask
/// for; results come back sorted and truncated to the limit.
async fn run_paged<F, Fut>(
    query: &AnalyticsQuery,
    max_page_size: u32,
    mut fetch_page: F,
) -> Result<Vec<AnalyticsRow>>
where
    F: FnMut(SearchAnalyticsQueryRequest) -> Fut,
    Fut: std::future::Future<Output = Result<SearchAnalyticsQueryResponse>>,
{
    let mut rows: Vec<AnalyticsRow> = Vec::new();
    let mut pages = 0u32;

    while (rows.len() as u32) < query.limit {
        if pages >= MAX_ANALYTICS_PAGES {
            return Err(GscMcpError::Gsc(GscApiError::PaginationLimitExceeded {
                max_pages: MAX_ANALYTICS_PAGES,
            }));
        }

        let remaining = query.limit - rows.len() as u32;
        let page_size = remaining.min(max_page_size);
        let start_row = query.offset + rows.len() as u32;

        let response = fetch_page(query.page_request(start_row, page_size)).await?;

        pages += 1;
        let fetched = response.rows.len() as u32;
        rows.extend(response.rows.into_iter().map(AnalyticsRow::from_api));

        tracing::debug!(
            site = %query.site_url,
            page = pages,
            fetched,
            total = rows.len(),
            "analytics page fetched"
        );

        // A short page means the upstream result set is exhausted.
        if fetched < page_size {
            break;
        }
    }

    sort_rows(&mut rows, query.sort_by, query.sort_direction);
    rows.truncate(query.limit as usize);
    Ok(rows)
}

/// Aggregate summary plus daily trend for one property
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceOverview {
    pub site_url: String,
    pub start_date: String,
    pub end_date: String,
    /// Absent when the property has no data in the window
    pub totals: Option<AnalyticsRow>,
    pub daily: Vec<AnalyticsRow>,
}

/// Absolute and percentage change of one metric between periods
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MetricDelta {
    pub absolute: f64,
    /// Null when the baseline is zero: a percentage would be unbounded or
    /// meaningless, and the absolute delta already carries the change.
    pub percent: Option<f64>,
}

impl MetricDelta {
    fn between(baseline: f64, comparison: f64) -> Self {
        let absolute = comparison - baseline;
        let percent = if baseline != 0.0 {
            Some(absolute / baseline * 100.0)
        } else {
            None
        };
        Self { absolute, percent }
    }
}

/// One joined comparison row
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub keys: Vec<String>,
    pub period1: AnalyticsRow,
    pub period2: AnalyticsRow,
    pub clicks_delta: MetricDelta,
    pub impressions_delta: MetricDelta,
    pub ctr_delta: MetricDelta,
    /// period1 - period2: positive means the page moved up in rankings
    pub position_delta: f64,
}

impl ComparisonRow {
    fn between(keys: Vec<String>, period1: AnalyticsRow, period2: AnalyticsRow) -> Self {
        Self {
            clicks_delta: MetricDelta::between(period1.clicks, period2.clicks),
            impressions_delta: MetricDelta::between(period1.impressions, period2.impressions),
            ctr_delta: MetricDelta::between(period1.ctr, period2.ctr),
            position_delta: period1.position - period2.position,
            keys,
            period1,
            period2,
        }
    }

    fn delta(&self, metric: SortMetric) -> MetricDelta {
        match metric {
            SortMetric::Clicks => self.clicks_delta,
            SortMetric::Impressions => self.impressions_delta,
            SortMetric::Ctr => self.ctr_delta,
            SortMetric::Position => MetricDelta {
                absolute: self.position_delta,
                percent: None,
            },
        }
    }
}

enum RankOrder {
    Gainers,
    Losers,
}

fn rank(rows: &[ComparisonRow], metric: SortMetric, top_n: usize, order: RankOrder) -> Vec<ComparisonRow> {
    let mut ranked: Vec<ComparisonRow> = rows.to_vec();
    ranked.sort_by(|a, b| {
        let by_delta = match order {
            RankOrder::Gainers => b.delta(metric).absolute.total_cmp(&a.delta(metric).absolute),
            RankOrder::Losers => a.delta(metric).absolute.total_cmp(&b.delta(metric).absolute),
        };
        by_delta.then_with(|| a.keys.cmp(&b.keys))
    });
    ranked.truncate(top_n);
    ranked
}

/// The whole comparison result: joined rows plus ranked movers
#[derive(Debug, Clone, Serialize)]
pub struct PeriodComparison {
    pub site_url: String,
    pub period1_start: String,
    pub period1_end: String,
    pub period2_start: String,
    pub period2_end: String,
    pub ranked_by: String,
    pub rows: Vec<ComparisonRow>,
    pub gainers: Vec<ComparisonRow>,
    pub losers: Vec<ComparisonRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(keys: &[&str], clicks: f64, impressions: f64, position: f64) -> AnalyticsRow {
        AnalyticsRow::from_api(ApiDataRow {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            clicks,
            impressions,
            ctr: 999.0, // should never survive; recomputed locally
            position,
        })
    }

    #[test]
    fn test_ctr_recomputed_from_counts() {
        let r = row(&["q"], 5.0, 100.0, 3.2);
        assert_eq!(r.ctr, 0.05);

        let empty = row(&["q"], 0.0, 0.0, 0.0);
        assert_eq!(empty.ctr, 0.0);
    }

    #[test]
    fn test_sort_rows_deterministic_tie_break() {
        let mut rows = vec![
            row(&["b"], 10.0, 100.0, 1.0),
            row(&["a"], 10.0, 100.0, 1.0),
            row(&["c"], 20.0, 100.0, 1.0),
        ];
        sort_rows(&mut rows, SortMetric::Clicks, SortDirection::Descending);
        let keys: Vec<&str> = rows.iter().map(|r| r.keys[0].as_str()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);

        // Re-sorting an identical set gives the identical order.
        let mut again = vec![
            row(&["a"], 10.0, 100.0, 1.0),
            row(&["c"], 20.0, 100.0, 1.0),
            row(&["b"], 10.0, 100.0, 1.0),
        ];
        sort_rows(&mut again, SortMetric::Clicks, SortDirection::Descending);
        let keys2: Vec<&str> = again.iter().map(|r| r.keys[0].as_str()).collect();
        assert_eq!(keys, keys2);
    }

    #[test]
    fn test_metric_delta_null_percent_on_zero_baseline() {
        let growth = MetricDelta::between(0.0, 50.0);
        assert_eq!(growth.absolute, 50.0);
        assert_eq!(growth.percent, None);

        let flat = MetricDelta::between(0.0, 0.0);
        assert_eq!(flat.absolute, 0.0);
        assert_eq!(flat.percent, None);

        let normal = MetricDelta::between(100.0, 150.0);
        assert_eq!(normal.absolute, 50.0);
        assert_eq!(normal.percent, Some(50.0));
    }

    #[test]
    fn test_comparison_row_zero_fill_semantics() {
        let keys = vec!["new query".to_string()];
        let p1 = AnalyticsRow::zero(keys.clone());
        let p2 = row(&["new query"], 30.0, 600.0, 5.0);
        let cmp = ComparisonRow::between(keys, p1, p2);

        assert_eq!(cmp.clicks_delta.absolute, 30.0);
        assert_eq!(cmp.clicks_delta.percent, None);
        assert_eq!(cmp.period1.clicks, 0.0);
    }

    #[test]
    fn test_position_delta_sign() {
        // Moved from position 8 to position 3: improved, positive delta.
        let keys = vec!["q".to_string()];
        let cmp = ComparisonRow::between(
            keys,
            row(&["q"], 1.0, 10.0, 8.0),
            row(&["q"], 2.0, 10.0, 3.0),
        );
        assert_eq!(cmp.position_delta, 5.0);
    }

    #[test]
    fn test_gainers_and_losers_ranking() {
        let mk = |key: &str, c1: f64, c2: f64| {
            ComparisonRow::between(
                vec![key.to_string()],
                row(&[key], c1, 100.0, 1.0),
                row(&[key], c2, 100.0, 1.0),
            )
        };
        let rows = vec![mk("up", 10.0, 40.0), mk("down", 50.0, 5.0), mk("flat", 7.0, 7.0)];

        let gainers = rank(&rows, SortMetric::Clicks, 2, RankOrder::Gainers);
        assert_eq!(gainers[0].keys[0], "up");

        let losers = rank(&rows, SortMetric::Clicks, 2, RankOrder::Losers);
        assert_eq!(losers[0].keys[0], "down");
    }

    #[test]
    fn test_page_request_carries_filters_and_sort() {
        let range = DateRange::explicit("2026-08-01", "2026-08-20", params_today()).unwrap();
        let query = AnalyticsQuery {
            filters: vec![QueryFilter {
                dimension: Dimension::Page,
                operator: FilterOperator::Equals,
                expression: "https://example.com/post".to_string(),
            }],
            ..AnalyticsQuery::simple("sc-domain:example.com", range, vec![Dimension::Query], 20)
        };

        let request = query.page_request(0, 20);
        assert_eq!(request.row_limit, 20);
        let groups = request.dimension_filter_groups.unwrap();
        assert_eq!(groups[0].filters[0].dimension, "page");
        assert_eq!(request.order_by.unwrap()[0].metric, "CLICK_COUNT");
    }

    fn params_today() -> chrono::NaiveDate {
        chrono::NaiveDate::parse_from_str("2026-08-29", "%Y-%m-%d").unwrap()
    }

    fn paged_query(limit: u32) -> AnalyticsQuery {
        let range = DateRange::explicit("2026-08-01", "2026-08-20", params_today()).unwrap();
        AnalyticsQuery::simple("sc-domain:example.com", range, vec![Dimension::Query], limit)
    }

    fn page(start: u32, count: u32) -> SearchAnalyticsQueryResponse {
        SearchAnalyticsQueryResponse {
            rows: (0..count)
                .map(|i| ApiDataRow {
                    keys: vec![format!("query-{:03}", start + i)],
                    clicks: (start + i) as f64,
                    impressions: 100.0,
                    ctr: 0.0,
                    position: 1.0,
                })
                .collect(),
            response_aggregation_type: None,
        }
    }

    #[tokio::test]
    async fn test_paging_empty_result() {
        let query = paged_query(10);
        let rows = run_paged(&query, 5, |request| {
            std::future::ready(Ok(page(request.start_row.unwrap(), 0)))
        })
        .await
        .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_paging_short_page_means_exhausted() {
        let query = paged_query(10);
        let mut calls = 0u32;
        let rows = run_paged(&query, 5, |request| {
            calls += 1;
            std::future::ready(Ok(page(request.start_row.unwrap(), 3)))
        })
        .await
        .unwrap();

        // A 3-row page against a 5-row ask ends the loop after one fetch.
        assert_eq!(rows.len(), 3);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_paging_advances_start_row_until_limit() {
        let query = paged_query(5);
        let mut requests: Vec<(u32, u32)> = Vec::new();
        let rows = run_paged(&query, 2, |request| {
            requests.push((request.start_row.unwrap(), request.row_limit));
            std::future::ready(Ok(page(request.start_row.unwrap(), request.row_limit)))
        })
        .await
        .unwrap();

        assert_eq!(rows.len(), 5);
        // Full pages of 2, then a final 1-row page for the remainder.
        assert_eq!(requests, vec![(0, 2), (2, 2), (4, 1)]);
        // Clicks descending with every key distinct: highest start row first.
        assert_eq!(rows[0].keys[0], "query-004");
    }

    #[tokio::test]
    async fn test_paging_cap_trips() {
        let query = paged_query(1000);
        let mut calls = 0u32;
        let result = run_paged(&query, 2, |request| {
            calls += 1;
            std::future::ready(Ok(page(request.start_row.unwrap(), request.row_limit)))
        })
        .await;

        assert_eq!(calls, MAX_ANALYTICS_PAGES);
        match result {
            Err(GscMcpError::Gsc(GscApiError::PaginationLimitExceeded { max_pages })) => {
                assert_eq!(max_pages, MAX_ANALYTICS_PAGES)
            }
            other => panic!("expected pagination cap error, got {:?}", other.map(|r| r.len())),
        }
    }
}
