//! Search Console API type definitions
//!
//! These types mirror the Search Console API responses and are used for
//! serialization/deserialization. Fields absent upstream stay `None` and are
//! passed through as nulls; nothing is fabricated locally.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize an integer that the API may send as either a JSON number or a
/// quoted int64 string ("errors": "0").
fn int64_compat<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

fn int64_compat_opt<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "int64_compat")] i64);

    Option::<Wrapper>::deserialize(deserializer).map(|o| o.map(|w| w.0))
}

/// A verified Search Console property
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteEntry {
    /// Property identifier (sc-domain: or URL prefix)
    pub site_url: String,

    /// Permission level of the authenticated user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_level: Option<String>,
}

/// Response from sites.list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitesList {
    /// Properties visible to the authenticated user
    #[serde(default)]
    pub site_entry: Vec<SiteEntry>,
}

/// A single dimension filter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionFilter {
    pub dimension: String,
    pub operator: String,
    pub expression: String,
}

/// A group of dimension filters (ANDed together by the API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionFilterGroup {
    #[serde(default)]
    pub filters: Vec<DimensionFilter>,
}

/// Sort instruction passed to searchanalytics.query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    /// Metric identifier (CLICK_COUNT, IMPRESSION_COUNT, CTR, POSITION)
    pub metric: String,

    /// "ascending" or "descending"
    pub direction: String,
}

/// Request body for searchanalytics.query
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalyticsQueryRequest {
    /// Inclusive start date, YYYY-MM-DD
    pub start_date: String,

    /// Inclusive end date, YYYY-MM-DD
    pub end_date: String,

    /// Dimensions to group by (empty for totals-only queries)
    #[serde(default)]
    pub dimensions: Vec<String>,

    /// Search surface (WEB, IMAGE, VIDEO, NEWS, DISCOVER)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_type: Option<String>,

    /// Filters, passed through upstream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_filter_groups: Option<Vec<DimensionFilterGroup>>,

    /// Sort instructions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<OrderBy>>,

    /// Rows per page (API maximum 25000)
    pub row_limit: u32,

    /// Pagination offset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_row: Option<u32>,
}

/// One row of searchanalytics.query output
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiDataRow {
    /// Dimension values, in request dimension order
    #[serde(default)]
    pub keys: Vec<String>,

    #[serde(default)]
    pub clicks: f64,

    #[serde(default)]
    pub impressions: f64,

    /// CTR as reported upstream; recomputed locally before use
    #[serde(default)]
    pub ctr: f64,

    /// Average position, 1-indexed, lower is better
    #[serde(default)]
    pub position: f64,
}

/// Response from searchanalytics.query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalyticsQueryResponse {
    #[serde(default)]
    pub rows: Vec<ApiDataRow>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_aggregation_type: Option<String>,
}

/// Request body for urlInspection.index.inspect
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectUrlRequest {
    pub inspection_url: String,
    pub site_url: String,
}

/// Response envelope from urlInspection.index.inspect
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectUrlResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspection_result: Option<InspectionResult>,
}

/// Full inspection result for one URL
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InspectionResult {
    /// Link to the result in the Search Console UI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspection_result_link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_status_result: Option<IndexStatusResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rich_results_result: Option<RichResultsResult>,
}

/// Indexing state for an inspected URL
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatusResult {
    /// PASS, FAIL, NEUTRAL, or VERDICT_UNSPECIFIED
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,

    /// Human-readable coverage state (e.g. "Submitted and indexed")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub robots_txt_state: Option<String>,

    /// INDEXING_ALLOWED / BLOCKED_BY_META_TAG / ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexing_state: Option<String>,

    /// Last crawl timestamp; null when never crawled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_crawl_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_fetch_state: Option<String>,

    /// Canonical selected by Google
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_canonical: Option<String>,

    /// Canonical declared by the site
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_canonical: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawled_as: Option<String>,

    /// Sitemaps that reference this URL
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sitemap: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub referring_urls: Vec<String>,
}

/// Rich results detection for an inspected URL
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RichResultsResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detected_items: Vec<DetectedRichResult>,
}

/// A detected rich result type and its issues
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DetectedRichResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rich_result_type: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<RichResultItem>,
}

/// One instance of a rich result with any issues found
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RichResultItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<RichResultIssue>,
}

/// An issue flagged against a rich result item
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RichResultIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

/// A submitted sitemap
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WmxSitemap {
    /// Sitemap URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_submitted: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_downloaded: Option<String>,

    /// True while Google has not yet processed the sitemap
    #[serde(default)]
    pub is_pending: bool,

    /// True if this sitemap is an index of other sitemaps
    #[serde(default)]
    pub is_sitemaps_index: bool,

    #[serde(default, deserialize_with = "int64_compat")]
    pub errors: i64,

    #[serde(default, deserialize_with = "int64_compat")]
    pub warnings: i64,

    /// Per-content-type URL counts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<WmxSitemapContent>,
}

/// URL counts for one content type within a sitemap
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WmxSitemapContent {
    /// Content type (web, image, video, ...)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(default, deserialize_with = "int64_compat_opt")]
    pub submitted: Option<i64>,

    #[serde(default, deserialize_with = "int64_compat_opt")]
    pub indexed: Option<i64>,
}

/// Response from sitemaps.list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapsList {
    #[serde(default)]
    pub sitemap: Vec<WmxSitemap>,
}
