//! Parameter validation and normalization
//!
//! Every tool's raw JSON arguments pass through here before any network
//! call. Downstream components receive typed values and never re-validate.

use chrono::{Duration, NaiveDate, Utc};

use crate::config::gsc::{MAX_INSPECTION_URLS, REPORTING_LAG_DAYS};
use crate::error::{GscMcpError, Result, ValidationError};

/// Analytics grouping dimensions accepted by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Query,
    Page,
    Country,
    Device,
    Date,
    SearchAppearance,
}

impl Dimension {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim() {
            "query" => Ok(Self::Query),
            "page" => Ok(Self::Page),
            "country" => Ok(Self::Country),
            "device" => Ok(Self::Device),
            "date" => Ok(Self::Date),
            "searchAppearance" => Ok(Self::SearchAppearance),
            other => Err(ValidationError::invalid(
                "dimensions",
                format!(
                    "unknown dimension '{}' (expected query, page, country, device, date, searchAppearance)",
                    other
                ),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Page => "page",
            Self::Country => "country",
            Self::Device => "device",
            Self::Date => "date",
            Self::SearchAppearance => "searchAppearance",
        }
    }
}

/// Parse a comma-separated dimension list, e.g. "query,page"
pub fn parse_dimensions(raw: &str) -> Result<Vec<Dimension>> {
    let dims: Vec<Dimension> = raw
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(Dimension::parse)
        .collect::<Result<_>>()?;

    if dims.is_empty() {
        return Err(ValidationError::invalid(
            "dimensions",
            "at least one dimension is required for grouped queries",
        ));
    }

    Ok(dims)
}

/// Filter operators accepted by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Contains,
    Equals,
    NotContains,
    NotEquals,
}

impl FilterOperator {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim() {
            "contains" => Ok(Self::Contains),
            "equals" => Ok(Self::Equals),
            "notContains" => Ok(Self::NotContains),
            "notEquals" => Ok(Self::NotEquals),
            other => Err(ValidationError::invalid(
                "filter_operator",
                format!(
                    "unknown operator '{}' (expected contains, equals, notContains, notEquals)",
                    other
                ),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Equals => "equals",
            Self::NotContains => "notContains",
            Self::NotEquals => "notEquals",
        }
    }
}

/// Metric a result set can be sorted or ranked by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMetric {
    #[default]
    Clicks,
    Impressions,
    Ctr,
    Position,
}

impl SortMetric {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim() {
            "clicks" => Ok(Self::Clicks),
            "impressions" => Ok(Self::Impressions),
            "ctr" => Ok(Self::Ctr),
            "position" => Ok(Self::Position),
            other => Err(ValidationError::invalid(
                "sort_by",
                format!(
                    "unknown metric '{}' (expected clicks, impressions, ctr, position)",
                    other
                ),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clicks => "clicks",
            Self::Impressions => "impressions",
            Self::Ctr => "ctr",
            Self::Position => "position",
        }
    }

    /// The API's metric identifier for orderBy clauses
    pub fn api_metric(&self) -> &'static str {
        match self {
            Self::Clicks => "CLICK_COUNT",
            Self::Impressions => "IMPRESSION_COUNT",
            Self::Ctr => "CTR",
            Self::Position => "POSITION",
        }
    }
}

/// Search surface for analytics queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchType {
    #[default]
    Web,
    Image,
    Video,
    News,
    Discover,
}

impl SearchType {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WEB" => Ok(Self::Web),
            "IMAGE" => Ok(Self::Image),
            "VIDEO" => Ok(Self::Video),
            "NEWS" => Ok(Self::News),
            "DISCOVER" => Ok(Self::Discover),
            other => Err(ValidationError::invalid(
                "search_type",
                format!("unknown search type '{}'", other),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "WEB",
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
            Self::News => "NEWS",
            Self::Discover => "DISCOVER",
        }
    }
}

/// Sitemap management actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapAction {
    List,
    Details,
    Submit,
    Delete,
}

impl SitemapAction {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(Self::List),
            "details" => Ok(Self::Details),
            "submit" => Ok(Self::Submit),
            "delete" => Ok(Self::Delete),
            other => Err(ValidationError::invalid(
                "action",
                format!("unknown action '{}' (expected list, details, submit, delete)", other),
            )),
        }
    }
}

/// Validate that a site URL looks like a property identifier:
/// either a domain property (`sc-domain:example.com`) or a URL-prefix
/// property (`https://example.com/`).
pub fn validate_site_url(site_url: &str) -> Result<String> {
    let site_url = site_url.trim();

    if let Some(domain) = site_url.strip_prefix("sc-domain:") {
        if domain.is_empty() || domain.contains('/') || domain.contains(' ') {
            return Err(ValidationError::invalid(
                "site_url",
                format!("'{}' is not a valid domain property", site_url),
            ));
        }
        return Ok(site_url.to_string());
    }

    if site_url.starts_with("http://") || site_url.starts_with("https://") {
        return Ok(site_url.to_string());
    }

    Err(ValidationError::invalid(
        "site_url",
        format!(
            "'{}' is neither a domain property (sc-domain:example.com) nor a URL-prefix property (https://example.com/)",
            site_url
        ),
    ))
}

/// Resolve a caller-supplied row limit, rejecting an explicit zero rather
/// than clamping it. Absent means the tool default.
pub fn validate_row_limit(limit: Option<u32>, default: u32) -> Result<u32> {
    match limit {
        Some(0) => Err(ValidationError::invalid("row_limit", "must be at least 1")),
        Some(n) => Ok(n),
        None => Ok(default),
    }
}

/// An inclusive date range, already clipped to available data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The most recent date for which analytics data is complete
    pub fn latest_available(today: NaiveDate) -> NaiveDate {
        today - Duration::days(REPORTING_LAG_DAYS)
    }

    /// Resolve a "last N days" shorthand, anchored to the reporting lag
    pub fn last_days(days: u32, today: NaiveDate) -> Result<Self> {
        if days == 0 {
            return Err(ValidationError::invalid("days", "must be at least 1"));
        }
        let end = Self::latest_available(today);
        let start = end - Duration::days(i64::from(days) - 1);
        Ok(Self { start, end })
    }

    /// Resolve an explicit range. Ends overlapping the reporting-lag window
    /// are clipped silently; an inverted range is rejected.
    pub fn explicit(start: &str, end: &str, today: NaiveDate) -> Result<Self> {
        let start = parse_date("start_date", start)?;
        let end = parse_date("end_date", end)?;

        if end < start {
            return Err(ValidationError::invalid(
                "end_date",
                format!("end date {} is before start date {}", end, start),
            ));
        }

        let end = end.min(Self::latest_available(today));
        if end < start {
            // The whole range sits inside the lag window; nothing to clip to.
            return Err(ValidationError::invalid(
                "start_date",
                format!(
                    "no data is available yet for dates after {}",
                    Self::latest_available(today)
                ),
            ));
        }

        Ok(Self { start, end })
    }

    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    /// Number of days the range spans (inclusive)
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::invalid(field, format!("'{}' is not a YYYY-MM-DD date", value))
    })
}

/// Today's date; the anchor for relative ranges
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse a newline-separated URL list: trim, drop blanks, deduplicate
/// preserving first occurrence, and enforce the batch cap.
pub fn parse_url_list(raw: &str, max: usize) -> Result<Vec<String>> {
    let mut urls: Vec<String> = Vec::new();
    for line in raw.lines() {
        let url = line.trim();
        if url.is_empty() {
            continue;
        }
        if !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }

    if urls.is_empty() {
        return Err(ValidationError::invalid("urls", "no URLs provided"));
    }

    if urls.len() > max {
        return Err(GscMcpError::Validation(ValidationError::TooManyItems {
            count: urls.len(),
            max,
        }));
    }

    Ok(urls)
}

/// Batch cap for URL inspection
pub fn inspection_url_list(raw: &str) -> Result<Vec<String>> {
    parse_url_list(raw, MAX_INSPECTION_URLS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_site_url_shapes() {
        assert!(validate_site_url("sc-domain:example.com").is_ok());
        assert!(validate_site_url("https://example.com/").is_ok());
        assert!(validate_site_url("http://example.com/blog/").is_ok());
        assert!(validate_site_url("example.com").is_err());
        assert!(validate_site_url("sc-domain:").is_err());
        assert!(validate_site_url("sc-domain:example.com/path").is_err());
    }

    #[test]
    fn test_row_limit_zero_rejected() {
        assert_eq!(validate_row_limit(None, 20).unwrap(), 20);
        assert_eq!(validate_row_limit(Some(5), 20).unwrap(), 5);

        let err = validate_row_limit(Some(0), 20).unwrap_err();
        assert!(err.to_string().contains("row_limit"));
    }

    #[test]
    fn test_dimension_enumeration() {
        assert_eq!(Dimension::parse("query").unwrap(), Dimension::Query);
        assert!(Dimension::parse("keyword").is_err());

        let dims = parse_dimensions("query, page").unwrap();
        assert_eq!(dims, vec![Dimension::Query, Dimension::Page]);
        assert!(parse_dimensions("").is_err());
    }

    #[test]
    fn test_last_days_anchored_to_lag() {
        let range = DateRange::last_days(7, d("2026-08-29")).unwrap();
        assert_eq!(range.end, d("2026-08-27"));
        assert_eq!(range.start, d("2026-08-21"));
        assert_eq!(range.len_days(), 7);
    }

    #[test]
    fn test_explicit_range_clips_recent_end() {
        let range = DateRange::explicit("2026-08-01", "2026-08-29", d("2026-08-29")).unwrap();
        assert_eq!(range.start, d("2026-08-01"));
        assert_eq!(range.end, d("2026-08-27"));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = DateRange::explicit("2026-08-10", "2026-08-01", d("2026-08-29"));
        assert!(matches!(
            err,
            Err(GscMcpError::Validation(ValidationError::InvalidParameter { .. }))
        ));
    }

    #[test]
    fn test_range_fully_inside_lag_window_rejected() {
        let err = DateRange::explicit("2026-08-28", "2026-08-29", d("2026-08-29"));
        assert!(err.is_err());
    }

    #[test]
    fn test_url_list_dedup_and_cap() {
        let raw = "https://a.com/1\n https://a.com/2 \nhttps://a.com/1\n\n";
        let urls = parse_url_list(raw, 10).unwrap();
        assert_eq!(urls, vec!["https://a.com/1", "https://a.com/2"]);

        let eleven: String = (0..11)
            .map(|i| format!("https://a.com/{}\n", i))
            .collect();
        let err = parse_url_list(&eleven, 10);
        assert!(matches!(
            err,
            Err(GscMcpError::Validation(ValidationError::TooManyItems {
                count: 11,
                max: 10
            }))
        ));
    }

    #[test]
    fn test_empty_url_list_rejected() {
        assert!(parse_url_list("\n  \n", 10).is_err());
    }

    #[test]
    fn test_sitemap_action_enumeration() {
        assert_eq!(SitemapAction::parse("Submit").unwrap(), SitemapAction::Submit);
        assert!(SitemapAction::parse("resubmit").is_err());
    }

    #[test]
    fn test_sort_metric_api_names() {
        assert_eq!(SortMetric::parse("clicks").unwrap().api_metric(), "CLICK_COUNT");
        assert_eq!(SortMetric::parse("position").unwrap().api_metric(), "POSITION");
    }
}
