//! MCP tool definitions and handlers
//!
//! Declares the tool surface and maps each call's raw JSON arguments through
//! validation into the matching engine. Handler errors become error-flagged
//! tool results, never protocol-level failures.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::gsc::analytics::{AnalyticsEngine, AnalyticsQuery, QueryFilter, SortDirection};
use crate::gsc::client::GscClient;
use crate::gsc::format;
use crate::gsc::inspection::{classify_issues, InspectionOrchestrator};
use crate::gsc::params::{
    self, DateRange, Dimension, FilterOperator, SearchType, SitemapAction, SortMetric,
};
use crate::gsc::sitemaps::SitemapManager;
use crate::mcp::types::{CallToolResult, Tool};

const DEFAULT_DAYS: u32 = 28;
const DEFAULT_ROW_LIMIT: u32 = 20;
const DEFAULT_ADVANCED_LIMIT: u32 = 1000;
const DEFAULT_TOP_N: usize = 10;

/// Tool handler
pub struct ToolHandler {
    client: Arc<GscClient>,
}

impl ToolHandler {
    pub fn new(client: Arc<GscClient>) -> Self {
        Self { client }
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        vec![
            tool_def("list_properties", "Lists all Search Console properties the authenticated account can access", json!({"type": "object", "properties": {}})),
            tool_def("get_site_details", "Gets details for one Search Console property", site_only_schema()),
            tool_def("add_site", "Adds a property to the Search Console account", site_only_schema()),
            tool_def("delete_site", "Removes a property from the Search Console account", site_only_schema()),
            tool_def("get_search_analytics", "Gets search performance data grouped by the given dimensions over the last N days", search_analytics_schema()),
            tool_def("get_advanced_search_analytics", "Runs a search analytics query with explicit dates, filtering, sorting and pagination", advanced_analytics_schema()),
            tool_def("get_performance_overview", "Gets aggregate totals plus a daily trend for a property", overview_schema()),
            tool_def("get_search_by_page_query", "Gets the search queries that led to a specific page", page_query_schema()),
            tool_def("compare_search_periods", "Compares search performance between two date periods and ranks movers", compare_periods_schema()),
            tool_def("inspect_url_enhanced", "Inspects one URL's index status, canonical selection and rich results", inspect_url_schema()),
            tool_def("batch_url_inspection", "Inspects up to 10 URLs, reporting per-URL outcomes in input order", url_batch_schema()),
            tool_def("check_indexing_issues", "Inspects a list of URLs and buckets them by indexing problem", url_batch_schema()),
            tool_def("get_sitemaps", "Lists all sitemaps submitted for a property", site_only_schema()),
            tool_def("list_sitemaps_enhanced", "Lists sitemaps, optionally the children of one sitemap index", list_sitemaps_schema()),
            tool_def("get_sitemap_details", "Gets status, errors and content counts for one sitemap", sitemap_url_schema()),
            tool_def("submit_sitemap", "Submits (or resubmits) a sitemap for crawling", sitemap_url_schema()),
            tool_def("delete_sitemap", "Removes a sitemap from Search Console", sitemap_url_schema()),
            tool_def("manage_sitemaps", "Runs a sitemap action: list, details, submit or delete", manage_sitemaps_schema()),
        ]
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, args: Value) -> CallToolResult {
        match name {
            "list_properties" => self.handle_list_properties().await,
            "get_site_details" => self.handle_get_site_details(args).await,
            "add_site" => self.handle_add_site(args).await,
            "delete_site" => self.handle_delete_site(args).await,
            "get_search_analytics" => self.handle_search_analytics(args).await,
            "get_advanced_search_analytics" => self.handle_advanced_analytics(args).await,
            "get_performance_overview" => self.handle_performance_overview(args).await,
            "get_search_by_page_query" => self.handle_search_by_page_query(args).await,
            "compare_search_periods" => self.handle_compare_periods(args).await,
            "inspect_url_enhanced" => self.handle_inspect_url(args).await,
            "batch_url_inspection" => self.handle_batch_inspection(args).await,
            "check_indexing_issues" => self.handle_check_indexing(args).await,
            "get_sitemaps" => self.handle_get_sitemaps(args).await,
            "list_sitemaps_enhanced" => self.handle_list_sitemaps(args).await,
            "get_sitemap_details" => self.handle_sitemap_details(args).await,
            "submit_sitemap" => self.handle_submit_sitemap(args).await,
            "delete_sitemap" => self.handle_delete_sitemap(args).await,
            "manage_sitemaps" => self.handle_manage_sitemaps(args).await,
            _ => CallToolResult::error(format!("Unknown tool: {}", name)),
        }
    }

    // ==================== Property Tools ====================

    async fn handle_list_properties(&self) -> CallToolResult {
        match self.client.list_sites().await {
            Ok(sites) => {
                let summary = format!("{} propert(ies) accessible", sites.len());
                text_or_error(format::payload(&summary, &sites))
            }
            Err(e) => CallToolResult::error(e.to_string()),
        }
    }

    async fn handle_get_site_details(&self, args: Value) -> CallToolResult {
        let site_url = match site_arg(args) {
            Ok(s) => s,
            Err(r) => return r,
        };

        match self.client.get_site(&site_url).await {
            Ok(site) => {
                let summary = format!(
                    "{} (permission: {})",
                    site.site_url,
                    format::or_null(site.permission_level.as_deref())
                );
                text_or_error(format::payload(&summary, &site))
            }
            Err(e) => CallToolResult::error(e.to_string()),
        }
    }

    async fn handle_add_site(&self, args: Value) -> CallToolResult {
        let site_url = match site_arg(args) {
            Ok(s) => s,
            Err(r) => return r,
        };

        match self.client.add_site(&site_url).await {
            Ok(()) => CallToolResult::text(format::confirmation(&format!(
                "Added {} to Search Console. Verification may still be required before data is available.",
                site_url
            ))),
            Err(e) => CallToolResult::error(e.to_string()),
        }
    }

    async fn handle_delete_site(&self, args: Value) -> CallToolResult {
        let site_url = match site_arg(args) {
            Ok(s) => s,
            Err(r) => return r,
        };

        match self.client.delete_site(&site_url).await {
            Ok(()) => CallToolResult::text(format::confirmation(&format!(
                "Removed {} from Search Console",
                site_url
            ))),
            Err(e) => CallToolResult::error(e.to_string()),
        }
    }

    // ==================== Analytics Tools ====================

    async fn handle_search_analytics(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            site_url: String,
            days: Option<u32>,
            dimensions: Option<String>,
            row_limit: Option<u32>,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(r) => return r,
        };

        let result: crate::error::Result<CallToolResult> = async {
            let site_url = params::validate_site_url(&args.site_url)?;
            let range = DateRange::last_days(args.days.unwrap_or(DEFAULT_DAYS), params::today())?;
            let dimensions =
                params::parse_dimensions(args.dimensions.as_deref().unwrap_or("query"))?;
            let limit = params::validate_row_limit(args.row_limit, DEFAULT_ROW_LIMIT)?;

            let query = AnalyticsQuery::simple(&site_url, range, dimensions.clone(), limit);
            let rows = AnalyticsEngine::new(&self.client).fetch_rows(&query).await?;

            let summary =
                format::analytics_summary(&site_url, &range.start_str(), &range.end_str(), rows.len());
            let text = format::payload(&summary, &format::analytics_rows_json(&rows, &dimensions))?;
            Ok(CallToolResult::text(text))
        }
        .await;

        result.unwrap_or_else(|e| CallToolResult::error(e.to_string()))
    }

    async fn handle_advanced_analytics(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            site_url: String,
            start_date: String,
            end_date: String,
            dimensions: Option<String>,
            search_type: Option<String>,
            filter_dimension: Option<String>,
            filter_operator: Option<String>,
            filter_expression: Option<String>,
            sort_by: Option<String>,
            sort_direction: Option<String>,
            row_limit: Option<u32>,
            start_row: Option<u32>,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(r) => return r,
        };

        let result: crate::error::Result<CallToolResult> = async {
            let site_url = params::validate_site_url(&args.site_url)?;
            let range = DateRange::explicit(&args.start_date, &args.end_date, params::today())?;
            let dimensions =
                params::parse_dimensions(args.dimensions.as_deref().unwrap_or("query"))?;

            let search_type = match args.search_type.as_deref() {
                Some(raw) => SearchType::parse(raw)?,
                None => SearchType::default(),
            };
            let sort_by = match args.sort_by.as_deref() {
                Some(raw) => SortMetric::parse(raw)?,
                None => SortMetric::default(),
            };
            let sort_direction = match args.sort_direction.as_deref() {
                Some(raw) => SortDirection::parse(raw)?,
                None => SortDirection::default(),
            };

            // A filter is all-or-nothing across its three parts.
            let filters = match (
                args.filter_dimension.as_deref(),
                args.filter_expression.as_deref(),
            ) {
                (Some(dimension), Some(expression)) => {
                    let operator = match args.filter_operator.as_deref() {
                        Some(raw) => FilterOperator::parse(raw)?,
                        None => FilterOperator::Contains,
                    };
                    vec![QueryFilter {
                        dimension: Dimension::parse(dimension)?,
                        operator,
                        expression: expression.to_string(),
                    }]
                }
                (None, None) => Vec::new(),
                _ => {
                    return Err(crate::error::ValidationError::invalid(
                        "filter_dimension",
                        "filter_dimension and filter_expression must be provided together",
                    ))
                }
            };

            let query = AnalyticsQuery {
                site_url: site_url.clone(),
                range,
                dimensions: dimensions.clone(),
                search_type,
                filters,
                sort_by,
                sort_direction,
                limit: params::validate_row_limit(args.row_limit, DEFAULT_ADVANCED_LIMIT)?,
                offset: args.start_row.unwrap_or(0),
            };

            let rows = AnalyticsEngine::new(&self.client).fetch_rows(&query).await?;
            let summary =
                format::analytics_summary(&site_url, &range.start_str(), &range.end_str(), rows.len());
            let text = format::payload(&summary, &format::analytics_rows_json(&rows, &dimensions))?;
            Ok(CallToolResult::text(text))
        }
        .await;

        result.unwrap_or_else(|e| CallToolResult::error(e.to_string()))
    }

    async fn handle_performance_overview(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            site_url: String,
            days: Option<u32>,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(r) => return r,
        };

        let result: crate::error::Result<CallToolResult> = async {
            let site_url = params::validate_site_url(&args.site_url)?;
            let range = DateRange::last_days(args.days.unwrap_or(DEFAULT_DAYS), params::today())?;

            let overview = AnalyticsEngine::new(&self.client)
                .performance_overview(&site_url, range)
                .await?;

            let summary = match &overview.totals {
                Some(totals) => format!(
                    "{}: {} clicks, {} impressions, CTR {}, avg position {} ({} to {})",
                    site_url,
                    totals.clicks,
                    totals.impressions,
                    format::format_ctr(totals.ctr),
                    format::format_position(totals.position),
                    range.start_str(),
                    range.end_str()
                ),
                None => format!(
                    "{}: no data between {} and {}",
                    site_url,
                    range.start_str(),
                    range.end_str()
                ),
            };
            let text = format::payload(&summary, &overview)?;
            Ok(CallToolResult::text(text))
        }
        .await;

        result.unwrap_or_else(|e| CallToolResult::error(e.to_string()))
    }

    async fn handle_search_by_page_query(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            site_url: String,
            page_url: String,
            days: Option<u32>,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(r) => return r,
        };

        let result: crate::error::Result<CallToolResult> = async {
            let site_url = params::validate_site_url(&args.site_url)?;
            let range = DateRange::last_days(args.days.unwrap_or(DEFAULT_DAYS), params::today())?;
            let dimensions = vec![Dimension::Query];

            let query = AnalyticsQuery {
                filters: vec![QueryFilter {
                    dimension: Dimension::Page,
                    operator: FilterOperator::Equals,
                    expression: args.page_url.clone(),
                }],
                ..AnalyticsQuery::simple(&site_url, range, dimensions.clone(), DEFAULT_ROW_LIMIT)
            };

            let rows = AnalyticsEngine::new(&self.client).fetch_rows(&query).await?;
            let summary = format!(
                "{} quer(ies) led to {} between {} and {}",
                rows.len(),
                args.page_url,
                range.start_str(),
                range.end_str()
            );
            let text = format::payload(&summary, &format::analytics_rows_json(&rows, &dimensions))?;
            Ok(CallToolResult::text(text))
        }
        .await;

        result.unwrap_or_else(|e| CallToolResult::error(e.to_string()))
    }

    async fn handle_compare_periods(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            site_url: String,
            period1_start: String,
            period1_end: String,
            period2_start: String,
            period2_end: String,
            dimensions: Option<String>,
            rank_by: Option<String>,
            top_n: Option<usize>,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(r) => return r,
        };

        let result: crate::error::Result<CallToolResult> = async {
            let site_url = params::validate_site_url(&args.site_url)?;
            let today = params::today();
            let period1 = DateRange::explicit(&args.period1_start, &args.period1_end, today)?;
            let period2 = DateRange::explicit(&args.period2_start, &args.period2_end, today)?;
            let dimensions =
                params::parse_dimensions(args.dimensions.as_deref().unwrap_or("query"))?;
            let rank_by = match args.rank_by.as_deref() {
                Some(raw) => SortMetric::parse(raw)?,
                None => SortMetric::default(),
            };

            let comparison = AnalyticsEngine::new(&self.client)
                .compare_periods(
                    &site_url,
                    period1,
                    period2,
                    dimensions,
                    rank_by,
                    args.top_n.unwrap_or(DEFAULT_TOP_N),
                )
                .await?;

            let summary = format!(
                "{}: {} joined row(s), {}..{} vs {}..{} ranked by {}",
                site_url,
                comparison.rows.len(),
                comparison.period1_start,
                comparison.period1_end,
                comparison.period2_start,
                comparison.period2_end,
                comparison.ranked_by
            );
            let text = format::payload(&summary, &comparison)?;
            Ok(CallToolResult::text(text))
        }
        .await;

        result.unwrap_or_else(|e| CallToolResult::error(e.to_string()))
    }

    // ==================== Inspection Tools ====================

    async fn handle_inspect_url(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            site_url: String,
            page_url: String,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(r) => return r,
        };

        let result: crate::error::Result<CallToolResult> = async {
            let site_url = params::validate_site_url(&args.site_url)?;
            let orchestrator = InspectionOrchestrator::new(self.client.clone());
            let summary = orchestrator.inspect_one(&site_url, &args.page_url).await?;

            let line = format!(
                "{}: verdict {}, coverage {}",
                summary.page_url,
                summary.verdict,
                format::or_null(summary.coverage_state.as_deref())
            );
            let text = format::payload(&line, &summary)?;
            Ok(CallToolResult::text(text))
        }
        .await;

        result.unwrap_or_else(|e| CallToolResult::error(e.to_string()))
    }

    async fn handle_batch_inspection(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            site_url: String,
            urls: String,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(r) => return r,
        };

        let result: crate::error::Result<CallToolResult> = async {
            let site_url = params::validate_site_url(&args.site_url)?;
            let urls = params::inspection_url_list(&args.urls)?;

            let orchestrator = InspectionOrchestrator::new(self.client.clone());
            let report = orchestrator.inspect_batch(&site_url, urls).await?;

            let line = format!(
                "Inspected {} URL(s): {} succeeded, {} failed",
                report.attempted, report.succeeded, report.failed
            );
            let text = format::payload(&line, &report)?;
            Ok(CallToolResult::text(text))
        }
        .await;

        result.unwrap_or_else(|e| CallToolResult::error(e.to_string()))
    }

    async fn handle_check_indexing(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            site_url: String,
            urls: String,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(r) => return r,
        };

        let result: crate::error::Result<CallToolResult> = async {
            let site_url = params::validate_site_url(&args.site_url)?;
            let urls = params::inspection_url_list(&args.urls)?;

            let orchestrator = InspectionOrchestrator::new(self.client.clone());
            let report = orchestrator.inspect_batch(&site_url, urls).await?;
            let issues = classify_issues(&site_url, &report.items);

            let line = format!(
                "Checked {} URL(s): {} indexed, {} not indexed, {} canonical issue(s), {} robots-blocked, {} fetch issue(s)",
                issues.total_checked,
                issues.indexed.len(),
                issues.not_indexed.len(),
                issues.canonical_issues.len(),
                issues.robots_blocked.len(),
                issues.fetch_issues.len()
            );
            let text = format::payload(&line, &issues)?;
            Ok(CallToolResult::text(text))
        }
        .await;

        result.unwrap_or_else(|e| CallToolResult::error(e.to_string()))
    }

    // ==================== Sitemap Tools ====================

    async fn handle_get_sitemaps(&self, args: Value) -> CallToolResult {
        let site_url = match site_arg(args) {
            Ok(s) => s,
            Err(r) => return r,
        };

        let result: crate::error::Result<CallToolResult> = async {
            let action = SitemapManager::new(&self.client)
                .dispatch(SitemapAction::List, &site_url, None)
                .await?;
            let text = format::payload(&sitemap_summary_line(&site_url, &action), &action)?;
            Ok(CallToolResult::text(text))
        }
        .await;

        result.unwrap_or_else(|e| CallToolResult::error(e.to_string()))
    }

    async fn handle_list_sitemaps(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            site_url: String,
            sitemap_index: Option<String>,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(r) => return r,
        };

        let result: crate::error::Result<CallToolResult> = async {
            let site_url = params::validate_site_url(&args.site_url)?;
            let manager = SitemapManager::new(&self.client);

            // With an index URL this lists the index's children via details.
            let action = match args.sitemap_index.as_deref() {
                Some(index) => {
                    manager
                        .dispatch(SitemapAction::Details, &site_url, Some(index))
                        .await?
                }
                None => manager.dispatch(SitemapAction::List, &site_url, None).await?,
            };

            let text = format::payload(&sitemap_summary_line(&site_url, &action), &action)?;
            Ok(CallToolResult::text(text))
        }
        .await;

        result.unwrap_or_else(|e| CallToolResult::error(e.to_string()))
    }

    async fn handle_sitemap_details(&self, args: Value) -> CallToolResult {
        self.sitemap_action(args, SitemapAction::Details).await
    }

    async fn handle_submit_sitemap(&self, args: Value) -> CallToolResult {
        self.sitemap_action(args, SitemapAction::Submit).await
    }

    async fn handle_delete_sitemap(&self, args: Value) -> CallToolResult {
        self.sitemap_action(args, SitemapAction::Delete).await
    }

    async fn sitemap_action(&self, args: Value, action: SitemapAction) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            site_url: String,
            sitemap_url: String,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(r) => return r,
        };

        let result: crate::error::Result<CallToolResult> = async {
            let site_url = params::validate_site_url(&args.site_url)?;
            let outcome = SitemapManager::new(&self.client)
                .dispatch(action, &site_url, Some(&args.sitemap_url))
                .await?;
            let text = format::payload(&sitemap_summary_line(&site_url, &outcome), &outcome)?;
            Ok(CallToolResult::text(text))
        }
        .await;

        result.unwrap_or_else(|e| CallToolResult::error(e.to_string()))
    }

    async fn handle_manage_sitemaps(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            site_url: String,
            action: String,
            sitemap_url: Option<String>,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(r) => return r,
        };

        let result: crate::error::Result<CallToolResult> = async {
            let site_url = params::validate_site_url(&args.site_url)?;
            let action = SitemapAction::parse(&args.action)?;

            if action != SitemapAction::List && args.sitemap_url.is_none() {
                return Err(crate::error::ValidationError::invalid(
                    "sitemap_url",
                    format!("required for the '{}' action", args.action.trim()),
                ));
            }

            let outcome = SitemapManager::new(&self.client)
                .dispatch(action, &site_url, args.sitemap_url.as_deref())
                .await?;
            let text = format::payload(&sitemap_summary_line(&site_url, &outcome), &outcome)?;
            Ok(CallToolResult::text(text))
        }
        .await;

        result.unwrap_or_else(|e| CallToolResult::error(e.to_string()))
    }
}

fn sitemap_summary_line(site_url: &str, action: &crate::gsc::sitemaps::SitemapActionResult) -> String {
    use crate::gsc::sitemaps::SitemapActionResult::*;
    match action {
        List { sitemaps, .. } => format!("{} sitemap(s) for {}", sitemaps.len(), site_url),
        Details { sitemap, children, .. } => {
            if sitemap.is_sitemaps_index {
                format!(
                    "{}: sitemap index with {} child(ren), {} error(s), {} warning(s)",
                    sitemap.path,
                    children.len(),
                    sitemap.errors,
                    sitemap.warnings
                )
            } else {
                format!(
                    "{}: {} error(s), {} warning(s)",
                    sitemap.path, sitemap.errors, sitemap.warnings
                )
            }
        }
        Submit { sitemap_url, .. } => format!("Submitted {} for {}", sitemap_url, site_url),
        Delete { sitemap_url, .. } => format!("Deleted {} from {}", sitemap_url, site_url),
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(
    args: Value,
) -> std::result::Result<T, CallToolResult> {
    serde_json::from_value(args)
        .map_err(|e| CallToolResult::error(format!("Invalid arguments: {}", e)))
}

/// Parse and validate the lone site_url argument
fn site_arg(args: Value) -> std::result::Result<String, CallToolResult> {
    #[derive(Deserialize)]
    struct Args {
        site_url: String,
    }

    let args: Args = parse_args(args)?;
    params::validate_site_url(&args.site_url).map_err(|e| CallToolResult::error(e.to_string()))
}

fn text_or_error(rendered: crate::error::Result<String>) -> CallToolResult {
    match rendered {
        Ok(text) => CallToolResult::text(text),
        Err(e) => CallToolResult::error(e.to_string()),
    }
}

// ==================== Tool Schemas ====================

fn tool_def(name: &str, description: &str, input_schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
    }
}

fn site_url_property() -> Value {
    json!({
        "type": "string",
        "description": "Property identifier: sc-domain:example.com or https://example.com/"
    })
}

fn site_only_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "site_url": site_url_property()
        },
        "required": ["site_url"]
    })
}

fn search_analytics_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "site_url": site_url_property(),
            "days": {
                "type": "integer",
                "description": "Number of days to look back (default 28)",
                "minimum": 1
            },
            "dimensions": {
                "type": "string",
                "description": "Comma-separated dimensions, e.g. \"query\" or \"query,page\" (default \"query\")"
            },
            "row_limit": {
                "type": "integer",
                "description": "Maximum rows to return (default 20)",
                "minimum": 1
            }
        },
        "required": ["site_url"]
    })
}

fn advanced_analytics_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "site_url": site_url_property(),
            "start_date": {"type": "string", "description": "Start date, YYYY-MM-DD"},
            "end_date": {"type": "string", "description": "End date, YYYY-MM-DD (inclusive)"},
            "dimensions": {
                "type": "string",
                "description": "Comma-separated dimensions (default \"query\")"
            },
            "search_type": {
                "type": "string",
                "enum": ["web", "image", "video", "news", "discover"],
                "description": "Search surface (default web)"
            },
            "filter_dimension": {
                "type": "string",
                "description": "Dimension to filter on (query, page, country, device)"
            },
            "filter_operator": {
                "type": "string",
                "enum": ["contains", "equals", "notContains", "notEquals"],
                "description": "Filter operator (default contains)"
            },
            "filter_expression": {"type": "string", "description": "Filter value"},
            "sort_by": {
                "type": "string",
                "enum": ["clicks", "impressions", "ctr", "position"],
                "description": "Metric to sort by (default clicks)"
            },
            "sort_direction": {
                "type": "string",
                "enum": ["ascending", "descending"],
                "description": "Sort direction (default descending)"
            },
            "row_limit": {
                "type": "integer",
                "description": "Maximum rows to return (default 1000)",
                "minimum": 1
            },
            "start_row": {
                "type": "integer",
                "description": "Pagination offset into the result set (default 0)",
                "minimum": 0
            }
        },
        "required": ["site_url", "start_date", "end_date"]
    })
}

fn overview_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "site_url": site_url_property(),
            "days": {
                "type": "integer",
                "description": "Number of days to look back (default 28)",
                "minimum": 1
            }
        },
        "required": ["site_url"]
    })
}

fn page_query_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "site_url": site_url_property(),
            "page_url": {"type": "string", "description": "Full URL of the page to analyze"},
            "days": {
                "type": "integer",
                "description": "Number of days to look back (default 28)",
                "minimum": 1
            }
        },
        "required": ["site_url", "page_url"]
    })
}

fn compare_periods_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "site_url": site_url_property(),
            "period1_start": {"type": "string", "description": "Baseline period start, YYYY-MM-DD"},
            "period1_end": {"type": "string", "description": "Baseline period end, YYYY-MM-DD"},
            "period2_start": {"type": "string", "description": "Comparison period start, YYYY-MM-DD"},
            "period2_end": {"type": "string", "description": "Comparison period end, YYYY-MM-DD"},
            "dimensions": {
                "type": "string",
                "description": "Comma-separated dimensions to join on (default \"query\")"
            },
            "rank_by": {
                "type": "string",
                "enum": ["clicks", "impressions", "ctr", "position"],
                "description": "Metric for ranking gainers and losers (default clicks)"
            },
            "top_n": {
                "type": "integer",
                "description": "How many gainers/losers to rank (default 10)",
                "minimum": 1
            }
        },
        "required": ["site_url", "period1_start", "period1_end", "period2_start", "period2_end"]
    })
}

fn inspect_url_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "site_url": site_url_property(),
            "page_url": {"type": "string", "description": "Full URL to inspect"}
        },
        "required": ["site_url", "page_url"]
    })
}

fn url_batch_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "site_url": site_url_property(),
            "urls": {
                "type": "string",
                "description": "Newline-separated list of URLs (at most 10)"
            }
        },
        "required": ["site_url", "urls"]
    })
}

fn list_sitemaps_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "site_url": site_url_property(),
            "sitemap_index": {
                "type": "string",
                "description": "URL of a sitemap index; when set, its child sitemaps are listed"
            }
        },
        "required": ["site_url"]
    })
}

fn sitemap_url_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "site_url": site_url_property(),
            "sitemap_url": {"type": "string", "description": "Full URL of the sitemap"}
        },
        "required": ["site_url", "sitemap_url"]
    })
}

fn manage_sitemaps_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "site_url": site_url_property(),
            "action": {
                "type": "string",
                "enum": ["list", "details", "submit", "delete"],
                "description": "Sitemap action to perform"
            },
            "sitemap_url": {
                "type": "string",
                "description": "Full URL of the sitemap (required for all actions except list)"
            }
        },
        "required": ["site_url", "action"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names_are_unique() {
        let tools = [
            "list_properties",
            "get_site_details",
            "add_site",
            "delete_site",
            "get_search_analytics",
            "get_advanced_search_analytics",
            "get_performance_overview",
            "get_search_by_page_query",
            "compare_search_periods",
            "inspect_url_enhanced",
            "batch_url_inspection",
            "check_indexing_issues",
            "get_sitemaps",
            "list_sitemaps_enhanced",
            "get_sitemap_details",
            "submit_sitemap",
            "delete_sitemap",
            "manage_sitemaps",
        ];
        assert_eq!(tools.len(), 18);

        let mut sorted = tools.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), tools.len());
    }

    #[test]
    fn test_site_arg_validation() {
        assert!(site_arg(json!({"site_url": "sc-domain:example.com"})).is_ok());
        assert!(site_arg(json!({"site_url": "example.com"})).is_err());
        assert!(site_arg(json!({})).is_err());
    }

    #[test]
    fn test_schemas_are_objects() {
        for schema in [
            site_only_schema(),
            search_analytics_schema(),
            advanced_analytics_schema(),
            overview_schema(),
            page_query_schema(),
            compare_periods_schema(),
            inspect_url_schema(),
            url_batch_schema(),
            list_sitemaps_schema(),
            sitemap_url_schema(),
            manage_sitemaps_schema(),
        ] {
            assert_eq!(schema["type"], "object");
            assert!(schema["properties"].is_object());
        }
    }
}
