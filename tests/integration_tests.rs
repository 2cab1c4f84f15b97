//! Integration tests for the Search Console MCP server
//!
//! These tests verify MCP protocol handling, argument shapes and the
//! validation and engine layers. No real Search Console API calls are made.

use serde_json::{json, Value};

/// Helper to create a JSON-RPC request
fn make_request(id: i64, method: &str, params: Option<Value>) -> Value {
    let mut request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
    });
    if let Some(p) = params {
        request["params"] = p;
    }
    request
}

mod mcp_protocol_tests {
    use super::*;

    #[test]
    fn test_initialize_request_format() {
        let request = make_request(1, "initialize", Some(json!({
            "protocolVersion": "2024-11-05",
            "clientInfo": {
                "name": "test-client",
                "version": "1.0.0"
            },
            "capabilities": {}
        })));

        assert_eq!(request["method"], "initialize");
        assert_eq!(request["id"], 1);
        assert!(request["params"]["protocolVersion"].is_string());
    }

    #[test]
    fn test_list_tools_request_format() {
        let request = make_request(2, "tools/list", None);
        assert_eq!(request["method"], "tools/list");
        assert_eq!(request["id"], 2);
    }

    #[test]
    fn test_call_tool_request_format() {
        let request = make_request(3, "tools/call", Some(json!({
            "name": "get_search_analytics",
            "arguments": {
                "site_url": "sc-domain:example.com",
                "days": 28,
                "dimensions": "query,page"
            }
        })));

        assert_eq!(request["method"], "tools/call");
        assert_eq!(request["params"]["name"], "get_search_analytics");
        assert_eq!(request["params"]["arguments"]["site_url"], "sc-domain:example.com");
    }

    #[test]
    fn test_jsonrpc_response_structure() {
        let response: Value =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":{"tools":[]}}"#).unwrap();

        assert_eq!(response["jsonrpc"], "2.0");
        assert_eq!(response["id"], 1);
        assert!(response["result"].is_object());
        assert!(response["error"].is_null());
    }

    #[test]
    fn test_jsonrpc_error_response_structure() {
        let response: Value = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found: unknown"}}"#,
        )
        .unwrap();

        assert_eq!(response["jsonrpc"], "2.0");
        assert!(response["result"].is_null());
        assert_eq!(response["error"]["code"], -32601);
    }
}

mod tool_schema_tests {
    use super::*;

    #[test]
    fn test_advanced_analytics_arguments() {
        let args = json!({
            "site_url": "https://example.com/",
            "start_date": "2026-06-01",
            "end_date": "2026-06-30",
            "dimensions": "query",
            "search_type": "web",
            "filter_dimension": "page",
            "filter_operator": "contains",
            "filter_expression": "/blog/",
            "sort_by": "impressions",
            "sort_direction": "descending",
            "row_limit": 100,
            "start_row": 0
        });

        assert!(args["site_url"].is_string());
        assert!(args["start_date"].is_string());
        assert!(args["end_date"].is_string());
        assert!(args["row_limit"].is_number());
    }

    #[test]
    fn test_compare_periods_arguments() {
        let args = json!({
            "site_url": "sc-domain:example.com",
            "period1_start": "2026-06-01",
            "period1_end": "2026-06-30",
            "period2_start": "2026-07-01",
            "period2_end": "2026-07-31",
            "dimensions": "query",
            "rank_by": "clicks",
            "top_n": 10
        });

        assert!(args["period1_start"].is_string());
        assert!(args["period2_end"].is_string());
        assert!(args["top_n"].is_number());
    }

    #[test]
    fn test_batch_inspection_arguments() {
        let args = json!({
            "site_url": "sc-domain:example.com",
            "urls": "https://example.com/a\nhttps://example.com/b"
        });

        assert!(args["urls"].is_string());
        assert_eq!(args["urls"].as_str().unwrap().lines().count(), 2);
    }

    #[test]
    fn test_manage_sitemaps_arguments() {
        let args = json!({
            "site_url": "sc-domain:example.com",
            "action": "submit",
            "sitemap_url": "https://example.com/sitemap.xml"
        });

        assert!(args["action"].is_string());
        assert!(args["sitemap_url"].is_string());
    }
}

mod validation_tests {
    use chrono::NaiveDate;
    use gsc_mcp_server_rust::gsc::params::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_property_identifier_shapes() {
        assert!(validate_site_url("sc-domain:example.com").is_ok());
        assert!(validate_site_url("https://example.com/").is_ok());
        assert!(validate_site_url("ftp://example.com/").is_err());
        assert!(validate_site_url("example.com").is_err());
    }

    #[test]
    fn test_date_range_end_clipped_to_reporting_lag() {
        let range = DateRange::explicit("2026-08-01", "2026-08-29", d("2026-08-29")).unwrap();
        assert_eq!(range.end, d("2026-08-27"));
    }

    #[test]
    fn test_inverted_date_range_rejected() {
        assert!(DateRange::explicit("2026-08-20", "2026-08-01", d("2026-08-29")).is_err());
    }

    #[test]
    fn test_url_batch_cap_enforced() {
        let eleven: String = (0..11).map(|i| format!("https://a.com/{}\n", i)).collect();
        assert!(inspection_url_list(&eleven).is_err());

        let two = "https://a.com/1\nhttps://a.com/2";
        assert_eq!(inspection_url_list(two).unwrap().len(), 2);
    }

    #[test]
    fn test_dimension_list_parsing() {
        let dims = parse_dimensions("query,page").unwrap();
        assert_eq!(dims.len(), 2);
        assert!(parse_dimensions("query,bogus").is_err());
    }
}

mod analytics_tests {
    use gsc_mcp_server_rust::gsc::analytics::{sort_rows, AnalyticsRow, SortDirection};
    use gsc_mcp_server_rust::gsc::params::SortMetric;
    use gsc_mcp_server_rust::gsc::types::ApiDataRow;

    fn row(key: &str, clicks: f64, impressions: f64) -> AnalyticsRow {
        AnalyticsRow::from_api(ApiDataRow {
            keys: vec![key.to_string()],
            clicks,
            impressions,
            ctr: 0.0,
            position: 1.0,
        })
    }

    #[test]
    fn test_ctr_always_recomputed() {
        let r = row("q", 7.0, 140.0);
        assert_eq!(r.ctr, 0.05);

        let no_impressions = row("q", 0.0, 0.0);
        assert_eq!(no_impressions.ctr, 0.0);
    }

    #[test]
    fn test_repeated_sorts_are_identical() {
        let build = || {
            vec![
                row("beta", 5.0, 50.0),
                row("alpha", 5.0, 50.0),
                row("gamma", 9.0, 50.0),
            ]
        };

        let mut first = build();
        let mut second = build();
        second.reverse();

        sort_rows(&mut first, SortMetric::Clicks, SortDirection::Descending);
        sort_rows(&mut second, SortMetric::Clicks, SortDirection::Descending);

        let keys1: Vec<&str> = first.iter().map(|r| r.keys[0].as_str()).collect();
        let keys2: Vec<&str> = second.iter().map(|r| r.keys[0].as_str()).collect();
        assert_eq!(keys1, keys2);
        assert_eq!(keys1, vec!["gamma", "alpha", "beta"]);
    }
}

mod wire_types_tests {
    use gsc_mcp_server_rust::gsc::types::*;

    #[test]
    fn test_sitemap_int64_as_string() {
        let json = r#"{
            "path": "https://example.com/sitemap.xml",
            "isPending": false,
            "isSitemapsIndex": false,
            "errors": "3",
            "warnings": 7
        }"#;

        let sitemap: WmxSitemap = serde_json::from_str(json).unwrap();
        assert_eq!(sitemap.errors, 3);
        assert_eq!(sitemap.warnings, 7);
    }

    #[test]
    fn test_inspection_response_sparse_fields() {
        let json = r#"{
            "inspectionResult": {
                "indexStatusResult": {
                    "verdict": "PASS",
                    "coverageState": "Submitted and indexed"
                }
            }
        }"#;

        let response: InspectUrlResponse = serde_json::from_str(json).unwrap();
        let status = response
            .inspection_result
            .unwrap()
            .index_status_result
            .unwrap();
        assert_eq!(status.verdict.as_deref(), Some("PASS"));
        assert_eq!(status.last_crawl_time, None);
        assert!(status.sitemap.is_empty());
    }

    #[test]
    fn test_analytics_row_defaults() {
        let json = r#"{"rows": [{"keys": ["rust"], "clicks": 12, "impressions": 300}]}"#;
        let response: SearchAnalyticsQueryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.rows.len(), 1);
        assert_eq!(response.rows[0].clicks, 12.0);
        assert_eq!(response.rows[0].position, 0.0);
    }
}

mod mcp_types_tests {
    use gsc_mcp_server_rust::mcp::types::*;

    #[test]
    fn test_tool_result_text() {
        let result = CallToolResult::text("3 propert(ies) accessible");
        assert!(!result.is_error);
        assert_eq!(result.content.len(), 1);
    }

    #[test]
    fn test_tool_result_error() {
        let result = CallToolResult::error("site not found: sc-domain:missing.com");
        assert!(result.is_error);

        let ToolResultContent::Text { text } = &result.content[0];
        assert!(text.contains("Error:"));
        assert!(text.contains("sc-domain:missing.com"));
    }

    #[test]
    fn test_request_id_variants() {
        let json_num = serde_json::to_string(&RequestId::Number(42)).unwrap();
        let json_str = serde_json::to_string(&RequestId::String("req-123".to_string())).unwrap();

        assert_eq!(json_num, "42");
        assert_eq!(json_str, "\"req-123\"");
    }

    #[test]
    fn test_jsonrpc_response_success() {
        let response =
            JsonRpcResponse::success(RequestId::Number(1), serde_json::json!({"status": "ok"}));

        assert!(response.result.is_some());
        assert!(response.error.is_none());
    }

    #[test]
    fn test_jsonrpc_response_error() {
        let response = JsonRpcResponse::error(
            RequestId::Number(1),
            JsonRpcError::method_not_found("unknown_method"),
        );

        assert!(response.result.is_none());
        assert_eq!(response.error.as_ref().unwrap().code, -32601);
    }
}
