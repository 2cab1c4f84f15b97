//! Response formatting
//!
//! Pure transforms from engine output to tool-result text: a one-line
//! human-readable summary followed by the structured payload as pretty JSON.
//! Metric rounding happens only here. Fields the upstream API left out stay
//! null in the payload instead of being fabricated.

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::gsc::analytics::AnalyticsRow;
use crate::gsc::params::Dimension;

/// CTR is reported as a fraction with four decimal places
pub fn round_ctr(ctr: f64) -> f64 {
    (ctr * 10_000.0).round() / 10_000.0
}

/// Position is averaged and 1-indexed; one decimal place
pub fn round_position(position: f64) -> f64 {
    (position * 10.0).round() / 10.0
}

pub fn format_ctr(ctr: f64) -> String {
    format!("{:.4}", ctr)
}

pub fn format_position(position: f64) -> String {
    format!("{:.1}", position)
}

pub const NULL_MARKER: &str = "null";

pub fn or_null(value: Option<&str>) -> &str {
    value.unwrap_or(NULL_MARKER)
}

/// Summary line plus pretty-printed structured data
pub fn payload<T: Serialize>(summary: &str, data: &T) -> Result<String> {
    let body = serde_json::to_string_pretty(data)?;
    Ok(format!("{}\n\n{}", summary, body))
}

/// Summary line only, for confirmations with no structured body
pub fn confirmation(summary: &str) -> String {
    summary.to_string()
}

/// One analytics row as a JSON object: each dimension by name, then the four
/// metrics with the rounding policy applied.
pub fn analytics_row_json(row: &AnalyticsRow, dimensions: &[Dimension]) -> Value {
    let mut object = serde_json::Map::new();

    for (dimension, key) in dimensions.iter().zip(row.keys.iter()) {
        object.insert(dimension.as_str().to_string(), json!(key));
    }
    // A keys/dimensions length mismatch is upstream malformation; surface the
    // extra values rather than dropping them.
    if row.keys.len() > dimensions.len() {
        object.insert("extra_keys".to_string(), json!(row.keys[dimensions.len()..]));
    }

    object.insert("clicks".to_string(), json!(row.clicks));
    object.insert("impressions".to_string(), json!(row.impressions));
    object.insert("ctr".to_string(), json!(round_ctr(row.ctr)));
    object.insert("position".to_string(), json!(round_position(row.position)));

    Value::Object(object)
}

pub fn analytics_rows_json(rows: &[AnalyticsRow], dimensions: &[Dimension]) -> Value {
    Value::Array(
        rows.iter()
            .map(|row| analytics_row_json(row, dimensions))
            .collect(),
    )
}

/// Summary line for an analytics result set
pub fn analytics_summary(site_url: &str, start: &str, end: &str, row_count: usize) -> String {
    format!(
        "Search analytics for {}: {} row(s), {} to {}",
        site_url, row_count, start, end
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(keys: Vec<&str>, clicks: f64, impressions: f64, position: f64) -> AnalyticsRow {
        let ctr = if impressions > 0.0 { clicks / impressions } else { 0.0 };
        AnalyticsRow {
            keys: keys.into_iter().map(String::from).collect(),
            clicks,
            impressions,
            ctr,
            position,
        }
    }

    #[test]
    fn test_ctr_rounding() {
        assert_eq!(round_ctr(0.123_456), 0.1235);
        assert_eq!(round_ctr(0.0), 0.0);
        assert_eq!(format_ctr(0.05), "0.0500");
    }

    #[test]
    fn test_position_rounding() {
        assert_eq!(round_position(3.44), 3.4);
        assert_eq!(round_position(3.45), 3.5);
        assert_eq!(format_position(12.0), "12.0");
    }

    #[test]
    fn test_row_json_maps_dimensions_by_name() {
        let dims = vec![Dimension::Query, Dimension::Page];
        let value = analytics_row_json(
            &row(vec!["rust mcp", "https://example.com/a"], 10.0, 200.0, 4.26),
            &dims,
        );

        assert_eq!(value["query"], "rust mcp");
        assert_eq!(value["page"], "https://example.com/a");
        assert_eq!(value["clicks"], 10.0);
        assert_eq!(value["ctr"], 0.05);
        assert_eq!(value["position"], 4.3);
    }

    #[test]
    fn test_row_json_keeps_excess_keys() {
        let value = analytics_row_json(
            &row(vec!["a", "b"], 1.0, 1.0, 1.0),
            &[Dimension::Query],
        );
        assert_eq!(value["query"], "a");
        assert_eq!(value["extra_keys"], json!(["b"]));
    }

    #[test]
    fn test_payload_layout() {
        let text = payload("2 row(s)", &json!({"rows": 2})).unwrap();
        assert!(text.starts_with("2 row(s)\n\n{"));
    }

    #[test]
    fn test_or_null() {
        assert_eq!(or_null(Some("x")), "x");
        assert_eq!(or_null(None), "null");
    }
}
