//! Sitemap management
//!
//! Dispatches the list / details / submit / delete actions against the
//! sitemaps endpoints. Details on a sitemap index also enumerates the child
//! sitemaps it references.

use serde::Serialize;

use crate::error::Result;
use crate::gsc::client::GscClient;
use crate::gsc::params::SitemapAction;
use crate::gsc::types::WmxSitemap;

/// One sitemap flattened for output
#[derive(Debug, Clone, Serialize)]
pub struct SitemapSummary {
    pub path: String,
    pub last_submitted: Option<String>,
    pub last_downloaded: Option<String>,
    pub is_pending: bool,
    pub is_sitemaps_index: bool,
    pub errors: i64,
    pub warnings: i64,
    pub contents: Vec<SitemapContentSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SitemapContentSummary {
    pub content_type: String,
    pub submitted: i64,
    pub indexed: i64,
}

impl From<WmxSitemap> for SitemapSummary {
    fn from(sitemap: WmxSitemap) -> Self {
        Self {
            path: sitemap.path.unwrap_or_default(),
            last_submitted: sitemap.last_submitted,
            last_downloaded: sitemap.last_downloaded,
            is_pending: sitemap.is_pending,
            is_sitemaps_index: sitemap.is_sitemaps_index,
            errors: sitemap.errors,
            warnings: sitemap.warnings,
            contents: sitemap
                .contents
                .into_iter()
                .map(|content| SitemapContentSummary {
                    content_type: content.content_type.unwrap_or_default(),
                    submitted: content.submitted.unwrap_or(0),
                    indexed: content.indexed.unwrap_or(0),
                })
                .collect(),
        }
    }
}

/// Result of one dispatched sitemap action
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SitemapActionResult {
    List {
        site_url: String,
        sitemaps: Vec<SitemapSummary>,
    },
    Details {
        site_url: String,
        sitemap: SitemapSummary,
        /// Children of a sitemap index, empty for a plain sitemap
        children: Vec<SitemapSummary>,
    },
    Submit {
        site_url: String,
        sitemap_url: String,
        sitemap: SitemapSummary,
    },
    Delete {
        site_url: String,
        sitemap_url: String,
    },
}

/// Runs sitemap actions against the API
pub struct SitemapManager<'a> {
    client: &'a GscClient,
}

impl<'a> SitemapManager<'a> {
    pub fn new(client: &'a GscClient) -> Self {
        Self { client }
    }

    /// Dispatch one action. `sitemap_url` has already been validated as
    /// present for the actions that need it.
    pub async fn dispatch(
        &self,
        action: SitemapAction,
        site_url: &str,
        sitemap_url: Option<&str>,
    ) -> Result<SitemapActionResult> {
        match action {
            SitemapAction::List => self.list(site_url).await,
            SitemapAction::Details => self.details(site_url, required(sitemap_url)).await,
            SitemapAction::Submit => self.submit(site_url, required(sitemap_url)).await,
            SitemapAction::Delete => self.delete(site_url, required(sitemap_url)).await,
        }
    }

    async fn list(&self, site_url: &str) -> Result<SitemapActionResult> {
        let sitemaps = self.client.list_sitemaps(site_url, None).await?;
        Ok(SitemapActionResult::List {
            site_url: site_url.to_string(),
            sitemaps: sitemaps.into_iter().map(Into::into).collect(),
        })
    }

    async fn details(&self, site_url: &str, sitemap_url: &str) -> Result<SitemapActionResult> {
        let sitemap = self.client.get_sitemap(site_url, sitemap_url).await?;

        let children = if sitemap.is_sitemaps_index {
            let nested = self.client.list_sitemaps(site_url, Some(sitemap_url)).await?;
            nested.into_iter().map(Into::into).collect()
        } else {
            Vec::new()
        };

        Ok(SitemapActionResult::Details {
            site_url: site_url.to_string(),
            sitemap: sitemap.into(),
            children,
        })
    }

    /// Submission is idempotent upstream; resubmitting asks for a re-crawl.
    async fn submit(&self, site_url: &str, sitemap_url: &str) -> Result<SitemapActionResult> {
        self.client.submit_sitemap(site_url, sitemap_url).await?;

        // Re-fetch so the caller sees the post-submit state.
        let sitemap = self.client.get_sitemap(site_url, sitemap_url).await?;

        Ok(SitemapActionResult::Submit {
            site_url: site_url.to_string(),
            sitemap_url: sitemap_url.to_string(),
            sitemap: sitemap.into(),
        })
    }

    /// Checks existence first so deleting an unknown sitemap fails with
    /// a not-found error instead of silently succeeding.
    async fn delete(&self, site_url: &str, sitemap_url: &str) -> Result<SitemapActionResult> {
        self.client.get_sitemap(site_url, sitemap_url).await?;
        self.client.delete_sitemap(site_url, sitemap_url).await?;

        Ok(SitemapActionResult::Delete {
            site_url: site_url.to_string(),
            sitemap_url: sitemap_url.to_string(),
        })
    }
}

// Parameter presence is enforced during argument validation, before any
// network call, so this is unreachable in practice.
fn required(sitemap_url: Option<&str>) -> &str {
    sitemap_url.unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gsc::types::WmxSitemapContent;

    #[test]
    fn test_summary_from_wire_type() {
        let sitemap = WmxSitemap {
            path: Some("https://example.com/sitemap.xml".to_string()),
            last_submitted: Some("2025-06-01T00:00:00Z".to_string()),
            is_pending: false,
            is_sitemaps_index: true,
            errors: 2,
            warnings: 5,
            contents: vec![WmxSitemapContent {
                content_type: Some("web".to_string()),
                submitted: Some(120),
                indexed: Some(98),
            }],
            ..Default::default()
        };

        let summary: SitemapSummary = sitemap.into();
        assert_eq!(summary.path, "https://example.com/sitemap.xml");
        assert!(summary.is_sitemaps_index);
        assert_eq!(summary.errors, 2);
        assert_eq!(summary.contents.len(), 1);
        assert_eq!(summary.contents[0].content_type, "web");
        assert_eq!(summary.contents[0].indexed, 98);
    }

    #[test]
    fn test_summary_defaults_for_sparse_sitemap() {
        let summary: SitemapSummary = WmxSitemap::default().into();
        assert_eq!(summary.path, "");
        assert!(!summary.is_pending);
        assert_eq!(summary.warnings, 0);
        assert!(summary.contents.is_empty());
    }
}
