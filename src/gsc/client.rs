//! Search Console API client
//!
//! The single choke point for all upstream calls. Builds requests, attaches
//! the (transparently refreshed) credential, classifies outcomes and retries
//! transient failures with bounded exponential backoff. No other module
//! performs network I/O against the API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::gsc::{API_BASE_URL, INSPECTION_API_URL};
use crate::error::{GscApiError, GscMcpError, Result};
use crate::gsc::auth::Authenticator;
use crate::gsc::types::*;

/// Maximum attempts per call (first try + retries)
const MAX_ATTEMPTS: u32 = 3;

/// Base backoff delay, doubled per attempt
const BASE_DELAY_MS: u64 = 500;

/// How a single HTTP exchange turned out
enum Outcome {
    Success(reqwest::Response),
    /// Rate limiting or a 5xx; worth retrying
    Transient { status: StatusCode, body: String },
    /// A definitive upstream answer; surfaced immediately
    Fatal(GscMcpError),
}

/// Search Console API client
pub struct GscClient {
    http_client: reqwest::Client,
    authenticator: Arc<Authenticator>,
}

impl GscClient {
    /// Create a new client
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            authenticator,
        }
    }

    fn site_url(site: &str) -> String {
        format!("{}/sites/{}", API_BASE_URL, urlencoding::encode(site))
    }

    fn sitemap_url(site: &str, feedpath: &str) -> String {
        format!(
            "{}/sitemaps/{}",
            Self::site_url(site),
            urlencoding::encode(feedpath)
        )
    }

    /// Issue one call with classification and bounded backoff.
    ///
    /// `resource` names what the call addresses; it becomes the subject of a
    /// `NotFound` when the API answers 404.
    async fn call(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        resource: &str,
    ) -> Result<reqwest::Response> {
        let mut attempt = 0;
        let mut last_transient = String::new();

        while attempt < MAX_ATTEMPTS {
            attempt += 1;

            // Credential refresh happens inside; failure there is fatal.
            let token = self.authenticator.get_access_token().await?;

            let mut request = self
                .http_client
                .request(method.clone(), url)
                .bearer_auth(&token);
            if let Some(body) = body {
                request = request.json(body);
            }

            match self.classify(request.send().await, resource).await {
                Outcome::Success(response) => return Ok(response),
                Outcome::Fatal(err) => return Err(err),
                Outcome::Transient { status, body } => {
                    last_transient = format!("{}: {}", status, body);
                    if attempt < MAX_ATTEMPTS {
                        let delay = BASE_DELAY_MS * (1 << (attempt - 1));
                        tracing::warn!(
                            %url,
                            attempt,
                            delay_ms = delay,
                            "transient Search Console failure, backing off"
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }
                }
            }
        }

        Err(GscMcpError::Gsc(GscApiError::UpstreamUnavailable {
            attempts: MAX_ATTEMPTS,
            message: last_transient,
        }))
    }

    /// Classify one exchange into success / transient / fatal
    async fn classify(
        &self,
        result: std::result::Result<reqwest::Response, reqwest::Error>,
        resource: &str,
    ) -> Outcome {
        let response = match result {
            Ok(r) => r,
            // Connection-level failures are as transient as a 503
            Err(e) => {
                return Outcome::Transient {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    body: e.to_string(),
                }
            }
        };

        let status = response.status();
        if status.is_success() {
            return Outcome::Success(response);
        }

        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Outcome::Transient { status, body };
        }

        Outcome::Fatal(GscMcpError::Gsc(fatal_error(status, resource, body)))
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        resource: &str,
    ) -> Result<T> {
        let response = self.call(method, url, body, resource).await?;
        Ok(response.json().await?)
    }

    async fn call_empty(
        &self,
        method: Method,
        url: &str,
        resource: &str,
    ) -> Result<()> {
        self.call(method, url, None, resource).await?;
        Ok(())
    }

    // ==================== Property Operations ====================

    /// List all properties visible to the authenticated user
    pub async fn list_sites(&self) -> Result<Vec<SiteEntry>> {
        let url = format!("{}/sites", API_BASE_URL);
        let list: SitesList = self
            .call_json(Method::GET, &url, None, "site list")
            .await?;
        Ok(list.site_entry)
    }

    /// Get details for one property
    pub async fn get_site(&self, site: &str) -> Result<SiteEntry> {
        self.call_json(Method::GET, &Self::site_url(site), None, site)
            .await
    }

    /// Add a property
    pub async fn add_site(&self, site: &str) -> Result<()> {
        self.call_empty(Method::PUT, &Self::site_url(site), site)
            .await
    }

    /// Remove a property
    pub async fn delete_site(&self, site: &str) -> Result<()> {
        self.call_empty(Method::DELETE, &Self::site_url(site), site)
            .await
    }

    // ==================== Search Analytics ====================

    /// Run one searchanalytics.query page
    pub async fn query_analytics(
        &self,
        site: &str,
        request: &SearchAnalyticsQueryRequest,
    ) -> Result<SearchAnalyticsQueryResponse> {
        let url = format!("{}/searchAnalytics/query", Self::site_url(site));
        let body = serde_json::to_value(request)?;
        self.call_json(Method::POST, &url, Some(&body), site).await
    }

    // ==================== URL Inspection ====================

    /// Inspect a single URL's index status
    pub async fn inspect_url(&self, site: &str, page_url: &str) -> Result<InspectUrlResponse> {
        let request = InspectUrlRequest {
            inspection_url: page_url.to_string(),
            site_url: site.to_string(),
        };
        let body = serde_json::to_value(&request)?;
        self.call_json(Method::POST, INSPECTION_API_URL, Some(&body), page_url)
            .await
    }

    // ==================== Sitemaps ====================

    /// List sitemaps; with `sitemap_index` set, lists that index's children
    pub async fn list_sitemaps(
        &self,
        site: &str,
        sitemap_index: Option<&str>,
    ) -> Result<Vec<WmxSitemap>> {
        let mut url = format!("{}/sitemaps", Self::site_url(site));
        if let Some(index) = sitemap_index {
            url.push_str(&format!("?sitemapIndex={}", urlencoding::encode(index)));
        }
        let list: SitemapsList = self.call_json(Method::GET, &url, None, site).await?;
        Ok(list.sitemap)
    }

    /// Get one sitemap's details
    pub async fn get_sitemap(&self, site: &str, feedpath: &str) -> Result<WmxSitemap> {
        self.call_json(
            Method::GET,
            &Self::sitemap_url(site, feedpath),
            None,
            feedpath,
        )
        .await
    }

    /// Submit (or resubmit) a sitemap
    pub async fn submit_sitemap(&self, site: &str, feedpath: &str) -> Result<()> {
        self.call_empty(Method::PUT, &Self::sitemap_url(site, feedpath), feedpath)
            .await
    }

    /// Delete a sitemap
    pub async fn delete_sitemap(&self, site: &str, feedpath: &str) -> Result<()> {
        self.call_empty(Method::DELETE, &Self::sitemap_url(site, feedpath), feedpath)
            .await
    }
}

/// Map a non-retryable status to its error, keeping the upstream body as the
/// diagnostic on every arm.
fn fatal_error(status: StatusCode, resource: &str, body: String) -> GscApiError {
    match status {
        StatusCode::NOT_FOUND => GscApiError::NotFound {
            resource: resource.to_string(),
            message: body,
        },
        StatusCode::FORBIDDEN => GscApiError::PermissionDenied { message: body },
        StatusCode::CONFLICT => GscApiError::Conflict { message: body },
        _ => GscApiError::RequestFailed {
            message: format!("{}: {}", status, body),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_url_encoding() {
        let url = GscClient::site_url("https://example.com/");
        assert!(url.ends_with("/sites/https%3A%2F%2Fexample.com%2F"));
    }

    #[test]
    fn test_sitemap_url_encoding() {
        let url = GscClient::sitemap_url("sc-domain:example.com", "https://example.com/sitemap.xml");
        assert!(url.contains("/sites/sc-domain%3Aexample.com/sitemaps/"));
        assert!(url.ends_with("https%3A%2F%2Fexample.com%2Fsitemap.xml"));
    }

    #[test]
    fn test_not_found_keeps_upstream_body() {
        let err = fatal_error(
            StatusCode::NOT_FOUND,
            "sc-domain:example.com",
            r#"{"error": {"message": "Site not found in account"}}"#.to_string(),
        );
        let text = err.to_string();
        assert!(text.contains("sc-domain:example.com"));
        assert!(text.contains("Site not found in account"));
    }

    #[test]
    fn test_bad_request_is_fatal_with_body() {
        let err = fatal_error(
            StatusCode::BAD_REQUEST,
            "sc-domain:example.com",
            "invalid dimension".to_string(),
        );
        assert!(matches!(err, GscApiError::RequestFailed { .. }));
        assert!(err.to_string().contains("invalid dimension"));
    }

    #[test]
    fn test_backoff_doubles() {
        let delays: Vec<u64> = (1..MAX_ATTEMPTS)
            .map(|attempt| BASE_DELAY_MS * (1 << (attempt - 1)))
            .collect();
        assert_eq!(delays, vec![500, 1000]);
    }
}
