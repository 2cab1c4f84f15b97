//! OAuth authentication for the Search Console API
//!
//! Handles loading client credentials, the interactive browser-based
//! authentication flow, and transparent token refresh. Refresh never
//! surfaces to callers unless it fails, which is fatal for the process.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{AuthError, GscMcpError, Result};

/// Refresh when the token has less than this many seconds left
const REFRESH_MARGIN_SECS: i64 = 300;

/// OAuth client credentials
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthKeys {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

/// OAuth keys file format (can carry "installed" or "web" credentials)
#[derive(Debug, Deserialize)]
struct OAuthKeysFile {
    #[serde(alias = "web")]
    installed: Option<OAuthKeys>,
}

/// Stored credentials (tokens)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub access_token: String,
    pub refresh_token: Option<String>,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Expiry timestamp (Unix seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,

    #[serde(default)]
    pub scope: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Token response from the OAuth token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: Option<i64>,
    #[serde(default)]
    scope: String,
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// OAuth authenticator
pub struct Authenticator {
    config: Config,
    http_client: reqwest::Client,
    keys: OAuthKeys,

    /// Current tokens. Refresh is idempotent, so concurrent refreshes are
    /// harmless; the lock only guards the swap.
    credentials: Arc<RwLock<Option<StoredCredentials>>>,
}

impl Authenticator {
    /// Create a new authenticator
    pub async fn new(config: Config) -> Result<Self> {
        config.find_and_copy_oauth_keys()?;

        let keys = Self::load_oauth_keys(&config.oauth_path)?;

        let auth = Self {
            config,
            http_client: reqwest::Client::new(),
            keys,
            credentials: Arc::new(RwLock::new(None)),
        };

        if auth.config.credentials_exist() {
            if let Ok(creds) = auth.load_credentials().await {
                *auth.credentials.write().await = Some(creds);
            }
        }

        Ok(auth)
    }

    fn load_oauth_keys(path: &Path) -> Result<OAuthKeys> {
        if !path.exists() {
            return Err(GscMcpError::Auth(AuthError::KeysFileNotFound {
                path: path.display().to_string(),
            }));
        }

        let content = std::fs::read_to_string(path)?;
        let keys_file: OAuthKeysFile = serde_json::from_str(&content)?;

        keys_file
            .installed
            .ok_or(GscMcpError::Auth(AuthError::InvalidKeysFormat))
    }

    async fn load_credentials(&self) -> Result<StoredCredentials> {
        let content = tokio::fs::read_to_string(&self.config.credentials_path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persist tokens and swap them into the shared slot
    async fn store_credentials(&self, credentials: StoredCredentials) -> Result<()> {
        let content = serde_json::to_string_pretty(&credentials)?;
        tokio::fs::write(&self.config.credentials_path, content).await?;
        *self.credentials.write().await = Some(credentials);
        Ok(())
    }

    /// Check if we have credentials loaded
    pub async fn is_authenticated(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    /// Get a valid access token, refreshing transparently if needed.
    ///
    /// The read guard must be released before refreshing, since the refresh
    /// path takes the write lock to swap in the new tokens.
    pub async fn get_access_token(&self) -> Result<String> {
        let current = {
            let creds = self.credentials.read().await;
            match creds.as_ref() {
                Some(c) => {
                    let expiring = c
                        .expiry_date
                        .is_some_and(|expiry| expiry - unix_now() < REFRESH_MARGIN_SECS);
                    if expiring {
                        None
                    } else {
                        Some(c.access_token.clone())
                    }
                }
                None => {
                    return Err(GscMcpError::Auth(AuthError::CredentialsNotFound {
                        path: self.config.credentials_path.display().to_string(),
                    }))
                }
            }
        };

        match current {
            Some(token) => Ok(token),
            None => self.refresh_token().await,
        }
    }

    /// Refresh the access token using the stored refresh token
    async fn refresh_token(&self) -> Result<String> {
        let refresh_token = self
            .credentials
            .read()
            .await
            .as_ref()
            .and_then(|c| c.refresh_token.clone())
            .ok_or_else(|| {
                GscMcpError::Auth(AuthError::TokenRefreshFailed {
                    message: "No refresh token available".to_string(),
                })
            })?;

        tracing::debug!("Refreshing Search Console access token");

        let params = [
            ("client_id", self.keys.client_id.as_str()),
            ("client_secret", self.keys.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&self.keys.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GscMcpError::Auth(AuthError::TokenRefreshFailed {
                message: text,
            }));
        }

        let token: TokenResponse = response.json().await?;

        let credentials = StoredCredentials {
            access_token: token.access_token.clone(),
            // Google only returns the refresh token on first grant
            refresh_token: token.refresh_token.or(Some(refresh_token)),
            token_type: token.token_type,
            expiry_date: token.expires_in.map(|e| unix_now() + e),
            scope: token.scope,
        };

        let access_token = credentials.access_token.clone();
        self.store_credentials(credentials).await?;

        Ok(access_token)
    }

    /// Generate the authorization URL
    pub fn generate_auth_url(&self) -> String {
        let scopes = self.config.scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.keys.auth_uri,
            urlencoding::encode(&self.keys.client_id),
            urlencoding::encode(&self.config.oauth_callback_url),
            urlencoding::encode(&scopes)
        )
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<()> {
        let params = [
            ("client_id", self.keys.client_id.as_str()),
            ("client_secret", self.keys.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.oauth_callback_url.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.keys.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GscMcpError::Auth(AuthError::TokenExchangeFailed {
                message: text,
            }));
        }

        let token: TokenResponse = response.json().await?;

        let credentials = StoredCredentials {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            token_type: token.token_type,
            expiry_date: token.expires_in.map(|e| unix_now() + e),
            scope: token.scope,
        };

        self.store_credentials(credentials).await
    }

    /// Run the interactive authentication flow with a local callback server
    pub async fn authenticate_interactive(&self) -> Result<()> {
        use axum::{extract::Query, response::Html, routing::get, Router};
        use std::collections::HashMap;
        use tokio::sync::oneshot;

        let auth_url = self.generate_auth_url();
        eprintln!("\nPlease visit this URL to authenticate:");
        eprintln!("{}\n", auth_url);

        if let Err(e) = open::that(&auth_url) {
            eprintln!("Could not open browser automatically: {}", e);
            eprintln!("Please open the URL manually.");
        }

        let (tx, rx) = oneshot::channel::<String>();
        let tx = Arc::new(std::sync::Mutex::new(Some(tx)));

        let tx_clone = tx.clone();
        let callback_handler = move |Query(params): Query<HashMap<String, String>>| async move {
            if let Some(code) = params.get("code") {
                if let Some(tx) = tx_clone.lock().unwrap().take() {
                    let _ = tx.send(code.clone());
                }
                Html("<html><body><h1>Authentication successful!</h1><p>You can close this window.</p></body></html>")
            } else {
                Html("<html><body><h1>Authentication failed</h1><p>No authorization code received.</p></body></html>")
            }
        };

        let app = Router::new().route("/oauth2callback", get(callback_handler));

        let addr = std::net::SocketAddr::from(([127, 0, 0, 1], self.config.oauth_callback_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;

        eprintln!(
            "Waiting for authentication callback on port {}...",
            self.config.oauth_callback_port
        );

        let server = axum::serve(listener, app);

        tokio::select! {
            result = server => {
                if let Err(e) = result {
                    return Err(GscMcpError::Auth(AuthError::CallbackError {
                        message: e.to_string(),
                    }));
                }
            }
            code = rx => {
                match code {
                    Ok(code) => {
                        eprintln!("Received authorization code, exchanging for tokens...");
                        self.exchange_code(&code).await?;
                    }
                    Err(_) => {
                        return Err(GscMcpError::Auth(AuthError::NoAuthCode));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_keys_deserialize() {
        let json = r#"{
            "installed": {
                "client_id": "test-client-id",
                "client_secret": "test-secret",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"
            }
        }"#;

        let keys_file: OAuthKeysFile = serde_json::from_str(json).unwrap();
        assert_eq!(keys_file.installed.unwrap().client_id, "test-client-id");
    }

    #[test]
    fn test_oauth_keys_web_alias() {
        let json = r#"{
            "web": {
                "client_id": "web-client",
                "client_secret": "s",
                "auth_uri": "a",
                "token_uri": "t"
            }
        }"#;

        let keys_file: OAuthKeysFile = serde_json::from_str(json).unwrap();
        assert_eq!(keys_file.installed.unwrap().client_id, "web-client");
    }

    #[test]
    fn test_stored_credentials_roundtrip() {
        let creds = StoredCredentials {
            access_token: "test-token".to_string(),
            refresh_token: Some("refresh-token".to_string()),
            token_type: "Bearer".to_string(),
            expiry_date: Some(1234567890),
            scope: "https://www.googleapis.com/auth/webmasters".to_string(),
        };

        let json = serde_json::to_string(&creds).unwrap();
        let back: StoredCredentials = serde_json::from_str(&json).unwrap();
        assert_eq!(back.access_token, "test-token");
        assert_eq!(back.refresh_token.as_deref(), Some("refresh-token"));
    }
}
