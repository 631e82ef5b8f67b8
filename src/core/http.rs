// ─── HTTP ───
// The launcher's only window onto the network. Everything the core needs
// from remote services goes through `RemoteApi`, so tests can swap in a fake.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::VersionManifest;

pub const APP_USER_AGENT: &str = "LaunchiCube/0.1.0";

// Content-Length is only a hint for the initial buffer size.
const MAX_PREALLOC: u64 = 8 * 1024 * 1024;

pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(user_agent)
        .default_headers(default_headers)
        .cookie_store(true)
        .build()
}

/// Result of a credential check against the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub authenticated: bool,
    /// Username with the server's capitalization.
    pub username: String,
}

#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Fetch and parse the version manifest.
    async fn fetch_manifest(&self) -> LauncherResult<VersionManifest>;

    /// Check credentials. Wrong credentials are `authenticated: false`, not an error.
    async fn login(&self, username: &str, password: &str) -> LauncherResult<LoginResponse>;

    /// Fetch raw bytes, failing on any non-success status.
    async fn fetch_bytes(&self, url: &str) -> LauncherResult<Vec<u8>>;
}

/// Endpoints used by [`HttpRemote`].
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub manifest_url: String,
    pub login_url: String,
}

pub struct HttpRemote {
    client: Client,
    endpoints: Endpoints,
}

#[derive(Debug, Deserialize)]
struct LoginTokenBody {
    #[serde(default)]
    token: String,
}

#[derive(Debug, Deserialize)]
struct LoginResultBody {
    #[serde(default)]
    authenticated: bool,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

impl HttpRemote {
    pub fn new(client: Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    async fn checked_get(&self, url: &str) -> LauncherResult<reqwest::Response> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RemoteApi for HttpRemote {
    async fn fetch_manifest(&self) -> LauncherResult<VersionManifest> {
        info!("Fetching version manifest...");
        let manifest: VersionManifest = self
            .checked_get(&self.endpoints.manifest_url)
            .await?
            .json()
            .await?;
        info!(
            "Loaded {} stable / {} dev versions",
            manifest.stable.len(),
            manifest.dev.len()
        );
        Ok(manifest)
    }

    async fn login(&self, username: &str, password: &str) -> LauncherResult<LoginResponse> {
        info!("Logging in as {}", username);

        // The login form is CSRF-protected: fetch a token first, the session
        // cookie it sets is kept by the client's cookie store.
        let token: LoginTokenBody = self
            .checked_get(&self.endpoints.login_url)
            .await?
            .json()
            .await?;

        let body: LoginResultBody = self
            .client
            .post(&self.endpoints.login_url)
            .form(&[
                ("username", username),
                ("password", password),
                ("token", token.token.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        if !body.errors.is_empty() {
            debug!("Login rejected: {:?}", body.errors);
        }

        Ok(LoginResponse {
            authenticated: body.authenticated,
            username: body.username.unwrap_or_else(|| username.to_string()),
        })
    }

    async fn fetch_bytes(&self, url: &str) -> LauncherResult<Vec<u8>> {
        let response = self.checked_get(url).await?;
        let hint = response.content_length().unwrap_or(0).min(MAX_PREALLOC);
        let mut buffer = Vec::with_capacity(hint as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        debug!("Fetched {} bytes from {}", buffer.len(), url);
        Ok(buffer)
    }
}
