use std::fmt::{self, Debug};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use tracing::debug;
use url::Url;

use crate::client::HttpClient;
use crate::credentials::{SPREADSHEETS_SCOPE, ServiceAccount};
use crate::errors::Result;
use crate::google::GoogleSheetsClient;
use crate::spreadsheet::SpreadsheetClient;

/// Reused tokens are refreshed once they get this close to expiring.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Upper bound on how long a reused token is trusted, whatever the token
/// endpoint claims.
const MAX_TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Hands out ready to use spreadsheet clients.
#[async_trait]
pub trait ClientProvider: Debug + Send + Sync {
    async fn obtain(&self) -> Result<Arc<dyn SpreadsheetClient>>;
}

/// Always returns the same client.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    client: Arc<dyn SpreadsheetClient>,
}

impl StaticProvider {
    pub fn new(client: Arc<dyn SpreadsheetClient>) -> Self {
        StaticProvider { client }
    }
}

#[async_trait]
impl ClientProvider for StaticProvider {
    async fn obtain(&self) -> Result<Arc<dyn SpreadsheetClient>> {
        Ok(self.client.clone())
    }
}

#[derive(Clone)]
struct ReusableToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl fmt::Debug for ReusableToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReusableToken")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl ReusableToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(TOKEN_EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Authenticates with a service account key file.
///
/// By default every `obtain` reads the key file and does a full token
/// exchange. With token reuse enabled the last token is kept until it's
/// about to expire.
#[derive(Debug)]
pub struct ServiceAccountProvider<C> {
    http: C,
    key_path: PathBuf,
    endpoint: Url,
    /// Only present when token reuse is enabled.
    token: Option<Mutex<Option<ReusableToken>>>,
}

impl<C> ServiceAccountProvider<C>
where
    C: HttpClient,
{
    pub fn new(http: C, key_path: impl Into<PathBuf>, endpoint: Url) -> Self {
        ServiceAccountProvider {
            http,
            key_path: key_path.into(),
            endpoint,
            token: None,
        }
    }

    pub fn with_token_reuse(mut self, reuse: bool) -> Self {
        self.token = reuse.then(|| Mutex::new(None));
        self
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    async fn access_token(&self) -> Result<String> {
        if let Some(slot) = &self.token {
            let now = Utc::now();
            let reusable = slot
                .lock()
                .as_ref()
                .filter(|tok| tok.is_fresh(now))
                .map(|tok| tok.access_token.clone());
            if let Some(access_token) = reusable {
                debug!("reusing access token");
                return Ok(access_token);
            }
        }

        // Requests racing on an empty or stale slot each fetch their own
        // token. The last one stored wins.
        let account = ServiceAccount::from_file(&self.key_path).await?;
        let fetched_at = Utc::now();
        let token = account
            .fetch_access_token(&self.http, SPREADSHEETS_SCOPE)
            .await?;
        debug!(client_email = %account.client_email, expires_in = token.expires_in, "fetched access token");

        if let Some(slot) = &self.token {
            let lifetime = i64::try_from(token.expires_in)
                .unwrap_or(0)
                .min(MAX_TOKEN_LIFETIME_SECS);
            *slot.lock() = Some(ReusableToken {
                access_token: token.access_token.clone(),
                expires_at: fetched_at + TimeDelta::seconds(lifetime),
            });
        }

        Ok(token.access_token)
    }
}

#[async_trait]
impl<C> ClientProvider for ServiceAccountProvider<C>
where
    C: HttpClient,
{
    async fn obtain(&self) -> Result<Arc<dyn SpreadsheetClient>> {
        let access_token = self.access_token().await?;
        let client = GoogleSheetsClient::new(self.http.clone(), self.endpoint.clone(), &access_token)?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{Method, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::client::ReqwestClient;
    use crate::errors::{ErrorKind, SheetsError};
    use crate::testutil::{FakeUpstream, service_account_json};

    /// Answers token requests on `/token` and values reads everywhere else.
    async fn fake_google() -> FakeUpstream {
        FakeUpstream::spawn(|req| {
            if req.path == "/token" {
                (
                    StatusCode::OK,
                    json!({"access_token": "ya29.fake", "expires_in": 3599}).to_string(),
                )
            } else {
                (
                    StatusCode::OK,
                    json!({"range": "Sheet1!A1", "values": [["hi"]]}).to_string(),
                )
            }
        })
        .await
    }

    fn write_key_file(dir: &tempfile::TempDir, upstream: &FakeUpstream) -> PathBuf {
        let path = dir.path().join("credentials.json");
        let token_uri = upstream.url.join("token").unwrap();
        std::fs::write(&path, service_account_json(&token_uri)).unwrap();
        path
    }

    fn token_requests(upstream: &FakeUpstream) -> usize {
        upstream
            .requests()
            .iter()
            .filter(|r| r.path == "/token")
            .count()
    }

    #[tokio::test]
    async fn obtained_client_uses_fetched_token() {
        let upstream = fake_google().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_key_file(&dir, &upstream);

        let provider = ServiceAccountProvider::new(ReqwestClient::default(), path, upstream.url.clone());
        let client = provider.obtain().await.unwrap();
        let range = client.get("sid", "Sheet1!A1").await.unwrap();
        assert_eq!(1, range.num_rows());

        let request = upstream.last_request();
        assert_eq!(Method::GET, request.method);
        assert_eq!(Some("Bearer ya29.fake"), request.authorization());
    }

    #[tokio::test]
    async fn fresh_handshake_per_obtain() {
        let upstream = fake_google().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_key_file(&dir, &upstream);

        let provider = ServiceAccountProvider::new(ReqwestClient::default(), path, upstream.url.clone());
        provider.obtain().await.unwrap();
        provider.obtain().await.unwrap();

        assert_eq!(2, token_requests(&upstream));
    }

    #[tokio::test]
    async fn token_reuse_fetches_once() {
        let upstream = fake_google().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_key_file(&dir, &upstream);

        let provider = ServiceAccountProvider::new(ReqwestClient::default(), path, upstream.url.clone())
            .with_token_reuse(true);
        for _ in 0..3 {
            provider.obtain().await.unwrap();
        }

        assert_eq!(1, token_requests(&upstream));
    }

    #[tokio::test]
    async fn missing_key_file_fails_obtain() {
        let upstream = fake_google().await;
        let dir = tempfile::tempdir().unwrap();

        let provider = ServiceAccountProvider::new(
            ReqwestClient::default(),
            dir.path().join("credentials.json"),
            upstream.url.clone(),
        );
        let err = provider.obtain().await.unwrap_err();
        assert!(matches!(err, SheetsError::CredentialsIo { .. }), "{err}");
        assert_eq!(ErrorKind::Credentials, err.kind());
        assert!(upstream.requests().is_empty());
    }

    #[test]
    fn token_freshness_margin() {
        let now = Utc::now();
        let token = ReusableToken {
            access_token: "tok".to_string(),
            expires_at: now + TimeDelta::seconds(90),
        };
        assert!(token.is_fresh(now));
        assert!(!token.is_fresh(now + TimeDelta::seconds(31)));
    }
}
