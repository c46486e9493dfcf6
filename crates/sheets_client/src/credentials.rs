use std::fmt;
use std::path::Path;

use base64::Engine;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Method, Request};
use ring::signature::RsaKeyPair;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::client::{HttpClient, HttpResponse, fallback_message, read_body, set_form_body};
use crate::errors::{Result, SheetsError};

/// Full read/write access to spreadsheets.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for the signed assertion, in seconds.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// A service account key file as downloaded from the cloud console.
///
/// Only the fields needed for the jwt bearer flow are required.
#[derive(Deserialize)]
pub struct ServiceAccount {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    private_key: String,
    pub client_email: String,
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'static str,
    typ: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Error body returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl ServiceAccount {
    pub fn try_from_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|e| {
            SheetsError::InvalidCredentials(format!(
                "Failed to deserialize json service account key: {e}"
            ))
        })
    }

    /// Read and parse a key file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| SheetsError::CredentialsIo {
                    path: path.to_path_buf(),
                    source,
                })?;
        Self::try_from_str(&contents)
    }

    /// Build the RS256 signed assertion exchanged for an access token.
    pub fn signed_assertion(&self, scope: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = JwtClaims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + TimeDelta::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
        };
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
            kid: self.private_key_id.as_deref(),
        };

        let header_b64 = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_string(&header)?);
        let claims_b64 = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_string(&claims)?);
        let signing_input = format!("{}.{}", header_b64, claims_b64);

        let key_pair = self.key_pair()?;

        // Sign with PKCS#1 v1.5 SHA-256 (RS256)
        let mut signature = vec![0; key_pair.public().modulus_len()];
        key_pair
            .sign(
                &ring::signature::RSA_PKCS1_SHA256,
                &ring::rand::SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| SheetsError::InvalidCredentials("Failed to sign payload".to_string()))?;

        let sig_b64 = BASE64_URL_SAFE_NO_PAD.encode(&signature);
        Ok(format!("{}.{}", signing_input, sig_b64))
    }

    fn key_pair(&self) -> Result<RsaKeyPair> {
        let invalid = |msg: String| SheetsError::InvalidCredentials(msg);

        let mut reader = std::io::Cursor::new(self.private_key.as_bytes());
        let key = rustls_pemfile::read_one(&mut reader)
            .map_err(|e| invalid(format!("invalid PEM private key: {e}")))?;
        match key {
            Some(rustls_pemfile::Item::Pkcs8Key(der)) => {
                RsaKeyPair::from_pkcs8(der.secret_pkcs8_der()).map_err(|e| {
                    invalid(format!(
                        "Failed to create rsa key pair from pkcs8 key: {e}"
                    ))
                })
            }
            Some(rustls_pemfile::Item::Pkcs1Key(der)) => {
                RsaKeyPair::from_der(der.secret_pkcs1_der()).map_err(|e| {
                    invalid(format!(
                        "Failed to create rsa key pair from pkcs1 key: {e}"
                    ))
                })
            }
            _ => Err(invalid("Missing key".to_string())),
        }
    }

    /// Fetch an access token for `scope` using this service account.
    pub async fn fetch_access_token<C>(&self, client: &C, scope: &str) -> Result<AccessToken>
    where
        C: HttpClient,
    {
        let jwt = self.signed_assertion(scope, Utc::now())?;

        // Exchange the JWT for an access token
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", &jwt)];
        let url = Url::parse(&self.token_uri).map_err(|e| {
            SheetsError::InvalidCredentials(format!("Failed to parse token uri as url: {e}"))
        })?;
        let mut request = Request::new(Method::POST, url);
        set_form_body(&mut request, &params)?;

        debug!(client_email = %self.client_email, token_uri = %self.token_uri, "requesting access token");

        let resp = client.do_request(request).await?;
        let status = resp.status();
        let body = read_body(resp.into_bytes_stream()).await?;

        if !status.is_success() {
            let message = match serde_json::from_slice::<TokenErrorResponse>(&body) {
                Ok(TokenErrorResponse {
                    error_description: Some(desc),
                    ..
                }) if !desc.is_empty() => desc,
                Ok(TokenErrorResponse { error, .. }) => error,
                Err(_) => fallback_message(status, &body),
            };
            return Err(SheetsError::TokenRejected { status, message });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}
