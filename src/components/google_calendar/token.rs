use crate::error::{auth_error, provider_error, AppResult};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// OAuth scope granting read/write access to calendars
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Google's OAuth token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of a signed assertion; Google caps it at one hour
const ASSERTION_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a service account JSON key that signing needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Read a key from a JSON file
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            auth_error(&format!(
                "Failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&content)
    }

    /// Parse a key from its JSON text
    pub fn from_json(content: &str) -> AppResult<Self> {
        let key: ServiceAccountKey = serde_json::from_str(content)
            .map_err(|e| auth_error(&format!("Invalid service account key: {}", e)))?;

        match key.key_type.as_deref() {
            None | Some("service_account") => Ok(key),
            Some(other) => Err(auth_error(&format!(
                "Expected a service_account key, found '{}'",
                other
            ))),
        }
    }
}

/// JWT claims of a service account assertion
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Build and RS256-sign the assertion exchanged for an access token
pub fn sign_assertion(key: &ServiceAccountKey, now: i64) -> AppResult<String> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let claims = AssertionClaims {
        iss: key.client_email.clone(),
        scope: CALENDAR_SCOPE.to_string(),
        aud: key.token_uri.clone(),
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| auth_error(&format!("Invalid private key: {}", e)))?;

    encode(&header, &claims, &encoding_key)
        .map_err(|e| auth_error(&format!("Failed to sign assertion: {}", e)))
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// A bearer token for the Calendar API
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken").finish_non_exhaustive()
    }
}

/// Exchanges service account credentials for access tokens.
///
/// The key is re-read and a fresh token requested on every call; nothing is
/// cached between requests.
#[derive(Clone)]
pub struct TokenManager {
    credentials_file: PathBuf,
    client: Client,
}

impl TokenManager {
    pub fn new(credentials_file: PathBuf, client: Client) -> Self {
        Self {
            credentials_file,
            client,
        }
    }

    /// Authenticate with the configured service account
    pub async fn get_token(&self) -> AppResult<AccessToken> {
        let key = ServiceAccountKey::from_file(&self.credentials_file)?;
        let now = Utc::now().timestamp();
        let assertion = sign_assertion(&key, now)?;

        debug!("Requesting access token for {}", key.client_email);

        let params = [
            ("grant_type", JWT_BEARER_GRANT),
            ("assertion", assertion.as_str()),
        ];

        let response = self
            .client
            .post(&key.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| provider_error(&format!("Failed to reach token endpoint: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Token request rejected: HTTP {} - {}",
                status, error_body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

        Ok(AccessToken {
            token: token.access_token,
        })
    }
}
