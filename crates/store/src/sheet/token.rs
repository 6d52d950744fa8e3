//! Access tokens for the spreadsheet API.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use leadboard_shared::config::SheetsAuth;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::SheetError;

/// Assertion lifetime accepted by OAuth token endpoints.
const ASSERTION_TTL_SECS: i64 = 3600;
/// Refresh this long before the cached token expires.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_TTL_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    refresh_at: DateTime<Utc>,
}

/// Where bearer tokens come from.
pub(crate) enum TokenSource {
    Static(String),
    ServiceAccount {
        client_email: String,
        key: EncodingKey,
        token_uri: String,
        scope: String,
        cached: RwLock<Option<CachedToken>>,
    },
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => f.write_str("TokenSource::Static([hidden])"),
            Self::ServiceAccount { client_email, .. } => f
                .debug_struct("TokenSource::ServiceAccount")
                .field("client_email", client_email)
                .finish_non_exhaustive(),
        }
    }
}

impl TokenSource {
    /// Builds a token source from configuration.
    ///
    /// Private keys copied from JSON key files often carry literal `\n`
    /// sequences; those are expanded before the PEM is parsed.
    pub(crate) fn from_config(auth: &SheetsAuth) -> Result<Self, SheetError> {
        match auth {
            SheetsAuth::Bearer { token } => Ok(Self::Static(token.clone())),
            SheetsAuth::ServiceAccount {
                client_email,
                private_key,
                token_uri,
                scope,
            } => {
                let pem = private_key.replace("\\n", "\n");
                let key = EncodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| SheetError::Auth(format!("invalid private key: {e}")))?;
                Ok(Self::ServiceAccount {
                    client_email: client_email.clone(),
                    key,
                    token_uri: token_uri.clone(),
                    scope: scope.clone(),
                    cached: RwLock::new(None),
                })
            }
        }
    }

    /// Returns a valid access token, exchanging a fresh assertion if the
    /// cached one is missing or about to expire.
    pub(crate) async fn access_token(&self, client: &reqwest::Client) -> Result<String, SheetError> {
        let (client_email, key, token_uri, scope, cached) = match self {
            Self::Static(token) => return Ok(token.clone()),
            Self::ServiceAccount {
                client_email,
                key,
                token_uri,
                scope,
                cached,
            } => (client_email, key, token_uri, scope, cached),
        };

        let now = Utc::now();
        if let Some(token) = cached.read().await.as_ref()
            && token.refresh_at > now
        {
            return Ok(token.token.clone());
        }

        let mut slot = cached.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(token) = slot.as_ref()
            && token.refresh_at > now
        {
            return Ok(token.token.clone());
        }

        let claims = AssertionClaims {
            iss: client_email,
            scope,
            aud: token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_TTL_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, key)
            .map_err(|e| SheetError::Auth(format!("failed to sign assertion: {e}")))?;

        let response = client
            .post(token_uri.as_str())
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SheetError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Auth(format!("token endpoint returned {status}: {body}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SheetError::Auth(format!("malformed token response: {e}")))?;

        let refresh_in = (token.expires_in - REFRESH_MARGIN_SECS).max(0);
        *slot = Some(CachedToken {
            token: token.access_token.clone(),
            refresh_at: now + Duration::seconds(refresh_in),
        });
        tracing::debug!(client_email = %client_email, expires_in = token.expires_in, "Refreshed spreadsheet access token");

        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let source = TokenSource::from_config(&SheetsAuth::Bearer {
            token: "abc".into(),
        })
        .unwrap();
        let client = reqwest::Client::new();

        assert_eq!(source.access_token(&client).await.unwrap(), "abc");
        assert_eq!(format!("{source:?}"), "TokenSource::Static([hidden])");
    }

    #[test]
    fn test_bad_private_key() {
        let result = TokenSource::from_config(&SheetsAuth::ServiceAccount {
            client_email: "bot@example.iam".into(),
            private_key: "not a key".into(),
            token_uri: "https://oauth2.example/token".into(),
            scope: "sheets".into(),
        });
        assert!(matches!(result, Err(SheetError::Auth(_))));
    }
}
