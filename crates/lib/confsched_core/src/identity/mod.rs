//! Microsoft identity platform sign-in (OAuth 2.0 authorization code + PKCE).
//!
//! Only what the web app needs: build the authorize URL, exchange the code for
//! tokens, and read the claims out of the `id_token`. Refresh and signature
//! validation are not handled here.

pub mod pkce;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::models::auth::{AuthToken, Claims};

/// Default authority (multi-tenant).
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/common";

/// Identity errors.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity provider returned an error: {error}: {description}")]
    Provider { error: String, description: String },

    #[error("Unknown or expired login state")]
    InvalidState,

    #[error("Token exchange failed: {0}")]
    Exchange(String),

    #[error("Invalid id_token: {0}")]
    InvalidIdToken(String),

    #[error("Invalid identity configuration: {0}")]
    Config(String),
}

/// Application registration used for sign-in.
#[derive(Clone)]
pub struct IdentitySettings {
    /// e.g. `https://login.microsoftonline.com/<tenant>`.
    pub authority: String,
    pub client_id: String,
    pub client_secret: String,
    /// Must match the redirect URI registered for the app.
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl std::fmt::Debug for IdentitySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitySettings")
            .field("authority", &self.authority)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl IdentitySettings {
    fn endpoint(&self, leaf: &str) -> String {
        format!(
            "{}/oauth2/v2.0/{leaf}",
            self.authority.trim_end_matches('/')
        )
    }

    /// Requested scopes; `openid` and `profile` are always included so an
    /// `id_token` comes back.
    fn scope_param(&self) -> String {
        let mut scopes: Vec<&str> = vec!["openid", "profile"];
        for scope in &self.scopes {
            if !scopes.contains(&scope.as_str()) {
                scopes.push(scope);
            }
        }
        scopes.join(" ")
    }
}

/// Response from the token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Turn the response into the session token bundle.
    pub fn into_auth_token(self) -> Result<AuthToken, IdentityError> {
        let identity_claims = match self.id_token.as_deref() {
            Some(id_token) => Some(decode_id_token_claims(id_token)?),
            None => None,
        };
        Ok(AuthToken {
            identity_claims,
            access_token: Some(self.access_token),
        })
    }
}

/// Read the payload of an `id_token` without verifying its signature.
///
/// Only call this on tokens received straight from the token endpoint.
pub fn decode_id_token_claims(id_token: &str) -> Result<Claims, IdentityError> {
    let mut parts = id_token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(IdentityError::InvalidIdToken("expected three segments".into()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| IdentityError::InvalidIdToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice::<Claims>(&bytes)
        .map_err(|e| IdentityError::InvalidIdToken(format!("payload is not a JSON object: {e}")))
}

/// Talks to the authorize and token endpoints.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: Client,
    settings: IdentitySettings,
}

impl IdentityClient {
    pub fn new(http: Client, settings: IdentitySettings) -> Self {
        Self { http, settings }
    }

    /// URL the browser is sent to for sign-in.
    pub fn authorize_url(&self, state: &str, code_challenge: &str) -> Result<String, IdentityError> {
        let mut url = Url::parse(&self.settings.endpoint("authorize"))
            .map_err(|e| IdentityError::Config(format!("authority: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.settings.redirect_uri)
            .append_pair("response_mode", "query")
            .append_pair("scope", &self.settings.scope_param())
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256");
        Ok(url.to_string())
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, IdentityError> {
        let scope = self.settings.scope_param();
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
            ("code_verifier", code_verifier),
            ("scope", scope.as_str()),
        ];

        let resp = self
            .http
            .post(self.settings.endpoint("token"))
            .form(&params)
            .send()
            .await
            .map_err(|e| IdentityError::Exchange(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(IdentityError::Exchange(format!("HTTP {status}: {body}")));
        }

        let token = resp
            .json::<TokenResponse>()
            .await
            .map_err(|e| IdentityError::Exchange(format!("response parse error: {e}")))?;
        debug!(expires_in = ?token.expires_in, "authorization code exchanged");
        Ok(token)
    }
}
