//! Authentication domain models.
//!
//! An `AuthToken` only ever lives in the in-memory session store; it is never
//! written to the database.

use serde::{Deserialize, Serialize};

/// Identity claims asserted by the identity provider (claim name → value).
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Token bundle attached to a signed-in session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthToken {
    /// Claims decoded from the `id_token`; `None` until sign-in completes.
    pub identity_claims: Option<Claims>,
    /// Bearer token for Microsoft Graph.
    pub access_token: Option<String>,
}

impl AuthToken {
    /// True when the token carries at least one identity claim.
    pub fn has_claims(&self) -> bool {
        self.identity_claims
            .as_ref()
            .is_some_and(|claims| !claims.is_empty())
    }

    /// The access token, if present and non-empty.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}
