use chrono::DateTime;
use chrono::Utc;
use jsonwebtoken::dangerous;
use serde::Deserialize;

use crate::error::Error;
use crate::error::Result;
use crate::userinfo::UserClaim;

/// Claims of an OIDC id token that are relevant when writing a kubeconfig
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    /// Issuer - must match `idp-issuer-url` for kubectl to refresh the token
    pub iss: String,
    /// Subject - stable identifier of the user at the provider
    pub sub: String,
    /// Expiration time as Unix timestamp
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl IdTokenClaims {
    /// Decode the claims without validating the signature
    ///
    /// The token is only relayed to kubectl; the API server verifies it on every request.
    pub fn decode(token: &str) -> Result<Self> {
        let token_data = dangerous::insecure_decode::<IdTokenClaims>(token)?;
        Ok(token_data.claims)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp()
    }

    /// Pick a claim from the token, for providers without a userinfo endpoint
    pub fn claim(&self, claim: UserClaim) -> Result<String> {
        let value = match claim {
            UserClaim::Email => self.email.as_deref(),
            UserClaim::Sub => Some(self.sub.as_str()),
            UserClaim::Name => self.name.as_deref(),
        };

        value
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::ClaimNotProvided(claim.to_string()))
    }

    /// Whether the token was issued by the configured issuer, ignoring a trailing slash
    pub fn issued_by(&self, issuer: &str) -> bool {
        self.iss.trim_end_matches('/') == issuer.trim_end_matches('/')
    }
}
