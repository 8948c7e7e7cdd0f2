use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::discovery_error;
use crate::error::Result;

/// Subset of the OpenID provider metadata needed for the authorization code flow
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DiscoverySpec {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    /// Some providers omit the userinfo endpoint; the id token is used instead
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    #[serde(default)]
    pub scopes_supported: Vec<String>,
    #[serde(default)]
    pub response_types_supported: Vec<String>,
}

impl DiscoverySpec {
    /// Fetch the provider metadata from `{issuer}/.well-known/openid-configuration`
    pub async fn fetch(client: &Client, issuer: &str) -> Result<Self> {
        let openid_url = discovery_url(issuer);
        debug!(url = %openid_url, "fetching OpenID configuration");

        let spec = client
            .get(&openid_url)
            .send()
            .await
            .map_err(discovery_error)?
            .error_for_status()
            .map_err(discovery_error)?
            .json()
            .await
            .map_err(discovery_error)?;

        Ok(spec)
    }

    /// The userinfo endpoint, treating an empty value as absent
    pub fn userinfo_endpoint(&self) -> Option<&str> {
        self.userinfo_endpoint.as_deref().filter(|e| !e.is_empty())
    }

    pub fn supports_scope(&self, scope: &str) -> bool {
        self.scopes_supported.iter().any(|s| s == scope)
    }
}

fn discovery_url(issuer: &str) -> String {
    format!(
        "{}/.well-known/openid-configuration",
        issuer.trim_end_matches('/')
    )
}
