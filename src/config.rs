use reqwest::Client;

use crate::credentials::ClientCredentials;
use crate::userinfo::UserClaim;

/// Issuer used when none is configured
pub const DEFAULT_ISSUER: &str = "https://accounts.google.com";
/// Scopes requested when none are configured
pub const DEFAULT_SCOPES: &str = "openid email profile";
/// Out-of-band redirect: the provider shows the code to the user instead of redirecting
pub const DEFAULT_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Configuration for the OIDC helper
#[derive(Debug, Clone)]
pub struct HelperConfig {
    /// The OIDC issuer; discovery happens relative to this URL
    pub(crate) issuer: String,
    /// OAuth client registered with the provider
    pub(crate) credentials: ClientCredentials,
    /// Space separated scopes to request
    pub(crate) scopes: String,
    /// Redirect URI registered for the client
    pub(crate) redirect_uri: String,
    /// Claim used to name the kubeconfig user
    pub(crate) user_claim: UserClaim,
    /// Optional custom HTTP client
    /// If not provided, a default client will be created
    pub(crate) http_client: Option<Client>,
}

impl HelperConfig {
    /// Create a new configuration for the given client, using Google as the issuer
    pub fn new(credentials: ClientCredentials) -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            credentials,
            scopes: DEFAULT_SCOPES.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            user_claim: UserClaim::Email,
            http_client: None,
        }
    }

    /// Set the issuer URL
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Set the requested scopes
    pub fn with_scopes(mut self, scopes: impl Into<String>) -> Self {
        self.scopes = scopes.into();
        self
    }

    /// Set the redirect URI
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Set the claim used as the kubeconfig user name
    pub fn with_user_claim(mut self, user_claim: UserClaim) -> Self {
        self.user_claim = user_claim;
        self
    }

    /// Set a custom HTTP client
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }
}
