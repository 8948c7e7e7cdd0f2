use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use tracing::info;
use tracing::warn;
use url::Url;

use crate::auth_url::authorization_url;
use crate::config::HelperConfig;
use crate::discovery::DiscoverySpec;
use crate::error::Result;
use crate::id_token::IdTokenClaims;
use crate::kubeconfig::generate_auth_info;
use crate::kubeconfig::AuthInfo;
use crate::kubeconfig::Kubeconfig;
use crate::token::exchange_code;
use crate::token::TokenResponse;
use crate::userinfo::fetch_user_info;

/// The steps of the authorization code flow that talk to the identity provider
#[async_trait]
pub trait IdentityProvider {
    /// URL the user opens to approve access and obtain a code
    fn authorization_url(&self) -> Result<Url>;

    /// Exchange the one-time code for tokens
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse>;

    /// Resolve the configured user claim for the owner of the tokens
    async fn user_claim(&self, tokens: &TokenResponse) -> Result<String>;

    /// Build the kubeconfig auth info for the tokens
    fn auth_info(&self, tokens: &TokenResponse) -> AuthInfo;
}

const SNIPPET_HEADER: &str = "# Add the following to your ~/.kube/config";

/// Credentials ready to be placed in a kubeconfig
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Name of the kubeconfig user, taken from the configured claim
    pub user: String,
    pub auth_info: AuthInfo,
}

impl Credentials {
    /// A kubeconfig holding only these credentials
    pub fn to_kubeconfig(&self) -> Kubeconfig {
        Kubeconfig::with_auth_info(self.user.clone(), self.auth_info.clone())
    }

    /// The snippet printed for the user to paste into their kubeconfig
    pub fn to_snippet(&self) -> Result<String> {
        Ok(format!("{SNIPPET_HEADER}\n{}", self.to_kubeconfig().to_yaml()?))
    }
}

/// Entry point: binds a configuration to an HTTP client
pub struct OidcHelper {
    config: HelperConfig,
    client: Client,
}

impl OidcHelper {
    pub fn new(config: HelperConfig) -> Result<Self> {
        config.credentials.ensure_client_id()?;
        let client = config.http_client.clone().unwrap_or_default();

        Ok(Self { config, client })
    }

    /// Fetch the provider metadata for the configured issuer
    pub async fn discover(self) -> Result<OidcProvider> {
        let spec = DiscoverySpec::fetch(&self.client, &self.config.issuer).await?;
        debug!(?spec, "discovered provider");

        Ok(OidcProvider {
            config: self.config,
            client: self.client,
            spec,
        })
    }
}

/// A discovered OIDC provider
pub struct OidcProvider {
    config: HelperConfig,
    client: Client,
    spec: DiscoverySpec,
}

impl OidcProvider {
    pub fn spec(&self) -> &DiscoverySpec {
        &self.spec
    }

    /// Inspect the id token, warning about anything that would stop kubectl from using it
    fn inspect_id_token(&self, tokens: &TokenResponse) -> Option<IdTokenClaims> {
        let claims = match IdTokenClaims::decode(tokens.id_token()) {
            Ok(claims) => claims,
            Err(error) => {
                warn!(%error, "id token could not be decoded");
                return None;
            }
        };

        if !claims.issued_by(&self.config.issuer) {
            warn!(
                token_issuer = %claims.iss,
                configured_issuer = %self.config.issuer,
                "id token issuer differs from the configured issuer, kubectl will not be able to refresh it"
            );
        }
        match claims.expires_at() {
            Some(expiry) if claims.is_expired() => {
                warn!(%expiry, "id token is already expired, kubectl will have to refresh it first")
            }
            Some(expiry) => info!(%expiry, "id token expires"),
            None => warn!(exp = claims.exp, "id token has an invalid expiry"),
        }
        if tokens.refresh_token().is_empty() {
            warn!("no refresh token was issued, kubectl cannot renew the id token once it expires");
        }

        Some(claims)
    }
}

#[async_trait]
impl IdentityProvider for OidcProvider {
    fn authorization_url(&self) -> Result<Url> {
        authorization_url(
            &self.spec,
            &self.config.scopes,
            &self.config.redirect_uri,
            &self.config.credentials.client_id,
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        exchange_code(
            &self.client,
            &self.spec,
            &self.config.credentials,
            code,
            &self.config.redirect_uri,
        )
        .await
    }

    async fn user_claim(&self, tokens: &TokenResponse) -> Result<String> {
        let claims = self.inspect_id_token(tokens);

        match (self.spec.userinfo_endpoint(), claims) {
            (Some(endpoint), _) => {
                let info = fetch_user_info(&self.client, endpoint, tokens.access_token()).await?;
                info.claim(self.config.user_claim)
            }
            (None, Some(claims)) => {
                debug!("provider has no userinfo endpoint, using the id token");
                claims.claim(self.config.user_claim)
            }
            (None, None) => IdTokenClaims::decode(tokens.id_token())?.claim(self.config.user_claim),
        }
    }

    fn auth_info(&self, tokens: &TokenResponse) -> AuthInfo {
        generate_auth_info(
            &self.config.issuer,
            &self.config.credentials.client_id,
            self.config.credentials.secret(),
            tokens.id_token(),
            tokens.refresh_token(),
        )
    }
}

/// Run the flow once the user has supplied the code:
/// exchange it, resolve the user name and build the auth info.
pub async fn run_flow<P>(provider: &P, code: &str) -> Result<Credentials>
where
    P: IdentityProvider + Sync,
{
    let tokens = provider.exchange_code(code).await?;
    let user = provider.user_claim(&tokens).await?;
    let auth_info = provider.auth_info(&tokens);

    Ok(Credentials { user, auth_info })
}
