//! # k8s-oidc-helper
//!
//! Obtain an OpenID Connect id token from an identity provider (Google by
//! default, or any provider that publishes a discovery document) and turn it
//! into a kubeconfig user for kubectl's `oidc` auth-provider plugin.
//!
//! The flow is the OAuth2 authorization code flow with a manually entered code:
//!
//! 1. discover the provider endpoints from `{issuer}/.well-known/openid-configuration`
//! 2. send the user to the authorization URL
//! 3. exchange the code the provider displays for tokens
//! 4. look up the user claim that names the kubeconfig user
//! 5. print or merge the resulting kubeconfig
//!
//! ## Example
//!
//! ```rust,no_run
//! use k8s_oidc_helper::{run_flow, ClientCredentials, HelperConfig, IdentityProvider, OidcHelper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = ClientCredentials::read_from("client_secret.json")?;
//!     let provider = OidcHelper::new(HelperConfig::new(credentials))?
//!         .discover()
//!         .await?;
//!
//!     println!("Open {}", provider.authorization_url()?);
//!     let code = "4/P7q7W91a-oMsCeLvIaQm6bTrgtp7";
//!
//!     let credentials = run_flow(&provider, code).await?;
//!     print!("{}", credentials.to_kubeconfig().to_yaml()?);
//!
//!     Ok(())
//! }
//! ```

mod auth_url;
pub mod browser;
mod config;
mod credentials;
mod discovery;
mod error;
mod helper;
mod id_token;
pub mod kubeconfig;
mod token;
mod userinfo;

// Re-exports for public API
pub use auth_url::authorization_url;
pub use config::HelperConfig;
pub use config::DEFAULT_ISSUER;
pub use config::DEFAULT_REDIRECT_URI;
pub use config::DEFAULT_SCOPES;
pub use credentials::ClientCredentials;
pub use discovery::DiscoverySpec;
pub use error::Error;
pub use error::Result;
pub use helper::run_flow;
pub use helper::Credentials;
pub use helper::IdentityProvider;
pub use helper::OidcHelper;
pub use helper::OidcProvider;
pub use id_token::IdTokenClaims;
pub use kubeconfig::default_kube_path;
pub use kubeconfig::generate_auth_info;
pub use kubeconfig::AuthInfo;
pub use kubeconfig::Kubeconfig;
pub use token::exchange_code;
pub use token::TokenResponse;
pub use userinfo::fetch_user_info;
pub use userinfo::UserClaim;
pub use userinfo::UserInfo;
