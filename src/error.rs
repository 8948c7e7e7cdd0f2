use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Failed to read credentials file {1:?}: {0}")]
    ReadCredentials(#[source] std::io::Error, PathBuf),
    #[error("Invalid credentials file: {0}")]
    InvalidCredentials(String),
    #[error("No client id configured, use a credentials file or --client-id")]
    MissingClientId,
    #[error("OIDC discovery failed: {0}")]
    Discovery(String),
    #[error("Invalid URL {0:?}: {1}")]
    InvalidUrl(String, url::ParseError),
    #[error("The authorization code is empty")]
    EmptyCode,
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
    #[error("Token response did not contain an id_token")]
    MissingIdToken,
    #[error("User claim needs to be one of sub/name/email, got: {0}")]
    UnsupportedClaim(String),
    #[error("UserInfo endpoint does not provide the claim: {0}")]
    ClaimNotProvided(String),
    #[error("UserInfo request failed: {0}")]
    UserInfo(String),
    #[error("Failed to read kubeconfig {1:?}: {0}")]
    ReadKubeconfig(#[source] std::io::Error, PathBuf),
    #[error("Failed to write kubeconfig {1:?}: {0}")]
    WriteKubeconfig(#[source] std::io::Error, PathBuf),
    #[error("Kubeconfig documents disagree on {0}")]
    KubeconfigMismatch(&'static str),
    #[error("Could not determine the home directory of the current user")]
    NoHomeDir,
}

pub(crate) fn discovery_error(error: reqwest::Error) -> Error {
    Error::Discovery(format!("Failed to fetch OpenID config: {error}"))
}

pub(crate) fn token_error(error: reqwest::Error) -> Error {
    Error::TokenExchange(format!("Failed to call token endpoint: {error}"))
}

pub(crate) fn userinfo_error(error: reqwest::Error) -> Error {
    Error::UserInfo(format!("Failed to call userinfo endpoint: {error}"))
}
