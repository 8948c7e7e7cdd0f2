use reqwest::Client;
use secrecy::ExposeSecret;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::credentials::ClientCredentials;
use crate::discovery::DiscoverySpec;
use crate::error::token_error;
use crate::error::Error;
use crate::error::Result;

/// Tokens returned by the token endpoint
#[derive(Debug, Clone)]
pub struct TokenResponse {
    pub access_token: SecretString,
    /// Empty when the provider did not issue a refresh token
    pub refresh_token: SecretString,
    pub id_token: SecretString,
}

impl TokenResponse {
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }

    pub fn id_token(&self) -> &str {
        self.id_token.expose_secret()
    }
}

#[derive(Deserialize)]
struct RawTokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

/// OAuth2 error body (RFC 6749 section 5.2)
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error_description {
            Some(description) => write!(f, "{}: {}", self.error, description),
            None => write!(f, "{}", self.error),
        }
    }
}

fn error_reason(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|error| error.to_string())
}

/// Exchange a one-time authorization code for tokens
pub async fn exchange_code(
    client: &Client,
    spec: &DiscoverySpec,
    credentials: &ClientCredentials,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse> {
    let code = code.trim();
    if code.is_empty() {
        return Err(Error::EmptyCode);
    }

    let form = [
        ("grant_type", "authorization_code"),
        ("redirect_uri", redirect_uri),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.secret()),
        ("code", code),
    ];

    debug!(url = %spec.token_endpoint, "exchanging authorization code");
    let response = client
        .post(&spec.token_endpoint)
        .form(&form)
        .send()
        .await
        .map_err(token_error)?;

    let status = response.status();
    let body = response.text().await.map_err(token_error)?;
    if !status.is_success() {
        let reason = error_reason(&body).unwrap_or_else(|| format!("{status}: {body}"));
        return Err(Error::TokenExchange(reason));
    }

    // some providers answer 200 with an OAuth2 error body
    let raw: RawTokenResponse = serde_json::from_str(&body).map_err(|error| {
        Error::TokenExchange(
            error_reason(&body).unwrap_or_else(|| format!("invalid token response: {error}")),
        )
    })?;
    let id_token = raw.id_token.ok_or(Error::MissingIdToken)?;

    Ok(TokenResponse {
        access_token: SecretString::from(raw.access_token),
        refresh_token: SecretString::from(raw.refresh_token.unwrap_or_default()),
        id_token: SecretString::from(id_token),
    })
}
