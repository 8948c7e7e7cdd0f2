use std::fmt;
use std::str::FromStr;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::userinfo_error;
use crate::error::Error;
use crate::error::Result;

/// Claim used to name the user entry in the kubeconfig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserClaim {
    #[default]
    Email,
    Sub,
    Name,
}

impl UserClaim {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserClaim::Email => "email",
            UserClaim::Sub => "sub",
            UserClaim::Name => "name",
        }
    }
}

impl fmt::Display for UserClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserClaim {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "email" => Ok(UserClaim::Email),
            "sub" => Ok(UserClaim::Sub),
            "name" => Ok(UserClaim::Name),
            other => Err(Error::UnsupportedClaim(other.to_string())),
        }
    }
}

/// Claims returned by the userinfo endpoint
#[derive(Debug, Default, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl UserInfo {
    /// Pick the requested claim, treating an empty value as absent
    pub fn claim(&self, claim: UserClaim) -> Result<String> {
        let value = match claim {
            UserClaim::Email => &self.email,
            UserClaim::Sub => &self.sub,
            UserClaim::Name => &self.name,
        };

        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::ClaimNotProvided(claim.to_string()))
    }
}

/// Fetch the user's claims from the userinfo endpoint
pub async fn fetch_user_info(
    client: &Client,
    userinfo_endpoint: &str,
    access_token: &str,
) -> Result<UserInfo> {
    debug!(url = %userinfo_endpoint, "fetching user info");

    // Google historically accepts the token as a query parameter, everybody else as a bearer header.
    let info = client
        .get(userinfo_endpoint)
        .query(&[("alt", "json"), ("access_token", access_token)])
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(userinfo_error)?
        .error_for_status()
        .map_err(userinfo_error)?
        .json()
        .await
        .map_err(userinfo_error)?;

    Ok(info)
}
