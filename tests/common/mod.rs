#![allow(dead_code)]

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use k8s_oidc_helper::{ClientCredentials, HelperConfig};
use mockito::{Matcher, Mock, ServerGuard};
use serde::Serialize;
use serde_json::json;

pub const CLIENT_ID: &str = "test-client.apps.example.com";
pub const CLIENT_SECRET: &str = "test-client-secret";
pub const CODE: &str = "4/test-authorization-code";
pub const ACCESS_TOKEN: &str = "ya29.test-access-token";
pub const REFRESH_TOKEN: &str = "1//test-refresh-token";

/// Claims of a test id token
#[derive(Debug, Serialize)]
pub struct TestIdToken {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TestIdToken {
    /// Create claims that expire in 1 hour
    pub fn valid(issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            iss: issuer,
            sub: "110169484474386276334".to_string(),
            aud: CLIENT_ID.to_string(),
            exp: now + 3600,
            iat: now,
            email: Some("jane@example.com".to_string()),
            name: Some("Jane Doe".to_string()),
        }
    }

    /// Create claims that expired an hour ago
    pub fn expired(issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            exp: now - 3600,
            iat: now - 7200,
            ..Self::valid(issuer)
        }
    }

    /// Sign the claims; the helper never verifies the signature
    pub fn encode(&self) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            self,
            &EncodingKey::from_secret(b"test-signing-secret"),
        )
        .expect("Failed to encode JWT")
    }
}

pub fn test_config(issuer: &str) -> HelperConfig {
    HelperConfig::new(ClientCredentials::new(CLIENT_ID, CLIENT_SECRET)).with_issuer(issuer)
}

/// Mock the discovery document, optionally without a userinfo endpoint
pub async fn mock_discovery(
    server: &mut ServerGuard,
    with_userinfo: bool,
    scopes_supported: &[&str],
) -> Mock {
    let issuer = server.url();
    let mut discovery = json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{issuer}/auth"),
        "token_endpoint": format!("{issuer}/token"),
        "jwks_uri": format!("{issuer}/jwks"),
        "scopes_supported": scopes_supported,
        "response_types_supported": ["code"],
    });
    if with_userinfo {
        discovery["userinfo_endpoint"] = json!(format!("{issuer}/userinfo"));
    }

    server
        .mock("GET", "/.well-known/openid-configuration")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(discovery.to_string())
        .create_async()
        .await
}

/// Mock a token endpoint that only accepts the expected form
pub async fn mock_token(server: &mut ServerGuard, id_token: &str) -> Mock {
    server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            Matcher::UrlEncoded("redirect_uri".into(), "urn:ietf:wg:oauth:2.0:oob".into()),
            Matcher::UrlEncoded("client_id".into(), CLIENT_ID.into()),
            Matcher::UrlEncoded("client_secret".into(), CLIENT_SECRET.into()),
            Matcher::UrlEncoded("code".into(), CODE.into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": ACCESS_TOKEN,
                "refresh_token": REFRESH_TOKEN,
                "id_token": id_token,
                "expires_in": 3599,
                "token_type": "Bearer",
            })
            .to_string(),
        )
        .create_async()
        .await
}

/// Mock a userinfo endpoint returning the given body for the expected access token
pub async fn mock_userinfo(server: &mut ServerGuard, body: serde_json::Value) -> Mock {
    server
        .mock("GET", "/userinfo")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("alt".into(), "json".into()),
            Matcher::UrlEncoded("access_token".into(), ACCESS_TOKEN.into()),
        ]))
        .match_header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}
