use url::Url;

use crate::discovery::DiscoverySpec;
use crate::error::Error;
use crate::error::Result;

const OFFLINE_ACCESS: &str = "offline_access";

/// Build the URL the user opens to approve access
///
/// Providers differ in how refresh tokens are requested: Google wants
/// `access_type=offline`, others (e.g. Auth0) want the `offline_access` scope.
/// Both are sent; providers ignore parameters they do not understand.
pub fn authorization_url(
    spec: &DiscoverySpec,
    scopes: &str,
    redirect_uri: &str,
    client_id: &str,
) -> Result<Url> {
    let mut url = Url::parse(&spec.authorization_endpoint)
        .map_err(|e| Error::InvalidUrl(spec.authorization_endpoint.clone(), e))?;

    let scopes = requested_scopes(spec, scopes);
    let params = [
        ("scope", scopes.as_str()),
        ("redirect_uri", redirect_uri),
        ("response_type", "code"),
        ("client_id", client_id),
        ("approval_prompt", "force"),
        ("access_type", "offline"),
    ];

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !params.iter().any(|(name, _)| name == key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .extend_pairs(params);

    Ok(url)
}

fn requested_scopes(spec: &DiscoverySpec, scopes: &str) -> String {
    let scopes = scopes.trim();
    let already_requested = scopes.split_whitespace().any(|s| s == OFFLINE_ACCESS);

    if spec.supports_scope(OFFLINE_ACCESS) && !already_requested {
        format!("{scopes} {OFFLINE_ACCESS}")
    } else {
        scopes.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn spec(endpoint: &str, scopes_supported: &[&str]) -> DiscoverySpec {
        DiscoverySpec {
            authorization_endpoint: endpoint.to_string(),
            token_endpoint: "https://idp.example.com/token".to_string(),
            userinfo_endpoint: None,
            scopes_supported: scopes_supported.iter().map(|s| s.to_string()).collect(),
            response_types_supported: vec!["code".to_string()],
        }
    }

    fn query(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn google_style_url() {
        let url = authorization_url(
            &spec("https://accounts.google.com/o/oauth2/v2/auth", &["openid", "email"]),
            "openid email profile",
            "urn:ietf:wg:oauth:2.0:oob",
            "my-client",
        )
        .unwrap();

        let q = query(&url);
        assert_eq!(url.path(), "/o/oauth2/v2/auth");
        assert_eq!(q["scope"], "openid email profile");
        assert_eq!(q["redirect_uri"], "urn:ietf:wg:oauth:2.0:oob");
        assert_eq!(q["response_type"], "code");
        assert_eq!(q["client_id"], "my-client");
        assert_eq!(q["approval_prompt"], "force");
        assert_eq!(q["access_type"], "offline");
        assert!(url.as_str().contains("scope=openid+email+profile"));
    }

    #[test]
    fn offline_access_scope_appended_when_supported() {
        let url = authorization_url(
            &spec("https://tenant.auth0.com/authorize", &["openid", "offline_access"]),
            "  openid email ",
            "urn:ietf:wg:oauth:2.0:oob",
            "my-client",
        )
        .unwrap();

        assert_eq!(query(&url)["scope"], "openid email offline_access");
    }

    #[test]
    fn offline_access_not_duplicated() {
        let url = authorization_url(
            &spec("https://tenant.auth0.com/authorize", &["offline_access"]),
            "openid offline_access",
            "urn:ietf:wg:oauth:2.0:oob",
            "my-client",
        )
        .unwrap();

        assert_eq!(query(&url)["scope"], "openid offline_access");
    }

    #[test]
    fn existing_query_parameters_are_kept() {
        let url = authorization_url(
            &spec("https://idp.example.com/auth?tenant=acme&client_id=stale", &[]),
            "openid",
            "urn:ietf:wg:oauth:2.0:oob",
            "my-client",
        )
        .unwrap();

        let q = query(&url);
        assert_eq!(q["tenant"], "acme");
        assert_eq!(q["client_id"], "my-client");
        assert_eq!(url.query_pairs().filter(|(k, _)| k == "client_id").count(), 1);
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let result = authorization_url(&spec("not a url", &[]), "openid", "uri", "client");
        assert!(matches!(result, Err(Error::InvalidUrl(_, _))));
    }
}
