//! Kubeconfig handling
//!
//! Only the `users` section is modelled in detail. Clusters, contexts and any
//! field this crate does not know about are carried as raw YAML so that
//! merging credentials into an existing file never clobbers them.
//!
//! The generated user entry uses kubectl's `oidc` auth-provider plugin:
//!
//! ```yaml
//! users:
//! - name: jane@example.com
//!   user:
//!     auth-provider:
//!       name: oidc
//!       config:
//!         client-id: <client id>
//!         client-secret: <client secret>
//!         id-token: <id token>
//!         idp-issuer-url: https://accounts.google.com
//!         refresh-token: <refresh token>
//! ```

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_yaml::Value;
use tracing::debug;

use crate::error::Error;
use crate::error::Result;

const API_VERSION: &str = "v1";
const KIND: &str = "Config";
/// Name of kubectl's OIDC auth-provider plugin
pub const OIDC_AUTH_PROVIDER: &str = "oidc";

/// A kubeconfig document
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Kubeconfig {
    #[serde(rename = "apiVersion")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub clusters: Vec<NamedEntry>,
    #[serde(rename = "users")]
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub auth_infos: Vec<NamedAuthInfo>,
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub contexts: Vec<NamedEntry>,
    #[serde(rename = "current-context")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_context: Option<String>,
    /// Everything else (preferences, extensions, ...)
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// A named cluster or context, kept verbatim
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NamedEntry {
    pub name: String,
    #[serde(flatten)]
    pub rest: BTreeMap<String, Value>,
}

/// NamedAuthInfo associates name with authentication.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NamedAuthInfo {
    pub name: String,
    #[serde(rename = "user")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_info: Option<AuthInfo>,
}

/// AuthInfo stores information to tell the cluster who you are.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct AuthInfo {
    #[serde(rename = "auth-provider")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_provider: Option<AuthProviderConfig>,
    /// Other authentication methods (token, client certificates, exec, ...)
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// AuthProviderConfig stores the configuration of a kubectl auth-provider plugin.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthProviderConfig {
    pub name: String,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

/// Build the auth info for kubectl's `oidc` auth-provider
pub fn generate_auth_info(
    issuer: &str,
    client_id: &str,
    client_secret: &str,
    id_token: &str,
    refresh_token: &str,
) -> AuthInfo {
    let config = BTreeMap::from([
        ("client-id".to_string(), client_id.to_string()),
        ("client-secret".to_string(), client_secret.to_string()),
        ("id-token".to_string(), id_token.to_string()),
        ("idp-issuer-url".to_string(), issuer.to_string()),
        ("refresh-token".to_string(), refresh_token.to_string()),
    ]);

    AuthInfo {
        auth_provider: Some(AuthProviderConfig {
            name: OIDC_AUTH_PROVIDER.to_string(),
            config,
        }),
        other: BTreeMap::new(),
    }
}

/// Default kubeconfig location: `$HOME/.kube/config`
pub fn default_kube_path() -> Result<PathBuf> {
    home::home_dir()
        .map(|h| h.join(".kube").join("config"))
        .ok_or(Error::NoHomeDir)
}

impl Kubeconfig {
    /// A config holding a single user
    pub fn with_auth_info(name: impl Into<String>, auth_info: AuthInfo) -> Self {
        Self {
            api_version: Some(API_VERSION.to_string()),
            kind: Some(KIND.to_string()),
            auth_infos: vec![NamedAuthInfo {
                name: name.into(),
                auth_info: Some(auth_info),
            }],
            ..Default::default()
        }
    }

    /// Read a kubeconfig from a file
    ///
    /// A missing or empty file yields an empty config. Multiple YAML
    /// documents are merged in order.
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(data) => Self::from_yaml(&data),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "kubeconfig does not exist yet");
                Ok(Self::default())
            }
            Err(error) => Err(Error::ReadKubeconfig(error, path.into())),
        }
    }

    /// Parse possibly multi-document YAML text into a single config
    pub fn from_yaml(text: &str) -> Result<Self> {
        let mut merged = Self::default();
        for document in serde_yaml::Deserializer::from_str(text) {
            let value = Value::deserialize(document)?;
            if value.is_null() {
                continue;
            }
            merged = merged.merge(serde_yaml::from_value(value)?)?;
        }
        Ok(merged)
    }

    /// Merge according to the kubeconfig merge rules: the first to set a
    /// value or named entry wins, and later entries with the same name are
    /// discarded entirely.
    pub fn merge(mut self, next: Kubeconfig) -> Result<Self> {
        if self.kind.is_some() && next.kind.is_some() && self.kind != next.kind {
            return Err(Error::KubeconfigMismatch("kind"));
        }
        if self.api_version.is_some()
            && next.api_version.is_some()
            && self.api_version != next.api_version
        {
            return Err(Error::KubeconfigMismatch("apiVersion"));
        }

        self.kind = self.kind.or(next.kind);
        self.api_version = self.api_version.or(next.api_version);
        append_new_named(&mut self.clusters, next.clusters, |x| &x.name);
        append_new_named(&mut self.auth_infos, next.auth_infos, |x| &x.name);
        append_new_named(&mut self.contexts, next.contexts, |x| &x.name);
        self.current_context = self.current_context.or(next.current_context);
        for (key, value) in next.other {
            self.other.entry(key).or_insert(value);
        }
        Ok(self)
    }

    /// Insert or replace the user with the given name, keeping its position
    pub fn upsert_auth_info(&mut self, name: &str, auth_info: AuthInfo) {
        let entry = NamedAuthInfo {
            name: name.to_string(),
            auth_info: Some(auth_info),
        };

        match self.auth_infos.iter_mut().find(|x| x.name == name) {
            Some(existing) => *existing = entry,
            None => self.auth_infos.push(entry),
        }

        self.api_version.get_or_insert_with(|| API_VERSION.to_string());
        self.kind.get_or_insert_with(|| KIND.to_string());
    }

    pub fn auth_info(&self, name: &str) -> Option<&AuthInfo> {
        self.auth_infos
            .iter()
            .find(|x| x.name == name)
            .and_then(|x| x.auth_info.as_ref())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the config, creating parent directories as needed
    ///
    /// On unix a newly created file is only readable by its owner, since it holds secrets.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let yaml = self.to_yaml()?;
        let write_error = |error| Error::WriteKubeconfig(error, path.into());

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(write_error)?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path).map_err(write_error)?;
        file.write_all(yaml.as_bytes()).map_err(write_error)?;
        debug!(path = %path.display(), "kubeconfig written");
        Ok(())
    }
}

fn deserialize_null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    T: Default + Deserialize<'de>,
    D: Deserializer<'de>,
{
    let opt = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

fn append_new_named<T, F>(base: &mut Vec<T>, next: Vec<T>, f: F)
where
    F: Fn(&T) -> &String,
{
    let existing = base.iter().map(|x| f(x).clone()).collect::<HashSet<_>>();
    base.extend(next.into_iter().filter(|x| !existing.contains(f(x))));
}
