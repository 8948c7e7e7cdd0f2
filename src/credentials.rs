use std::fs;
use std::path::Path;

use secrecy::ExposeSecret;
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::Error;
use crate::error::Result;

/// OAuth client registered with the identity provider
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

/// Client secret file as downloaded from the Google developer console
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<InstalledClient>,
}

#[derive(Debug, Deserialize)]
struct InstalledClient {
    client_id: String,
    #[serde(default)]
    client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }

    /// Pick the credentials file when one is given, otherwise the id and secret passed in
    pub fn resolve(
        config: Option<&Path>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        match config {
            Some(path) => Self::read_from(path),
            None => Ok(Self::new(client_id, client_secret)),
        }
    }

    /// Read the client id and secret from the `installed` section of a client secret JSON file
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(&path)
            .map_err(|source| Error::ReadCredentials(source, path.as_ref().into()))?;

        Self::from_json(&data)
    }

    /// Parse a client secret JSON document
    pub fn from_json(data: &str) -> Result<Self> {
        let file: ClientSecretFile = serde_json::from_str(data)
            .map_err(|error| Error::InvalidCredentials(error.to_string()))?;

        let installed = file.installed.ok_or_else(|| {
            Error::InvalidCredentials("missing the \"installed\" section".to_string())
        })?;

        Ok(Self::new(installed.client_id, installed.client_secret))
    }

    /// Fail early when no client id was provided by either the file or the flags
    pub fn ensure_client_id(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::MissingClientId);
        }
        Ok(())
    }

    pub(crate) fn secret(&self) -> &str {
        self.client_secret.expose_secret()
    }
}
