use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

pub const TOKEN_VAR: &str = "REST_PUBLISH_TOKEN";
pub const URL_VAR: &str = "REST_PUBLISH_URL";

/// Persisted publishing settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub token: String,

    #[serde(rename = "publishUrl")]
    pub publish_url: String,
}

impl Settings {
    /// Defaults when the file does not exist yet.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        let settings = serde_json::from_slice(&bytes)?;

        Ok(settings)
    }

    pub async fn save(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(self)?;

        tokio::fs::write(path, json).await?;

        Ok(())
    }

    /// Environment variables win over stored values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(token) = std::env::var(TOKEN_VAR) {
            self.token = token;
        }

        if let Ok(url) = std::env::var(URL_VAR) {
            self.publish_url = url;
        }

        self
    }

    pub fn set_publish_url(&mut self, url: &str) -> Result<(), Error> {
        url::Url::parse(url)?;

        self.publish_url = url.to_owned();

        Ok(())
    }

    /// Token with all but the last four characters hidden.
    pub fn masked_token(&self) -> String {
        let count = self.token.chars().count();

        if count <= 4 {
            return "*".repeat(count);
        }

        let visible: String = self.token.chars().skip(count - 4).collect();

        format!("{}{}", "*".repeat(count - 4), visible)
    }
}
