use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::ConfigError;
use crate::http::response::Framing;

static CONFIG: OnceLock<HttpConfig> = OnceLock::new();

pub(crate) const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Response-side settings shared by every [`HttpResponse`](crate::http::response::HttpResponse)
/// created with [`HttpResponse::new`](crate::http::response::HttpResponse::new).
///
/// Every field is optional in the TOML source and falls back to [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Protocol version written in the status line of new responses.
    pub protocol_version: String,

    /// Line terminators and header/body separator used when serializing.
    pub framing: Framing,

    /// flate2 level used by [`encoding::apply`](crate::http::encoding::apply).
    /// Values above 9 are clamped.
    pub compression_level: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            protocol_version: "HTTP/1.1".to_string(),
            framing: Framing::Standard,
            compression_level: 6,
        }
    }
}

impl HttpConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str::<HttpConfig>(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    /// Like [`from_file`](Self::from_file), but logs the failure and returns
    /// the defaults instead of an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::from_file(path.as_ref()) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    path = %path.as_ref().display(),
                    "{err}, falling back to default config"
                );
                HttpConfig::default()
            }
        }
    }

    pub fn compression_level(&self) -> u32 {
        self.compression_level.min(MAX_COMPRESSION_LEVEL)
    }
}

/// Installs the process-wide configuration.
///
/// Fails once a configuration is in place, including the defaults installed by
/// an earlier call to [`config`].
pub fn set_config(cfg: HttpConfig) -> Result<(), ConfigError> {
    CONFIG.set(cfg).map_err(|_| ConfigError::AlreadySet)
}

/// The process-wide configuration, or the defaults when none was installed.
pub fn config() -> &'static HttpConfig {
    CONFIG.get_or_init(HttpConfig::default)
}
