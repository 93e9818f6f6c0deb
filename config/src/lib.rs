//! Configuration for the Vibe Coach binaries.
//!
//! Everything lives under `~/.vibe/`:
//!
//! ```toml
//! # ~/.vibe/config.toml
//! [api_keys]
//! google = "${GEMINI_API_KEY}"
//!
//! [gemini]
//! model = "gemini-3-flash-preview"
//! timeout_secs = 20
//!
//! [proxy]
//! url = "http://127.0.0.1:8787/api/generate"
//!
//! [server]
//! bind = "127.0.0.1:8787"
//! ```
//!
//! `${VAR}` references are expanded from the environment. A missing file is
//! not an error; every section has defaults.

mod atomic_write;
mod state;

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use serde::Deserialize;
use thiserror::Error;

use vibe_types::ApiKey;

pub use atomic_write::atomic_write;
pub use state::FileTutorialFlag;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:8787/api/generate";
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

/// Environment variables consulted for the client-side key, in order.
pub const CLIENT_KEY_VARS: &[&str] = &["GEMINI_API_KEY"];
/// Environment variables consulted for the proxy's key, in order.
pub const SERVER_KEY_VARS: &[&str] = &["API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VibeConfig {
    #[serde(default)]
    pub api_keys: ApiKeys,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Default, Deserialize)]
pub struct ApiKeys {
    pub google: Option<String>,
}

// Manual Debug impl to prevent leaking API keys in logs.
impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let google = if self.google.is_some() {
            "[REDACTED]"
        } else {
            "None"
        };
        f.debug_struct("ApiKeys").field("google", &google).finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_GEMINI_MODEL.to_owned(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_owned(),
            timeout_secs: 20,
        }
    }
}

impl GeminiConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Set to an empty string to disable the proxy route.
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PROXY_URL.to_owned(),
            timeout_secs: 30,
        }
    }
}

impl ProxyConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The proxy URL, or `None` when the route is disabled.
    #[must_use]
    pub fn enabled_url(&self) -> Option<String> {
        let url = expand_env_vars(&self.url);
        let url = url.trim();
        (!url.is_empty()).then(|| url.to_owned())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_owned(),
        }
    }
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

impl VibeConfig {
    /// Load `~/.vibe/config.toml`. `Ok(None)` when there is no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {}: {source}", path.display());
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::parse(&content)
            .map(Some)
            .map_err(|source| {
                tracing::warn!("Failed to parse config at {}: {source}", path.display());
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Key for the direct Gemini route: environment first, then the file.
    #[must_use]
    pub fn client_key(&self) -> Option<ApiKey> {
        self.resolve_key(CLIENT_KEY_VARS, |var| env::var(var).ok())
    }

    /// Key held by the proxy server: environment first, then the file.
    #[must_use]
    pub fn server_key(&self) -> Option<ApiKey> {
        self.resolve_key(SERVER_KEY_VARS, |var| env::var(var).ok())
    }

    fn resolve_key(
        &self,
        vars: &[&str],
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<ApiKey> {
        vars.iter()
            .filter_map(|var| lookup(var))
            .find_map(ApiKey::new)
            .or_else(|| {
                self.api_keys
                    .google
                    .as_deref()
                    .map(expand_env_vars)
                    .and_then(ApiKey::new)
            })
    }
}

/// `~/.vibe`, the home of config, state and logs.
#[must_use]
pub fn vibe_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".vibe"))
}

pub fn config_path() -> Option<PathBuf> {
    vibe_dir().map(|dir| dir.join("config.toml"))
}

pub fn state_path() -> Option<PathBuf> {
    vibe_dir().map(|dir| dir.join("state.toml"))
}
