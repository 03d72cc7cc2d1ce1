//! Configuration for the hosted collaborators and local storage.
//!
//! A TOML file at `~/.config/neuracare/config.toml` plus a resolution
//! chain: env var > config file > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub const GEMINI_API_KEY_ENV: &str = "NEURACARE_GEMINI_API_KEY";
/// Older deployments exported the key under this generic name.
pub const LEGACY_API_KEY_ENV: &str = "API_KEY";
pub const GEMINI_MODEL_ENV: &str = "NEURACARE_GEMINI_MODEL";
pub const GEMINI_BASE_URL_ENV: &str = "NEURACARE_GEMINI_BASE_URL";
pub const IDENTITY_API_KEY_ENV: &str = "NEURACARE_IDENTITY_API_KEY";
pub const IDENTITY_BASE_URL_ENV: &str = "NEURACARE_IDENTITY_BASE_URL";
pub const DATA_DIR_ENV: &str = "NEURACARE_DATA_DIR";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub gemini: GeminiSection,
    #[serde(default)]
    pub identity: IdentitySection,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GeminiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IdentitySection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

pub const CONFIG_FILE: &str = "config.toml";

/// Return the config directory: `$XDG_CONFIG_HOME/neuracare` or
/// `~/.config/neuracare`.
pub fn config_dir() -> PathBuf {
    config_dir_with(|key| std::env::var(key).ok())
}

fn config_dir_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(xdg) = env("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("neuracare");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("neuracare")
}

pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Default directory for the preference file.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("neuracare")
}

// -----------------------------------------------------------------------
// Read
// -----------------------------------------------------------------------

/// Load and parse a config file. A missing file is `Ok(None)`; an
/// unreadable or malformed one is an error.
pub fn load_config_from(path: &Path) -> Result<Option<ConfigFile>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to read config file at {}", path.display()));
        }
    };
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Settings for [`crate::analysis::GeminiBackend`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
    pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Config with the default model and endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Settings for [`crate::session::IdentityToolkitProvider`].
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// `None` when the hosted identity adapter is not used.
    pub api_key: Option<String>,
    pub base_url: String,
}

impl IdentityConfig {
    pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
}

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone)]
pub struct NeuraConfig {
    pub gemini: GeminiConfig,
    pub identity: IdentityConfig,
    pub data_dir: PathBuf,
}

impl NeuraConfig {
    /// Resolve from the process environment and the config file.
    pub fn resolve() -> Result<Self> {
        Self::resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve with `env` supplying both the settings and the location of
    /// the config file (`XDG_CONFIG_HOME`).
    pub fn resolve_with(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = config_dir_with(&env).join(CONFIG_FILE);
        let file = load_config_from(&path)?;
        Self::resolve_from(env, file)
    }

    /// Resolve from an explicit env lookup and optional file (testable
    /// without touching the process environment).
    ///
    /// - Gemini key: `NEURACARE_GEMINI_API_KEY` > `API_KEY` > `[gemini] api_key` > error
    /// - Gemini model/base URL: env > file > default
    /// - Identity key: env > file > none
    /// - Data dir: `NEURACARE_DATA_DIR` > `[storage] data_dir` > platform data dir
    pub fn resolve_from(
        env: impl Fn(&str) -> Option<String>,
        file: Option<ConfigFile>,
    ) -> Result<Self> {
        let file = file.unwrap_or_default();
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let Some(api_key) = non_empty(GEMINI_API_KEY_ENV)
            .or_else(|| non_empty(LEGACY_API_KEY_ENV))
            .or(file.gemini.api_key)
        else {
            bail!(
                "Gemini API key not found; set {GEMINI_API_KEY_ENV} or add `api_key` under [gemini] in {}",
                config_path().display()
            );
        };

        let gemini = GeminiConfig {
            api_key,
            model: non_empty(GEMINI_MODEL_ENV)
                .or(file.gemini.model)
                .unwrap_or_else(|| GeminiConfig::DEFAULT_MODEL.to_string()),
            base_url: non_empty(GEMINI_BASE_URL_ENV)
                .or(file.gemini.base_url)
                .unwrap_or_else(|| GeminiConfig::DEFAULT_BASE_URL.to_string()),
            timeout: GeminiConfig::DEFAULT_TIMEOUT,
        };

        let identity = IdentityConfig {
            api_key: non_empty(IDENTITY_API_KEY_ENV).or(file.identity.api_key),
            base_url: non_empty(IDENTITY_BASE_URL_ENV)
                .or(file.identity.base_url)
                .unwrap_or_else(|| IdentityConfig::DEFAULT_BASE_URL.to_string()),
        };

        let data_dir = non_empty(DATA_DIR_ENV)
            .map(PathBuf::from)
            .or(file.storage.data_dir)
            .unwrap_or_else(default_data_dir);

        Ok(Self {
            gemini,
            identity,
            data_dir,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
