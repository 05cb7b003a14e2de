//! Engine configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (WAYLAY_*)
//! 2. TOML config file (if WAYLAY_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The routing pattern lists are the only externally tunable policy
//! surface of the engine; everything else is plumbing (paths, limits).

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Engine configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (WAYLAY_*)
/// 2. TOML config file (if WAYLAY_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Deployment version identifier. Bumping it supersedes both stores;
    /// old versions are purged on activation.
    ///
    /// Set via WAYLAY_VERSION environment variable.
    #[serde(default = "default_version")]
    pub version: String,

    /// Application origin. Same-origin requests are eligible for every
    /// strategy; precache asset paths are resolved against it.
    ///
    /// Set via WAYLAY_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Shell asset paths written into the precache store at install time.
    ///
    /// Set via WAYLAY_PRECACHE_ASSETS environment variable (comma-separated).
    #[serde(default = "default_precache_assets")]
    pub precache_assets: Vec<String>,

    /// Path to the SQLite cache database.
    ///
    /// Set via WAYLAY_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for outbound requests.
    ///
    /// Set via WAYLAY_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via WAYLAY_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Network request timeout in milliseconds.
    ///
    /// Set via WAYLAY_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Path patterns that must never be cached (auth, admin, analytics).
    /// Checked before every other rule set.
    #[serde(default = "default_network_only")]
    pub network_only: Vec<String>,

    /// Extension patterns served cache-first (images, fonts, bundles).
    #[serde(default = "default_cache_first")]
    pub cache_first: Vec<String>,

    /// Patterns served network-first (API paths, data files, documents).
    /// Unmatched requests also default to network-first.
    #[serde(default = "default_network_first")]
    pub network_first: Vec<String>,
}

fn default_version() -> String {
    "v1".into()
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}

fn default_precache_assets() -> Vec<String> {
    ["/", "/index.html", "/app.js", "/styles.css", "/manifest.json"]
        .map(String::from)
        .to_vec()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./waylay-cache.sqlite")
}

fn default_user_agent() -> String {
    "waylay/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_network_only() -> Vec<String> {
    [r"^/api/auth(/|$)", r"^/admin(/|$)", r"^/analytics(/|$)"]
        .map(String::from)
        .to_vec()
}

fn default_cache_first() -> Vec<String> {
    [
        r"\.(?:png|jpe?g|gif|webp|svg|ico)$",
        r"\.(?:woff2?|ttf|otf|eot)$",
        r"\.(?:js|mjs|css)$",
    ]
    .map(String::from)
    .to_vec()
}

fn default_network_first() -> Vec<String> {
    [r"^/api/", r"\.(?:json|xml|csv)$", r"\.html?$"].map(String::from).to_vec()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            origin: default_origin(),
            precache_assets: default_precache_assets(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            network_only: default_network_only(),
            cache_first: default_cache_first(),
            network_first: default_network_first(),
        }
    }
}

impl EngineConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `WAYLAY_`
    /// 2. TOML file from `WAYLAY_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WAYLAY_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("WAYLAY_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
