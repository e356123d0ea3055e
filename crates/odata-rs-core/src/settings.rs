//! Settings for the odata-rs workspace.
//!
//! This module provides the [`Settings`] struct holding all runtime
//! configuration, and [`LazySettings`], a globally-accessible,
//! lazily-initialized settings instance. Settings can be loaded from TOML
//! files with environment variable overrides layered on top.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `ODATA_DEBUG` | `debug` |
//! | `ODATA_LOG_LEVEL` | `log_level` |
//! | `ODATA_ATTRIBUTE_CONTAINERS` | `attribute_containers` (comma-separated) |
//! | `ODATA_DEFAULT_BACKEND` | `default_backend` |
//! | `ODATA_MAX_TOP` | `max_top` |

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{ODataError, ODataResult};

/// The complete set of workspace settings.
///
/// Use [`SETTINGS`] to access the global instance, or construct one
/// directly and pass it to the components that take settings explicitly.
///
/// # Examples
///
/// ```
/// use odata_rs_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.attribute_containers, vec!["attributes".to_string()]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,

    // ── Query compilation ────────────────────────────────────────────

    /// Container names under which ad hoc (dynamic) columns may appear,
    /// e.g. `attributes` allows `attributes.color` in filters.
    pub attribute_containers: Vec<String>,
    /// The SQL backend queries are rendered for by default
    /// ("postgres", "sqlite", or "mysql").
    pub default_backend: String,
    /// Optional ceiling applied to `$top` values. `None` leaves paging
    /// uncapped.
    pub max_top: Option<u64>,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            attribute_containers: vec!["attributes".to_string()],
            default_backend: "postgres".to_string(),
            max_top: None,
            extra: HashMap::new(),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML string.
    ///
    /// Fields not present in the TOML keep their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or cannot be deserialized.
    pub fn from_toml_str(toml_str: &str) -> ODataResult<Self> {
        toml::from_str(toml_str)
            .map_err(|e| ODataError::Configuration(format!("Failed to parse TOML: {e}")))
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ODataResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ODataError::Configuration(format!(
                "Failed to read TOML file '{}': {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads settings from a TOML file and then applies environment
    /// variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed.
    pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> ODataResult<Self> {
        let mut settings = Self::from_toml_file(path)?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Loads settings from just environment variables (starting from
    /// defaults).
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env_overrides();
        settings
    }

    /// Applies `ODATA_*` environment variable overrides to this struct.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ODATA_DEBUG") {
            self.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
        }

        if let Ok(val) = std::env::var("ODATA_LOG_LEVEL") {
            self.log_level = val;
        }

        if let Ok(val) = std::env::var("ODATA_ATTRIBUTE_CONTAINERS") {
            self.attribute_containers = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(val) = std::env::var("ODATA_DEFAULT_BACKEND") {
            self.default_backend = val;
        }

        if let Ok(val) = std::env::var("ODATA_MAX_TOP") {
            if let Ok(cap) = val.parse::<u64>() {
                self.max_top = Some(cap);
            }
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup to set the
/// settings, then use [`get`](LazySettings::get) to access them.
///
/// # Panics
///
/// [`get`](LazySettings::get) panics if settings have not been configured.
/// [`configure`](LazySettings::configure) panics if called more than once.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
///
/// Call `SETTINGS.configure(settings)` once at application startup, then
/// access settings via `SETTINGS.get()` anywhere in the workspace.
pub static SETTINGS: LazySettings = LazySettings::new();
