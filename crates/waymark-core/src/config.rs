#![forbid(unsafe_code)]

//! Guide-level configuration.
//!
//! [`GuideConfig`] carries the guide-wide option layer (sections keyed by
//! component id) and the runtime tunables that are not per-component
//! options. It can be loaded from TOML or JSON at startup:
//!
//! ```toml
//! resize_throttle_ms = 250
//!
//! [options.tour]
//! alwaysMark = false
//!
//! [options.marker]
//! placement = "overlay"
//! position = "bottom"
//! ```
//!
//! ```rust,ignore
//! let config = GuideConfig::from_toml_file("waymark.toml")?;
//! ```
//!
//! `GuideConfig::default()` matches the compiled component defaults, so an
//! empty file changes nothing.

#[cfg(feature = "config")]
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::options::OptionSet;
use crate::schedule::DEFAULT_RESIZE_THROTTLE;

/// Default clearance between an overlay marker and its anchor, in pixels.
pub const DEFAULT_MARKER_SPACING: f64 = 15.0;

/// Default horizontal drift, in pixels, before a smart arrow is created.
pub const DEFAULT_ARROW_TOLERANCE: f64 = 10.0;

/// Top-level configuration for a guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    /// Guide-wide options, one section per component id
    /// (`tour`, `spot`, `marker`, or an extension id).
    pub options: OptionSet,

    /// Minimum interval between resize-driven overlay repositioning passes.
    pub resize_throttle_ms: u64,

    /// Whether the guide container starts shown.
    pub start_shown: bool,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            options: OptionSet::new(),
            resize_throttle_ms: DEFAULT_RESIZE_THROTTLE.as_millis() as u64,
            start_shown: false,
        }
    }
}

impl GuideConfig {
    /// Set the guide-wide options.
    #[must_use]
    pub fn with_options(mut self, options: OptionSet) -> Self {
        self.options = options;
        self
    }

    /// Set the resize throttle interval.
    #[must_use]
    pub fn with_resize_throttle(mut self, interval: Duration) -> Self {
        self.resize_throttle_ms = interval.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn resize_throttle(&self) -> Duration {
        Duration::from_millis(self.resize_throttle_ms)
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate parameters. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (key, value) in self.options.iter() {
            if value.as_map().is_none() {
                errors.push(format!(
                    "options.{key} must be a section keyed by component id, got '{value}'"
                ));
            }
        }

        if let Some(spacing) = self.options.get_f64("marker.spacing")
            && spacing < 0.0
        {
            errors.push(format!("options.marker.spacing must be >= 0, got {spacing}"));
        }

        if let Some(tolerance) = self.options.get_f64("marker.arrowTolerance")
            && tolerance < 0.0
        {
            errors.push(format!(
                "options.marker.arrowTolerance must be >= 0, got {tolerance}"
            ));
        }

        errors
    }

    #[cfg(feature = "config")]
    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors from loading a [`GuideConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// File could not be read.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
