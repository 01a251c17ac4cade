//! Configuration management for inkset.
//!
//! Parses `inkset.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! Programmatic settings can be applied during load via [`Overrides`].
//!
//! ```toml
//! theme = "dark"
//!
//! [render]
//! sanitize = true
//! wrapper_tag = "article"
//! wrapper_class = "inkset"
//!
//! [parser]
//! extensions = ["table", "math"]
//!
//! [plugins.diagram]
//! enabled = false
//!
//! [plugins.heading]
//! priority = 5
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct Overrides {
    /// Override color theme.
    pub theme: Option<Theme>,
    /// Override sanitize flag.
    pub sanitize: Option<bool>,
    /// Override wrapper tag.
    pub wrapper_tag: Option<String>,
    /// Override wrapper class.
    pub wrapper_class: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "inkset.toml";

/// Color theme passed to plugin style and render functions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Theme name as used in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Color theme.
    pub theme: Theme,
    /// Static rendering configuration.
    pub render: RenderConfig,
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Per-plugin settings, keyed by plugin name.
    pub plugins: BTreeMap<String, PluginConfig>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Static rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Pass raw HTML through the sanitizer.
    pub sanitize: bool,
    /// Tag wrapping the rendered document, if any.
    pub wrapper_tag: Option<String>,
    /// Class on the wrapper tag; also scopes plugin styles.
    pub wrapper_class: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sanitize: false,
            wrapper_tag: None,
            wrapper_class: "inkset".to_owned(),
        }
    }
}

/// Parser configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Syntax extensions registered in addition to those plugins request.
    pub extensions: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            extensions: ["table", "strikethrough", "task-list", "math"]
                .map(str::to_owned)
                .to_vec(),
        }
    }
}

/// Per-plugin settings.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PluginConfig {
    /// Whether the plugin is registered.
    pub enabled: bool,
    /// Priority override (lower runs first).
    pub priority: Option<i32>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional overrides.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `inkset.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// Overrides are applied after loading, then the result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or a value is invalid.
    pub fn load(
        config_path: Option<&Path>,
        overrides: Option<&Overrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(overrides) = overrides {
            config.apply_overrides(overrides);
            config.validate()?;
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Search for config file in `start` and its parents.
    #[must_use]
    pub fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Settings for a plugin, defaulting to enabled with no priority override.
    #[must_use]
    pub fn plugin(&self, name: &str) -> PluginConfig {
        self.plugins.get(name).copied().unwrap_or_default()
    }

    /// Apply overrides to the configuration.
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(theme) = overrides.theme {
            self.theme = theme;
        }
        if let Some(sanitize) = overrides.sanitize {
            self.render.sanitize = sanitize;
        }
        if let Some(wrapper_tag) = &overrides.wrapper_tag {
            self.render.wrapper_tag = Some(wrapper_tag.clone());
        }
        if let Some(wrapper_class) = &overrides.wrapper_class {
            self.render.wrapper_class.clone_from(wrapper_class);
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_render()?;
        self.validate_plugins()?;
        Ok(())
    }

    /// Validate render configuration.
    fn validate_render(&self) -> Result<(), ConfigError> {
        if let Some(tag) = &self.render.wrapper_tag {
            let mut chars = tag.chars();
            let valid = chars.next().is_some_and(|c| c.is_ascii_lowercase())
                && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
            if !valid {
                return Err(ConfigError::Validation(format!(
                    "render.wrapper_tag must be a lowercase tag name, got {tag:?}"
                )));
            }
        }

        let class = &self.render.wrapper_class;
        if class.is_empty() {
            return Err(ConfigError::Validation(
                "render.wrapper_class cannot be empty".to_owned(),
            ));
        }
        if class.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "render.wrapper_class must be a single class name, got {class:?}"
            )));
        }

        Ok(())
    }

    /// Validate plugin configuration.
    fn validate_plugins(&self) -> Result<(), ConfigError> {
        if let Some(name) = self.plugins.keys().find(|name| name.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "plugin name cannot be empty, got {name:?}"
            )));
        }
        Ok(())
    }
}
