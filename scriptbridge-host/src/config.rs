//! Configuration file loading and management
//!
//! This module handles loading and parsing the host configuration from
//! `$XDG_CONFIG_HOME/scriptbridge/config.toml`. If the configuration file
//! doesn't exist, a default configuration is created with documented comments.

use anyhow::{Context, Result};
use provider_ruby::RubySettings;
use scriptbridge_core::{ClassDescriptor, ContextScope, ScriptLanguage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main host configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    /// Engine-wide configuration
    #[serde(default)]
    pub engine: EngineConfig,
    /// Per-language backend configuration
    #[serde(default)]
    pub languages: LanguagesConfig,
    /// Host types described to scripts
    #[serde(default, rename = "class", skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<ClassDescriptor>,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Language the ambient engine should use when available.
    /// If None, the first enabled backend is used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<ScriptLanguage>,
    /// Concurrency tier for new interpreters: "concurrent" or "single_thread"
    /// Default: "concurrent"
    pub context_scope: ContextScope,
    /// Log level (trace, debug, info, warn, error)
    /// Default: "info"
    pub log_level: String,
}

/// Backend configurations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LanguagesConfig {
    #[serde(default)]
    pub ruby: RubyConfig,
}

/// Ruby backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RubyConfig {
    /// Whether the Ruby backend is registered
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// How to launch the runtime
    #[serde(flatten)]
    pub settings: RubySettings,
}

fn default_enabled() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preferred_language: None,
            context_scope: ContextScope::Concurrent,
            log_level: "info".to_string(),
        }
    }
}

impl Default for RubyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            settings: RubySettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from the specified path
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// The parsed configuration or an error if loading/parsing fails
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default XDG config location
    ///
    /// If the configuration file doesn't exist, creates a default configuration
    /// file with documented comments.
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_file(&config_path)?;
        }

        Self::load(&config_path)
    }

    /// Get the default configuration file path
    ///
    /// Returns `$XDG_CONFIG_HOME/scriptbridge/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "raibid-labs", "scriptbridge")
            .context("Failed to determine project directories")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Create a default configuration file with documented comments
    pub fn create_default_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config file: {}", path.display()))?;

        tracing::info!("Created default configuration file at: {}", path.display());
        Ok(())
    }

    /// Generate the default configuration file content with comments
    fn default_config_content() -> String {
        r#"# scriptbridge configuration

[engine]
# Language the ambient engine uses when its backend is enabled: "ruby" or "none"
# If not specified, the first enabled backend is used
# preferred_language = "ruby"

# Concurrency tier for new interpreters
# "concurrent": evaluations on one interpreter may overlap
# "single_thread": evaluations on one interpreter run one at a time
# Default: "concurrent"
context_scope = "concurrent"

# Log level: trace, debug, info, warn, error
# Default: "info"
log_level = "info"

[languages.ruby]
# Whether the Ruby backend is available (default: true)
# When the runtime cannot be started, scripting falls back to the no-op backend
enabled = true

# Ruby executable, looked up on PATH when not absolute
# Default: "ruby"
executable = "ruby"

# Directories added to $LOAD_PATH for every evaluation
# load_paths = ["/path/to/lib"]

# Libraries required before every evaluation
# requires = ["set", "json"]

# Host types scripts can ask about (`scriptbridge methods <name>`)
# [[class]]
# name = "Box"
#
# [[class.methods]]
# name = "size"
# returns = "u32"
#
# [[class.methods]]
# name = "resize"
# params = ["u32", "u32"]
"#
        .to_string()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.engine.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log_level: {}. Must be one of: {}",
                self.engine.log_level,
                valid_log_levels.join(", ")
            );
        }

        let ruby = &self.languages.ruby;
        if ruby.enabled && ruby.settings.executable.as_os_str().is_empty() {
            anyhow::bail!("languages.ruby.executable must not be empty");
        }

        if self.engine.preferred_language == Some(ScriptLanguage::Ruby) && !ruby.enabled {
            anyhow::bail!("preferred_language is ruby but languages.ruby.enabled is false");
        }

        let mut seen = std::collections::HashSet::new();
        for class in &self.classes {
            if class.name.trim().is_empty() {
                anyhow::bail!("class name must not be empty");
            }
            if !seen.insert(class.name.as_str()) {
                anyhow::bail!("class '{}' is declared more than once", class.name);
            }
        }

        Ok(())
    }
}
