//! TOML Configuration File Support
//!
//! Loads orchestrator settings and panel definitions from
//! `~/.config/curtain/curtain.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file follows XDG Base Directory specification:
//! - `$XDG_CONFIG_HOME/curtain/curtain.toml` (typically `~/.config/curtain/curtain.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [orchestrator]
//! entry_panel = "main_menu"
//! default_open_audio = "ui_open"
//! default_close_audio = "ui_close"
//! time_scale = 1.0
//! max_cascade_steps = 256
//!
//! [[panels]]
//! id = "main_menu"
//! on_motion = "tween"
//! off_motion = "instant"
//! on_secs = 0.3
//! off_secs = 0.2
//! easing = "ease_in_out_expo"
//! apply = "fade"
//!
//! [[panels.actions]]
//! event = "opened"
//! target = "news_ticker"
//! action = "turn_on"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::{EasingFunction, DEFAULT_TRANSITION_SECS};
use crate::events::LifecycleEvent;
use crate::messages::{ActionPair, PanelAction, PanelId};
use crate::orchestrator::OrchestratorSettings;
use crate::panel::{
    ApplyMode, MotionStrategy, Panel, PanelSettings, PropertyTween, TickMode, TimedAnimator,
    TweenTarget,
};

/// Environment variable overriding the orchestrator time scale
pub const ENV_TIME_SCALE: &str = "CURTAIN_TIME_SCALE";
/// Environment variable overriding the entry panel
pub const ENV_ENTRY_PANEL: &str = "CURTAIN_ENTRY_PANEL";
/// Environment variable overriding the cascade step bound
pub const ENV_MAX_CASCADE_STEPS: &str = "CURTAIN_MAX_CASCADE_STEPS";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Orchestrator section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorToml {
    /// Panel opened at start-up
    pub entry_panel: Option<String>,

    /// Default open cue
    pub default_open_audio: Option<String>,

    /// Default close cue
    pub default_close_audio: Option<String>,

    /// Time scale for custom-tick panels
    pub time_scale: Option<f32>,

    /// Bound on dispatch steps per call
    pub max_cascade_steps: Option<usize>,
}

/// One `[[panels.actions]]` entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionToml {
    /// Lifecycle event that fires the action
    pub event: LifecycleEvent,

    /// Panel acted on
    pub target: String,

    /// What to do
    pub action: PanelAction,
}

/// One `[[panels]]` entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PanelToml {
    /// Panel identifier
    pub id: String,

    /// Structural parent
    #[serde(default)]
    pub parent: Option<String>,

    /// Turn-on strategy
    #[serde(default)]
    pub on_motion: Option<MotionStrategy>,

    /// Turn-off strategy
    #[serde(default)]
    pub off_motion: Option<MotionStrategy>,

    /// Turn-on duration in seconds
    #[serde(default)]
    pub on_secs: Option<f32>,

    /// Turn-off duration in seconds
    #[serde(default)]
    pub off_secs: Option<f32>,

    /// Easing curve name
    #[serde(default)]
    pub easing: Option<String>,

    /// Built-in tween applier
    #[serde(default)]
    pub apply: Option<ApplyMode>,

    /// Property tweens (takes precedence over `apply`)
    #[serde(default)]
    pub tweens: Vec<PropertyTween>,

    /// Attach a timed external animator with this duration
    #[serde(default)]
    pub animator_secs: Option<f32>,

    /// Frame delta the panel consumes
    #[serde(default)]
    pub tick_mode: Option<TickMode>,

    /// Open cue
    #[serde(default)]
    pub open_audio: Option<String>,

    /// Close cue
    #[serde(default)]
    pub close_audio: Option<String>,

    /// Never fall back to default cues
    #[serde(default)]
    pub custom_audio: Option<bool>,

    /// Start in the `On` state
    #[serde(default)]
    pub turn_on_at_start: Option<bool>,

    /// Cascade actions
    #[serde(default)]
    pub actions: Vec<ActionToml>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurtainToml {
    /// Orchestrator configuration section
    pub orchestrator: OrchestratorToml,

    /// Panel definitions
    pub panels: Vec<PanelToml>,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// A panel definition ready to be built
#[derive(Clone, Debug, PartialEq)]
pub struct PanelConfig {
    /// Panel identifier
    pub id: PanelId,
    /// Structural parent
    pub parent: Option<PanelId>,
    /// Resolved settings
    pub settings: PanelSettings,
    /// Built-in applier
    pub apply: Option<ApplyMode>,
    /// Property tweens
    pub tweens: Vec<PropertyTween>,
    /// Timed animator duration
    pub animator_secs: Option<f32>,
    /// Cascade actions keyed by lifecycle event
    pub actions: Vec<(LifecycleEvent, ActionPair)>,
}

impl PanelConfig {
    /// Build the panel this entry describes
    #[must_use]
    pub fn build(&self) -> Panel {
        let mut panel = Panel::new(self.id.clone(), self.settings.clone());
        if let Some(parent) = &self.parent {
            panel = panel.with_parent(parent.clone());
        }

        if !self.tweens.is_empty() {
            panel = panel.with_target(TweenTarget::Organizer(self.tweens.clone()));
        } else if let Some(mode) = self.apply {
            panel = panel.with_target(TweenTarget::Apply(mode));
        }

        if let Some(secs) = self.animator_secs {
            panel = panel.with_animator(TimedAnimator::new(secs));
        }

        for (event, pair) in &self.actions {
            panel.inject_actions(*event, [pair.clone()]);
        }
        panel
    }
}

impl From<&PanelToml> for PanelConfig {
    fn from(toml: &PanelToml) -> Self {
        let defaults = PanelSettings::default();
        let settings = PanelSettings {
            on_motion: toml.on_motion.unwrap_or(defaults.on_motion),
            off_motion: toml.off_motion.unwrap_or(defaults.off_motion),
            on_secs: toml.on_secs.unwrap_or(DEFAULT_TRANSITION_SECS),
            off_secs: toml.off_secs.unwrap_or(DEFAULT_TRANSITION_SECS),
            easing: toml
                .easing
                .as_deref()
                .map_or(defaults.easing, EasingFunction::from_name),
            tick_mode: toml.tick_mode.unwrap_or(defaults.tick_mode),
            open_audio: toml.open_audio.clone(),
            close_audio: toml.close_audio.clone(),
            custom_audio: toml.custom_audio.unwrap_or(defaults.custom_audio),
            turn_on_at_start: toml.turn_on_at_start.unwrap_or(defaults.turn_on_at_start),
        };

        Self {
            id: PanelId::new(toml.id.clone()),
            parent: toml.parent.clone().map(PanelId::new),
            settings,
            apply: toml.apply,
            tweens: toml.tweens.clone(),
            animator_secs: toml.animator_secs,
            actions: toml
                .actions
                .iter()
                .map(|a| (a.event, ActionPair::new(a.target.as_str(), a.action)))
                .collect(),
        }
    }
}

/// Centralized configuration for the panel engine
#[derive(Clone, Debug)]
pub struct CurtainConfig {
    /// Orchestrator settings
    pub orchestrator: OrchestratorSettings,

    /// Panel definitions, in file order
    pub panels: Vec<PanelConfig>,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for CurtainConfig {
    fn default() -> Self {
        Self {
            orchestrator: OrchestratorSettings::default(),
            panels: Vec::new(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl CurtainConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Look up a panel definition
    #[must_use]
    pub fn panel(&self, id: &str) -> Option<&PanelConfig> {
        self.panels.iter().find(|p| p.id.as_str() == id)
    }

    /// Check values that cannot be repaired with a fallback
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = self.orchestrator.time_scale;
        if !scale.is_finite() || scale < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "time_scale must be a non-negative number, got {scale}"
            )));
        }
        if self.orchestrator.max_cascade_steps == 0 {
            return Err(ConfigError::ValidationError(
                "max_cascade_steps must be at least 1".to_string(),
            ));
        }
        if self.panels.iter().any(|p| p.id.as_str().trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "panel id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/curtain/curtain.toml` or
/// `~/.config/curtain/curtain.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("curtain").join("curtain.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed or fails
/// validation. A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<CurtainConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read, parsed or
/// validated.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<CurtainConfig, ConfigError> {
    load_config_with_env(path.as_deref(), |key| std::env::var(key).ok())
}

/// Load configuration reading environment overrides through `env`
///
/// # Errors
///
/// See [`load_config_from_path`].
pub fn load_config_with_env(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<CurtainConfig, ConfigError> {
    // Start with defaults
    let mut config = CurtainConfig::default();

    // Try to load from file
    if let Some(config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.to_path_buf(),
                    source: e,
                })?;

            let toml_config: CurtainToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.to_path_buf());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                panels = config.panels.len(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    // Apply environment variables (overrides file values)
    apply_env_config(&mut config, env);

    config.validate()?;
    Ok(config)
}

/// Parse configuration from a TOML string, without environment overrides
///
/// # Errors
///
/// Returns an error if the TOML is malformed or fails validation.
pub fn parse_config(toml_content: &str) -> Result<CurtainConfig, ConfigError> {
    let toml_config: CurtainToml = toml::from_str(toml_content)?;
    let mut config = CurtainConfig::default();
    apply_toml_config(&mut config, &toml_config);
    config.source = ConfigSource::File;
    config.validate()?;
    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut CurtainConfig, toml: &CurtainToml) {
    let section = &toml.orchestrator;
    if let Some(entry) = &section.entry_panel {
        config.orchestrator.entry_panel = Some(PanelId::new(entry.clone()));
    }
    if section.default_open_audio.is_some() {
        config.orchestrator.default_open_audio = section.default_open_audio.clone();
    }
    if section.default_close_audio.is_some() {
        config.orchestrator.default_close_audio = section.default_close_audio.clone();
    }
    if let Some(scale) = section.time_scale {
        config.orchestrator.time_scale = scale;
    }
    if let Some(steps) = section.max_cascade_steps {
        config.orchestrator.max_cascade_steps = steps;
    }

    config.panels = toml.panels.iter().map(PanelConfig::from).collect();
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut CurtainConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(scale) = env(ENV_TIME_SCALE) {
        match scale.parse::<f32>() {
            Ok(scale) => {
                config.orchestrator.time_scale = scale;
                config.source = ConfigSource::Env;
            }
            Err(_) => tracing::warn!(var = ENV_TIME_SCALE, value = %scale, "Ignoring unparsable value"),
        }
    }
    if let Some(entry) = env(ENV_ENTRY_PANEL) {
        config.orchestrator.entry_panel = Some(PanelId::new(entry));
        config.source = ConfigSource::Env;
    }
    if let Some(steps) = env(ENV_MAX_CASCADE_STEPS) {
        match steps.parse::<usize>() {
            Ok(steps) => {
                config.orchestrator.max_cascade_steps = steps;
                config.source = ConfigSource::Env;
            }
            Err(_) => {
                tracing::warn!(var = ENV_MAX_CASCADE_STEPS, value = %steps, "Ignoring unparsable value");
            }
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Time scale override
    pub time_scale: Option<f32>,

    /// Entry panel override
    pub entry_panel: Option<String>,

    /// Cascade bound override
    pub max_cascade_steps: Option<usize>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set time scale override
    #[must_use]
    pub fn with_time_scale(mut self, scale: f32) -> Self {
        self.time_scale = Some(scale);
        self
    }

    /// Set entry panel override
    #[must_use]
    pub fn with_entry_panel(mut self, panel: String) -> Self {
        self.entry_panel = Some(panel);
        self
    }

    /// Set cascade bound override
    #[must_use]
    pub fn with_max_cascade_steps(mut self, steps: usize) -> Self {
        self.max_cascade_steps = Some(steps);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut CurtainConfig) {
        if self.time_scale.is_some()
            || self.entry_panel.is_some()
            || self.max_cascade_steps.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(scale) = self.time_scale {
            config.orchestrator.time_scale = scale;
        }
        if let Some(ref panel) = self.entry_panel {
            config.orchestrator.entry_panel = Some(PanelId::new(panel.clone()));
        }
        if let Some(steps) = self.max_cascade_steps {
            config.orchestrator.max_cascade_steps = steps;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
