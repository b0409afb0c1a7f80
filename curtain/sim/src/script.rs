//! Request scripts
//!
//! A script is a TOML list of steps. Each step can advance the clock and
//! then issue one request:
//!
//! ```toml
//! [[steps]]
//! request = { panel = "menu", direction = "on", cascade_ancestors = true }
//!
//! [[steps]]
//! tick = 30
//! request = { panel = "menu", direction = "off" }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use curtain_core::TransitionRequest;

/// One scripted step
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Frames to advance before the request
    #[serde(default)]
    pub tick: u32,

    /// Request to issue after ticking
    #[serde(default)]
    pub request: Option<TransitionRequest>,
}

/// Parsed script
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse a script from TOML
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse script")
    }

    /// Read and parse a script file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {path:?}"))?;
        Self::parse(&content).with_context(|| format!("Invalid script: {path:?}"))
    }

    /// Total frames the script advances
    pub fn total_ticks(&self) -> u64 {
        self.steps.iter().map(|step| u64::from(step.tick)).sum()
    }
}
