//! Engine configuration
//!
//! Loaded from JSON. Every field is optional in the file and falls back to
//! its default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::buffer::{MAX_DURATION_SECS, SAMPLE_RATE};
use crate::error::{Result, SynthError};
use crate::synth::PresetTable;

/// Default in-memory limit (1 hour, ~635 MB of f32 samples)
pub const DEFAULT_MAX_IN_MEMORY_SECS: f64 = 3600.0;

/// Default chunk for streaming renders (10 seconds)
pub const DEFAULT_CHUNK_SAMPLES: usize = SAMPLE_RATE as usize * 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Longest accepted request
    pub max_duration_secs: f64,
    /// Longest request rendered as a single in-memory buffer
    pub max_in_memory_secs: f64,
    /// Samples per chunk in streaming renders
    pub chunk_samples: usize,
    /// Seed used when a request does not carry one
    pub default_seed: Option<u64>,
    /// Directory holding pre-recorded sounds
    pub asset_dir: Option<PathBuf>,
    pub presets: PresetTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: MAX_DURATION_SECS,
            max_in_memory_secs: DEFAULT_MAX_IN_MEMORY_SECS,
            chunk_samples: DEFAULT_CHUNK_SAMPLES,
            default_seed: None,
            asset_dir: None,
            presets: PresetTable::default(),
        }
    }
}

impl EngineConfig {
    /// Read and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SynthError::Config {
                reason: format!("config file not found: {}", path.display()),
            });
        }
        let text = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Write this config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.max_duration_secs > 0.0 && self.max_duration_secs <= MAX_DURATION_SECS) {
            return Err(SynthError::Config {
                reason: format!(
                    "max_duration_secs must be in (0, {}], got {}",
                    MAX_DURATION_SECS, self.max_duration_secs
                ),
            });
        }
        if !(self.max_in_memory_secs > 0.0 && self.max_in_memory_secs <= self.max_duration_secs) {
            return Err(SynthError::Config {
                reason: format!(
                    "max_in_memory_secs must be in (0, max_duration_secs], got {}",
                    self.max_in_memory_secs
                ),
            });
        }
        if self.chunk_samples == 0 {
            return Err(SynthError::Config {
                reason: "chunk_samples must be greater than zero".to_string(),
            });
        }
        self.presets.validate()
    }
}
