//! Game configuration.
//!
//! Narration timing, retry policy, selection seed and the catalog location.
//! Configuration can be loaded from and saved to a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::narration::NarrationTiming;
use crate::tutorial::InteractionSettings;

/// Configuration file name.
pub const CONFIG_FILE: &str = "phonics.toml";

/// Game configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Narration ===
    /// Pause before each separated sound after the first (ms)
    pub phoneme_gap_ms: u64,
    /// Pause after tutorial narration beats (ms)
    pub narration_pause_ms: u64,
    /// Pause after feedback narration (ms)
    pub feedback_pause_ms: u64,

    // === Tutorial ===
    /// Tutorial misses before the problem advances anyway
    pub escape_after_misses: u32,

    // === Selection ===
    /// Problem selection seed (None = random)
    pub rng_seed: Option<u64>,

    // === Content ===
    /// Problem catalog document
    pub catalog_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        let timing = NarrationTiming::default();
        Self {
            phoneme_gap_ms: timing.phoneme_gap_ms,
            narration_pause_ms: timing.narration_pause_ms,
            feedback_pause_ms: timing.feedback_pause_ms,
            escape_after_misses: 2,
            rng_seed: None,
            catalog_path: PathBuf::from("catalog.toml"),
        }
    }
}

impl GameConfig {
    /// Load configuration from `phonics.toml` in the working directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str::<Self>(&contents) {
                    Ok(mut config) => {
                        info!("Loaded config from {}", path.display());
                        config.validate();
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.phoneme_gap_ms = self.phoneme_gap_ms.min(5_000);
        self.narration_pause_ms = self.narration_pause_ms.min(10_000);
        self.feedback_pause_ms = self.feedback_pause_ms.min(10_000);
        // At least one miss before the escape valve opens.
        self.escape_after_misses = self.escape_after_misses.clamp(1, 10);
    }

    /// Narration pauses.
    #[must_use]
    pub fn timing(&self) -> NarrationTiming {
        NarrationTiming {
            phoneme_gap_ms: self.phoneme_gap_ms,
            narration_pause_ms: self.narration_pause_ms,
            feedback_pause_ms: self.feedback_pause_ms,
        }
    }

    /// Interaction tunables.
    #[must_use]
    pub fn interaction_settings(&self) -> InteractionSettings {
        InteractionSettings {
            timing: self.timing(),
            escape_after_misses: self.escape_after_misses,
        }
    }
}
