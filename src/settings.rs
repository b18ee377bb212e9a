use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::core::oscillator::{deserialize_waveform, Waveform};
use crate::core::synth::{SynthConfig, DEFAULT_AMPLITUDE, DEFAULT_BLOCK_SIZE, DEFAULT_SAMPLE_RATE};

const SETTINGS_DIR: &str = "midiplayer";
const SETTINGS_FILE: &str = "settings.json";

/// User settings, persisted as JSON in the platform config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    #[serde(deserialize_with = "deserialize_waveform")]
    pub waveform: Waveform,
    pub amplitude: f32,
    pub sample_rate: u32,
    pub block_size: usize,
    /// Output gain applied after synthesis, 0.0 = silent, 1.0 = full scale
    pub master_volume: f32,
    /// Case-insensitive substring of the MIDI input port to use
    pub midi_port: String,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            waveform: Waveform::Square,
            amplitude: DEFAULT_AMPLITUDE,
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            master_volume: 0.2,
            midi_port: "CASIO".to_string(),
        }
    }
}

impl PlayerSettings {
    pub fn settings_dir() -> Result<PathBuf> {
        let mut path =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not find config directory"))?;
        path.push(SETTINGS_DIR);
        Ok(path)
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::settings_dir()?.join(SETTINGS_FILE))
    }

    /// Load the settings file from the platform config directory, see [`Self::load_or_create_at`].
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::default_path()?)
    }

    /// Load the settings file at `path`, writing out the defaults first if there is none.
    pub fn load_or_create_at(path: &Path) -> Result<Self> {
        if path.exists() {
            let settings = Self::load(path)?;
            info!("Loaded settings from {}", path.display());
            return Ok(settings);
        }

        let settings = Self::default();
        match settings.save(path) {
            Ok(()) => info!("Wrote default settings to {}", path.display()),
            Err(err) => warn!("Could not write default settings: {:#}", err),
        }
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open settings file: {}", path.display()))?;
        let settings: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create settings directory")?;
        }
        let file = File::create(path).context("Failed to create settings file")?;
        serde_json::to_writer_pretty(file, self).context("Failed to write settings")?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            bail!("sample_rate must be positive");
        }
        if self.block_size == 0 {
            bail!("block_size must be positive");
        }
        if !(0.0..=1.0).contains(&self.amplitude) {
            bail!("amplitude must be within [0, 1], got {}", self.amplitude);
        }
        if !(0.0..=1.0).contains(&self.master_volume) {
            bail!("master_volume must be within [0, 1], got {}", self.master_volume);
        }
        Ok(())
    }

    pub fn synth_config(&self) -> SynthConfig {
        SynthConfig {
            sample_rate: self.sample_rate,
            waveform: self.waveform,
            amplitude: self.amplitude,
            block_size: self.block_size,
        }
    }
}
