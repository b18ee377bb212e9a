use anyhow::bail;
use serde::{Deserialize, Deserializer, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use super::Phase;

/// Periodic shapes the producer can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Saw,
    #[default]
    Square,
}

impl Waveform {
    /// Evaluate the shape at `phase`, scaled by `amplitude`.
    pub fn sample(&self, phase: Phase, amplitude: f64) -> f64 {
        let phase = phase.radians();
        match self {
            Waveform::Sine => amplitude * phase.sin(),
            Waveform::Saw => amplitude * (2.0 * (phase / TAU) - 1.0),
            Waveform::Square => amplitude * if phase < PI { 1.0 } else { -1.0 },
        }
    }

    /// Fill `buffer` starting at `start`, stepping the local phase by `step` radians per sample.
    pub fn fill(&self, buffer: &mut [f32], start: Phase, step: f64, amplitude: f64) {
        let mut phase = start;
        for sample in buffer.iter_mut() {
            *sample = self.sample(phase, amplitude) as f32;
            phase.step(step);
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Saw => "saw",
            Waveform::Square => "square",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" => Ok(Waveform::Sine),
            "saw" => Ok(Waveform::Saw),
            "square" => Ok(Waveform::Square),
            other => bail!("Unknown waveform: {}", other),
        }
    }
}

/// Lenient deserializer for settings files: unknown names fall back to the default shape.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Waveform, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    Ok(name.parse().unwrap_or_else(|_| {
        log::warn!("Unknown waveform: {}, using {}", name, Waveform::default());
        Waveform::default()
    }))
}
