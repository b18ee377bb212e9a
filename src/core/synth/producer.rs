use std::sync::Arc;

use super::{NoteState, SynthConfig};
use crate::core::oscillator::{phase_increment, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerMode {
    Sounding,
    Silent,
}

/// Pull-driven block generator continuing one oscillator phase across blocks.
///
/// Owned by the audio callback. The note frequency is read once per block,
/// so a note change lands on the next block boundary.
pub struct WaveformProducer {
    config: SynthConfig,
    notes: Arc<NoteState>,
    phase: Phase,
    mode: ProducerMode,
}

impl WaveformProducer {
    pub fn new(config: SynthConfig, notes: Arc<NoteState>) -> Self {
        Self {
            config,
            notes,
            phase: Phase::ZERO,
            mode: ProducerMode::Silent,
        }
    }

    /// Fill `buffer` with the next block of samples.
    pub fn produce_block(&mut self, buffer: &mut [f32]) {
        debug_assert!(!buffer.is_empty(), "block must hold at least one sample");

        let frequency = self.notes.snapshot_frequency();
        if frequency == 0.0 {
            // silence leaves the phase where it was
            buffer.fill(0.0);
            self.mode = ProducerMode::Silent;
            return;
        }
        self.mode = ProducerMode::Sounding;

        let step = phase_increment(frequency, self.config.sample_rate);
        let start = self.phase;
        self.phase.advance(step * buffer.len() as f64);

        self.config
            .waveform
            .fill(buffer, start, step, self.config.amplitude as f64);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> ProducerMode {
        self.mode
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }
}
