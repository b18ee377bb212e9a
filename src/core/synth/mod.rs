pub mod note_state;
pub mod producer;

pub use note_state::{NoteChange, NoteSnapshot, NoteState};
pub use producer::{ProducerMode, WaveformProducer};

use crate::core::oscillator::Waveform;

pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;
/// 10 ms at the default sample rate
pub const DEFAULT_BLOCK_SIZE: usize = 480;
pub const DEFAULT_AMPLITUDE: f32 = 0.3;

/// Producer configuration, fixed for the lifetime of a producer.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    pub sample_rate: u32,
    pub waveform: Waveform,
    /// Peak amplitude in [0.0, 1.0]
    pub amplitude: f32,
    /// Samples per pull
    pub block_size: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            waveform: Waveform::default(),
            amplitude: DEFAULT_AMPLITUDE,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}
