pub mod app;
pub mod core;
pub mod settings;
pub mod utils;

pub use crate::app::Player;
pub use crate::core::midi::{MidiInputHandler, MidiMessage};
pub use crate::core::oscillator::{Phase, Waveform};
pub use crate::core::synth::{NoteSnapshot, NoteState, SynthConfig, WaveformProducer};
pub use crate::settings::PlayerSettings;
