mod input;
mod message;

pub use input::{match_port, MidiInputHandler, RawMidiMessage};
pub use message::MidiMessage;
