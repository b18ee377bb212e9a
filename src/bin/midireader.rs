//! Dump every message from the configured MIDI input port.

use anyhow::Result;
use env_logger::Env;
use log::info;

use midiplayer::core::midi::MidiMessage;
use midiplayer::utils::helpers::{format_bytes_hex, note_name};
use midiplayer::{MidiInputHandler, PlayerSettings};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let settings = PlayerSettings::load_or_create()?;

    for port in MidiInputHandler::list_ports()? {
        info!("Input port: {}", port);
    }

    let mut midi = MidiInputHandler::new();
    let (_port, messages) = midi.connect_raw(&settings.midi_port)?;

    // the connection owns the sender, so this runs until the process is interrupted
    for message in messages.iter() {
        let decoded = match MidiMessage::parse(&message.bytes) {
            MidiMessage::NoteOn { note, velocity, .. } => {
                format!(" note on {} vel {}", note_name(note), velocity)
            }
            MidiMessage::NoteOff { note, .. } => format!(" note off {}", note_name(note)),
            MidiMessage::Other => String::new(),
        };
        info!(
            "Received MIDI message with {} bytes: {{ {} }} at timestamp {}{}",
            message.bytes.len(),
            format_bytes_hex(&message.bytes),
            message.timestamp,
            decoded
        );
    }

    Ok(())
}
