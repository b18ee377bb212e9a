use std::sync::Arc;

use anyhow::{anyhow, Result};
use crossbeam_channel::{unbounded, Receiver};
use log::{debug, info};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort};

use super::MidiMessage;
use crate::core::synth::{NoteChange, NoteState};
use crate::utils::helpers::{format_frequency, note_name};

const CLIENT_NAME: &str = "midiplayer input";

/// Raw message as delivered by the transport, with its timestamp in microseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMidiMessage {
    pub timestamp: u64,
    pub bytes: Vec<u8>,
}

/// Handles MIDI input from a connected device
pub struct MidiInputHandler {
    connection: Option<MidiInputConnection<()>>,
    port_name: Option<String>,
}

impl MidiInputHandler {
    pub fn new() -> Self {
        Self {
            connection: None,
            port_name: None,
        }
    }

    /// List the names of all available MIDI input ports
    pub fn list_ports() -> Result<Vec<String>> {
        let midi_in = new_client(Ignore::All)?;
        Ok(midi_in
            .ports()
            .iter()
            .filter_map(|port| midi_in.port_name(port).ok())
            .collect())
    }

    /// Connect to the first port whose name contains `pattern` and route note
    /// messages into `notes`. Returns the full name of the connected port.
    pub fn connect_notes(&mut self, pattern: &str, notes: Arc<NoteState>) -> Result<String> {
        self.disconnect();

        let midi_in = new_client(ignore_filter(ConnectionKind::Notes))?;
        let (port, name) = find_port(&midi_in, pattern)?;
        info!("Using port {}", name);

        // the callback runs on the transport's own thread
        let connection = midi_in
            .connect(
                &port,
                "midiplayer-read-input",
                move |_stamp, message, _| {
                    route_message(message, &notes);
                },
                (),
            )
            .map_err(|err| anyhow!("Failed to connect to MIDI port '{}': {}", name, err))?;

        self.connection = Some(connection);
        self.port_name = Some(name.clone());
        Ok(name)
    }

    /// Connect to the first port matching `pattern` and forward every message,
    /// unparsed, over a channel.
    pub fn connect_raw(&mut self, pattern: &str) -> Result<(String, Receiver<RawMidiMessage>)> {
        self.disconnect();

        let midi_in = new_client(ignore_filter(ConnectionKind::Raw))?;
        let (port, name) = find_port(&midi_in, pattern)?;
        info!("Using port {}", name);

        let (sender, receiver) = unbounded();
        let connection = midi_in
            .connect(
                &port,
                "midiplayer-monitor",
                move |timestamp, message, _| {
                    sender
                        .send(RawMidiMessage {
                            timestamp,
                            bytes: message.to_vec(),
                        })
                        .ok();
                },
                (),
            )
            .map_err(|err| anyhow!("Failed to connect to MIDI port '{}': {}", name, err))?;

        self.connection = Some(connection);
        self.port_name = Some(name.clone());
        Ok((name, receiver))
    }

    /// Disconnect from the currently connected MIDI port
    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
            if let Some(name) = self.port_name.take() {
                info!("Closed MIDI port {}", name);
            }
        }
    }

    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }
}

impl Default for MidiInputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MidiInputHandler {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Index of the first name containing `pattern`, ignoring case.
pub fn match_port<S: AsRef<str>>(names: &[S], pattern: &str) -> Option<usize> {
    let pattern = pattern.to_lowercase();
    names
        .iter()
        .position(|name| name.as_ref().to_lowercase().contains(&pattern))
}

/// Decode one message and apply it to the note state.
pub(crate) fn route_message(message: &[u8], notes: &NoteState) -> NoteChange {
    let change = notes.apply(MidiMessage::parse(message));
    match change {
        NoteChange::Started { note, frequency } => {
            info!("Note on: {} ({}), freq: {}", note, note_name(note), format_frequency(frequency));
        }
        NoteChange::Stopped { note } => {
            info!("Note off: {} ({})", note, note_name(note));
        }
        NoteChange::Ignored { note } => {
            debug!("Ignoring note off for {}, not the active note", note);
        }
        NoteChange::Unchanged => {}
    }
    change
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionKind {
    /// Feeds the note state, only channel messages matter
    Notes,
    /// Monitor feed, every message is passed through
    Raw,
}

fn ignore_filter(kind: ConnectionKind) -> Ignore {
    match kind {
        ConnectionKind::Notes => Ignore::All,
        ConnectionKind::Raw => Ignore::None,
    }
}

fn new_client(ignore: Ignore) -> Result<MidiInput> {
    let mut midi_in = MidiInput::new(CLIENT_NAME)
        .map_err(|err| anyhow!("Failed to create MIDI input: {}", err))?;
    midi_in.ignore(ignore);
    Ok(midi_in)
}

fn find_port(midi_in: &MidiInput, pattern: &str) -> Result<(MidiInputPort, String)> {
    let ports = midi_in.ports();
    let names: Vec<String> = ports
        .iter()
        .map(|port| midi_in.port_name(port).unwrap_or_default())
        .collect();

    match match_port(&names, pattern) {
        Some(idx) => Ok((ports[idx].clone(), names[idx].clone())),
        None => Err(anyhow!(
            "Could not find a MIDI input port matching '{}' (available: {})",
            pattern,
            if names.is_empty() { "none".to_string() } else { names.join(", ") }
        )),
    }
}
