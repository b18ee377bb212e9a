const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;

/// Decoded channel message as far as the synth cares about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    Other,
}

impl MidiMessage {
    /// Decode raw bytes. Note on with velocity 0 is treated as note off.
    pub fn parse(message: &[u8]) -> Self {
        let (status, note, velocity) = match message {
            [status, note, velocity, ..] => (*status, *note & 0x7F, *velocity & 0x7F),
            _ => return MidiMessage::Other,
        };
        let channel = status & 0x0F;

        match status & 0xF0 {
            NOTE_ON if velocity > 0 => MidiMessage::NoteOn { channel, note, velocity },
            NOTE_ON | NOTE_OFF => MidiMessage::NoteOff { channel, note },
            _ => MidiMessage::Other,
        }
    }
}
