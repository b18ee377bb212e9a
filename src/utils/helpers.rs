const A4_MIDI: f64 = 69.0;
const A4_FREQ: f64 = 440.0;

const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Convert a MIDI note number to its equal-tempered frequency in Hz (A4 = 440 Hz)
pub fn midi_note_to_freq(note: u8) -> f64 {
    A4_FREQ * 2.0f64.powf((note as f64 - A4_MIDI) / 12.0)
}

/// Scientific pitch name, e.g. 60 -> "C4", 61 -> "C#4"
pub fn note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
}

/// Format a frequency value with appropriate unit suffix (Hz, kHz)
pub fn format_frequency(freq: f64) -> String {
    if freq >= 1000.0 {
        format!("{:.2} kHz", freq / 1000.0)
    } else {
        format!("{:.1} Hz", freq)
    }
}

pub fn format_bytes_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{:02x}", b))
        .collect::<Vec<_>>()
        .join(", ")
}
