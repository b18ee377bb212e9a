use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::core::midi::MidiMessage;
use crate::utils::helpers::midi_note_to_freq;

/// The tracked note and its frequency, always read and written as a pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoteSnapshot {
    pub active_note: Option<u8>,
    /// Target frequency in Hz, 0.0 while no note is active
    pub frequency: f64,
}

impl NoteSnapshot {
    pub fn is_silent(&self) -> bool {
        self.active_note.is_none()
    }
}

/// Result of applying a note message to the state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteChange {
    Started { note: u8, frequency: f64 },
    Stopped { note: u8 },
    /// Note off for a note other than the tracked one
    Ignored { note: u8 },
    Unchanged,
}

/// Monophonic note state shared between the MIDI callback and the audio callback.
///
/// A single lock guards both fields; it is only held for a copy or an assignment,
/// never while samples are being synthesized.
#[derive(Debug, Default)]
pub struct NoteState {
    inner: Mutex<NoteSnapshot>,
}

impl NoteState {
    pub fn new() -> Self {
        Self::default()
    }

    // The guarded data is two plain values written together, so a panic while
    // holding the lock cannot leave it inconsistent.
    fn lock(&self) -> MutexGuard<'_, NoteSnapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track `note`, replacing any note already sounding. Returns the new frequency.
    pub fn note_on(&self, note: u8) -> f64 {
        debug_assert!(note <= 127, "MIDI note out of range: {}", note);
        let frequency = midi_note_to_freq(note);
        let mut state = self.lock();
        state.active_note = Some(note);
        state.frequency = frequency;
        frequency
    }

    /// Silence the instrument if `note` is the tracked note. Returns whether it was.
    pub fn note_off(&self, note: u8) -> bool {
        debug_assert!(note <= 127, "MIDI note out of range: {}", note);
        let mut state = self.lock();
        if state.active_note != Some(note) {
            return false;
        }
        *state = NoteSnapshot::default();
        true
    }

    pub fn snapshot_frequency(&self) -> f64 {
        self.lock().frequency
    }

    pub fn snapshot(&self) -> NoteSnapshot {
        *self.lock()
    }

    pub fn apply(&self, message: MidiMessage) -> NoteChange {
        match message {
            MidiMessage::NoteOn { note, .. } => NoteChange::Started {
                note,
                frequency: self.note_on(note),
            },
            MidiMessage::NoteOff { note, .. } => {
                if self.note_off(note) {
                    NoteChange::Stopped { note }
                } else {
                    NoteChange::Ignored { note }
                }
            }
            MidiMessage::Other => NoteChange::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_silent() {
        let state = NoteState::new();
        assert_eq!(state.snapshot_frequency(), 0.0);
        assert!(state.snapshot().is_silent());
    }

    #[test]
    fn test_reference_pitch() {
        let state = NoteState::new();
        assert_eq!(state.note_on(69), 440.0);
        assert_eq!(state.snapshot_frequency(), 440.0);
        state.note_on(81);
        assert_eq!(state.snapshot_frequency(), 880.0);
    }

    #[test]
    fn test_last_note_on_wins() {
        let state = NoteState::new();
        state.note_on(60);
        state.note_on(64);
        assert!(!state.note_off(60));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.active_note, Some(64));
        assert!((snapshot.frequency - 329.63).abs() < 0.01);
    }

    #[test]
    fn test_matching_note_off_silences() {
        let state = NoteState::new();
        state.note_on(64);
        assert!(state.note_off(64));
        assert_eq!(state.snapshot(), NoteSnapshot::default());
        assert!(!state.note_off(64));
    }

    #[test]
    fn test_note_on_is_idempotent() {
        let state = NoteState::new();
        let first = state.note_on(72);
        let second = state.note_on(72);
        assert_eq!(first, second);
        assert_eq!(state.snapshot().active_note, Some(72));
    }

    #[test]
    fn test_apply_messages() {
        let state = NoteState::new();
        let change = state.apply(MidiMessage::NoteOn { channel: 0, note: 69, velocity: 100 });
        assert_eq!(change, NoteChange::Started { note: 69, frequency: 440.0 });
        assert_eq!(
            state.apply(MidiMessage::NoteOff { channel: 0, note: 70 }),
            NoteChange::Ignored { note: 70 }
        );
        assert_eq!(state.apply(MidiMessage::Other), NoteChange::Unchanged);
        assert_eq!(
            state.apply(MidiMessage::NoteOff { channel: 0, note: 69 }),
            NoteChange::Stopped { note: 69 }
        );
        assert!(state.snapshot().is_silent());
    }
}
