use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info};

use crate::core::audio::AudioOutput;
use crate::core::midi::MidiInputHandler;
use crate::core::synth::{NoteSnapshot, NoteState};
use crate::settings::PlayerSettings;
use crate::utils::helpers::{format_frequency, note_name};

const STATUS_INTERVAL: Duration = Duration::from_secs(10);

/// Owns everything the synthesizer needs for the life of the process: the shared
/// note state, the MIDI connection feeding it and the audio stream reading it.
pub struct Player {
    notes: Arc<NoteState>,
    midi: MidiInputHandler,
    audio: AudioOutput,
}

impl Player {
    pub fn start(settings: &PlayerSettings) -> Result<Self> {
        settings.validate()?;
        let notes = Arc::new(NoteState::new());

        info!("Starting audio output");
        let audio = AudioOutput::start(
            settings.synth_config(),
            settings.master_volume,
            Arc::clone(&notes),
        )?;

        info!("Setting up MIDI input");
        let mut midi = MidiInputHandler::new();
        midi.connect_notes(&settings.midi_port, Arc::clone(&notes))?;

        Ok(Self { notes, midi, audio })
    }

    /// Block the calling thread; all work happens on the MIDI and audio callback threads.
    pub fn run(self) -> ! {
        info!(
            "Playing from '{}' on '{}', waiting for notes",
            self.midi.port_name().unwrap_or("?"),
            self.audio.device_name()
        );
        loop {
            thread::sleep(STATUS_INTERVAL);
            debug!("{}", status_line(self.audio.elapsed(), self.notes.snapshot()));
        }
    }
}

fn status_line(elapsed: Duration, snapshot: NoteSnapshot) -> String {
    let playing = match snapshot.active_note {
        Some(note) => format!(
            "playing {} at {}",
            note_name(note),
            format_frequency(snapshot.frequency)
        ),
        None => "silent".to_string(),
    };
    format!("Stream at {:.1}s, {}", elapsed.as_secs_f64(), playing)
}
