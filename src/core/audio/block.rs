use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::{FromSample, Sample};

use crate::core::synth::WaveformProducer;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Number of samples the output stream has produced so far. Cloned handles share
/// the count, the audio thread advances it and anyone else may read it.
#[derive(Debug, Clone)]
pub struct StreamPosition {
    samples: Arc<AtomicU64>,
    sample_rate: u32,
}

impl StreamPosition {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            samples: Arc::new(AtomicU64::new(0)),
            sample_rate,
        }
    }

    fn add(&self, len: usize) {
        self.samples.fetch_add(len as u64, Ordering::Relaxed);
    }

    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    /// Stream time covered by the produced samples, integer-scaled so it never drifts.
    pub fn elapsed(&self) -> Duration {
        let nanos = self.samples() as u128 * NANOS_PER_SECOND / self.sample_rate as u128;
        Duration::from_nanos(nanos as u64)
    }
}

/// Adapts the device's variable-sized callback buffers to fixed-size producer blocks.
pub struct BlockReader {
    producer: WaveformProducer,
    block: Vec<f32>,
    cursor: usize,
    position: StreamPosition,
}

impl BlockReader {
    pub fn new(producer: WaveformProducer) -> Self {
        let config = producer.config();
        let block_size = config.block_size;
        let position = StreamPosition::new(config.sample_rate);
        Self {
            producer,
            block: vec![0.0; block_size],
            // start exhausted so the first read pulls a block
            cursor: block_size,
            position,
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        if self.cursor >= self.block.len() {
            self.producer.produce_block(&mut self.block);
            self.position.add(self.block.len());
            self.cursor = 0;
        }
        let sample = self.block[self.cursor];
        self.cursor += 1;
        sample
    }

    /// Write mono samples into an interleaved buffer, one value per frame
    /// copied to every channel.
    pub fn fill_interleaved<T>(&mut self, data: &mut [T], channels: usize, volume: f32)
    where
        T: Sample + FromSample<f32>,
    {
        for frame in data.chunks_mut(channels) {
            let value = T::from_sample(self.next_sample() * volume);
            for sample in frame.iter_mut() {
                *sample = value;
            }
        }
    }

    /// Handle on the produced sample count, still valid after the reader moves
    /// into the stream callback.
    pub fn position(&self) -> StreamPosition {
        self.position.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oscillator::Waveform;
    use crate::core::synth::{NoteState, SynthConfig};
    use std::sync::Arc;

    fn config(block_size: usize) -> SynthConfig {
        SynthConfig {
            sample_rate: 48_000,
            waveform: Waveform::Sine,
            amplitude: 0.5,
            block_size,
        }
    }

    #[test]
    fn test_position_counts_whole_blocks() {
        let notes = Arc::new(NoteState::new());
        let mut reader = BlockReader::new(WaveformProducer::new(config(480), notes));
        let position = reader.position();
        assert_eq!(position.elapsed(), Duration::ZERO);

        // one sample into the second block pulls it whole
        let mut data = vec![0.0f32; 481];
        reader.fill_interleaved(&mut data, 1, 1.0);
        assert_eq!(position.samples(), 960);
        assert_eq!(position.elapsed(), Duration::from_millis(20));
    }

    #[test]
    fn test_position_does_not_drift() {
        let position = StreamPosition::new(44_100);
        for _ in 0..44_100 {
            position.add(1);
        }
        assert_eq!(position.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn test_reader_matches_blocks_regardless_of_slicing() {
        let notes = Arc::new(NoteState::new());
        notes.note_on(69);

        let mut reference = WaveformProducer::new(config(64), Arc::clone(&notes));
        let mut expected = Vec::new();
        let mut block = vec![0.0f32; 64];
        for _ in 0..4 {
            reference.produce_block(&mut block);
            expected.extend_from_slice(&block);
        }

        let mut reader = BlockReader::new(WaveformProducer::new(config(64), Arc::clone(&notes)));
        let mut got = Vec::new();
        for chunk in [7usize, 100, 1, 64, 84] {
            let mut data = vec![0.0f32; chunk];
            reader.fill_interleaved(&mut data, 1, 1.0);
            got.extend_from_slice(&data);
        }

        assert_eq!(got, expected);
        assert_eq!(reader.position().samples(), 256);
    }

    #[test]
    fn test_fill_duplicates_channels_with_volume() {
        let notes = Arc::new(NoteState::new());
        notes.note_on(60);
        let mut reader = BlockReader::new(WaveformProducer::new(
            SynthConfig {
                waveform: Waveform::Square,
                ..config(16)
            },
            notes,
        ));

        let mut data = vec![0.0f32; 8];
        reader.fill_interleaved(&mut data, 2, 0.5);
        for frame in data.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert_eq!(data[0], 0.25);
    }

    #[test]
    fn test_silent_reader_outputs_zero() {
        let notes = Arc::new(NoteState::new());
        let mut reader = BlockReader::new(WaveformProducer::new(config(32), notes));
        let mut data = vec![1.0f32; 96];
        reader.fill_interleaved(&mut data, 3, 1.0);
        assert!(data.iter().all(|s| *s == 0.0));
        assert_eq!(reader.position().samples(), 32);
    }

    fn square_reader(notes: Arc<NoteState>) -> BlockReader {
        BlockReader::new(WaveformProducer::new(
            SynthConfig {
                waveform: Waveform::Square,
                ..config(16)
            },
            notes,
        ))
    }

    #[test]
    fn test_fill_interleaved_i16() {
        let notes = Arc::new(NoteState::new());
        let mut reader = square_reader(Arc::clone(&notes));

        // a full block of stereo frames, so the note below starts a fresh block
        let mut silent = vec![1i16; 32];
        reader.fill_interleaved(&mut silent, 2, 0.5);
        assert!(silent.iter().all(|s| *s == 0));

        // 0.5 amplitude at 0.5 volume, the first half of a square period is high
        notes.note_on(60);
        let mut data = [0i16; 16];
        reader.fill_interleaved(&mut data, 2, 0.5);
        for frame in data.chunks(2) {
            assert_eq!(frame[0], frame[1]);
            assert!((frame[0] as i32 - 8192).abs() <= 1, "got {}", frame[0]);
        }
    }

    #[test]
    fn test_fill_interleaved_u16() {
        let notes = Arc::new(NoteState::new());
        let mut reader = square_reader(Arc::clone(&notes));

        // a full block of stereo frames, so the note below starts a fresh block
        let mut silent = vec![0u16; 32];
        reader.fill_interleaved(&mut silent, 2, 0.5);
        assert!(silent.iter().all(|s| *s == 32768));

        notes.note_on(60);
        let mut data = [0u16; 16];
        reader.fill_interleaved(&mut data, 2, 0.5);
        for frame in data.chunks(2) {
            assert_eq!(frame[0], frame[1]);
            assert!((frame[0] as i32 - 40960).abs() <= 1, "got {}", frame[0]);
        }
    }
}
