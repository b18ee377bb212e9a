//! Audio output: drives the waveform producer from the device's callback thread

mod block;

pub use block::{BlockReader, StreamPosition};

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use log::{error, info, warn};

use crate::core::synth::{NoteState, SynthConfig, WaveformProducer};

/// A running output stream on the default device.
pub struct AudioOutput {
    _stream: Stream,
    device_name: String,
    position: StreamPosition,
}

impl AudioOutput {
    /// Open the default output device and start pulling blocks from a new producer.
    ///
    /// The device's own sample rate wins over `config.sample_rate` so pitch stays correct.
    pub fn start(
        mut config: SynthConfig,
        master_volume: f32,
        notes: Arc<NoteState>,
    ) -> Result<Self> {
        let host = cpal::default_host();
        info!("Using audio host: {}", host.id().name());

        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No output device available"))?;
        let device_name = device.name().unwrap_or_else(|_| "<unnamed>".to_string());
        info!("Using output device: {}", device_name);

        let supported = device
            .default_output_config()
            .context("Failed to query default output config")?;
        let sample_format = supported.sample_format();
        let stream_config = StreamConfig::from(supported);
        let sample_rate = stream_config.sample_rate.0;
        let channels = stream_config.channels;

        if sample_rate != config.sample_rate {
            warn!(
                "Device runs at {} Hz, overriding configured {} Hz",
                sample_rate, config.sample_rate
            );
            config.sample_rate = sample_rate;
        }
        info!(
            "Stream config: {} Hz, {} channel(s), {:?}, {} samples per block, {} waveform",
            sample_rate, channels, sample_format, config.block_size, config.waveform
        );

        let reader = BlockReader::new(WaveformProducer::new(config, notes));
        let position = reader.position();
        let volume = master_volume;
        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, reader, volume),
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, reader, volume),
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, reader, volume),
            other => bail!("Unsupported sample format: {:?}", other),
        }?;

        stream.play().context("Failed to start audio stream")?;
        info!("Audio stream started");

        Ok(Self {
            _stream: stream,
            device_name,
            position,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Stream time produced so far.
    pub fn elapsed(&self) -> Duration {
        self.position.elapsed()
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut reader: BlockReader,
    volume: f32,
) -> Result<Stream>
where
    T: SizedSample + FromSample<f32> + Send + 'static,
{
    let channels = config.channels as usize;
    let err_fn = |err| error!("An error occurred on the audio stream: {}", err);

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                reader.fill_interleaved(data, channels, volume);
            },
            err_fn,
            None,
        )
        .context("Failed to build output stream")?;

    Ok(stream)
}
