//! Real-time output via cpal.

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use keytone_synth::Generator;

/// The default output device and the stream config it prefers.
pub struct OutputDevice {
    device: Device,
    config: StreamConfig,
    name: String,
}

impl OutputDevice {
    /// Open the host's default output device.
    pub fn open_default() -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("no output audio device available")?;
        let config: StreamConfig = device
            .default_output_config()
            .context("output device has no usable config")?
            .into();
        let name = device
            .description()
            .map(|d| d.name().to_string())
            .unwrap_or_else(|_| "<unknown>".to_string());
        Ok(Self {
            device,
            config,
            name,
        })
    }

    /// Device sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Device channel count.
    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start rendering `generator` into the device.
    ///
    /// Each callback buffer is split into blocks of at most `block_frames`
    /// frames, and parameter updates land at block boundaries. Audio stops
    /// when the returned stream is dropped.
    pub fn start(self, mut generator: Generator, block_frames: usize) -> anyhow::Result<Stream> {
        let block_samples = block_frames.max(1) * usize::from(self.config.channels);
        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for block in data.chunks_mut(block_samples) {
                        generator.process(block);
                    }
                },
                |err| tracing::error!(error = %err, "output stream error"),
                None,
            )
            .context("failed to build output stream")?;

        stream.play().context("failed to start output stream")?;
        tracing::info!(
            device = %self.name,
            channels = self.config.channels,
            sample_rate = self.config.sample_rate,
            "output stream started"
        );
        Ok(stream)
    }
}
