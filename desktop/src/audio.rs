use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

use crate::config::Config;
use crate::error::Error;

/// Square-wave beeper. The stream runs for the whole session; the gate
/// flips it between the tone and silence. The gate is the only datum shared
/// with the audio callback thread, and writing it never blocks.
pub struct Beeper {
    gate: Arc<AtomicBool>,
    _stream: Stream,
}

impl Beeper {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(Error::NoAudioDevice)?;
        let supported = device.default_output_config()?;

        let stream_config = StreamConfig {
            channels: supported.channels(),
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        debug!(
            "audio: {} Hz, {} channel(s), {:?}",
            stream_config.sample_rate.0,
            stream_config.channels,
            supported.sample_format()
        );

        let gate = Arc::new(AtomicBool::new(false));
        let stream = match supported.sample_format() {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, config, &gate)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, config, &gate)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, config, &gate)?,
            other => return Err(Error::AudioFormat(other)),
        };
        Ok(Self {
            gate,
            _stream: stream,
        })
    }

    pub fn set_on(&self, on: bool) {
        self.gate.store(on, Ordering::Relaxed);
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    stream_config: &StreamConfig,
    config: &Config,
    gate: &Arc<AtomicBool>,
) -> Result<Stream, Error>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = stream_config.channels as usize;
    let amplitude = f32::from(config.volume) / f32::from(i16::MAX);
    let half_period = (stream_config.sample_rate.0 / config.tone_freq / 2).max(1);
    let gate = Arc::clone(gate);
    let mut sample_index = 0u32;

    let stream = device.build_output_stream(
        stream_config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let value = if gate.load(Ordering::Relaxed) {
                    if sample_index / half_period % 2 == 0 {
                        amplitude
                    } else {
                        -amplitude
                    }
                } else {
                    0.0
                };
                sample_index = sample_index.wrapping_add(1);
                for sample in frame.iter_mut() {
                    *sample = T::from_sample(value);
                }
            }
        },
        |err| warn!("audio stream error: {}", err),
        None,
    )?;
    stream.play()?;
    Ok(stream)
}
