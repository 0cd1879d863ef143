//! Playback transports that own the play cursor.
//!
//! The cursor is measured in source samples. The device transport lets the
//! audio callback advance it; the clock transport advances it by the frame
//! timestep so headless runs stay deterministic.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::decode::DecodedAudio;
use crate::error::AudioError;

/// Audible playback through the default output device
pub struct DevicePlayback {
    cursor: Arc<AtomicUsize>,

    /// Output stream (kept alive)
    _stream: cpal::Stream,
}

impl DevicePlayback {
    pub fn start(audio: Arc<DecodedAudio>) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::Output("no output device found".to_string()))?;
        let config = device
            .default_output_config()
            .map_err(|e| AudioError::Output(e.to_string()))?;

        let output_rate = config.sample_rate().0;
        let channels = config.channels().max(1) as usize;
        log::info!(
            "Audio output: {} @ {}Hz",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            output_rate
        );

        let cursor = Arc::new(AtomicUsize::new(0));
        let callback_cursor = Arc::clone(&cursor);
        // Source samples consumed per output frame
        let step = audio.sample_rate as f64 / output_rate.max(1) as f64;
        let mut position = 0.0f64;

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let sample = audio.samples.get(position as usize).copied().unwrap_or(0.0);
                        frame.fill(sample);
                        position += step;
                    }
                    callback_cursor.store(position as usize, Ordering::Relaxed);
                },
                |err| log::warn!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::Output(e.to_string()))?;

        stream.play().map_err(|e| AudioError::Output(e.to_string()))?;

        Ok(Self {
            cursor,
            _stream: stream,
        })
    }

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }
}

/// Silent playback driven by simulated time
#[derive(Debug, Clone)]
pub struct ClockPlayback {
    sample_rate: u32,
    position: f64,
}

impl ClockPlayback {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            position: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.position += dt.max(0.0) as f64 * self.sample_rate as f64;
    }

    pub fn cursor(&self) -> usize {
        self.position as usize
    }
}

pub enum Playback {
    Device(DevicePlayback),
    Clock(ClockPlayback),
}

impl Playback {
    /// Source samples played so far
    pub fn cursor(&self) -> usize {
        match self {
            Playback::Device(device) => device.cursor(),
            Playback::Clock(clock) => clock.cursor(),
        }
    }

    /// Advance simulated time; devices keep their own clock
    pub fn advance(&mut self, dt: f32) {
        if let Playback::Clock(clock) = self {
            clock.advance(dt);
        }
    }

    pub fn is_audible(&self) -> bool {
        matches!(self, Playback::Device(_))
    }
}
