//! Per-frame amplitude from the attached audio source.

use std::sync::Arc;

use super::analyser::FrequencyAnalyser;
use super::decode::DecodedAudio;
use super::playback::{ClockPlayback, DevicePlayback, Playback};
use crate::error::AudioError;
use crate::params::AnalyserConfig;

/// How an attached source is played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Play through the default output device, falling back to the clock
    Device,
    /// Silent, advanced by [`AudioAmplitudeSampler::advance`]
    Clock,
}

struct ActiveSource {
    audio: Arc<DecodedAudio>,
    playback: Playback,
}

/// Turns the attached source into one amplitude per frame (0-255 scale).
///
/// At most one source is attached. With nothing attached the amplitude is 0.
pub struct AudioAmplitudeSampler {
    analyser: FrequencyAnalyser,
    mode: PlaybackMode,
    source: Option<ActiveSource>,
    window: Vec<f32>,
}

impl AudioAmplitudeSampler {
    pub fn new(config: AnalyserConfig, mode: PlaybackMode) -> Result<Self, AudioError> {
        let window = vec![0.0; config.fft_size];
        Ok(Self {
            analyser: FrequencyAnalyser::new(config)?,
            mode,
            source: None,
            window,
        })
    }

    /// Sampler that never touches an output device
    pub fn silent() -> Result<Self, AudioError> {
        Self::new(AnalyserConfig::default(), PlaybackMode::Clock)
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Replace the current source. The previous one is stopped first.
    pub fn attach(&mut self, audio: DecodedAudio) {
        self.detach();

        let audio = Arc::new(audio);
        let playback = match self.mode {
            PlaybackMode::Device => match DevicePlayback::start(Arc::clone(&audio)) {
                Ok(device) => Playback::Device(device),
                Err(e) => {
                    log::warn!("{}; playing silently", e);
                    Playback::Clock(ClockPlayback::new(audio.sample_rate))
                }
            },
            PlaybackMode::Clock => Playback::Clock(ClockPlayback::new(audio.sample_rate)),
        };

        log::info!(
            "Audio attached: {:.1} s @ {} Hz ({})",
            audio.duration_s(),
            audio.sample_rate,
            if playback.is_audible() { "audible" } else { "silent" }
        );
        self.source = Some(ActiveSource { audio, playback });
    }

    /// Stop and drop the current source, if any
    pub fn detach(&mut self) {
        if self.source.take().is_some() {
            log::info!("Audio detached");
        }
        self.analyser.reset();
    }

    pub fn is_attached(&self) -> bool {
        self.source.is_some()
    }

    /// Source samples played so far
    pub fn cursor(&self) -> Option<usize> {
        self.source.as_ref().map(|source| source.playback.cursor())
    }

    /// Advance the simulated clock by one frame
    pub fn advance(&mut self, dt: f32) {
        if let Some(source) = &mut self.source {
            source.playback.advance(dt);
        }
    }

    /// Mean byte-spectrum value of the window ending at the play cursor.
    /// Returns 0 when nothing is attached.
    pub fn sample(&mut self) -> f32 {
        let Some(source) = &self.source else {
            return 0.0;
        };

        let end = source.playback.cursor();
        let size = self.window.len();
        let start = end.saturating_sub(size);
        let lead = size - (end - start);

        // Before the start and past the end is silence
        self.window[..lead].fill(0.0);
        for (slot, index) in self.window[lead..].iter_mut().zip(start..end) {
            *slot = source.audio.samples.get(index).copied().unwrap_or(0.0);
        }

        self.analyser.mean_amplitude(&self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noise(seconds: f32, sample_rate: u32) -> DecodedAudio {
        let mut rng = StdRng::seed_from_u64(7);
        let len = (seconds * sample_rate as f32) as usize;
        let samples = (0..len).map(|_| rng.gen_range(-0.5..0.5)).collect();
        DecodedAudio::new(samples, sample_rate)
    }

    #[test]
    fn test_detached_sampler_is_silent() {
        let mut sampler = AudioAmplitudeSampler::silent().unwrap();
        assert!(!sampler.is_attached());
        assert_eq!(sampler.sample(), 0.0);
        assert_eq!(sampler.cursor(), None);
    }

    #[test]
    fn test_noise_is_loud() {
        let mut sampler = AudioAmplitudeSampler::silent().unwrap();
        sampler.attach(noise(1.0, 44100));
        sampler.advance(0.1);
        for _ in 0..5 {
            sampler.sample();
        }
        assert!(sampler.sample() > 30.0);
    }

    #[test]
    fn test_amplitude_decays_after_track_ends() {
        let mut sampler = AudioAmplitudeSampler::silent().unwrap();
        sampler.attach(noise(0.1, 44100));
        sampler.advance(0.05);
        assert!(sampler.sample() > 0.0);

        sampler.advance(1.0);
        for _ in 0..200 {
            sampler.sample();
        }
        assert_eq!(sampler.sample(), 0.0);
    }

    #[test]
    fn test_attach_replaces_previous_source() {
        let mut sampler = AudioAmplitudeSampler::silent().unwrap();
        sampler.attach(noise(1.0, 44100));
        sampler.advance(0.5);
        sampler.attach(noise(1.0, 22050));
        assert_eq!(sampler.cursor(), Some(0));

        sampler.detach();
        assert!(!sampler.is_attached());
        assert_eq!(sampler.sample(), 0.0);
    }
}
