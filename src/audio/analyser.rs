//! Byte-spectrum frequency analysis.
//!
//! Mirrors the behaviour of a browser analyser node: a Blackman-windowed
//! FFT, magnitudes scaled by 1/N, exponential smoothing between frames,
//! then decibels mapped linearly onto 0-255.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::AudioError;
use crate::params::AnalyserConfig;

/// Frequency analyser holding the smoothing state between frames
pub struct FrequencyAnalyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
}

impl FrequencyAnalyser {
    pub fn new(config: AnalyserConfig) -> Result<Self, AudioError> {
        config.validate().map_err(AudioError::Config)?;

        let size = config.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let window = (0..size).map(|i| blackman_window(i, size)).collect();
        let bins = config.bin_count();

        Ok(Self {
            config,
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); size],
            smoothed: vec![0.0; bins],
            bytes: vec![0; bins],
        })
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    /// Analyse the most recent `fft_size` samples.
    ///
    /// Shorter input is zero-padded at the front, longer input uses its tail.
    pub fn byte_frequency_data(&mut self, samples: &[f32]) -> &[u8] {
        let size = self.config.fft_size;
        let tail = &samples[samples.len().saturating_sub(size)..];
        let pad = size - tail.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { tail[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let tau = self.config.smoothing_time_constant;
        let scale = 1.0 / size as f32;
        let range = self.config.max_decibels - self.config.min_decibels;

        for (bin, (smoothed, byte)) in self.smoothed.iter_mut().zip(self.bytes.iter_mut()).enumerate() {
            let magnitude = self.buffer[bin].norm() * scale;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;

            *byte = if *smoothed > 0.0 {
                let db = 20.0 * smoothed.log10();
                let scaled = 255.0 / range * (db - self.config.min_decibels);
                scaled.clamp(0.0, 255.0).floor() as u8
            } else {
                0
            };
        }

        &self.bytes
    }

    /// Mean of the byte spectrum (0-255)
    pub fn mean_amplitude(&mut self, samples: &[f32]) -> f32 {
        let bytes = self.byte_frequency_data(samples);
        if bytes.is_empty() {
            return 0.0;
        }
        bytes.iter().map(|&b| b as f32).sum::<f32>() / bytes.len() as f32
    }

    /// Forget the smoothing history
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
        self.bytes.fill(0);
    }
}

/// Blackman window (alpha 0.16) over `size` samples
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(amplitude: f32, bin: usize, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * bin as f32 * i as f32 / 256.0).sin())
            .collect()
    }

    #[test]
    fn test_blackman_window() {
        assert!(blackman_window(0, 256).abs() < 1e-6);
        assert!((blackman_window(128, 256) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_silence_is_zero() {
        let mut analyser = FrequencyAnalyser::new(AnalyserConfig::default()).unwrap();
        let bytes = analyser.byte_frequency_data(&[0.0; 256]);
        assert_eq!(bytes.len(), 128);
        assert!(bytes.iter().all(|&b| b == 0));
        assert_eq!(analyser.mean_amplitude(&[]), 0.0);
    }

    #[test]
    fn test_full_scale_tone_saturates_its_bin() {
        let mut analyser = FrequencyAnalyser::new(AnalyserConfig::default()).unwrap();
        let tone = sine(1.0, 16, 256);
        for _ in 0..50 {
            analyser.byte_frequency_data(&tone);
        }
        assert_eq!(analyser.byte_frequency_data(&tone)[16], 255);
    }

    #[test]
    fn test_louder_input_raises_mean() {
        let config = AnalyserConfig::default();
        let mut loud = FrequencyAnalyser::new(config.clone()).unwrap();
        let mut quiet = FrequencyAnalyser::new(config).unwrap();
        let loud_tone = sine(1.0, 10, 256);
        let quiet_tone = sine(0.01, 10, 256);

        let mut loud_mean = 0.0;
        let mut quiet_mean = 0.0;
        for _ in 0..20 {
            loud_mean = loud.mean_amplitude(&loud_tone);
            quiet_mean = quiet.mean_amplitude(&quiet_tone);
        }
        assert!(loud_mean > quiet_mean);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut analyser = FrequencyAnalyser::new(AnalyserConfig::default()).unwrap();
        analyser.byte_frequency_data(&sine(1.0, 8, 256));
        analyser.reset();
        assert_eq!(analyser.mean_amplitude(&[0.0; 256]), 0.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AnalyserConfig {
            fft_size: 100,
            ..Default::default()
        };
        assert!(matches!(FrequencyAnalyser::new(config), Err(AudioError::Config(_))));
    }
}
