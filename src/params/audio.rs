//! Audio analysis configuration.

/// Frequency analyser configuration (byte-spectrum semantics)
#[derive(Debug, Clone)]
pub struct AnalyserConfig {
    /// Analysis window size in samples (must be power of 2)
    /// 256 samples = 128 frequency bins
    pub fft_size: usize,

    /// Exponential smoothing between consecutive frames (0 = none, <1)
    pub smoothing_time_constant: f32,

    /// Magnitude mapped to byte value 0 (decibels)
    pub min_decibels: f32,

    /// Magnitude mapped to byte value 255 (decibels)
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserConfig {
    /// Number of frequency bins produced per frame
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(format!(
                "FFT size must be a power of 2 and at least 32, got {}",
                self.fft_size
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing_time_constant) {
            return Err(format!(
                "Smoothing time constant must be in [0, 1), got {}",
                self.smoothing_time_constant
            ));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalyserConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bin_count(), 128);
    }

    #[test]
    fn test_rejects_bad_configs() {
        let mut config = AnalyserConfig::default();
        config.fft_size = 300;
        assert!(config.validate().is_err());

        let mut config = AnalyserConfig::default();
        config.smoothing_time_constant = 1.0;
        assert!(config.validate().is_err());

        let mut config = AnalyserConfig::default();
        config.min_decibels = -20.0;
        assert!(config.validate().is_err());
    }
}
