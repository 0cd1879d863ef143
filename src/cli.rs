//! Command-line argument parsing.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use clap::Parser;

use crate::entity::{ColorParseError, Rgb};
use crate::params::{ControlRanges, Palette, SimulationConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Bouncebox")]
#[command(about = "Audio-reactive bouncing balls in a resizable box", long_about = None)]
pub struct Args {
    /// Audio file to play and react to (mp3, m4a, wav, ...)
    #[arg(long, value_name = "FILE")]
    pub audio: Option<PathBuf>,

    /// Number of balls (1-50)
    #[arg(long, value_name = "COUNT", default_value = "5")]
    pub balls: usize,

    /// Vertical gravity (-20 to 0, meters per second squared)
    #[arg(long, value_name = "M_PER_S2", default_value = "-9.82", allow_hyphen_values = true)]
    pub gravity: f32,

    /// Ball radius (0.1-2 meters)
    #[arg(long, value_name = "METERS", default_value = "0.5")]
    pub ball_size: f32,

    /// Enclosure edge length (5-50 meters)
    #[arg(long, value_name = "METERS", default_value = "20")]
    pub box_size: f32,

    /// Palette preset (1-3) or comma-separated hex colors ("#ff0000,#00ff00")
    #[arg(long, value_name = "PALETTE")]
    pub palette: Option<String>,

    /// Seed for spawn positions
    #[arg(long, value_name = "SEED", default_value_t = 0x5eed)]
    pub seed: u64,

    /// Run without a window
    #[arg(long)]
    pub headless: bool,

    /// Frames to simulate in headless mode
    #[arg(long, value_name = "FRAMES", default_value = "600")]
    pub frames: u64,

    /// Enable the bulk ball-count keys (, and .)
    #[arg(long)]
    pub allow_bulk_count: bool,

    /// Analyse audio without playing it
    #[arg(long)]
    pub silent: bool,
}

impl Args {
    /// Initial configuration, clamped (not snapped) to the control ranges
    pub fn simulation_config(&self, ranges: &ControlRanges) -> Result<SimulationConfig, ColorParseError> {
        let palette = match &self.palette {
            Some(text) => parse_palette(text)?,
            None => SimulationConfig::default().palette,
        };

        Ok(SimulationConfig {
            entity_count: ranges.clamp_entity_count(self.balls),
            gravity_y: clamp(self.gravity, &ranges.gravity_y),
            entity_size_m: clamp(self.ball_size, &ranges.entity_size_m),
            enclosure_size_m: clamp(self.box_size, &ranges.enclosure_size_m),
            palette,
        })
    }
}

fn clamp(value: f32, range: &RangeInclusive<f32>) -> f32 {
    value.clamp(*range.start(), *range.end())
}

/// Preset number or a comma-separated list of hex colors
pub fn parse_palette(text: &str) -> Result<Vec<Rgb>, ColorParseError> {
    if let Some(preset) = text.trim().parse::<usize>().ok().and_then(Palette::from_index) {
        return Ok(preset.colors());
    }

    let colors = text
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Rgb::from_hex)
        .collect::<Result<Vec<_>, _>>()?;

    if colors.is_empty() {
        return Err(ColorParseError(format!("empty palette '{}'", text)));
    }
    Ok(colors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_simulation_defaults() {
        let args = Args::parse_from(["bouncebox"]);
        let config = args.simulation_config(&ControlRanges::default()).unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(args.seed, 0x5eed);
        assert!(!args.allow_bulk_count);
    }

    #[test]
    fn test_values_are_clamped() {
        let args = Args::parse_from([
            "bouncebox",
            "--balls",
            "500",
            "--gravity",
            "-35",
            "--box-size",
            "2",
        ]);
        let config = args.simulation_config(&ControlRanges::default()).unwrap();
        assert_eq!(config.entity_count, 50);
        assert_eq!(config.gravity_y, -20.0);
        assert_eq!(config.enclosure_size_m, 5.0);
    }

    #[test]
    fn test_palette_presets_and_hex_lists() {
        assert_eq!(parse_palette("2").unwrap(), Palette::Secondary.colors());
        assert_eq!(
            parse_palette("#ff0000, #0000ff").unwrap(),
            vec![Rgb::RED, Rgb::BLUE]
        );
        assert!(parse_palette("#zz0000").is_err());
        assert!(parse_palette(" , ").is_err());
    }
}
