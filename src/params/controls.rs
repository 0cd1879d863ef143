//! Control-surface ranges and color palette presets.
//!
//! Values are clamped here, before they reach the simulation core.

use std::ops::RangeInclusive;

use crate::entity::Rgb;

/// Accepted range of every user-editable parameter
#[derive(Debug, Clone)]
pub struct ControlRanges {
    pub entity_count: RangeInclusive<usize>,
    pub gravity_y: RangeInclusive<f32>,
    pub entity_size_m: RangeInclusive<f32>,
    pub enclosure_size_m: RangeInclusive<f32>,

    /// Slider increments
    pub gravity_step: f32,
    pub entity_size_step: f32,
    pub enclosure_size_step: f32,
}

impl Default for ControlRanges {
    fn default() -> Self {
        Self {
            entity_count: 1..=50,
            gravity_y: -20.0..=0.0,
            entity_size_m: 0.1..=2.0,
            enclosure_size_m: 5.0..=50.0,
            gravity_step: 0.1,
            entity_size_step: 0.1,
            enclosure_size_step: 1.0,
        }
    }
}

impl ControlRanges {
    pub fn clamp_entity_count(&self, count: usize) -> usize {
        count.clamp(*self.entity_count.start(), *self.entity_count.end())
    }

    pub fn clamp_gravity(&self, gravity_y: f32) -> f32 {
        snap(gravity_y, self.gravity_step).clamp(*self.gravity_y.start(), *self.gravity_y.end())
    }

    pub fn clamp_entity_size(&self, size_m: f32) -> f32 {
        snap(size_m, self.entity_size_step)
            .clamp(*self.entity_size_m.start(), *self.entity_size_m.end())
    }

    pub fn clamp_enclosure_size(&self, size_m: f32) -> f32 {
        snap(size_m, self.enclosure_size_step)
            .clamp(*self.enclosure_size_m.start(), *self.enclosure_size_m.end())
    }
}

/// Round to the nearest slider increment
fn snap(value: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

/// Discrete palette selection offered by the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    /// Red, green, blue
    Primary,
    /// Yellow, magenta, cyan
    Secondary,
    /// Orange, purple, teal, navy
    Deep,
}

impl Palette {
    pub const ALL: [Palette; 3] = [Palette::Primary, Palette::Secondary, Palette::Deep];

    /// Hex codes as offered by the control surface
    pub fn hex_codes(self) -> &'static [&'static str] {
        match self {
            Palette::Primary => &["#ff0000", "#00ff00", "#0000ff"],
            Palette::Secondary => &["#ffff00", "#ff00ff", "#00ffff"],
            Palette::Deep => &["#FFA500", "#800080", "#008080", "#000080"],
        }
    }

    /// Parsed palette colors
    pub fn colors(self) -> Vec<Rgb> {
        self.hex_codes()
            .iter()
            .filter_map(|hex| Rgb::from_hex(hex).ok())
            .collect()
    }

    /// Palette for a 1-based selector (keyboard digit or CLI flag)
    pub fn from_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping_respects_ranges() {
        let ranges = ControlRanges::default();
        assert_eq!(ranges.clamp_entity_count(0), 1);
        assert_eq!(ranges.clamp_entity_count(80), 50);
        assert_eq!(ranges.clamp_gravity(3.0), 0.0);
        assert_eq!(ranges.clamp_gravity(-25.0), -20.0);
        assert_eq!(ranges.clamp_entity_size(0.0), 0.1);
        assert_eq!(ranges.clamp_enclosure_size(51.4), 50.0);
        assert_eq!(ranges.clamp_enclosure_size(12.4), 12.0);
    }

    #[test]
    fn test_palettes_parse() {
        assert_eq!(Palette::Primary.colors().len(), 3);
        assert_eq!(Palette::Deep.colors().len(), 4);
        assert_eq!(Palette::Secondary.colors()[1], Rgb::from_hex("#ff00ff").unwrap());
    }

    #[test]
    fn test_palette_from_index() {
        assert_eq!(Palette::from_index(1), Some(Palette::Primary));
        assert_eq!(Palette::from_index(3), Some(Palette::Deep));
        assert_eq!(Palette::from_index(0), None);
        assert_eq!(Palette::from_index(4), None);
    }
}
