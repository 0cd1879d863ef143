//! Live simulation configuration (what the control surface edits).

use crate::entity::Rgb;

/// Population and world settings that a rebuild reads from
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Number of balls spawned on populate
    pub entity_count: usize,

    /// Vertical gravity (meters per second squared, negative = down)
    pub gravity_y: f32,

    /// Ball radius (meters)
    pub entity_size_m: f32,

    /// Enclosure edge length (meters)
    pub enclosure_size_m: f32,

    /// Colors assigned round-robin to spawned balls
    pub palette: Vec<Rgb>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            entity_count: 5,
            gravity_y: -9.82,
            entity_size_m: 0.5,
            enclosure_size_m: 20.0,
            palette: vec![Rgb::RED],
        }
    }
}

impl SimulationConfig {
    /// Color for the ball spawned at `index`
    pub fn color_for_index(&self, index: usize) -> Rgb {
        if self.palette.is_empty() {
            return Rgb::WHITE;
        }
        self.palette[index % self.palette.len()]
    }
}
