//! Visual mapping parameters (trails, speed colors, labels, walls).

use crate::entity::Rgb;

#[derive(Debug, Clone)]
pub struct VisualParams {
    /// Positions kept per trail
    pub trail_capacity: usize,

    /// Speed mapped to the end of the hue range (meters per second)
    pub color_max_speed_m_per_s: f32,

    /// Hue at zero speed (0-1); full speed maps to hue 0
    pub hue_span: f32,

    /// Label text height (meters)
    pub label_font_size_m: f32,

    /// Wall panel color
    pub wall_color: Rgb,

    /// Ceiling panel opacity (0-1)
    pub ceiling_opacity: f32,
}

impl Default for VisualParams {
    fn default() -> Self {
        Self {
            trail_capacity: 50,
            color_max_speed_m_per_s: 15.0,
            hue_span: 0.7,
            label_font_size_m: 0.5,
            wall_color: Rgb::from_hex_u32(0x666666),
            ceiling_opacity: 0.2,
        }
    }
}
