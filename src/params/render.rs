//! Rendering and camera configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (meters)
    pub near_plane_m: f32,

    /// Far clipping plane (meters)
    pub far_plane_m: f32,

    /// Initial camera position (meters)
    pub camera_eye: [f32; 3],

    /// Point the camera orbits around (meters)
    pub camera_target: [f32; 3],

    /// Segments per wireframe circle when drawing spheres
    pub sphere_segments: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 75.0,
            near_plane_m: 0.1,
            far_plane_m: 1000.0,
            camera_eye: [0.0, 8.0, 25.0],
            camera_target: [0.0, 0.0, 0.0],
            sphere_segments: 24,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }
}
