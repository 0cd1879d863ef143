//! Orbit camera around the enclosure.

use glam::{Mat4, Vec3};

use crate::params::RenderConfig;

/// Closest the camera may get to its target (meters)
const MIN_DISTANCE_M: f32 = 2.0;

/// Farthest the camera may get from its target (meters)
const MAX_DISTANCE_M: f32 = 200.0;

/// Pitch limit so the camera never flips over the pole (radians)
const MAX_PITCH_RAD: f32 = 1.55;

/// Camera orbiting a fixed target on a sphere
#[derive(Debug, Clone)]
pub struct CameraSystem {
    target: Vec3,
    distance: f32,
    /// Rotation about +Y, 0 looks down -Z
    yaw: f32,
    /// Elevation above the XZ plane
    pitch: f32,
    fov_degrees: f32,
    near_plane_m: f32,
    far_plane_m: f32,
    aspect_ratio: f32,
}

impl CameraSystem {
    /// Start at the configured eye, looking at the configured target
    pub fn new(config: &RenderConfig) -> Self {
        let target = Vec3::from_array(config.camera_target);
        let offset = Vec3::from_array(config.camera_eye) - target;
        let distance = offset.length().clamp(MIN_DISTANCE_M, MAX_DISTANCE_M);
        let pitch = (offset.y / offset.length().max(1e-6))
            .clamp(-1.0, 1.0)
            .asin()
            .clamp(-MAX_PITCH_RAD, MAX_PITCH_RAD);
        let yaw = offset.x.atan2(offset.z);

        Self {
            target,
            distance,
            yaw,
            pitch,
            fov_degrees: config.fov_degrees,
            near_plane_m: config.near_plane_m,
            far_plane_m: config.far_plane_m,
            aspect_ratio: config.aspect_ratio(),
        }
    }

    pub fn eye(&self) -> Vec3 {
        let direction = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        );
        self.target + direction * self.distance
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Rotate around the target (radians)
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-MAX_PITCH_RAD, MAX_PITCH_RAD);
    }

    /// Scale the orbit distance; factors below 1 move closer
    pub fn zoom(&mut self, factor: f32) {
        if factor > 0.0 {
            self.distance = (self.distance * factor).clamp(MIN_DISTANCE_M, MAX_DISTANCE_M);
        }
    }

    /// Track the surface size so the projection keeps its proportions
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Create view-projection matrix for rendering
    ///
    /// # Returns
    /// Tuple of (view_proj_matrix, camera_position)
    pub fn create_view_proj_matrix(&self) -> (Mat4, Vec3) {
        let eye = self.eye();

        // Always keep Y as up vector (camera never rolls)
        let view = Mat4::look_at_rh(eye, self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect_ratio,
            self.near_plane_m,
            self.far_plane_m,
        );

        (proj * view, eye)
    }
}
