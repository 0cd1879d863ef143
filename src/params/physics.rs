//! Rigid-body physics parameters.

/// Fixed simulation timestep (seconds). Collision response is tuned for it.
pub const FIXED_TIMESTEP_S: f32 = 1.0 / 60.0;

/// Physics parameters shared by the stepper, enclosure and entity spawner
#[derive(Debug, Clone)]
pub struct PhysicsParams {
    /// Timestep passed to every step (seconds)
    pub timestep_s: f32,

    /// Contact solver passes per substep
    pub solver_iterations: usize,

    /// Audio impulse per unit of amplitude (kg·m/s)
    /// Formula: impulse_y = amplitude * this_scale
    pub impulse_scale: f32,

    /// Amplitude that must be exceeded before impulses fire (0-255 scale)
    pub amplitude_threshold: f32,

    /// Speed ceiling for dynamic bodies (meters per second)
    pub max_speed_m_per_s: f32,

    /// Largest distance a body may travel within one substep (meters)
    /// Must stay below wall half-thickness plus the smallest ball radius
    pub max_substep_travel_m: f32,

    /// Upper bound on substeps per step
    pub max_substeps: usize,

    /// Approach speed below which contacts do not bounce (meters per second)
    pub rest_speed_m_per_s: f32,

    /// Ball mass (kilograms)
    pub ball_mass_kg: f32,

    /// Ball restitution (dimensionless, 0-1)
    pub ball_restitution: f32,

    /// Ball-wall contact friction coefficient
    pub ball_wall_friction: f32,

    /// Ball-wall contact restitution
    pub ball_wall_restitution: f32,

    /// Friction used for material pairs without a registered contact material
    pub default_friction: f32,

    /// Enclosure wall thickness (meters)
    pub wall_thickness_m: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            timestep_s: FIXED_TIMESTEP_S,
            solver_iterations: 10,
            impulse_scale: 0.1,
            amplitude_threshold: 30.0,
            max_speed_m_per_s: 60.0,
            max_substep_travel_m: 0.2,
            max_substeps: 32,
            rest_speed_m_per_s: 0.5,
            ball_mass_kg: 1.0,
            ball_restitution: 0.7,
            ball_wall_friction: 0.1,
            ball_wall_restitution: 0.7,
            default_friction: 0.3,
            wall_thickness_m: 0.5,
        }
    }
}
