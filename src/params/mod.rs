//! Parameter definitions with physical units and documented semantics.
//!
//! All tunable numbers live here with:
//! - Physical units (meters, seconds, kilograms, etc.)
//! - Documented ranges and meanings
//! - Type safety where possible

mod audio;
mod controls;
mod physics;
mod render;
mod simulation;
mod visual;

// Re-export all types
pub use audio::AnalyserConfig;
pub use controls::{ControlRanges, Palette};
pub use physics::{PhysicsParams, FIXED_TIMESTEP_S};
pub use render::RenderConfig;
pub use simulation::SimulationConfig;
pub use visual::VisualParams;
