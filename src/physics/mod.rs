//! Minimal rigid-body physics: spheres bouncing inside static boxes.
//!
//! Not a general engine. Shapes are limited to spheres, boxes and a
//! half-space, bodies carry linear velocity only, and gravity is a single
//! world vector.

mod collision;
mod stepper;
mod world;

// Re-export public types
pub use collision::{candidate_pairs, contact, Contact};
pub use stepper::{PhysicsStepper, StepReport};
pub use world::{Body, BodyHandle, Broadphase, ContactMaterial, MaterialId, Shape, World};
