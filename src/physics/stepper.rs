//! Fixed-timestep integration with audio-driven impulses.

use glam::Vec3;

use super::collision::{candidate_pairs, contact};
use super::world::{Body, World};
use crate::params::PhysicsParams;

/// Broadphase bounds inflation (meters)
const BROADPHASE_MARGIN_M: f32 = 0.05;

/// What one call to [`PhysicsStepper::step`] did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    /// Impulse given to every dynamic body, if the amplitude was loud enough
    pub impulse: Option<Vec3>,
    /// Substeps the step was split into
    pub substeps: usize,
    /// Touching pairs found on the first solver pass of each substep
    pub contacts: usize,
}

/// Advances a [`World`] by a caller-supplied timestep.
///
/// The stepper never looks at the wall clock. Callers pass the fixed
/// timestep and handle any frame-time accumulation themselves.
#[derive(Debug, Clone)]
pub struct PhysicsStepper {
    impulse_scale: f32,
    amplitude_threshold: f32,
    max_speed: f32,
    max_substep_travel: f32,
    max_substeps: usize,
    rest_speed: f32,
}

impl PhysicsStepper {
    pub fn new(params: &PhysicsParams) -> Self {
        Self {
            impulse_scale: params.impulse_scale,
            amplitude_threshold: params.amplitude_threshold,
            max_speed: params.max_speed_m_per_s,
            max_substep_travel: params.max_substep_travel_m.max(1e-3),
            max_substeps: params.max_substeps.max(1),
            rest_speed: params.rest_speed_m_per_s,
        }
    }

    /// Upward impulse for an amplitude, `None` at or below the threshold
    pub fn audio_impulse(&self, amplitude: f32) -> Option<Vec3> {
        (amplitude > self.amplitude_threshold)
            .then(|| Vec3::new(0.0, amplitude * self.impulse_scale, 0.0))
    }

    /// Advance every dynamic body by exactly `dt` seconds.
    ///
    /// Gravity is read from `world.gravity` on every call. Velocities are
    /// updated first (gravity, then the audio impulse), positions are then
    /// integrated with the new velocity and contacts resolved. The step is
    /// split into substeps so no body moves further than the configured
    /// travel per substep.
    pub fn step(&self, world: &mut World, dt: f32, amplitude: f32) -> StepReport {
        let gravity = world.gravity;
        let impulse = self.audio_impulse(amplitude);

        let handles: Vec<_> = world.bodies().map(|(handle, _)| handle).collect();
        let mut bodies: Vec<Body> = world.bodies().map(|(_, body)| *body).collect();

        let mut fastest = 0.0f32;
        for body in bodies.iter_mut().filter(|b| b.is_dynamic()) {
            body.velocity += gravity * dt;
            if let Some(impulse) = impulse {
                body.apply_impulse(impulse);
            }
            body.velocity = body.velocity.clamp_length_max(self.max_speed);
            fastest = fastest.max(body.speed());
        }

        let substeps = ((fastest * dt / self.max_substep_travel).ceil() as usize)
            .clamp(1, self.max_substeps);
        let h = dt / substeps as f32;

        let mut contacts = 0;
        for _ in 0..substeps {
            for body in bodies.iter_mut().filter(|b| b.is_dynamic()) {
                body.position += body.velocity * h;
            }
            contacts += self.solve_contacts(world, &mut bodies);
        }

        for (handle, body) in handles.into_iter().zip(bodies) {
            if let Some(slot) = world.body_mut(handle) {
                *slot = body;
            }
        }

        log::trace!(
            "step dt={:.4} amplitude={:.1} substeps={} contacts={}",
            dt,
            amplitude,
            substeps,
            contacts
        );

        StepReport {
            impulse,
            substeps,
            contacts,
        }
    }

    /// Sequential-impulse passes over the broadphase pairs. Returns the
    /// number of touching pairs seen on the first pass.
    fn solve_contacts(&self, world: &World, bodies: &mut [Body]) -> usize {
        let pairs = candidate_pairs(bodies, world.broadphase, BROADPHASE_MARGIN_M);
        let mut first_pass = 0;

        for iteration in 0..world.solver_iterations.max(1) {
            let mut touching = 0;
            for &(i, j) in &pairs {
                if self.resolve_pair(world, bodies, i, j) {
                    touching += 1;
                }
            }
            if iteration == 0 {
                first_pass = touching;
            }
            if touching == 0 {
                break;
            }
        }
        separate_from_static(bodies);
        first_pass
    }

    /// Separate one pair and exchange normal and friction impulses.
    fn resolve_pair(&self, world: &World, bodies: &mut [Body], i: usize, j: usize) -> bool {
        let (a, b) = (bodies[i], bodies[j]);
        let Some(hit) = contact(&a, &b) else {
            return false;
        };
        let inv_sum = a.inv_mass() + b.inv_mass();
        if inv_sum == 0.0 {
            return false;
        }
        let material = world.resolve_contact_material(&a, &b);
        let normal = hit.normal;

        // Remove the overlap, split by inverse mass
        let correction = normal * (hit.depth / inv_sum);
        bodies[i].position += correction * a.inv_mass();
        bodies[j].position -= correction * b.inv_mass();

        let relative = a.velocity - b.velocity;
        let approach = relative.dot(normal);
        if approach < 0.0 {
            let restitution = if -approach > self.rest_speed {
                material.restitution
            } else {
                0.0
            };
            let normal_impulse = -(1.0 + restitution) * approach / inv_sum;
            let mut impulse = normal * normal_impulse;

            // Coulomb friction, capped by the normal impulse
            let tangent = relative - normal * approach;
            let slide = tangent.length();
            if slide > 1e-6 {
                let friction_impulse = (slide / inv_sum).min(material.friction * normal_impulse);
                impulse -= tangent / slide * friction_impulse;
            }

            bodies[i].velocity += impulse * a.inv_mass();
            bodies[j].velocity -= impulse * b.inv_mass();
        }
        true
    }
}

/// Final positional pass: push every dynamic body fully out of every static
/// body it still overlaps and drop velocity heading back in.
///
/// Ball-ball corrections may run after the wall pairs and leave a crowded
/// ball inside a wall; static bodies get the last word. Every static body
/// is tested, not just broadphase pairs, since corrections may have moved a
/// ball past the broadphase margin.
fn separate_from_static(bodies: &mut [Body]) {
    let statics: Vec<Body> = bodies.iter().filter(|b| b.is_static()).copied().collect();
    for body in bodies.iter_mut().filter(|b| b.is_dynamic()) {
        for fixed in &statics {
            let Some(hit) = contact(body, fixed) else {
                continue;
            };
            body.position += hit.normal * hit.depth;
            let inward = body.velocity.dot(hit.normal);
            if inward < 0.0 {
                body.velocity -= hit.normal * inward;
            }
        }
    }
}
