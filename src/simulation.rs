//! Simulation controller: owns the world, scene, enclosure and balls and
//! runs one sample → step → sync cycle per tick.

use std::path::PathBuf;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::audio::{AudioAmplitudeSampler, DecodedAudio, PendingAudio};
use crate::enclosure::Enclosure;
use crate::entity::{BallEntity, BallSpec, Rgb};
use crate::params::{PhysicsParams, SimulationConfig, VisualParams};
use crate::physics::{ContactMaterial, MaterialId, PhysicsStepper, StepReport, World};
use crate::scene::Scene;
use crate::sync::{RenderSync, SyncReport};

/// Horizontal spread of spawn points around the center (meters)
const SPAWN_SPREAD_M: f32 = 5.0;

/// Spawn height above the center (meters)
const SPAWN_HEIGHT_M: f32 = 5.0;

/// Candidate points tried per ball before accepting an overlapping one.
/// The second half of the attempts sample the whole room.
const SPAWN_ATTEMPTS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
}

/// Everything that changes while the simulation runs
#[derive(Debug)]
pub struct SimulationState {
    pub world: World,
    pub scene: Scene,
    pub enclosure: Enclosure,
    pub entities: Vec<BallEntity>,
}

/// Result of one running tick
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub amplitude: f32,
    pub step: StepReport,
    pub sync: SyncReport,
}

pub struct SimulationController {
    config: SimulationConfig,
    params: PhysicsParams,
    visuals: VisualParams,
    state: SimulationState,
    stepper: PhysicsStepper,
    sync: RenderSync,
    sampler: AudioAmplitudeSampler,
    pending_audio: Option<PendingAudio>,
    run_state: RunState,
    rng: StdRng,
    ball_material: MaterialId,
    frame: u64,
    last_amplitude: f32,
}

impl SimulationController {
    /// Build the world and enclosure, then spawn the configured balls
    pub fn new(
        config: SimulationConfig,
        params: PhysicsParams,
        visuals: VisualParams,
        sampler: AudioAmplitudeSampler,
        seed: u64,
    ) -> Self {
        let mut world = World::new(Vec3::new(0.0, config.gravity_y, 0.0));
        world.solver_iterations = params.solver_iterations;
        world.default_friction = params.default_friction;

        let ball_material = world.create_material("ball");
        let wall_material = world.create_material("wall");
        world.add_contact_material(
            ball_material,
            wall_material,
            ContactMaterial {
                friction: params.ball_wall_friction,
                restitution: params.ball_wall_restitution,
            },
        );

        let mut scene = Scene::new();
        let enclosure = Enclosure::build(
            &mut world,
            &mut scene,
            config.enclosure_size_m,
            params.wall_thickness_m,
            wall_material,
            &visuals,
        );

        let mut controller = Self {
            stepper: PhysicsStepper::new(&params),
            sync: RenderSync::new(&visuals),
            state: SimulationState {
                world,
                scene,
                enclosure,
                entities: Vec::new(),
            },
            config,
            params,
            visuals,
            sampler,
            pending_audio: None,
            run_state: RunState::Running,
            rng: StdRng::seed_from_u64(seed),
            ball_material,
            frame: 0,
            last_amplitude: 0.0,
        };
        controller.populate();
        controller
    }

    /// One frame: sample the amplitude, step the world, mirror into the scene.
    ///
    /// Finished audio decodes are attached first. Returns `None` while paused.
    pub fn tick(&mut self) -> Option<FrameReport> {
        self.poll_audio();

        if self.run_state == RunState::Paused {
            return None;
        }

        let dt = self.params.timestep_s;
        self.sampler.advance(dt);
        let amplitude = self.sampler.sample();
        self.last_amplitude = amplitude;

        let step = self.stepper.step(&mut self.state.world, dt, amplitude);
        let sync = self.sync.sync(
            &self.state.world,
            &mut self.state.entities,
            &mut self.state.scene,
        );
        self.frame += 1;

        if step.impulse.is_some() {
            log::debug!("frame {}: amplitude {:.1} triggered impulse", self.frame, amplitude);
        }

        Some(FrameReport {
            frame: self.frame,
            amplitude,
            step,
            sync,
        })
    }

    pub fn toggle_pause(&mut self) -> RunState {
        self.run_state = match self.run_state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
        };
        log::info!("Simulation {:?}", self.run_state);
        self.run_state
    }

    /// Respawn every ball from the configuration and resume
    pub fn reset(&mut self) {
        self.rebuild_entities();
        self.run_state = RunState::Running;
        log::info!("Simulation reset");
    }

    /// Rebuild the enclosure at a new size and repopulate it
    pub fn set_enclosure_size(&mut self, size_m: f32) {
        let previous = self.run_state;
        self.run_state = RunState::Paused;

        self.destroy_entities();
        self.config.enclosure_size_m = size_m;
        self.state.enclosure.rebuild(
            &mut self.state.world,
            &mut self.state.scene,
            size_m,
            &self.visuals,
        );
        self.populate();

        self.run_state = previous;
    }

    pub fn set_entity_color(&mut self, palette: Vec<Rgb>) {
        self.config.palette = palette;
        self.rebuild_entities();
    }

    pub fn set_entity_size(&mut self, size_m: f32) {
        self.config.entity_size_m = size_m;
        self.rebuild_entities();
    }

    /// Takes effect on the next step
    pub fn set_gravity(&mut self, gravity_y: f32) {
        self.config.gravity_y = gravity_y;
        self.state.world.gravity = Vec3::new(0.0, gravity_y, 0.0);
        log::debug!("Gravity set to {:.2}", gravity_y);
    }

    /// Spawn one more ball with the next palette color
    pub fn add_entity(&mut self) {
        let index = self.state.entities.len();
        self.spawn_ball(index);
        self.config.entity_count = self.state.entities.len();
        log::info!("Added ball #{}", self.config.entity_count);
    }

    /// Replace the population with `count` fresh balls
    pub fn set_entity_count(&mut self, count: usize) {
        self.config.entity_count = count;
        self.rebuild_entities();
    }

    /// Decode a file in the background; attached on a later tick
    pub fn load_audio(&mut self, path: PathBuf) {
        self.pending_audio = Some(PendingAudio::from_path(path));
    }

    /// Decode an in-memory file in the background
    pub fn load_audio_bytes(&mut self, bytes: Vec<u8>, extension: Option<String>) {
        self.pending_audio = Some(PendingAudio::from_bytes(bytes, extension));
    }

    /// Attach already-decoded audio immediately
    pub fn attach_audio(&mut self, audio: DecodedAudio) {
        self.pending_audio = None;
        self.sampler.attach(audio);
    }

    pub fn is_loading_audio(&self) -> bool {
        self.pending_audio.is_some()
    }

    fn poll_audio(&mut self) {
        let Some(result) = self.pending_audio.as_ref().and_then(PendingAudio::poll) else {
            return;
        };
        let source = self
            .pending_audio
            .take()
            .map(|pending| pending.source().to_string())
            .unwrap_or_default();

        match result {
            Ok(audio) => self.sampler.attach(audio),
            Err(e) => log::warn!("Failed to load audio from {}: {}", source, e),
        }
    }

    fn rebuild_entities(&mut self) {
        self.destroy_entities();
        self.populate();
    }

    fn destroy_entities(&mut self) {
        for entity in self.state.entities.drain(..) {
            entity.despawn(&mut self.state.world, &mut self.state.scene);
        }
    }

    fn populate(&mut self) {
        for index in 0..self.config.entity_count {
            self.spawn_ball(index);
        }
        log::info!(
            "Spawned {} balls (radius {:.2} m) in a {:.1} m box",
            self.state.entities.len(),
            self.config.entity_size_m,
            self.config.enclosure_size_m
        );
    }

    fn spawn_ball(&mut self, index: usize) {
        let radius = self.config.entity_size_m;
        let position = self.spawn_point(radius);

        let spec = BallSpec {
            radius,
            color: self.config.color_for_index(index),
            position,
            mass: self.params.ball_mass_kg,
            restitution: self.params.ball_restitution,
            material: self.ball_material,
        };
        let entity = BallEntity::spawn(
            &mut self.state.world,
            &mut self.state.scene,
            &spec,
            &self.visuals,
        );
        self.state.entities.push(entity);
    }

    /// Random point inside the room, preferring the cluster above the center
    /// and avoiding balls already spawned
    fn spawn_point(&mut self, radius: f32) -> Vec3 {
        let limit = (self.state.enclosure.inner_half_extent() - radius).max(0.0);
        let mut candidate = Vec3::ZERO;
        for attempt in 0..SPAWN_ATTEMPTS {
            let raw = if attempt < SPAWN_ATTEMPTS / 2 {
                let x = (self.rng.gen::<f32>() - 0.5) * SPAWN_SPREAD_M;
                let z = (self.rng.gen::<f32>() - 0.5) * SPAWN_SPREAD_M;
                Vec3::new(x, SPAWN_HEIGHT_M, z)
            } else {
                Vec3::new(
                    self.rng.gen_range(-1.0..=1.0),
                    self.rng.gen_range(-1.0..=1.0),
                    self.rng.gen_range(-1.0..=1.0),
                ) * limit
            };
            candidate = raw.clamp(Vec3::splat(-limit), Vec3::splat(limit));

            if !self.overlaps_ball(candidate, radius) {
                return candidate;
            }
        }
        log::debug!("No free spawn point after {} attempts", SPAWN_ATTEMPTS);
        candidate
    }

    fn overlaps_ball(&self, position: Vec3, radius: f32) -> bool {
        self.state.entities.iter().any(|entity| {
            self.state
                .world
                .body(entity.body())
                .is_some_and(|body| body.position.distance(position) < entity.radius() + radius)
        })
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn world(&self) -> &World {
        &self.state.world
    }

    pub fn scene(&self) -> &Scene {
        &self.state.scene
    }

    pub fn entities(&self) -> &[BallEntity] {
        &self.state.entities
    }

    pub fn enclosure(&self) -> &Enclosure {
        &self.state.enclosure
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    pub fn visuals(&self) -> &VisualParams {
        &self.visuals
    }

    pub fn sampler(&self) -> &AudioAmplitudeSampler {
        &self.sampler
    }

    /// Frames stepped since creation
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Amplitude used by the last running tick
    pub fn last_amplitude(&self) -> f32 {
        self.last_amplitude
    }
}
