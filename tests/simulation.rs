//! End-to-end behaviour of the simulation loop through the public API.

use bouncebox::audio::{AudioAmplitudeSampler, DecodedAudio};
use bouncebox::entity::SpeedColorMap;
use bouncebox::params::{PhysicsParams, SimulationConfig, VisualParams};
use bouncebox::physics::{Body, PhysicsStepper, Shape, World};
use bouncebox::scene::Node;
use bouncebox::simulation::{RunState, SimulationController};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn controller(config: SimulationConfig) -> SimulationController {
    SimulationController::new(
        config,
        PhysicsParams::default(),
        VisualParams::default(),
        AudioAmplitudeSampler::silent().unwrap(),
        42,
    )
}

fn loud_noise() -> DecodedAudio {
    let mut rng = StdRng::seed_from_u64(3);
    let samples = (0..44100 * 12).map(|_| rng.gen_range(-0.5..0.5)).collect();
    DecodedAudio::new(samples, 44100)
}

fn ball_states(sim: &SimulationController) -> Vec<Body> {
    sim.world().bodies().map(|(_, body)| *body).collect()
}

fn scene_nodes(sim: &SimulationController) -> Vec<Node> {
    sim.scene().nodes().map(|(_, node)| node.clone()).collect()
}

fn assert_inside(sim: &SimulationController, tolerance: f32) {
    let limit = sim.enclosure().inner_half_extent();
    for entity in sim.entities() {
        let position = sim.world().body(entity.body()).unwrap().position;
        let reach = position.abs().max_element() + entity.radius();
        assert!(
            reach <= limit + tolerance,
            "ball escaped: {:?} (limit {})",
            position,
            limit
        );
    }
}

#[test]
fn balls_stay_inside_enclosure_without_audio() {
    let mut sim = controller(SimulationConfig::default());
    for _ in 0..600 {
        sim.tick();
        assert_inside(&sim, 0.25);
    }
}

#[test]
fn balls_stay_inside_enclosure_under_loud_audio() {
    let mut sim = controller(SimulationConfig {
        entity_count: 10,
        enclosure_size_m: 8.0,
        ..Default::default()
    });
    sim.attach_audio(loud_noise());

    let mut impulses = 0;
    for _ in 0..600 {
        let report = sim.tick().unwrap();
        if report.step.impulse.is_some() {
            impulses += 1;
        }
        assert_inside(&sim, 0.25);
    }
    assert!(impulses > 0);
}

fn run_crowded(config: SimulationConfig, loud: bool, ticks: usize) {
    let half_size = config.enclosure_size_m / 2.0;
    let mut sim = controller(config);
    if loud {
        sim.attach_audio(loud_noise());
    }
    for tick in 0..ticks {
        sim.tick();
        assert_inside(&sim, 0.01);
        for entity in sim.entities() {
            let position = sim.world().body(entity.body()).unwrap().position;
            assert!(
                position.abs().max_element() <= half_size,
                "tick {}: ball center outside the box at {:?}",
                tick,
                position
            );
        }
    }
}

#[test]
fn largest_balls_at_max_count_stay_inside() {
    let config = SimulationConfig {
        entity_count: 50,
        entity_size_m: 2.0,
        enclosure_size_m: 20.0,
        ..Default::default()
    };
    run_crowded(config.clone(), false, 600);
    run_crowded(config, true, 600);
}

#[test]
fn crowded_smallest_box_stays_inside() {
    let config = SimulationConfig {
        entity_count: 30,
        entity_size_m: 0.5,
        enclosure_size_m: 5.0,
        ..Default::default()
    };
    run_crowded(config.clone(), false, 600);
    run_crowded(
        SimulationConfig {
            entity_count: 50,
            gravity_y: -20.0,
            ..config
        },
        true,
        600,
    );
}

#[test]
fn trails_fill_to_capacity() {
    let mut sim = controller(SimulationConfig::default());
    for _ in 0..10 {
        sim.tick();
    }
    assert!(sim.entities().iter().all(|e| e.trail().len() == 10));

    for _ in 0..70 {
        sim.tick();
    }
    for entity in sim.entities() {
        assert_eq!(entity.trail().len(), 50);
        let line = sim.scene().line(entity.trail_line()).unwrap();
        assert_eq!(line.points.len(), 50);
        assert_eq!(line.points.last().copied(), entity.trail().latest());
    }
}

#[test]
fn speed_colors_are_deterministic() {
    let map = SpeedColorMap::default();
    assert!((map.hue_for_speed(0.0) - 0.7).abs() < 1e-6);
    assert_eq!(map.hue_for_speed(15.0), 0.0);
    assert_eq!(map.hue_for_speed(40.0), 0.0);
    assert_eq!(map.color_for_speed(7.3), map.color_for_speed(7.3));
}

#[test]
fn impulse_fires_only_above_threshold() {
    let stepper = PhysicsStepper::new(&PhysicsParams::default());
    let build = || {
        let mut world = World::new(Vec3::ZERO);
        for x in [-3.0, 0.0, 3.0] {
            world.add_body(
                Body::dynamic(1.0, Shape::sphere(0.5)).with_position(Vec3::new(x, 0.0, 0.0)),
            );
        }
        world.add_body(Body::fixed(Shape::cuboid(Vec3::ONE)).with_position(Vec3::new(0.0, -5.0, 0.0)));
        world
    };

    let mut quiet = build();
    stepper.step(&mut quiet, 1.0 / 60.0, 29.0);
    assert!(quiet.bodies().all(|(_, b)| b.velocity == Vec3::ZERO));

    let mut loud = build();
    stepper.step(&mut loud, 1.0 / 60.0, 31.0);
    for (_, body) in loud.bodies() {
        if body.is_dynamic() {
            assert!((body.velocity.y - 3.1).abs() < 1e-4);
        } else {
            assert_eq!(body.velocity, Vec3::ZERO);
        }
    }
}

#[test]
fn gravity_changes_apply_on_next_tick() {
    let mut sim = controller(SimulationConfig {
        entity_count: 1,
        ..Default::default()
    });
    let ball = sim.entities()[0].body();

    sim.set_gravity(0.0);
    sim.tick();
    assert_eq!(sim.world().body(ball).unwrap().velocity.y, 0.0);

    sim.set_gravity(-9.82);
    sim.tick();
    assert!(sim.world().body(ball).unwrap().velocity.y < 0.0);
}

#[test]
fn resize_rebuilds_walls_and_population() {
    let mut sim = controller(SimulationConfig::default());
    for _ in 0..30 {
        sim.tick();
    }

    sim.set_enclosure_size(12.0);

    let wall_boxes = sim
        .world()
        .bodies()
        .filter(|(_, b)| b.is_static() && matches!(b.shape, Shape::Cuboid { .. }))
        .count();
    assert_eq!(wall_boxes, 6);
    assert_eq!(sim.enclosure().wall_count(), 6);
    assert_eq!(sim.entities().len(), sim.config().entity_count);
    assert_eq!(sim.world().dynamic_count(), 5);
    assert_eq!(sim.enclosure().size(), 12.0);
    assert!(sim.is_running());
    assert_inside(&sim, 0.0);

    // Repeated resizes never leak bodies or nodes
    sim.set_enclosure_size(30.0);
    sim.set_enclosure_size(5.0);
    assert_eq!(sim.world().static_count(), 7);
    assert_eq!(sim.scene().len(), 6 + 5 * 3);
}

#[test]
fn paused_ticks_change_nothing() {
    let mut sim = controller(SimulationConfig::default());
    sim.tick();

    assert_eq!(sim.toggle_pause(), RunState::Paused);
    let bodies = ball_states(&sim);
    let nodes = scene_nodes(&sim);
    let frame = sim.frame();

    for _ in 0..10 {
        assert!(sim.tick().is_none());
    }
    assert_eq!(ball_states(&sim), bodies);
    assert_eq!(scene_nodes(&sim), nodes);
    assert_eq!(sim.frame(), frame);

    assert_eq!(sim.toggle_pause(), RunState::Running);
    assert!(sim.tick().is_some());
    assert_ne!(ball_states(&sim), bodies);
}

#[test]
fn bulk_count_and_add_one() {
    let mut sim = controller(SimulationConfig::default());
    sim.set_entity_count(12);
    assert_eq!(sim.entities().len(), 12);
    sim.add_entity();
    assert_eq!(sim.entities().len(), 13);
    assert_eq!(sim.world().dynamic_count(), 13);
}
