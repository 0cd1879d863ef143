//! Copies post-step physics state into the scene.

use glam::Vec3;

use crate::entity::{speed_label, BallEntity, SpeedColorMap};
use crate::params::VisualParams;
use crate::physics::World;
use crate::scene::Scene;

/// Summary of one sync pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Entities whose body was found and mirrored
    pub synced: usize,
    /// Fastest ball speed this frame (meters per second)
    pub max_speed: f32,
    /// Label text of the fastest ball
    pub fastest_label: Option<String>,
}

/// Mirrors body transforms into meshes, trails and labels
#[derive(Debug, Clone)]
pub struct RenderSync {
    color_map: SpeedColorMap,
}

impl RenderSync {
    pub fn new(visuals: &VisualParams) -> Self {
        Self {
            color_map: SpeedColorMap::new(visuals.color_max_speed_m_per_s, visuals.hue_span),
        }
    }

    pub fn color_map(&self) -> &SpeedColorMap {
        &self.color_map
    }

    /// For every entity: mesh transform and speed color, one trail push,
    /// line points, and the label text anchored above the ball.
    ///
    /// Entities whose body is gone are skipped.
    pub fn sync(&self, world: &World, entities: &mut [BallEntity], scene: &mut Scene) -> SyncReport {
        let mut report = SyncReport::default();

        for entity in entities.iter_mut() {
            let Some(body) = world.body(entity.body()) else {
                continue;
            };
            let position = body.position;
            let speed = body.speed();

            if let Some(mesh) = scene.mesh_mut(entity.mesh()) {
                mesh.position = position;
                mesh.orientation = body.orientation;
                mesh.color = self.color_map.color_for_speed(speed);
            }

            entity.trail_mut().push(position);
            let points: Vec<Vec3> = entity.trail().as_line_strip().collect();
            if let Some(line) = scene.line_mut(entity.trail_line()) {
                line.points = points;
            }

            let text = speed_label(speed);
            if let Some(label) = scene.label_mut(entity.label()) {
                label.text = text.clone();
                label.position = position + Vec3::Y * entity.radius();
            }

            report.synced += 1;
            if report.fastest_label.is_none() || speed > report.max_speed {
                report.max_speed = speed;
                report.fastest_label = Some(text);
            }
        }

        log::trace!("synced {} entities, max speed {:.2}", report.synced, report.max_speed);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{BallSpec, Rgb};
    use crate::physics::MaterialId;

    fn setup(velocity: Vec3) -> (World, Scene, Vec<BallEntity>) {
        let mut world = World::default();
        let mut scene = Scene::new();
        let spec = BallSpec {
            radius: 0.5,
            color: Rgb::RED,
            position: Vec3::new(0.0, 2.0, 0.0),
            mass: 1.0,
            restitution: 0.7,
            material: MaterialId::DEFAULT,
        };
        let ball = BallEntity::spawn(&mut world, &mut scene, &spec, &VisualParams::default());
        world.body_mut(ball.body()).unwrap().velocity = velocity;
        (world, scene, vec![ball])
    }

    #[test]
    fn test_sync_mirrors_body_into_scene() {
        let (world, mut scene, mut balls) = setup(Vec3::new(3.0, 4.0, 0.0));
        let sync = RenderSync::new(&VisualParams::default());

        let report = sync.sync(&world, &mut balls, &mut scene);

        let ball = &balls[0];
        assert_eq!(report.synced, 1);
        assert!((report.max_speed - 5.0).abs() < 1e-5);
        assert_eq!(report.fastest_label.as_deref(), Some("Vel: 5.00"));

        let label = scene.label(ball.label()).unwrap();
        assert_eq!(label.text, "Vel: 5.00");
        assert_eq!(label.position, Vec3::new(0.0, 2.5, 0.0));
        assert_eq!(
            scene.mesh(ball.mesh()).unwrap().color,
            sync.color_map().color_for_speed(5.0)
        );
        assert_eq!(scene.line(ball.trail_line()).unwrap().points, vec![Vec3::new(0.0, 2.0, 0.0)]);
    }

    #[test]
    fn test_trail_is_capped_across_many_syncs() {
        let (world, mut scene, mut balls) = setup(Vec3::ZERO);
        let sync = RenderSync::new(&VisualParams::default());
        for _ in 0..80 {
            sync.sync(&world, &mut balls, &mut scene);
        }
        assert_eq!(balls[0].trail().len(), 50);
        assert_eq!(scene.line(balls[0].trail_line()).unwrap().points.len(), 50);
    }

    #[test]
    fn test_missing_body_is_skipped() {
        let (mut world, mut scene, mut balls) = setup(Vec3::ZERO);
        world.clear_bodies();
        let report = RenderSync::new(&VisualParams::default()).sync(&world, &mut balls, &mut scene);
        assert_eq!(report.synced, 0);
        assert!(report.fastest_label.is_none());
    }
}
