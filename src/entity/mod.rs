//! Ball entities: one rigid body tied to its mesh, trail and speed label.

mod color;
mod trail;

use glam::{Quat, Vec3};

use crate::params::VisualParams;
use crate::physics::{Body, BodyHandle, MaterialId, Shape, World};
use crate::scene::{Geometry, LabelNode, LineNode, MeshNode, Node, NodeId, Scene};

// Re-export public types
pub use color::{ColorParseError, Hsl, Rgb, SpeedColorMap};
pub use trail::TrailBuffer;

/// Everything needed to spawn one ball
#[derive(Debug, Clone)]
pub struct BallSpec {
    pub radius: f32,
    pub color: Rgb,
    pub position: Vec3,
    pub mass: f32,
    pub restitution: f32,
    pub material: MaterialId,
}

/// A simulated ball. Exclusively owns its body, mesh, trail and label.
#[derive(Debug)]
pub struct BallEntity {
    body: BodyHandle,
    mesh: NodeId,
    trail_line: NodeId,
    label: NodeId,
    trail: TrailBuffer,
    radius: f32,
    color: Rgb,
}

impl BallEntity {
    /// Add the ball's body to `world` and its visuals to `scene`
    pub fn spawn(world: &mut World, scene: &mut Scene, spec: &BallSpec, visuals: &VisualParams) -> Self {
        let body = world.add_body(
            Body::dynamic(spec.mass, Shape::sphere(spec.radius))
                .with_position(spec.position)
                .with_restitution(spec.restitution)
                .with_material(spec.material),
        );

        let mesh = scene.add(Node::Mesh(MeshNode {
            geometry: Geometry::Sphere {
                radius: spec.radius,
            },
            position: spec.position,
            orientation: Quat::IDENTITY,
            color: spec.color,
            opacity: 1.0,
        }));

        let trail_line = scene.add(Node::Line(LineNode {
            points: Vec::new(),
            color: spec.color,
        }));

        let label = scene.add(Node::Label(LabelNode {
            text: speed_label(0.0),
            position: spec.position + Vec3::Y * spec.radius,
            font_size: visuals.label_font_size_m,
            color: Rgb::WHITE,
        }));

        Self {
            body,
            mesh,
            trail_line,
            label,
            trail: TrailBuffer::new(visuals.trail_capacity),
            radius: spec.radius,
            color: spec.color,
        }
    }

    /// Remove body, mesh, trail and label together
    pub fn despawn(self, world: &mut World, scene: &mut Scene) {
        world.remove_body(self.body);
        scene.remove(self.mesh);
        scene.remove(self.trail_line);
        scene.remove(self.label);
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn mesh(&self) -> NodeId {
        self.mesh
    }

    pub fn trail_line(&self) -> NodeId {
        self.trail_line
    }

    pub fn label(&self) -> NodeId {
        self.label
    }

    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    pub fn trail_mut(&mut self) -> &mut TrailBuffer {
        &mut self.trail
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Palette color the ball was spawned with (trail color)
    pub fn color(&self) -> Rgb {
        self.color
    }
}

/// Text shown above a ball
pub fn speed_label(speed: f32) -> String {
    format!("Vel: {:.2}", speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(world: &mut World) -> BallSpec {
        BallSpec {
            radius: 0.5,
            color: Rgb::GREEN,
            position: Vec3::new(1.0, 5.0, -1.0),
            mass: 1.0,
            restitution: 0.7,
            material: world.create_material("ball"),
        }
    }

    #[test]
    fn test_spawn_creates_body_and_three_nodes() {
        let mut world = World::default();
        let mut scene = Scene::new();
        let spec = spec(&mut world);
        let ball = BallEntity::spawn(&mut world, &mut scene, &spec, &VisualParams::default());

        assert_eq!(world.dynamic_count(), 1);
        assert_eq!(scene.len(), 3);
        assert_eq!(world.body(ball.body()).unwrap().position, spec.position);
        assert_eq!(scene.label(ball.label()).unwrap().text, "Vel: 0.00");
        assert_eq!(scene.line(ball.trail_line()).unwrap().color, Rgb::GREEN);
        assert_eq!(ball.trail().capacity(), 50);
    }

    #[test]
    fn test_despawn_removes_everything() {
        let mut world = World::default();
        let mut scene = Scene::new();
        let spec = spec(&mut world);
        let ball = BallEntity::spawn(&mut world, &mut scene, &spec, &VisualParams::default());
        let body = ball.body();

        ball.despawn(&mut world, &mut scene);
        assert!(!world.contains(body));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_speed_label_format() {
        assert_eq!(speed_label(3.14159), "Vel: 3.14");
    }
}
