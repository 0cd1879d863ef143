//! Bounding enclosure: six static wall boxes forming a cube room.
//!
//! Each wall is a thin one-sided box whose local +Z axis points into the
//! room, so a ball pushed past a wall's midline still goes back in. The
//! floor also gets a half-space whose plane is the floor's inner face, so a
//! ball can never fall out of the room even if a wall contact is missed.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};

use crate::params::VisualParams;
use crate::physics::{Body, BodyHandle, MaterialId, Shape, World};
use crate::scene::{Geometry, MeshNode, Node, NodeId, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    Floor,
    Ceiling,
    Back,
    Front,
    Left,
    Right,
}

impl WallSide {
    pub const ALL: [WallSide; 6] = [
        WallSide::Floor,
        WallSide::Ceiling,
        WallSide::Back,
        WallSide::Front,
        WallSide::Left,
        WallSide::Right,
    ];

    /// Wall center for a cube of edge `size` centered at the origin
    pub fn position(self, size: f32) -> Vec3 {
        let half = size / 2.0;
        match self {
            WallSide::Floor => Vec3::new(0.0, -half, 0.0),
            WallSide::Ceiling => Vec3::new(0.0, half, 0.0),
            WallSide::Back => Vec3::new(0.0, 0.0, -half),
            WallSide::Front => Vec3::new(0.0, 0.0, half),
            WallSide::Left => Vec3::new(-half, 0.0, 0.0),
            WallSide::Right => Vec3::new(half, 0.0, 0.0),
        }
    }

    /// Rotation taking the box's local +Z to the inward normal
    pub fn orientation(self) -> Quat {
        match self {
            WallSide::Floor => Quat::from_axis_angle(Vec3::X, -FRAC_PI_2),
            WallSide::Ceiling => Quat::from_axis_angle(Vec3::X, FRAC_PI_2),
            WallSide::Back => Quat::IDENTITY,
            WallSide::Front => Quat::from_axis_angle(Vec3::X, PI),
            WallSide::Left => Quat::from_axis_angle(Vec3::Y, FRAC_PI_2),
            WallSide::Right => Quat::from_axis_angle(Vec3::Y, -FRAC_PI_2),
        }
    }

    pub fn inward_normal(self) -> Vec3 {
        self.orientation() * Vec3::Z
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Wall {
    pub side: WallSide,
    pub body: BodyHandle,
    pub panel: NodeId,
}

/// The room the balls live in. Owns its wall bodies, panels and floor plane.
#[derive(Debug)]
pub struct Enclosure {
    size: f32,
    thickness: f32,
    material: MaterialId,
    walls: Vec<Wall>,
    floor_plane: Option<BodyHandle>,
}

impl Enclosure {
    pub fn build(
        world: &mut World,
        scene: &mut Scene,
        size: f32,
        thickness: f32,
        material: MaterialId,
        visuals: &VisualParams,
    ) -> Self {
        let mut enclosure = Self {
            size,
            thickness,
            material,
            walls: Vec::with_capacity(WallSide::ALL.len()),
            floor_plane: None,
        };
        enclosure.create(world, scene, visuals);
        enclosure
    }

    /// Remove the current walls, then create a set for `size`
    pub fn rebuild(&mut self, world: &mut World, scene: &mut Scene, size: f32, visuals: &VisualParams) {
        self.destroy(world, scene);
        self.size = size;
        self.create(world, scene, visuals);
    }

    /// Remove every body and panel this enclosure created
    pub fn destroy(&mut self, world: &mut World, scene: &mut Scene) {
        for wall in self.walls.drain(..) {
            world.remove_body(wall.body);
            scene.remove(wall.panel);
        }
        if let Some(plane) = self.floor_plane.take() {
            world.remove_body(plane);
        }
    }

    fn create(&mut self, world: &mut World, scene: &mut Scene, visuals: &VisualParams) {
        let half_extents = Vec3::new(self.size / 2.0, self.size / 2.0, self.thickness / 2.0);

        for side in WallSide::ALL {
            let position = side.position(self.size);
            let orientation = side.orientation();
            let body = world.add_body(
                Body::fixed(Shape::cuboid(half_extents))
                    .with_position(position)
                    .with_orientation(orientation)
                    .with_material(self.material)
                    .one_sided(),
            );
            let opacity = if side == WallSide::Ceiling {
                visuals.ceiling_opacity
            } else {
                1.0
            };
            let panel = scene.add(Node::Mesh(MeshNode {
                geometry: Geometry::Cuboid { half_extents },
                position,
                orientation,
                color: visuals.wall_color,
                opacity,
            }));
            self.walls.push(Wall { side, body, panel });
        }

        let floor = WallSide::Floor;
        self.floor_plane = Some(world.add_body(
            Body::fixed(Shape::HalfSpace)
                .with_position(floor.position(self.size) + floor.inward_normal() * self.thickness / 2.0)
                .with_orientation(floor.orientation())
                .with_material(self.material),
        ));

        log::info!("Enclosure built: size {:.1} m, {} walls", self.size, self.walls.len());
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    pub fn floor_plane(&self) -> Option<BodyHandle> {
        self.floor_plane
    }

    /// Distance from the center to any inner wall face (meters)
    pub fn inner_half_extent(&self) -> f32 {
        (self.size - self.thickness) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(size: f32) -> (World, Scene, Enclosure) {
        let mut world = World::default();
        let mut scene = Scene::new();
        let material = world.create_material("wall");
        let enclosure = Enclosure::build(
            &mut world,
            &mut scene,
            size,
            0.5,
            material,
            &VisualParams::default(),
        );
        (world, scene, enclosure)
    }

    #[test]
    fn test_every_wall_faces_inward() {
        for side in WallSide::ALL {
            let inward = side.inward_normal();
            let outward = side.position(10.0).normalize();
            assert!((inward + outward).length() < 1e-5, "{:?} faces {:?}", side, inward);
        }
    }

    #[test]
    fn test_build_creates_six_walls_and_floor_plane() {
        let (world, scene, enclosure) = build(20.0);
        assert_eq!(enclosure.wall_count(), 6);
        assert_eq!(world.static_count(), 7);
        assert_eq!(scene.len(), 6);
        assert!((enclosure.inner_half_extent() - 9.75).abs() < 1e-6);
        for wall in enclosure.walls() {
            assert!(world.body(wall.body).unwrap().is_one_sided());
        }

        let plane = world.body(enclosure.floor_plane().unwrap()).unwrap();
        assert!((plane.position.y + 9.75).abs() < 1e-5);
    }

    #[test]
    fn test_ceiling_panel_is_translucent() {
        let (_, scene, enclosure) = build(20.0);
        for wall in enclosure.walls() {
            let opacity = scene.mesh(wall.panel).unwrap().opacity;
            if wall.side == WallSide::Ceiling {
                assert!((opacity - 0.2).abs() < 1e-6);
            } else {
                assert_eq!(opacity, 1.0);
            }
        }
    }

    #[test]
    fn test_rebuild_replaces_previous_walls() {
        let (mut world, mut scene, mut enclosure) = build(20.0);
        let old: Vec<_> = enclosure.walls().iter().map(|w| w.body).collect();

        enclosure.rebuild(&mut world, &mut scene, 8.0, &VisualParams::default());

        assert_eq!(world.static_count(), 7);
        assert_eq!(scene.len(), 6);
        assert!(old.iter().all(|handle| !world.contains(*handle)));
        assert_eq!(enclosure.size(), 8.0);
    }

    #[test]
    fn test_destroy_removes_everything() {
        let (mut world, mut scene, mut enclosure) = build(20.0);
        enclosure.destroy(&mut world, &mut scene);
        assert_eq!(world.body_count(), 0);
        assert!(scene.is_empty());
        assert_eq!(enclosure.wall_count(), 0);
    }
}
