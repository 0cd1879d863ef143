//! Scene → line-list vertices.
//!
//! Spheres become three great circles, boxes their twelve edges and
//! polylines consecutive segments. Labels are not drawn here.

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};
use std::f32::consts::TAU;

use crate::scene::{Geometry, MeshNode, Node, Scene};

/// Vertex structure for line rendering
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    fn new(position: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }
}

/// Flatten every drawable node into vertex pairs (one pair per segment)
pub fn scene_to_lines(scene: &Scene, sphere_segments: usize) -> Vec<LineVertex> {
    let mut vertices = Vec::new();
    for (_, node) in scene.nodes() {
        match node {
            Node::Mesh(mesh) => push_mesh(&mut vertices, mesh, sphere_segments.max(3)),
            Node::Line(line) => {
                let color = line.color.to_array(1.0);
                for pair in line.points.windows(2) {
                    vertices.push(LineVertex::new(pair[0], color));
                    vertices.push(LineVertex::new(pair[1], color));
                }
            }
            Node::Label(_) => {}
        }
    }
    vertices
}

fn push_mesh(vertices: &mut Vec<LineVertex>, mesh: &MeshNode, segments: usize) {
    let color = mesh.color.to_array(mesh.opacity);
    match mesh.geometry {
        Geometry::Sphere { radius } => {
            let planes = [(Vec3::X, Vec3::Y), (Vec3::X, Vec3::Z), (Vec3::Y, Vec3::Z)];
            for (u, v) in planes {
                let point = |i: usize| {
                    let angle = TAU * i as f32 / segments as f32;
                    let local = (u * angle.cos() + v * angle.sin()) * radius;
                    mesh.position + mesh.orientation * local
                };
                for i in 0..segments {
                    vertices.push(LineVertex::new(point(i), color));
                    vertices.push(LineVertex::new(point(i + 1), color));
                }
            }
        }
        Geometry::Cuboid { half_extents } => {
            let corners = box_corners(mesh.position, mesh.orientation, half_extents);
            for (a, b) in BOX_EDGES {
                vertices.push(LineVertex::new(corners[a], color));
                vertices.push(LineVertex::new(corners[b], color));
            }
        }
    }
}

/// Corner `i` has bit 0 = +x, bit 1 = +y, bit 2 = +z
fn box_corners(center: Vec3, orientation: Quat, half_extents: Vec3) -> [Vec3; 8] {
    let mut corners = [Vec3::ZERO; 8];
    for (i, corner) in corners.iter_mut().enumerate() {
        let sign = Vec3::new(
            if i & 1 == 0 { -1.0 } else { 1.0 },
            if i & 2 == 0 { -1.0 } else { 1.0 },
            if i & 4 == 0 { -1.0 } else { 1.0 },
        );
        *corner = center + orientation * (sign * half_extents);
    }
    corners
}

const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];
