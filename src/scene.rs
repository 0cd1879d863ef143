//! Render-agnostic visual scene: meshes, polylines and text labels.
//!
//! The simulation writes here; a renderer reads it. Nodes are addressed by
//! [`NodeId`] so owners (balls, walls) can remove exactly what they added.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use crate::entity::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshNode {
    pub geometry: Geometry,
    pub position: Vec3,
    pub orientation: Quat,
    pub color: Rgb,
    /// 1.0 = opaque
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineNode {
    /// Connected polyline, drawn in order
    pub points: Vec<Vec3>,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelNode {
    pub text: String,
    /// Bottom-center anchor
    pub position: Vec3,
    pub font_size: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Mesh(MeshNode),
    Line(LineNode),
    Label(LabelNode),
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Node>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.remove(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn mesh_mut(&mut self, id: NodeId) -> Option<&mut MeshNode> {
        match self.nodes.get_mut(&id) {
            Some(Node::Mesh(mesh)) => Some(mesh),
            _ => None,
        }
    }

    pub fn line_mut(&mut self, id: NodeId) -> Option<&mut LineNode> {
        match self.nodes.get_mut(&id) {
            Some(Node::Line(line)) => Some(line),
            _ => None,
        }
    }

    pub fn label_mut(&mut self, id: NodeId) -> Option<&mut LabelNode> {
        match self.nodes.get_mut(&id) {
            Some(Node::Label(label)) => Some(label),
            _ => None,
        }
    }

    pub fn label(&self, id: NodeId) -> Option<&LabelNode> {
        match self.nodes.get(&id) {
            Some(Node::Label(label)) => Some(label),
            _ => None,
        }
    }

    pub fn mesh(&self, id: NodeId) -> Option<&MeshNode> {
        match self.nodes.get(&id) {
            Some(Node::Mesh(mesh)) => Some(mesh),
            _ => None,
        }
    }

    pub fn line(&self, id: NodeId) -> Option<&LineNode> {
        match self.nodes.get(&id) {
            Some(Node::Line(line)) => Some(line),
            _ => None,
        }
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors_match_node_kind() {
        let mut scene = Scene::new();
        let line = scene.add(Node::Line(LineNode {
            points: Vec::new(),
            color: Rgb::RED,
        }));

        assert!(scene.line_mut(line).is_some());
        assert!(scene.mesh_mut(line).is_none());
        assert!(scene.label(line).is_none());

        scene.remove(line);
        assert!(scene.is_empty());
        assert!(scene.line(line).is_none());
    }
}
