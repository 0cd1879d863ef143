//! Rigid-body world: bodies, shapes, materials and gravity.

use std::collections::{BTreeMap, HashMap};

use glam::{Quat, Vec3};

/// Stable handle to a body in a [`World`]. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(u64);

/// Material tag used to look up contact properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialId(u32);

impl MaterialId {
    /// Material of bodies that were never assigned one
    pub const DEFAULT: MaterialId = MaterialId(0);
}

/// Collision shape in body-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
    /// Infinite solid below the plane through the body origin; the surface
    /// normal is the body's local +Z axis
    HalfSpace,
}

impl Shape {
    pub fn sphere(radius: f32) -> Self {
        Shape::Sphere { radius }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Shape::Cuboid { half_extents }
    }
}

/// One rigid body. Mass 0 marks a static body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    mass: f32,
    inv_mass: f32,
    pub shape: Shape,
    pub position: Vec3,
    pub orientation: Quat,
    pub velocity: Vec3,
    pub restitution: f32,
    pub material: MaterialId,
    one_sided: bool,
}

impl Body {
    /// Body that integrates under gravity and impulses
    pub fn dynamic(mass: f32, shape: Shape) -> Self {
        let mass = mass.max(0.0);
        Self {
            mass,
            inv_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            shape,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            restitution: 0.0,
            material: MaterialId::DEFAULT,
            one_sided: false,
        }
    }

    /// Immovable body (mass 0)
    pub fn fixed(shape: Shape) -> Self {
        Self::dynamic(0.0, shape)
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation.normalize();
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = material;
        self
    }

    /// Cuboid that only pushes spheres out through its local +Z face.
    /// Spheres anywhere over the face footprint are sent back to that side.
    pub fn one_sided(mut self) -> Self {
        self.one_sided = true;
        self
    }

    pub fn is_one_sided(&self) -> bool {
        self.one_sided
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    pub fn is_dynamic(&self) -> bool {
        !self.is_static()
    }

    /// Change velocity by `impulse / mass`. Static bodies are unaffected.
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity += impulse * self.inv_mass;
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Axis-aligned bounds in world space; `None` for unbounded shapes
    pub fn aabb(&self) -> Option<(Vec3, Vec3)> {
        match self.shape {
            Shape::Sphere { radius } => Some((
                self.position - Vec3::splat(radius),
                self.position + Vec3::splat(radius),
            )),
            Shape::Cuboid { half_extents } => {
                // Project the rotated box axes onto world axes
                let axes = [
                    self.orientation * Vec3::X * half_extents.x,
                    self.orientation * Vec3::Y * half_extents.y,
                    self.orientation * Vec3::Z * half_extents.z,
                ];
                let extent = axes
                    .iter()
                    .fold(Vec3::ZERO, |acc, axis| acc + axis.abs());
                Some((self.position - extent, self.position + extent))
            }
            Shape::HalfSpace => None,
        }
    }
}

/// Friction and restitution for a pair of materials
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactMaterial {
    pub friction: f32,
    pub restitution: f32,
}

/// Candidate-pair generation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Broadphase {
    /// Every pair is tested
    #[default]
    Naive,
    /// Bodies sorted along x; only overlapping intervals are tested
    SweepAndPrune,
}

/// Rigid-body world. Gravity is read on every step.
#[derive(Debug, Clone)]
pub struct World {
    pub gravity: Vec3,
    pub solver_iterations: usize,
    pub broadphase: Broadphase,
    /// Friction for material pairs without a contact material
    pub default_friction: f32,
    bodies: BTreeMap<BodyHandle, Body>,
    next_handle: u64,
    material_names: Vec<String>,
    contact_materials: HashMap<(MaterialId, MaterialId), ContactMaterial>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -9.82, 0.0))
    }
}

impl World {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            solver_iterations: 10,
            broadphase: Broadphase::Naive,
            default_friction: 0.3,
            bodies: BTreeMap::new(),
            next_handle: 0,
            material_names: vec!["default".to_string()],
            contact_materials: HashMap::new(),
        }
    }

    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(handle, body);
        handle
    }

    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        self.bodies.remove(&handle)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(&handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(&handle)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(&handle)
    }

    /// Bodies in handle (creation) order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies.iter().map(|(handle, body)| (*handle, body))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn dynamic_count(&self) -> usize {
        self.bodies.values().filter(|b| b.is_dynamic()).count()
    }

    pub fn static_count(&self) -> usize {
        self.bodies.values().filter(|b| b.is_static()).count()
    }

    /// Register a new material tag
    pub fn create_material(&mut self, name: &str) -> MaterialId {
        let id = MaterialId(self.material_names.len() as u32);
        self.material_names.push(name.to_string());
        id
    }

    pub fn material_name(&self, id: MaterialId) -> Option<&str> {
        self.material_names.get(id.0 as usize).map(String::as_str)
    }

    /// Set contact properties for an unordered material pair
    pub fn add_contact_material(&mut self, a: MaterialId, b: MaterialId, material: ContactMaterial) {
        self.contact_materials.insert(pair_key(a, b), material);
    }

    pub fn contact_material(&self, a: MaterialId, b: MaterialId) -> Option<&ContactMaterial> {
        self.contact_materials.get(&pair_key(a, b))
    }

    /// Contact properties used when bodies `a` and `b` touch
    pub fn resolve_contact_material(&self, a: &Body, b: &Body) -> ContactMaterial {
        self.contact_material(a.material, b.material)
            .copied()
            .unwrap_or(ContactMaterial {
                friction: self.default_friction,
                restitution: a.restitution * b.restitution,
            })
    }

    /// Remove every body (materials and contact table survive)
    pub fn clear_bodies(&mut self) {
        self.bodies.clear();
    }
}

fn pair_key(a: MaterialId, b: MaterialId) -> (MaterialId, MaterialId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
