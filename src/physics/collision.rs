//! Contact generation: broadphase pair selection and sphere narrowphase.

use glam::Vec3;

use super::world::{Body, Broadphase, Shape};

/// Penetration between two bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the second body toward the first
    pub normal: Vec3,
    /// Overlap along the normal (meters, > 0)
    pub depth: f32,
}

impl Contact {
    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            depth: self.depth,
        }
    }
}

/// Narrowphase test between two bodies.
///
/// Only pairs involving at least one sphere generate contacts.
pub fn contact(a: &Body, b: &Body) -> Option<Contact> {
    match (a.shape, b.shape) {
        (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
            sphere_sphere(a.position, ra, b.position, rb)
        }
        (Shape::Sphere { radius }, Shape::Cuboid { half_extents }) => {
            sphere_cuboid(a.position, radius, b, half_extents)
        }
        (Shape::Cuboid { half_extents }, Shape::Sphere { radius }) => {
            sphere_cuboid(b.position, radius, a, half_extents).map(Contact::flipped)
        }
        (Shape::Sphere { radius }, Shape::HalfSpace) => sphere_half_space(a.position, radius, b),
        (Shape::HalfSpace, Shape::Sphere { radius }) => {
            sphere_half_space(b.position, radius, a).map(Contact::flipped)
        }
        _ => None,
    }
}

fn sphere_sphere(pa: Vec3, ra: f32, pb: Vec3, rb: f32) -> Option<Contact> {
    let delta = pa - pb;
    let reach = ra + rb;
    let dist_sq = delta.length_squared();
    if dist_sq >= reach * reach {
        return None;
    }
    let dist = dist_sq.sqrt();
    // Coincident centers: separate vertically
    let normal = if dist > 1e-6 { delta / dist } else { Vec3::Y };
    Some(Contact {
        normal,
        depth: reach - dist,
    })
}

fn sphere_cuboid(center: Vec3, radius: f32, cuboid: &Body, half_extents: Vec3) -> Option<Contact> {
    let local = cuboid.orientation.inverse() * (center - cuboid.position);
    if cuboid.is_one_sided() {
        return sphere_one_sided_face(local, radius, cuboid, half_extents);
    }
    let closest = local.clamp(-half_extents, half_extents);
    let offset = local - closest;
    let dist_sq = offset.length_squared();

    let (local_normal, depth) = if dist_sq > 1e-12 {
        if dist_sq >= radius * radius {
            return None;
        }
        let dist = dist_sq.sqrt();
        (offset / dist, radius - dist)
    } else {
        // Center inside the box: leave through the nearest face
        let face_gap = half_extents - local.abs();
        let axis = if face_gap.x <= face_gap.y && face_gap.x <= face_gap.z {
            0
        } else if face_gap.y <= face_gap.z {
            1
        } else {
            2
        };
        let sign = if local[axis] < 0.0 { -1.0 } else { 1.0 };
        let mut normal = Vec3::ZERO;
        normal[axis] = sign;
        (normal, radius + face_gap[axis])
    };

    Some(Contact {
        normal: cuboid.orientation * local_normal,
        depth,
    })
}

/// Contact with the +Z face of a one-sided cuboid. Depth is measured from
/// that face, so a center that crossed the box still exits on the +Z side.
fn sphere_one_sided_face(local: Vec3, radius: f32, cuboid: &Body, half_extents: Vec3) -> Option<Contact> {
    if local.x.abs() > half_extents.x + radius || local.y.abs() > half_extents.y + radius {
        return None;
    }
    let depth = radius + half_extents.z - local.z;
    if depth <= 0.0 {
        return None;
    }
    Some(Contact {
        normal: cuboid.orientation * Vec3::Z,
        depth,
    })
}

fn sphere_half_space(center: Vec3, radius: f32, plane: &Body) -> Option<Contact> {
    let normal = plane.orientation * Vec3::Z;
    let height = (center - plane.position).dot(normal);
    if height >= radius {
        return None;
    }
    Some(Contact {
        normal,
        depth: radius - height,
    })
}

/// Index pairs `(i, j)` with `i < j` worth a narrowphase test.
///
/// Static–static pairs are never returned. Output is sorted so both
/// strategies visit surviving pairs in the same order.
pub fn candidate_pairs(bodies: &[Body], strategy: Broadphase, margin: f32) -> Vec<(usize, usize)> {
    let mut pairs = match strategy {
        Broadphase::Naive => naive_pairs(bodies),
        Broadphase::SweepAndPrune => sweep_and_prune(bodies, margin),
    };
    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

fn naive_pairs(bodies: &[Body]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            if bodies[i].is_dynamic() || bodies[j].is_dynamic() {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

fn sweep_and_prune(bodies: &[Body], margin: f32) -> Vec<(usize, usize)> {
    let mut bounded: Vec<(usize, Vec3, Vec3)> = Vec::with_capacity(bodies.len());
    let mut unbounded = Vec::new();
    for (index, body) in bodies.iter().enumerate() {
        match body.aabb() {
            Some((min, max)) => {
                bounded.push((index, min - Vec3::splat(margin), max + Vec3::splat(margin)))
            }
            None => unbounded.push(index),
        }
    }
    bounded.sort_by(|a, b| a.1.x.total_cmp(&b.1.x));

    let mut pairs = Vec::new();
    let mut active: Vec<(usize, Vec3, Vec3)> = Vec::new();
    for &(index, min, max) in &bounded {
        active.retain(|(_, _, other_max)| other_max.x >= min.x);
        for &(other, other_min, other_max) in &active {
            let overlaps = min.y <= other_max.y
                && max.y >= other_min.y
                && min.z <= other_max.z
                && max.z >= other_min.z;
            if overlaps && (bodies[index].is_dynamic() || bodies[other].is_dynamic()) {
                pairs.push((index.min(other), index.max(other)));
            }
        }
        active.push((index, min, max));
    }

    // Unbounded shapes are tested against everything that moves
    for &plane in &unbounded {
        for (index, body) in bodies.iter().enumerate() {
            if index != plane && (body.is_dynamic() || bodies[plane].is_dynamic()) {
                pairs.push((index.min(plane), index.max(plane)));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_2;

    fn ball(position: Vec3, radius: f32) -> Body {
        Body::dynamic(1.0, Shape::sphere(radius)).with_position(position)
    }

    #[test]
    fn test_sphere_sphere_overlap() {
        let a = ball(Vec3::new(0.8, 0.0, 0.0), 0.5);
        let b = ball(Vec3::ZERO, 0.5);
        let hit = contact(&a, &b).unwrap();
        assert!((hit.depth - 0.2).abs() < 1e-5);
        assert!((hit.normal - Vec3::X).length() < 1e-5);

        let far = ball(Vec3::new(2.0, 0.0, 0.0), 0.5);
        assert!(contact(&far, &b).is_none());
    }

    #[test]
    fn test_sphere_resting_on_rotated_floor_box() {
        // Floor: thickness along world Y after rotation
        let floor = Body::fixed(Shape::cuboid(Vec3::new(10.0, 10.0, 0.25)))
            .with_orientation(Quat::from_axis_angle(Vec3::X, -FRAC_PI_2));
        let sphere = ball(Vec3::new(1.0, 0.6, 2.0), 0.5);

        let hit = contact(&sphere, &floor).unwrap();
        assert!((hit.normal - Vec3::Y).length() < 1e-4);
        assert!((hit.depth - 0.15).abs() < 1e-4);

        // Order of arguments flips the normal
        let flipped = contact(&floor, &sphere).unwrap();
        assert!((flipped.normal + Vec3::Y).length() < 1e-4);
    }

    #[test]
    fn test_sphere_center_inside_box_exits_nearest_face() {
        let wall = Body::fixed(Shape::cuboid(Vec3::new(5.0, 5.0, 0.25)));
        let sphere = ball(Vec3::new(0.0, 0.0, 0.2), 0.5);
        let hit = contact(&sphere, &wall).unwrap();
        assert!((hit.normal - Vec3::Z).length() < 1e-6);
        assert!((hit.depth - 0.55).abs() < 1e-5);
    }

    #[test]
    fn test_one_sided_wall_pushes_back_inside() {
        // Left wall of a 20 m room, +Z facing +X
        let wall = Body::fixed(Shape::cuboid(Vec3::new(10.0, 10.0, 0.25)))
            .with_position(Vec3::new(-10.0, 0.0, 0.0))
            .with_orientation(Quat::from_axis_angle(Vec3::Y, FRAC_PI_2))
            .one_sided();

        // Center past the wall midline: a two-sided box would push it outward
        let crossed = ball(Vec3::new(-10.1, 3.0, -2.0), 0.5);
        let hit = contact(&crossed, &wall).unwrap();
        assert!((hit.normal - Vec3::X).length() < 1e-5);
        assert!((hit.depth - 0.85).abs() < 1e-4);

        // Fully outside, still over the face
        let outside = ball(Vec3::new(-12.0, 0.0, 0.0), 0.5);
        assert!(contact(&outside, &wall).unwrap().normal.x > 0.99);

        let clear = ball(Vec3::new(-9.0, 0.0, 0.0), 0.5);
        assert!(contact(&clear, &wall).is_none());

        let beside = ball(Vec3::new(-10.0, 0.0, 11.0), 0.5);
        assert!(contact(&beside, &wall).is_none());
    }

    #[test]
    fn test_sphere_half_space() {
        let plane = Body::fixed(Shape::HalfSpace)
            .with_orientation(Quat::from_axis_angle(Vec3::X, -FRAC_PI_2));
        let sphere = ball(Vec3::new(3.0, -2.0, 1.0), 0.5);
        let hit = contact(&sphere, &plane).unwrap();
        assert!((hit.normal - Vec3::Y).length() < 1e-5);
        assert!((hit.depth - 2.5).abs() < 1e-4);

        let above = ball(Vec3::new(0.0, 1.0, 0.0), 0.5);
        assert!(contact(&above, &plane).is_none());
    }

    #[test]
    fn test_static_pairs_are_skipped() {
        let bodies = vec![
            Body::fixed(Shape::cuboid(Vec3::ONE)),
            Body::fixed(Shape::HalfSpace),
            ball(Vec3::ZERO, 0.5),
        ];
        let pairs = candidate_pairs(&bodies, Broadphase::Naive, 0.0);
        assert_eq!(pairs, vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn test_sweep_and_prune_keeps_every_touching_pair() {
        let bodies = vec![
            ball(Vec3::new(0.0, 0.0, 0.0), 0.5),
            ball(Vec3::new(0.9, 0.0, 0.0), 0.5),
            ball(Vec3::new(5.0, 0.0, 0.0), 0.5),
            ball(Vec3::new(0.0, 5.0, 0.0), 0.5),
            Body::fixed(Shape::HalfSpace)
                .with_orientation(Quat::from_axis_angle(Vec3::X, -FRAC_PI_2)),
        ];

        let touching: Vec<_> = candidate_pairs(&bodies, Broadphase::Naive, 0.0)
            .into_iter()
            .filter(|&(i, j)| contact(&bodies[i], &bodies[j]).is_some())
            .collect();
        let pruned: Vec<_> = candidate_pairs(&bodies, Broadphase::SweepAndPrune, 0.0)
            .into_iter()
            .filter(|&(i, j)| contact(&bodies[i], &bodies[j]).is_some())
            .collect();

        assert_eq!(touching, pruned);
        assert!(touching.contains(&(0, 1)));
        assert!(!touching.contains(&(0, 2)));
    }
}
