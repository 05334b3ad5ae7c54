//! Collision detection between spheres, AABBs and planes

use crate::shapes::{Aabb, Plane, Sphere};
use diorama_math::Vec3;

/// Contact information from a collision
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    /// Point of contact
    pub point: Vec3,
    /// Contact normal (direction documented per test function)
    pub normal: Vec3,
    /// Penetration depth (positive means overlapping)
    pub penetration: f32,
}

impl Contact {
    /// Create a new contact
    pub fn new(point: Vec3, normal: Vec3, penetration: f32) -> Self {
        Self {
            point,
            normal,
            penetration,
        }
    }

    /// Check if this represents an actual collision (positive penetration)
    pub fn is_colliding(&self) -> bool {
        self.penetration > 0.0
    }
}

/// Test sphere vs plane collision
///
/// The contact normal points from the plane toward the sphere.
pub fn sphere_vs_plane(sphere: &Sphere, plane: &Plane) -> Option<Contact> {
    let penetration = sphere.radius - plane.signed_distance(sphere.center);

    if penetration > 0.0 {
        let normal = plane.normal;
        let point = sphere.center - normal * sphere.radius;
        Some(Contact::new(point, normal, penetration))
    } else {
        None
    }
}

/// Test AABB vs plane collision
///
/// The contact normal is the plane normal.
pub fn aabb_vs_plane(aabb: &Aabb, plane: &Plane) -> Option<Contact> {
    let center = aabb.center();
    let half = aabb.half_extents();
    let n = plane.normal;

    // Vertex deepest along -normal
    let sign = Vec3::new(
        if n.x >= 0.0 { 1.0 } else { -1.0 },
        if n.y >= 0.0 { 1.0 } else { -1.0 },
        if n.z >= 0.0 { 1.0 } else { -1.0 },
    );
    let closest_vertex = center - half.component_mul(sign);
    let signed_dist = plane.signed_distance(closest_vertex);

    if signed_dist < 0.0 {
        Some(Contact::new(closest_vertex, n, -signed_dist))
    } else {
        None
    }
}

/// Test sphere vs AABB collision
///
/// The contact normal points from the AABB toward the sphere.
pub fn sphere_vs_aabb(sphere: &Sphere, aabb: &Aabb) -> Option<Contact> {
    let closest = aabb.closest_point(sphere.center);
    let delta = sphere.center - closest;
    let dist_squared = delta.length_squared();

    if dist_squared >= sphere.radius * sphere.radius {
        return None;
    }

    let dist = dist_squared.sqrt();
    let normal = if dist > 0.0001 {
        delta.normalized()
    } else {
        // Center inside the box: escape along the shallowest face
        let to_min = sphere.center - aabb.min;
        let to_max = aabb.max - sphere.center;
        let candidates = [
            (to_min.x, -Vec3::X),
            (to_max.x, Vec3::X),
            (to_min.y, -Vec3::Y),
            (to_max.y, Vec3::Y),
            (to_min.z, -Vec3::Z),
            (to_max.z, Vec3::Z),
        ];
        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.0 < best.0 {
                best = *candidate;
            }
        }
        best.1
    };

    Some(Contact::new(closest, normal, sphere.radius - dist))
}

/// Test AABB vs AABB collision
///
/// The contact normal points from `b` toward `a`.
pub fn aabb_vs_aabb(a: &Aabb, b: &Aabb) -> Option<Contact> {
    if a.max.x < b.min.x || a.min.x > b.max.x {
        return None;
    }
    if a.max.y < b.min.y || a.min.y > b.max.y {
        return None;
    }
    if a.max.z < b.min.z || a.min.z > b.max.z {
        return None;
    }

    let overlap_x = (a.max.x.min(b.max.x) - a.min.x.max(b.min.x)).max(0.0);
    let overlap_y = (a.max.y.min(b.max.y) - a.min.y.max(b.min.y)).max(0.0);
    let overlap_z = (a.max.z.min(b.max.z) - a.min.z.max(b.min.z)).max(0.0);

    let (ca, cb) = (a.center(), b.center());

    let mut min_overlap = overlap_x;
    let mut normal = if ca.x < cb.x { -Vec3::X } else { Vec3::X };

    if overlap_y < min_overlap {
        min_overlap = overlap_y;
        normal = if ca.y < cb.y { -Vec3::Y } else { Vec3::Y };
    }
    if overlap_z < min_overlap {
        min_overlap = overlap_z;
        normal = if ca.z < cb.z { -Vec3::Z } else { Vec3::Z };
    }

    let overlap_min = a.min.max_components(b.min);
    let overlap_max = a.max.min_components(b.max);
    let point = (overlap_min + overlap_max) * 0.5;

    Some(Contact::new(point, normal, min_overlap))
}

/// Test sphere vs sphere collision
///
/// The contact normal points from `a` toward `b`.
pub fn sphere_vs_sphere(a: &Sphere, b: &Sphere) -> Option<Contact> {
    let delta = b.center - a.center;
    let dist_sq = delta.length_squared();
    let min_dist = a.radius + b.radius;

    if dist_sq < min_dist * min_dist && dist_sq > 0.0001 {
        let dist = dist_sq.sqrt();
        let normal = delta.normalized();
        let point = a.center + normal * a.radius;
        Some(Contact::new(point, normal, min_dist - dist))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_vs_floor_above() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 2.0), 1.0);
        assert!(sphere_vs_plane(&sphere, &Plane::floor(0.0)).is_none());
    }

    #[test]
    fn test_sphere_vs_floor_colliding() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 0.5), 1.0);
        let contact = sphere_vs_plane(&sphere, &Plane::floor(0.0)).expect("Should collide");
        assert!((contact.penetration - 0.5).abs() < 0.0001);
        assert_eq!(contact.normal, Vec3::Z);
    }

    #[test]
    fn test_aabb_vs_floor_colliding() {
        let aabb = Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, 0.25), Vec3::new(0.5, 0.5, 0.5));
        let contact = aabb_vs_plane(&aabb, &Plane::floor(0.0)).expect("Should collide");
        assert!((contact.penetration - 0.25).abs() < 0.0001);
        assert_eq!(contact.normal, Vec3::Z);
    }

    #[test]
    fn test_sphere_vs_aabb_colliding() {
        let sphere = Sphere::new(Vec3::new(1.0, 0.0, 0.0), 1.0);
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(0.5, 0.5, 0.5));
        let contact = sphere_vs_aabb(&sphere, &aabb).expect("Should collide");
        assert!((contact.penetration - 0.5).abs() < 0.0001);
        assert_eq!(contact.normal, Vec3::X);
    }

    #[test]
    fn test_aabb_vs_aabb_separated() {
        let a = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(0.5, 0.5, 0.5));
        let b = Aabb::from_center_half_extents(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.5, 0.5, 0.5));
        assert!(aabb_vs_aabb(&a, &b).is_none());
    }

    #[test]
    fn test_aabb_vs_aabb_min_axis() {
        let a = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(0.5, 0.5, 0.5));
        let b = Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, 0.8), Vec3::new(0.5, 0.5, 0.5));
        let contact = aabb_vs_aabb(&a, &b).expect("Should collide");
        assert!((contact.penetration - 0.2).abs() < 0.0001);
        // b is above a, so the normal from b toward a points down
        assert_eq!(contact.normal, -Vec3::Z);
    }

    #[test]
    fn test_sphere_vs_sphere() {
        let a = Sphere::new(Vec3::ZERO, 1.0);
        let b = Sphere::new(Vec3::new(1.5, 0.0, 0.0), 1.0);
        let contact = sphere_vs_sphere(&a, &b).expect("Should collide");
        assert!((contact.penetration - 0.5).abs() < 0.0001);
        assert_eq!(contact.normal, Vec3::X);
    }
}
