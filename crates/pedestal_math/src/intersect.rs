//! Intersection tests for picking and surface hit testing

use crate::bounds::AABB;
use crate::ray::Ray;
use crate::vector::Vec3;

/// Ray-AABB intersection using the slab method
///
/// Returns the distance along the ray to the first intersection in front of
/// the origin, or None.
pub fn ray_aabb(ray: &Ray, aabb: &AABB) -> Option<f32> {
    if aabb.is_empty() {
        return None;
    }
    let inv_dir = ray.inverse_direction();

    let t1 = (aabb.min.x - ray.origin.x) * inv_dir.x;
    let t2 = (aabb.max.x - ray.origin.x) * inv_dir.x;
    let t3 = (aabb.min.y - ray.origin.y) * inv_dir.y;
    let t4 = (aabb.max.y - ray.origin.y) * inv_dir.y;
    let t5 = (aabb.min.z - ray.origin.z) * inv_dir.z;
    let t6 = (aabb.max.z - ray.origin.z) * inv_dir.z;

    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax {
        None
    } else {
        Some(if tmin < 0.0 { tmax } else { tmin })
    }
}

/// Ray-plane intersection
///
/// The plane is given by a point on it and its normal. Returns the distance
/// along the ray, or None when parallel or behind the origin.
pub fn ray_plane(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<f32> {
    let denom = plane_normal.dot(ray.direction);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (plane_point - ray.origin).dot(plane_normal) / denom;
    if t >= 0.0 { Some(t) } else { None }
}
