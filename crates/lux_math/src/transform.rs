// Transform utilities for Mat4
//
// Extends glam::Mat4 with the bounding-box helper used by rotated instances.
// glam::Mat4 already provides transform_point3(), transform_vector3() and inverse().

use crate::Aabb;
use glam::Mat4;

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let corners = aabb.corners();

        let first = self.transform_point3(corners[0]);
        let (min, max) = corners[1..]
            .iter()
            .map(|&corner| self.transform_point3(corner))
            .fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));

        Aabb::from_points(min, max)
    }
}
