use crate::Vec3;

/// Orthonormal basis built around a single axis.
///
/// `w` is the given axis; `u` and `v` complete a right-handed frame. Used to
/// map directions sampled around +Z onto a surface normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Onb {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Onb {
    pub fn new(n: Vec3) -> Self {
        let w = n.normalize();
        let a = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let v = w.cross(a).normalize();
        let u = w.cross(v);
        Self { u, v, w }
    }

    /// Express a local-frame vector in world coordinates.
    #[inline]
    pub fn transform(&self, local: Vec3) -> Vec3 {
        local.x * self.u + local.y * self.v + local.z * self.w
    }
}
