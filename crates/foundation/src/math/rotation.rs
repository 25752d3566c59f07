use serde::{Deserialize, Serialize};

use super::Vec3;

/// Unit quaternion `[x, y, z, w]` describing a rotation in viewer space.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn normalize(self) -> Self {
        let n = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if n > 1e-10 {
            Self::new(self.x / n, self.y / n, self.z / n, self.w / n)
        } else {
            Self::IDENTITY
        }
    }

    /// Rotation that maps unit vector `from` onto unit vector `to`.
    pub fn from_unit_vectors(from: Vec3, to: Vec3) -> Self {
        let dot = from.dot(to).clamp(-1.0, 1.0);

        // Nearly opposite vectors: pick arbitrary orthogonal axis.
        if dot < -0.999999 {
            let mut axis = Vec3::new(1.0, 0.0, 0.0).cross(from);
            if axis.dot(axis) < 1e-12 {
                axis = Vec3::UP.cross(from);
            }
            let axis = axis.normalize().unwrap_or(Vec3::new(0.0, 0.0, 1.0));
            return Self::new(axis.x, axis.y, axis.z, 0.0);
        }

        if dot > 0.999999 {
            return Self::IDENTITY;
        }

        let axis = from.cross(to);
        Self::new(axis.x, axis.y, axis.z, 1.0 + dot).normalize()
    }

    /// Rotate `v` by this (unit) quaternion.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let t = qv.cross(v).scale(2.0);
        v + t.scale(self.w) + qv.cross(t)
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}
