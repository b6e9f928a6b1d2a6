#![warn(missing_docs)]

//! Math types for zflat.
//!
//! Thin wrappers around nalgebra: points, displacement vectors, the affine
//! [`Transform`] that places an instance in its parent frame, and the
//! [`Tolerance`] used to classify directions against the vertical axis.

use nalgebra::{Matrix4, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector (displacement or direction) in 3D space.
pub type Vec3 = Vector3<f64>;

/// A 4x4 affine transformation matrix mapping a local frame into its parent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix (column vectors, translation in the last column).
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform (the root frame).
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Build from a column-major array of 16 values.
    pub fn from_column_slice(values: &[f64; 16]) -> Self {
        Self {
            matrix: Matrix4::from_column_slice(values),
        }
    }

    /// Column-major copy of the matrix.
    pub fn to_column_array(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.matrix.as_slice());
        out
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Translation by a displacement vector.
    pub fn translation_by(v: &Vec3) -> Self {
        Self::translation(v.x, v.y, v.z)
    }

    /// Non-uniform scale by `(sx, sy, sz)`.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        Self { matrix: m }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Composition `self ∘ inner`: the result applies `inner` first, then `self`.
    ///
    /// A child's world transform is `parent_world.compose(&child_local)`.
    pub fn compose(&self, inner: &Transform) -> Self {
        Self {
            matrix: self.matrix * inner.matrix,
        }
    }

    /// Transform a point (translation applies).
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a vector (translation ignored).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// Express a world-space transform in this transform's local frame.
    ///
    /// Returns `self⁻¹ ∘ world ∘ self`, or `None` when `self` is singular.
    pub fn conjugate(&self, world: &Transform) -> Option<Self> {
        let inv = self.inverse()?;
        Some(inv.compose(world).compose(self))
    }

    /// True if every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|v| v.is_finite())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in model units.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances (1e-6 linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// True if `v` is parallel (or anti-parallel) to the Z axis.
    ///
    /// Zero-length vectors have no direction and are never vertical.
    pub fn is_vertical(&self, v: &Vec3) -> bool {
        let len = v.norm();
        if len < self.linear {
            return false;
        }
        v.x.hypot(v.y) / len < self.angular
    }

    /// True if `v` lies in a horizontal plane (no Z component).
    pub fn is_horizontal(&self, v: &Vec3) -> bool {
        let len = v.norm();
        if len < self.linear {
            return false;
        }
        v.z.abs() / len < self.angular
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
