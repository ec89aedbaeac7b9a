//! Geometric transforms over positions.

use core::fmt;
use std::sync::Arc;

use crate::pos::Vec3;

/// A pure, composable mapping from one point to another.
pub trait Transform: fmt::Debug + Send + Sync {
    fn is_identity(&self) -> bool;

    fn apply(&self, point: Vec3) -> Vec3;

    fn inverse(&self) -> Arc<dyn Transform>;

    /// The affine matrix form, when there is one.
    fn as_affine(&self) -> Option<AffineTransform> {
        None
    }
}

/// Helpers for combining shared transforms.
pub struct Transforms;

impl Transforms {
    #[must_use]
    pub fn identity() -> Arc<dyn Transform> {
        Arc::new(Identity)
    }

    /// A transform that applies `first`, then `then`.
    ///
    /// Identities are dropped and affine pairs collapse into one matrix.
    #[must_use]
    pub fn combine(first: &Arc<dyn Transform>, then: &Arc<dyn Transform>) -> Arc<dyn Transform> {
        if first.is_identity() {
            return Arc::clone(then);
        }
        if then.is_identity() {
            return Arc::clone(first);
        }
        match (first.as_affine(), then.as_affine()) {
            (Some(a), Some(b)) => Arc::new(b.concatenate(&a)),
            _ => Arc::new(CombinedTransform::new(vec![
                Arc::clone(first),
                Arc::clone(then),
            ])),
        }
    }

    /// Apply the transform to every component of the direction of `vector`,
    /// ignoring any translation.
    #[must_use]
    pub fn apply_direction(transform: &dyn Transform, vector: Vec3) -> Vec3 {
        transform.apply(vector) - transform.apply(Vec3::ZERO)
    }
}

/// Leaves every point where it is.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Transform for Identity {
    fn is_identity(&self) -> bool {
        true
    }

    fn apply(&self, point: Vec3) -> Vec3 {
        point
    }

    fn inverse(&self) -> Arc<dyn Transform> {
        Arc::new(Self)
    }

    fn as_affine(&self) -> Option<AffineTransform> {
        Some(AffineTransform::IDENTITY)
    }
}

/// A sequence of transforms applied in order.
#[derive(Debug, Clone)]
pub struct CombinedTransform {
    transforms: Vec<Arc<dyn Transform>>,
}

impl CombinedTransform {
    #[must_use]
    pub fn new(transforms: Vec<Arc<dyn Transform>>) -> Self {
        Self { transforms }
    }
}

impl Transform for CombinedTransform {
    fn is_identity(&self) -> bool {
        self.transforms.iter().all(|t| t.is_identity())
    }

    fn apply(&self, point: Vec3) -> Vec3 {
        self.transforms.iter().fold(point, |p, t| t.apply(p))
    }

    fn inverse(&self) -> Arc<dyn Transform> {
        Arc::new(Self::new(
            self.transforms.iter().rev().map(|t| t.inverse()).collect(),
        ))
    }
}

/// A 3x4 affine matrix (rotation/scale in the left 3x3, translation in the last column).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineTransform {
    m: [[f64; 4]; 3],
}

/// Cosine that is exact at multiples of 90 degrees.
fn exact_cos(degrees: f64) -> f64 {
    match degrees.rem_euclid(360.0) {
        0.0 => 1.0,
        90.0 | 270.0 => 0.0,
        180.0 => -1.0,
        _ => degrees.to_radians().cos(),
    }
}

/// Sine that is exact at multiples of 90 degrees.
fn exact_sin(degrees: f64) -> f64 {
    match degrees.rem_euclid(360.0) {
        0.0 | 180.0 => 0.0,
        90.0 => 1.0,
        270.0 => -1.0,
        _ => degrees.to_radians().sin(),
    }
}

impl AffineTransform {
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ],
    };

    #[must_use]
    pub const fn new() -> Self {
        Self::IDENTITY
    }

    #[must_use]
    pub fn translate(self, offset: Vec3) -> Self {
        self.then(Self {
            m: [
                [1.0, 0.0, 0.0, offset.x],
                [0.0, 1.0, 0.0, offset.y],
                [0.0, 0.0, 1.0, offset.z],
            ],
        })
    }

    #[must_use]
    pub fn scale(self, factor: Vec3) -> Self {
        self.then(Self {
            m: [
                [factor.x, 0.0, 0.0, 0.0],
                [0.0, factor.y, 0.0, 0.0],
                [0.0, 0.0, factor.z, 0.0],
            ],
        })
    }

    #[must_use]
    pub fn rotate_x(self, degrees: f64) -> Self {
        let (c, s) = (exact_cos(degrees), exact_sin(degrees));
        self.then(Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, -s, 0.0],
                [0.0, s, c, 0.0],
            ],
        })
    }

    #[must_use]
    pub fn rotate_y(self, degrees: f64) -> Self {
        let (c, s) = (exact_cos(degrees), exact_sin(degrees));
        self.then(Self {
            m: [
                [c, 0.0, s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [-s, 0.0, c, 0.0],
            ],
        })
    }

    #[must_use]
    pub fn rotate_z(self, degrees: f64) -> Self {
        let (c, s) = (exact_cos(degrees), exact_sin(degrees));
        self.then(Self {
            m: [
                [c, -s, 0.0, 0.0],
                [s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
        })
    }

    /// `self · that`: the result applies `that` first, then `self`.
    #[must_use]
    pub fn concatenate(&self, that: &Self) -> Self {
        let a = &self.m;
        let b = &that.m;
        let mut m = [[0.0; 4]; 3];
        for (row, out) in m.iter_mut().enumerate() {
            for col in 0..4 {
                let mut sum = a[row][0] * b[0][col] + a[row][1] * b[1][col] + a[row][2] * b[2][col];
                if col == 3 {
                    sum += a[row][3];
                }
                out[col] = sum;
            }
        }
        Self { m }
    }

    /// The result applies `self` first, then `next`.
    #[must_use]
    pub fn then(self, next: Self) -> Self {
        next.concatenate(&self)
    }

    #[must_use]
    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// The inverse matrix, or `None` when the transform is singular.
    #[must_use]
    pub fn try_inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON {
            return None;
        }
        let m = &self.m;
        let mut inv = [[0.0; 4]; 3];
        inv[0][0] = (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det;
        inv[0][1] = (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det;
        inv[0][2] = (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det;
        inv[1][0] = (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det;
        inv[1][1] = (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det;
        inv[1][2] = (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det;
        inv[2][0] = (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det;
        inv[2][1] = (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det;
        inv[2][2] = (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det;
        for row in 0..3 {
            inv[row][3] = -(inv[row][0] * m[0][3] + inv[row][1] * m[1][3] + inv[row][2] * m[2][3]);
        }
        Some(Self { m: inv })
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform for AffineTransform {
    fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    fn apply(&self, p: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3],
            m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3],
            m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3],
        )
    }

    /// Singular transforms have no inverse; they map back to themselves.
    fn inverse(&self) -> Arc<dyn Transform> {
        match self.try_inverse() {
            Some(inverse) => Arc::new(inverse),
            None => {
                tracing::warn!(transform = ?self, "inverting a singular transform");
                Arc::new(*self)
            }
        }
    }

    fn as_affine(&self) -> Option<AffineTransform> {
        Some(*self)
    }
}
