use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// A 2D vector of `f64` components.
///
/// `Vec2` is a plain `Copy` value: every operation returns a new vector and
/// magnitudes are recomputed on demand, so there is no cached state that a
/// mutation could leave stale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const X_AXIS: Vec2 = Vec2 { x: 1.0, y: 0.0 };
    pub const Y_AXIS: Vec2 = Vec2 { x: 0.0, y: 1.0 };

    /// Creates a new Vec2.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the component along `axis` (0 = x, 1 = y).
    #[inline]
    pub fn axis(self, axis: usize) -> f64 {
        if axis == 0 {
            self.x
        } else {
            self.y
        }
    }

    /// Calculates the dot product of two vectors.
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Calculates the squared magnitude (length) of the vector.
    /// Useful for comparisons as it avoids a square root.
    pub fn magnitude_squared(self) -> f64 {
        self.dot(self)
    }

    /// Calculates the magnitude (length) of the vector.
    pub fn magnitude(self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Returns a normalized version of the vector (unit vector).
    /// If the magnitude is zero, it returns a zero vector.
    pub fn normalize(self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            Self::ZERO
        } else {
            self * (1.0 / mag)
        }
    }

    /// Normalizes the vector, returning `fallback` when its length is (near) zero.
    pub fn normalize_or(self, fallback: Vec2) -> Self {
        let mag = self.magnitude();
        if mag < 1e-12 {
            fallback
        } else {
            self * (1.0 / mag)
        }
    }

    /// Returns `true` when both components are exactly zero.
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Calculates the squared distance between two vector points.
    pub fn distance_squared(self, other: Self) -> f64 {
        (self - other).magnitude_squared()
    }

    /// Calculates the distance between two vector points.
    pub fn distance(self, other: Self) -> f64 {
        (self - other).magnitude()
    }

    /// Returns a vector perpendicular to this vector (90-degree counter-clockwise rotation).
    pub fn perpendicular(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Scalar projection of this vector onto `other` (`self · other / |other|`).
    pub fn project(self, other: Self) -> f64 {
        let mag = other.magnitude();
        if mag == 0.0 {
            0.0
        } else {
            self.dot(other) / mag
        }
    }

    /// Vector projection of this vector onto `other`.
    pub fn project_onto(self, other: Self) -> Self {
        let mag_sq = other.magnitude_squared();
        if mag_sq == 0.0 {
            Self::ZERO
        } else {
            other * (self.dot(other) / mag_sq)
        }
    }

    /// Rotates the vector by a given angle (in radians).
    pub fn rotate(self, angle: f64) -> Self {
        self.rotate_cs(angle.cos(), angle.sin())
    }

    /// Rotates the vector by a precomputed `(cos, sin)` pair.
    #[inline]
    pub fn rotate_cs(self, cos_a: f64, sin_a: f64) -> Self {
        Self::new(
            self.x * cos_a - self.y * sin_a,
            self.x * sin_a + self.y * cos_a,
        )
    }

    /// Rotates the vector around `pivot` by `angle`.
    pub fn rotate_about(self, pivot: Vec2, angle: f64) -> Self {
        pivot + (self - pivot).rotate(angle)
    }

    /// Computes the 2D cross product (scalar). Equivalent to z-component of 3D cross product.
    pub fn cross(&self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Angle of the vector measured from the +x axis, in `(-π, π]`.
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Angle at `self` swept from `left` to `right`, wrapped into `(-π, π]`.
    pub fn angle_between(self, left: Vec2, right: Vec2) -> f64 {
        super::wrap_angle((right - self).angle() - (left - self).angle())
    }

    /// Swaps the contents of two vectors in place.
    #[inline]
    pub fn swap(&mut self, other: &mut Vec2) {
        std::mem::swap(self, other);
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

// Vec2 * f64
impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

// f64 * Vec2
impl Mul<Vec2> for f64 {
    type Output = Vec2;

    fn mul(self, vec: Vec2) -> Vec2 {
        vec * self
    }
}

impl MulAssign<f64> for Vec2 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}
