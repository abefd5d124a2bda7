use super::vec2::Vec2;

/// A 2D rigid transform: rotation about `origin` followed by translation.
///
/// Forward application maps shape-local coordinates into world space:
/// `p' = R(p - origin) + origin + translation`. The sine and cosine of the
/// angle are computed once at construction so hot loops only multiply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec2,
    pub origin: Vec2,
    angle: f64,
    cos: f64,
    sin: f64,
}

impl Transform {
    /// Creates a new transform rotating about the local origin.
    pub fn new(translation: Vec2, angle: f64) -> Self {
        Self {
            translation,
            origin: Vec2::ZERO,
            angle,
            cos: angle.cos(),
            sin: angle.sin(),
        }
    }

    /// Creates an identity transform (no translation, no rotation).
    pub fn identity() -> Self {
        Self::new(Vec2::ZERO, 0.0)
    }

    /// Sets the point the rotation is performed about.
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Replaces the rotation angle, refreshing the cached sine and cosine.
    pub fn set_rotation(&mut self, angle: f64) {
        self.angle = angle;
        self.cos = angle.cos();
        self.sin = angle.sin();
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Rotates a direction vector without translating it.
    #[inline]
    pub fn rotate(&self, v: Vec2) -> Vec2 {
        v.rotate_cs(self.cos, self.sin)
    }

    /// Inverse of [`Transform::rotate`].
    #[inline]
    pub fn rotate_inverse(&self, v: Vec2) -> Vec2 {
        v.rotate_cs(self.cos, -self.sin)
    }

    /// Applies the transform (rotation about origin, then translation) to a point.
    pub fn apply(&self, point: Vec2) -> Vec2 {
        self.rotate(point - self.origin) + self.origin + self.translation
    }

    /// Applies the inverse transform (inverse translation then inverse rotation) to a point.
    pub fn apply_inverse(&self, point: Vec2) -> Vec2 {
        self.rotate_inverse(point - self.translation - self.origin) + self.origin
    }

    /// Returns the transform equivalent to applying `inner` first, then `self`.
    pub fn compose(&self, inner: &Transform) -> Transform {
        // inner(p) = R_i p + c_i with c_i = o_i - R_i o_i + t_i
        let inner_offset = inner.apply(Vec2::ZERO);
        Transform::new(self.apply(inner_offset), self.angle + inner.angle)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
