//! Gilbert-Johnson-Keerthi distance and overlap queries on the Minkowski
//! difference of two convex shapes.

use tracing::warn;

use crate::common::PhysicsConfig;
use crate::math::Vec2;

/// A point of the Minkowski difference together with the two witness points
/// it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SupportPoint {
    /// Witness on shape A.
    pub a: Vec2,
    /// Witness on shape B.
    pub b: Vec2,
    /// `a - b`.
    pub pt: Vec2,
}

impl SupportPoint {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b, pt: a - b }
    }
}

/// Support mapping of a Minkowski difference.
pub trait Support {
    /// Returns the point of `A - B` furthest along `dir` (world space).
    fn support(&self, dir: Vec2) -> SupportPoint;
}

impl<F> Support for F
where
    F: Fn(Vec2) -> SupportPoint,
{
    fn support(&self, dir: Vec2) -> SupportPoint {
        self(dir)
    }
}

/// Up to three support points, oldest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simplex {
    points: [SupportPoint; 3],
    len: usize,
}

impl Simplex {
    fn push(&mut self, point: SupportPoint) {
        debug_assert!(self.len < 3);
        self.points[self.len] = point;
        self.len += 1;
    }

    fn remove(&mut self, index: usize) {
        for i in index..self.len - 1 {
            self.points[i] = self.points[i + 1];
        }
        self.len -= 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn points(&self) -> &[SupportPoint] {
        &self.points[..self.len]
    }
}

/// Closest points between the two shapes, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoints {
    pub a: Vec2,
    pub b: Vec2,
}

#[derive(Debug, Clone, Copy)]
pub struct GjkResult {
    pub overlap: bool,
    /// Separation between the shapes, set when distance refinement converged.
    pub distance: Option<f64>,
    pub closest: Option<ClosestPoints>,
    pub simplex: Simplex,
    pub iterations: usize,
    /// The run was cut off; nothing else in the result is meaningful.
    pub max_iterations_reached: bool,
}

/// Next search direction for a line simplex: from the nearer endpoint toward
/// the origin, or perpendicular to the segment when the origin projects onto it.
///
/// `a` is the newer point. A segment collapsed to a point heads straight for
/// the origin.
pub fn next_search_direction(a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    if ab.is_zero() {
        -a
    } else if ab.dot(b) < 0.0 {
        -b
    } else if ab.dot(a) > 0.0 {
        -a
    } else if a.cross(ab) > 0.0 {
        ab.perpendicular()
    } else {
        -ab.perpendicular()
    }
}

/// Perpendicular of `edge` pointing away from `away`.
fn outward_normal(edge: Vec2, away: Vec2) -> Vec2 {
    let n = edge.perpendicular();
    if n.dot(away) > 0.0 {
        -n
    } else {
        n
    }
}

/// Witness points recovered from the two points the final simplex kept.
///
/// Both points are interpolated at the spot on the kept segment nearest the
/// origin. That also covers a two-point simplex whose segment passes through
/// the origin, where the witnesses coincide in the Minkowski difference.
pub fn closest_points(simplex: &Simplex) -> ClosestPoints {
    let points = simplex.points();
    if points.len() < 2 {
        let only = points.first().copied().unwrap_or_default();
        return ClosestPoints {
            a: only.a,
            b: only.b,
        };
    }
    // A third point is the rejected candidate from the final iteration.
    let last = points[1];
    let prev = points[0];
    let l = prev.pt - last.pt;
    if l.is_zero() {
        return ClosestPoints {
            a: last.a,
            b: last.b,
        };
    }
    let lambda_b = -l.dot(last.pt) / l.magnitude_squared();
    let lambda_a = 1.0 - lambda_b;
    if lambda_a <= 0.0 {
        ClosestPoints {
            a: prev.a,
            b: prev.b,
        }
    } else if lambda_b <= 0.0 {
        ClosestPoints {
            a: last.a,
            b: last.b,
        }
    } else {
        ClosestPoints {
            a: last.a * lambda_a + prev.a * lambda_b,
            b: last.b * lambda_a + prev.b * lambda_b,
        }
    }
}

/// Runs GJK on the Minkowski difference described by `support`.
///
/// `seed` is the first search direction (any non-zero vector; zero falls back
/// to +x). With `overlap_only` the run stops as soon as separation is proven;
/// otherwise it goes on to refine the separating distance and witness points.
pub fn gjk<S: Support + ?Sized>(
    support: &S,
    seed: Vec2,
    overlap_only: bool,
    config: &PhysicsConfig,
) -> GjkResult {
    let mut simplex = Simplex::default();
    let mut overlap = false;
    let mut no_overlap = false;
    let mut distance = None;
    let mut iterations = 0;

    let mut dir = if seed.is_zero() { Vec2::X_AXIS } else { seed };
    simplex.push(support.support(dir));
    dir = -dir;

    loop {
        iterations += 1;
        let previous = simplex.points()[simplex.len() - 1].pt;
        let added = support.support(dir);
        simplex.push(added);
        let last = added.pt;

        if last.is_zero() {
            overlap = true;
            break;
        }

        // A point that fails to pass the origin bounds the difference away from it.
        if !no_overlap && last.dot(dir) <= 0.0 {
            if overlap_only {
                break;
            }
            no_overlap = true;
        }

        if simplex.len() == 2 {
            dir = next_search_direction(last, previous);
        } else if no_overlap {
            dir = dir.normalize();
            let reach = previous.dot(dir);
            if (reach - last.dot(dir)).abs() < config.gjk_accuracy {
                distance = Some(-reach);
                break;
            }
            // Keep the two points nearest the origin; `last` is one of them.
            if previous.magnitude_squared() < simplex.points()[0].pt.magnitude_squared() {
                simplex.remove(0);
            } else {
                simplex.remove(1);
            }
            dir = next_search_direction(simplex.points()[1].pt, simplex.points()[0].pt);
        } else {
            let ab = previous - last;
            let ac = simplex.points()[0].pt - last;
            let ao = -last;
            if ab.cross(ao) * ab.cross(ac) < 0.0 {
                // Origin beyond edge AB: C is useless.
                simplex.remove(0);
                dir = outward_normal(ab, ac);
            } else if ac.cross(ao) * ac.cross(ab) < 0.0 {
                // Origin beyond edge AC: B is useless.
                simplex.remove(1);
                dir = outward_normal(ac, ab);
            } else {
                overlap = true;
                break;
            }
        }

        if dir.is_zero() {
            // The origin lies on the current segment.
            if no_overlap {
                distance = Some(0.0);
            } else {
                overlap = true;
            }
            break;
        }

        if iterations >= config.gjk_max_iterations {
            warn!(iterations, "GJK iteration cap reached");
            return GjkResult {
                overlap: false,
                distance: None,
                closest: None,
                simplex,
                iterations,
                max_iterations_reached: true,
            };
        }
    }

    GjkResult {
        overlap,
        distance,
        closest: distance.map(|_| closest_points(&simplex)),
        simplex,
        iterations,
        max_iterations_reached: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-9;

    fn square(center: Vec2, half: f64) -> Vec<Vec2> {
        vec![
            center + Vec2::new(-half, -half),
            center + Vec2::new(half, -half),
            center + Vec2::new(half, half),
            center + Vec2::new(-half, half),
        ]
    }

    fn farthest(points: &[Vec2], dir: Vec2) -> Vec2 {
        let mut best = points[0];
        for p in points {
            if p.dot(dir) > best.dot(dir) {
                best = *p;
            }
        }
        best
    }

    fn polygons(a: Vec<Vec2>, b: Vec<Vec2>) -> impl Fn(Vec2) -> SupportPoint {
        move |dir: Vec2| SupportPoint::new(farthest(&a, dir), farthest(&b, -dir))
    }

    fn circles(ca: Vec2, ra: f64, cb: Vec2, rb: f64) -> impl Fn(Vec2) -> SupportPoint {
        move |dir: Vec2| {
            let n = dir.normalize();
            SupportPoint::new(ca + n * ra, cb - n * rb)
        }
    }

    #[test]
    fn test_overlapping_squares() {
        let support = polygons(square(Vec2::ZERO, 1.0), square(Vec2::new(1.5, 0.5), 1.0));
        let result = gjk(&support, Vec2::new(-1.5, -0.5), true, &PhysicsConfig::default());
        assert!(result.overlap);
        assert!(!result.max_iterations_reached);
    }

    #[test]
    fn test_separated_squares_overlap_only() {
        let support = polygons(square(Vec2::ZERO, 1.0), square(Vec2::new(3.0, 0.0), 1.0));
        let result = gjk(&support, Vec2::new(-3.0, 0.0), true, &PhysicsConfig::default());
        assert!(!result.overlap);
        assert!(result.distance.is_none());
    }

    #[test]
    fn test_separated_squares_distance() {
        let support = polygons(square(Vec2::ZERO, 1.0), square(Vec2::new(3.0, 0.5), 1.0));
        let result = gjk(&support, Vec2::new(-3.0, -0.5), false, &PhysicsConfig::default());
        assert!(!result.overlap);
        let distance = result.distance.expect("distance converges");
        assert!((distance - 1.0).abs() < EPSILON);
        let closest = result.closest.expect("closest points");
        assert!((closest.b.x - closest.a.x - 1.0).abs() < EPSILON);
        assert!((closest.a.x - 1.0).abs() < EPSILON);
        assert!(closest.a.y >= -0.5 - EPSILON && closest.a.y <= 1.0 + EPSILON);
    }

    #[test]
    fn test_separated_circles_distance() {
        let support = circles(Vec2::ZERO, 1.0, Vec2::new(3.0, 4.0), 1.0);
        let result = gjk(&support, Vec2::new(-3.0, -4.0), false, &PhysicsConfig::default());
        // Centers 5 apart, radii sum 2.
        let distance = result.distance.expect("distance converges");
        assert!((distance - 3.0).abs() < 1e-2);
        let closest = result.closest.expect("closest points");
        assert!((closest.a.magnitude() - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_deep_overlap_terminates() {
        let support = polygons(square(Vec2::ZERO, 2.0), square(Vec2::ZERO, 1.0));
        let config = PhysicsConfig::default();
        let result = gjk(&support, Vec2::ZERO, true, &config);
        assert!(result.overlap);
        assert!(result.iterations <= config.gjk_max_iterations);
    }

    #[test]
    fn test_iteration_cap_is_reported() {
        let support = circles(Vec2::ZERO, 1.0, Vec2::new(3.0, 4.0), 1.0);
        let config = PhysicsConfig::default().with_gjk_max_iterations(1);
        let result = gjk(&support, Vec2::new(-3.0, -4.0), false, &config);
        assert!(result.max_iterations_reached);
        assert!(!result.overlap);
        assert!(result.distance.is_none());
    }

    #[test]
    fn test_next_search_direction_regions() {
        // Origin projects inside the segment: perpendicular toward the origin.
        let dir = next_search_direction(Vec2::new(-1.0, 1.0), Vec2::new(1.0, 1.0));
        assert!(dir.x.abs() < EPSILON && dir.y < 0.0);
        // Origin beyond endpoint b: head straight from b to the origin.
        let dir = next_search_direction(Vec2::new(3.0, 1.0), Vec2::new(2.0, 1.0));
        assert_eq!(dir, Vec2::new(-2.0, -1.0));
        let dir = next_search_direction(Vec2::new(0.0, 2.0), Vec2::new(0.0, 2.0));
        assert_eq!(dir, Vec2::new(0.0, -2.0));
    }

    #[test]
    fn test_point_shapes_distance() {
        let support = |_: Vec2| SupportPoint::new(Vec2::new(1.0, 1.0), Vec2::new(4.0, 5.0));
        let result = gjk(&support, Vec2::new(-3.0, -4.0), false, &PhysicsConfig::default());
        assert!(!result.overlap);
        let distance = result.distance.expect("distance converges");
        assert!((distance - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_closest_points_degenerate_segment() {
        let mut simplex = Simplex::default();
        let p = SupportPoint::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0));
        simplex.push(p);
        simplex.push(p);
        simplex.push(SupportPoint::new(Vec2::new(5.0, 5.0), Vec2::ZERO));
        let closest = closest_points(&simplex);
        assert_eq!(closest.a, p.a);
        assert_eq!(closest.b, p.b);
    }

    #[test]
    fn test_closest_points_segment_through_origin() {
        let mut simplex = Simplex::default();
        simplex.push(SupportPoint::new(Vec2::new(-1.0, 1.0), Vec2::new(0.0, 1.0)));
        simplex.push(SupportPoint::new(Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)));
        let closest = closest_points(&simplex);
        assert!(closest.a.x.abs() < EPSILON);
        assert!((closest.a.y - 1.0).abs() < EPSILON);
        assert!(closest.a.distance(closest.b) < EPSILON);
    }
}
