use std::f64::consts::PI;

use crate::collision::Aabb;
use crate::error::{PhysicsError, PhysicsResult};
use crate::math::vec2::Vec2;

const TOLERANCE: f64 = 1e-10;

/// Represents a convex polygon shape defined by its vertices in local space.
///
/// Vertices are stored counter-clockwise and centered on the centroid, so the
/// local origin is the center of mass for uniform density.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Vec2>,
}

impl Polygon {
    /// Creates a new convex polygon from a vertex loop in either winding.
    ///
    /// The vertices are reordered counter-clockwise and shifted so that the
    /// centroid sits at the origin.
    pub fn new(vertices: Vec<Vec2>) -> PhysicsResult<Self> {
        if vertices.len() < 3 {
            return Err(PhysicsError::TooFewVertices {
                count: vertices.len(),
            });
        }
        let mut polygon = Polygon { vertices };
        if polygon.signed_area() < 0.0 {
            polygon.vertices.reverse();
        }
        if !polygon.is_convex() {
            return Err(PhysicsError::NonConvexPolygon);
        }
        let centroid = polygon.calculate_centroid();
        for v in &mut polygon.vertices {
            *v -= centroid;
        }
        Ok(polygon)
    }

    /// Axis-aligned rectangle of the given full width and height.
    pub fn rectangle(width: f64, height: f64) -> PhysicsResult<Self> {
        let (hw, hh) = (width * 0.5, height * 0.5);
        Self::new(vec![
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ])
    }

    fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        let mut area = 0.0;
        for i in 0..n {
            area += self.vertices[i].cross(self.vertices[(i + 1) % n]);
        }
        area / 2.0
    }

    /// A counter-clockwise loop is convex when it never turns right and its
    /// turning angles add up to one full revolution (rules out star shapes).
    fn is_convex(&self) -> bool {
        let n = self.vertices.len();
        if self.signed_area() <= TOLERANCE {
            return false;
        }
        let mut total_turn = 0.0;
        for i in 0..n {
            let e1 = self.vertices[(i + 1) % n] - self.vertices[i];
            let e2 = self.vertices[(i + 2) % n] - self.vertices[(i + 1) % n];
            if e1.is_zero() || e2.is_zero() {
                return false;
            }
            let cross = e1.cross(e2);
            if cross < -TOLERANCE * e1.magnitude() * e2.magnitude() {
                return false;
            }
            total_turn += cross.atan2(e1.dot(e2));
        }
        (total_turn - 2.0 * PI).abs() < 1e-6
    }

    /// Calculates the area of the polygon using the Shoelace formula.
    pub fn calculate_area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Calculates the centroid (center of mass for uniform density) of the polygon.
    pub fn calculate_centroid(&self) -> Vec2 {
        let n = self.vertices.len();
        let mut centroid = Vec2::ZERO;
        let mut signed_area_sum = 0.0;
        let origin = self.vertices[0];

        for i in 1..(n - 1) {
            let v2 = self.vertices[i];
            let v3 = self.vertices[i + 1];
            let triangle_signed_area = (v2 - origin).cross(v3 - origin) / 2.0;
            signed_area_sum += triangle_signed_area;
            centroid += (origin + v2 + v3) / 3.0 * triangle_signed_area;
        }

        if signed_area_sum.abs() < TOLERANCE {
            let sum = self.vertices.iter().fold(Vec2::ZERO, |acc, v| acc + *v);
            sum / n as f64
        } else {
            centroid / signed_area_sum
        }
    }

    /// Moment of inertia (density = 1) about the local origin.
    fn calculate_inertia_about_origin(&self) -> f64 {
        let n = self.vertices.len();
        let mut inertia_sum = 0.0;
        for i in 0..n {
            let v1 = self.vertices[i];
            let v2 = self.vertices[(i + 1) % n];
            inertia_sum += v1.cross(v2) * (v1.magnitude_squared() + v1.dot(v2) + v2.magnitude_squared());
        }
        inertia_sum / 12.0
    }

    /// Moment of inertia about the centroid for a body of total `mass`.
    pub fn calculate_inertia(&self, mass: f64) -> f64 {
        let area = self.calculate_area();
        if area < TOLERANCE {
            return 0.0;
        }
        let density = mass / area;
        let inertia_origin = self.calculate_inertia_about_origin() * density;
        // Parallel axis theorem back to the centroid.
        let d_squared = self.calculate_centroid().magnitude_squared();
        (inertia_origin - mass * d_squared).max(0.0)
    }

    /// Bounding box of the polygon rotated by `angle` about its origin.
    pub fn local_aabb(&self, angle: f64) -> Aabb {
        let (cos_a, sin_a) = (angle.cos(), angle.sin());
        let rotated: Vec<Vec2> = self
            .vertices
            .iter()
            .map(|v| v.rotate_cs(cos_a, sin_a))
            .collect();
        Aabb::from_points(&rotated).unwrap_or_else(|| Aabb::point(Vec2::ZERO))
    }

    fn farthest_vertex(&self, dir: Vec2) -> usize {
        let mut best = 0;
        let mut best_dot = f64::NEG_INFINITY;
        for (i, v) in self.vertices.iter().enumerate() {
            let d = v.dot(dir);
            if d > best_dot {
                best_dot = d;
                best = i;
            }
        }
        best
    }

    /// Vertex farthest along `dir`.
    pub fn farthest_hull_point(&self, dir: Vec2) -> Vec2 {
        self.vertices[self.farthest_vertex(dir)]
    }

    /// Smallest distance from the centroid to an edge line.
    ///
    /// The inset polygon stays a proper shape around the centroid for margins
    /// up to this value, so core queries never inset further.
    pub fn inradius(&self) -> f64 {
        let n = self.vertices.len();
        let mut nearest = f64::INFINITY;
        for i in 0..n {
            let v = self.vertices[i];
            let inward = (self.vertices[(i + 1) % n] - v).normalize().perpendicular();
            nearest = nearest.min(-v.dot(inward));
        }
        nearest.max(0.0)
    }

    /// Vertex `idx` moved inward so it sits `margin` from both adjacent edges.
    fn inset_vertex(&self, idx: usize, margin: f64) -> Vec2 {
        let n = self.vertices.len();
        let v = self.vertices[idx];
        let prev = self.vertices[(idx + n - 1) % n];
        let next = self.vertices[(idx + 1) % n];
        // Inward normals of a counter-clockwise loop are the left perpendiculars.
        let n1 = (v - prev).normalize().perpendicular();
        let n2 = (next - v).normalize().perpendicular();
        let denom = 1.0 + n1.dot(n2);
        if denom < TOLERANCE {
            return v + (n1 + n2).normalize() * margin;
        }
        v + (n1 + n2) * (margin / denom)
    }

    /// Point of the polygon inset by `margin` that is farthest along `dir`.
    ///
    /// The core is the convex hull of the inset vertices, and the margin is
    /// clamped to [`Polygon::inradius`] so the core never turns inside out.
    pub fn farthest_core_point(&self, dir: Vec2, margin: f64) -> Vec2 {
        let margin = margin.clamp(0.0, self.inradius());
        if margin == 0.0 {
            return self.farthest_hull_point(dir);
        }
        let mut best = Vec2::ZERO;
        let mut best_dot = f64::NEG_INFINITY;
        for idx in 0..self.vertices.len() {
            let p = self.inset_vertex(idx, margin);
            let d = p.dot(dir);
            if d > best_dot {
                best_dot = d;
                best = p;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn unit_square() -> Vec<Vec2> {
        vec![
            Vec2::new(-0.5, -0.5),
            Vec2::new(0.5, -0.5),
            Vec2::new(0.5, 0.5),
            Vec2::new(-0.5, 0.5),
        ]
    }

    #[test]
    fn test_polygon_new() {
        let vertices = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let polygon = Polygon::new(vertices).unwrap();
        assert_eq!(polygon.vertices.len(), 3);
    }

    #[test]
    fn test_polygon_new_too_few_vertices() {
        let vertices = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)];
        assert_eq!(
            Polygon::new(vertices),
            Err(PhysicsError::TooFewVertices { count: 2 })
        );
    }

    #[test]
    fn test_polygon_rejects_concave_and_star() {
        let dart = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(0.5, 1.0),
        ];
        assert_eq!(Polygon::new(dart), Err(PhysicsError::NonConvexPolygon));

        let star: Vec<Vec2> = (0..5)
            .map(|i| Vec2::new(1.0, 0.0).rotate(i as f64 * 4.0 * PI / 5.0))
            .collect();
        assert_eq!(Polygon::new(star), Err(PhysicsError::NonConvexPolygon));

        let collinear = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)];
        assert!(Polygon::new(collinear).is_err());
    }

    #[test]
    fn test_polygon_clockwise_input_is_reordered() {
        let mut vertices = unit_square();
        vertices.reverse();
        let polygon = Polygon::new(vertices).unwrap();
        assert!(polygon.signed_area() > 0.0);
    }

    #[test]
    fn test_polygon_area_square() {
        let polygon = Polygon::new(unit_square()).unwrap();
        assert!((polygon.calculate_area() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_polygon_area_triangle() {
        let vertices = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let polygon = Polygon::new(vertices).unwrap();
        assert!((polygon.calculate_area() - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_polygon_is_recentered_on_centroid() {
        // Unit square offset from origin
        let offset = Vec2::new(10.0, -5.0);
        let vertices = unit_square().into_iter().map(|v| v + offset).collect();
        let polygon = Polygon::new(vertices).unwrap();
        let centroid = polygon.calculate_centroid();
        assert!(centroid.x.abs() < EPSILON);
        assert!(centroid.y.abs() < EPSILON);
        assert!((polygon.vertices[0].x + 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_polygon_centroid_triangle() {
        let vertices = vec![Vec2::new(0.0, 0.0), Vec2::new(3.0, 0.0), Vec2::new(0.0, 3.0)];
        // Centroid of triangle is (v1+v2+v3)/3 = (1, 1), moved to the origin.
        let polygon = Polygon::new(vertices).unwrap();
        assert!((polygon.vertices[0].x + 1.0).abs() < EPSILON);
        assert!((polygon.vertices[0].y + 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_polygon_inertia_square() {
        let polygon = Polygon::new(unit_square()).unwrap();
        let mass = 2.0;
        // Inertia of rectangle (w=1, h=1) about centroid = mass * (w^2 + h^2) / 12
        let expected_inertia = mass * (1.0f64.powi(2) + 1.0f64.powi(2)) / 12.0;
        assert!((polygon.calculate_inertia(mass) - expected_inertia).abs() < EPSILON);
        assert!((polygon.calculate_inertia(mass) - (1.0 / 3.0)).abs() < EPSILON);
    }

    #[test]
    fn test_polygon_rectangle_aabb_rotated() {
        let polygon = Polygon::rectangle(4.0, 2.0).unwrap();
        let aabb = polygon.local_aabb(PI / 2.0);
        assert!((aabb.half_width() - 1.0).abs() < EPSILON);
        assert!((aabb.half_height() - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_polygon_support_points() {
        let polygon = Polygon::new(unit_square()).unwrap();
        let hull = polygon.farthest_hull_point(Vec2::new(1.0, 0.9));
        assert_eq!(hull, Vec2::new(0.5, 0.5));
        // Inset square corner sits `margin` inside both edges.
        let core = polygon.farthest_core_point(Vec2::new(1.0, 0.9), 0.1);
        assert!((core.x - 0.4).abs() < EPSILON);
        assert!((core.y - 0.4).abs() < EPSILON);
    }

    #[test]
    fn test_polygon_inradius() {
        let square = Polygon::new(unit_square()).unwrap();
        assert!((square.inradius() - 0.5).abs() < EPSILON);
        let rectangle = Polygon::rectangle(2.0, 1.0).unwrap();
        assert!((rectangle.inradius() - 0.5).abs() < EPSILON);
        // Right triangle with legs 3: the centroid (1, 1) is nearest the hypotenuse.
        let vertices = vec![Vec2::new(0.0, 0.0), Vec2::new(3.0, 0.0), Vec2::new(0.0, 3.0)];
        let triangle = Polygon::new(vertices).unwrap();
        assert!((triangle.inradius() - 1.0 / 2f64.sqrt()).abs() < EPSILON);
    }

    #[test]
    fn test_core_margin_is_clamped_to_inradius() {
        let square = Polygon::new(unit_square()).unwrap();
        let core = square.farthest_core_point(Vec2::new(1.0, 0.9), 5.0);
        assert!(core.magnitude() < EPSILON);

        // A 2x1 rectangle collapses onto its long axis instead of turning inside out.
        let rectangle = Polygon::rectangle(2.0, 1.0).unwrap();
        let core = rectangle.farthest_core_point(Vec2::new(1.0, 1.0), 0.8);
        assert!((core.x - 0.5).abs() < EPSILON);
        assert!(core.y.abs() < EPSILON);
        let core = rectangle.farthest_core_point(Vec2::new(-1.0, -1.0), 0.8);
        assert!((core.x + 0.5).abs() < EPSILON);
    }
}
