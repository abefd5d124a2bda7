use tracing::debug;

use crate::{
    collision::{CollisionDetector, CollisionManifold, SweepAndPrune},
    common::PhysicsConfig,
    constraints::{ConstraintHandle, ConstraintSolver},
    error::{PhysicsError, PhysicsResult},
    objects::{BodyId, BodySet, RigidBody},
    response::ImpulseResolver,
};

/// Counters describing one call to [`PhysicsWorld::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepStats {
    /// Pairs whose bounding boxes overlap on both axes.
    pub candidates: usize,
    /// Pairs confirmed by the narrow phase.
    pub manifolds: usize,
    /// Manifolds that received a velocity impulse.
    pub impulses: usize,
    /// GJK runs abandoned at the iteration cap.
    pub gjk_cap_hits: usize,
    /// Pairs declined because margin refinement found no separation.
    pub margin_exhausted: usize,
}

/// Owns the bodies and runs the collision pipeline once per step:
/// broad phase, narrow phase, impulse response, then constraint relaxation.
///
/// Integration is left to the caller, who moves bodies between steps
/// through [`PhysicsWorld::bodies_mut`] or [`PhysicsWorld::body_mut`].
#[derive(Debug)]
pub struct PhysicsWorld {
    bodies: BodySet,
    broad_phase: SweepAndPrune,
    detector: CollisionDetector,
    resolver: ImpulseResolver,
    constraints: ConstraintSolver,
    config: PhysicsConfig,
    // Manifolds detected during the last step
    contacts: Vec<CollisionManifold>,
}

impl PhysicsWorld {
    /// Creates an empty world after checking the configuration.
    pub fn new(config: PhysicsConfig) -> PhysicsResult<Self> {
        config.validate()?;
        Ok(Self {
            bodies: BodySet::new(),
            broad_phase: SweepAndPrune::new(),
            detector: CollisionDetector::new(),
            resolver: ImpulseResolver::new(config),
            constraints: ConstraintSolver::new(&config),
            config,
            contacts: Vec::new(),
        })
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Adds a body and starts tracking it in the broad phase.
    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        let id = self.bodies.insert(body);
        self.broad_phase.track(id);
        id
    }

    /// Removes a body together with its broad-phase intervals, contact
    /// history and every constraint that references it.
    pub fn remove_body(&mut self, id: BodyId) -> PhysicsResult<RigidBody> {
        let body = self.bodies.remove(id).ok_or(PhysicsError::UnknownBody(id))?;
        self.broad_phase.untrack(id);
        self.detector.forget_body(id);
        let dropped = self.constraints.remove_body_constraints(id);
        self.contacts.retain(|m| m.body_a != id && m.body_b != id);
        debug!(body = %id, dropped_constraints = dropped, "body removed");
        Ok(body)
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id)
    }

    pub fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> impl Iterator<Item = (BodyId, &mut RigidBody)> {
        self.bodies.iter_mut()
    }

    /// Manifolds detected during the last step, in resolution order.
    pub fn contacts(&self) -> &[CollisionManifold] {
        &self.contacts
    }

    pub fn constraints(&self) -> &ConstraintSolver {
        &self.constraints
    }

    pub fn add_distance_constraint(
        &mut self,
        body_a: BodyId,
        body_b: BodyId,
        stiffness: Option<f64>,
        target_length: Option<f64>,
    ) -> PhysicsResult<ConstraintHandle> {
        self.constraints
            .add_distance_constraint(&self.bodies, body_a, body_b, stiffness, target_length)
    }

    pub fn add_angle_constraint(
        &mut self,
        body_a: BodyId,
        body_b: BodyId,
        body_c: BodyId,
        stiffness: Option<f64>,
        target_angle: Option<f64>,
    ) -> PhysicsResult<ConstraintHandle> {
        self.constraints
            .add_angle_constraint(&self.bodies, body_a, body_b, body_c, stiffness, target_angle)
    }

    pub fn remove_constraint(&mut self, handle: ConstraintHandle) -> bool {
        self.constraints.remove(handle)
    }

    pub fn drop_constraints(&mut self) {
        self.constraints.drop_all();
    }

    /// Runs one pass of the pipeline on the bodies' current positions.
    pub fn step(&mut self) -> StepStats {
        let candidates = self.broad_phase.update(&self.bodies);
        let candidate_count = candidates.len();
        let manifolds = self.detector.detect(&self.bodies, candidates, &self.config);

        let impulses = self.resolver.resolve(&mut self.bodies, &manifolds);
        self.constraints.solve(&mut self.bodies);

        let narrow = self.detector.stats();
        let stats = StepStats {
            candidates: candidate_count,
            manifolds: manifolds.len(),
            impulses: impulses.len(),
            gjk_cap_hits: narrow.gjk_cap_hits,
            margin_exhausted: narrow.margin_exhausted,
        };
        self.contacts = manifolds;
        debug!(?stats, "step finished");
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec2::Vec2;
    use crate::objects::Treatment;
    use crate::shapes::{Circle, Polygon, Shape};
    const EPSILON: f64 = 1e-9;

    fn default_test_shape() -> Shape {
        Shape::Circle(Circle::new(1.0).unwrap())
    }

    fn ball_at(x: f64, y: f64) -> RigidBody {
        RigidBody::new(1.0, default_test_shape())
            .unwrap()
            .with_position(Vec2::new(x, y))
    }

    #[test]
    fn test_world_new() {
        let world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        assert!(world.bodies().is_empty());
        assert!(world.constraints().is_empty());
        assert!(world.contacts().is_empty());

        let bad = PhysicsConfig::default().with_gjk_max_iterations(0);
        assert!(matches!(
            PhysicsWorld::new(bad),
            Err(PhysicsError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_add_and_remove_body() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let a = world.add_body(ball_at(0.0, 0.0));
        let b = world.add_body(ball_at(1.5, 0.0));
        let c = world.add_body(ball_at(0.0, 1.5));
        world.add_distance_constraint(a, b, None, None).unwrap();
        world.add_angle_constraint(b, a, c, None, None).unwrap();
        assert_eq!(world.constraints().len(), 2);

        world.step();
        assert!(!world.contacts().is_empty());

        let removed = world.remove_body(a).unwrap();
        assert_eq!(removed.mass, 1.0);
        assert!(world.body(a).is_none());
        assert!(world.constraints().is_empty());
        assert!(world.contacts().iter().all(|m| m.body_a != a && m.body_b != a));
        assert_eq!(world.remove_body(a).unwrap_err(), PhysicsError::UnknownBody(a));
        assert_eq!(world.bodies().len(), 2);
    }

    #[test]
    fn test_step_separates_overlapping_balls() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let a = world.add_body(ball_at(0.0, 0.0));
        let b = world.add_body(ball_at(1.5, 0.0));

        let stats = world.step();
        assert_eq!(stats.candidates, 1);
        assert_eq!(stats.manifolds, 1);

        let manifold = world.contacts()[0];
        assert_eq!((manifold.body_a, manifold.body_b), (a, b));
        assert!((manifold.overlap - 0.5).abs() < EPSILON);
        assert!(!manifold.collided_previously);

        // Half of 0.25 each after the sub-threshold dropoff.
        assert!((world.body(a).unwrap().position.x + 0.125).abs() < EPSILON);
        assert!((world.body(b).unwrap().position.x - 1.625).abs() < EPSILON);

        let stats = world.step();
        assert_eq!(stats.manifolds, 1);
        assert!(world.contacts()[0].collided_previously);
    }

    #[test]
    fn test_static_pairs_are_not_reported() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        world.add_body(ball_at(0.0, 0.0).with_treatment(Treatment::Static));
        world.add_body(ball_at(1.0, 0.0).with_treatment(Treatment::Kinematic));
        let stats = world.step();
        assert_eq!(stats.candidates, 1);
        assert_eq!(stats.manifolds, 0);
    }

    #[test]
    fn test_falling_ball_stops_on_floor() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let floor = RigidBody::new_static(
            Shape::Polygon(Polygon::rectangle(20.0, 2.0).unwrap()),
            Vec2::new(0.0, -1.0),
            0.0,
        );
        world.add_body(floor);
        let ball = RigidBody::new(1.0, Shape::Circle(Circle::new(0.5).unwrap()))
            .unwrap()
            .with_position(Vec2::new(0.0, 0.4))
            .with_velocity(Vec2::new(0.0, -2.0));
        let id = world.add_body(ball);

        let stats = world.step();
        assert_eq!(stats.manifolds, 1);
        let manifold = world.contacts()[0];
        assert!(manifold.normal.y > 0.99);
        assert!(manifold.world_contact(Vec2::new(0.0, -1.0)).y.abs() < 0.1);
        let body = world.body(id).unwrap();
        assert!(body.linear_velocity.y > 0.0);
        assert!(body.position.y > 0.4);
    }

    #[test]
    fn test_step_solves_constraints() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let a = world.add_body(ball_at(0.0, 0.0));
        let b = world.add_body(ball_at(15.0, 0.0));
        world.add_distance_constraint(a, b, Some(1.0), Some(10.0)).unwrap();
        let stats = world.step();
        assert_eq!(stats.candidates, 0);
        let length = world.body(a).unwrap().position.distance(world.body(b).unwrap().position);
        // Two passes at half strength remove three quarters of the error.
        assert!((length - 11.25).abs() < EPSILON);
    }
}
