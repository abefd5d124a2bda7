//! Gauss-Seidel relaxation over the registered constraints.

use std::fmt;

use tracing::debug;

use super::{AngleConstraint, Constraint, DistanceConstraint};
use crate::common::PhysicsConfig;
use crate::error::{PhysicsError, PhysicsResult};
use crate::objects::{BodyId, BodySet};

/// Identifies a registered constraint. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintHandle(u64);

impl fmt::Display for ConstraintHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "constraint#{}", self.0)
    }
}

/// Owns distance and angle constraints and relaxes them a fixed number of
/// times per solve.
#[derive(Debug, Clone)]
pub struct ConstraintSolver {
    iterations: usize,
    default_stiffness: f64,
    distance: Vec<(ConstraintHandle, DistanceConstraint)>,
    angle: Vec<(ConstraintHandle, AngleConstraint)>,
    next_handle: u64,
}

impl Default for ConstraintSolver {
    fn default() -> Self {
        Self::new(&PhysicsConfig::default())
    }
}

impl ConstraintSolver {
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            iterations: config.constraint_iterations.max(1),
            default_stiffness: config.default_constraint_stiffness,
            distance: Vec::new(),
            angle: Vec::new(),
            next_handle: 0,
        }
    }

    fn next_handle(&mut self) -> ConstraintHandle {
        let handle = ConstraintHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Links two bodies. The stiffness defaults to the configured value and
    /// the target length to their current distance.
    pub fn add_distance_constraint(
        &mut self,
        bodies: &BodySet,
        body_a: BodyId,
        body_b: BodyId,
        stiffness: Option<f64>,
        target_length: Option<f64>,
    ) -> PhysicsResult<ConstraintHandle> {
        let pos_a = bodies.get(body_a).ok_or(PhysicsError::UnknownBody(body_a))?.position;
        let pos_b = bodies.get(body_b).ok_or(PhysicsError::UnknownBody(body_b))?.position;
        let constraint = DistanceConstraint::new(
            body_a,
            body_b,
            stiffness.unwrap_or(self.default_stiffness),
            target_length.unwrap_or_else(|| pos_a.distance(pos_b)),
        )?;
        let handle = self.next_handle();
        self.distance.push((handle, constraint));
        Ok(handle)
    }

    /// Holds the angle at `body_b` between `body_a` and `body_c`. The target
    /// defaults to the current angle.
    pub fn add_angle_constraint(
        &mut self,
        bodies: &BodySet,
        body_a: BodyId,
        body_b: BodyId,
        body_c: BodyId,
        stiffness: Option<f64>,
        target_angle: Option<f64>,
    ) -> PhysicsResult<ConstraintHandle> {
        let pos_a = bodies.get(body_a).ok_or(PhysicsError::UnknownBody(body_a))?.position;
        let pos_b = bodies.get(body_b).ok_or(PhysicsError::UnknownBody(body_b))?.position;
        let pos_c = bodies.get(body_c).ok_or(PhysicsError::UnknownBody(body_c))?.position;
        let constraint = AngleConstraint::new(
            body_a,
            body_b,
            body_c,
            stiffness.unwrap_or(self.default_stiffness),
            target_angle.unwrap_or_else(|| pos_b.angle_between(pos_a, pos_c)),
        )?;
        let handle = self.next_handle();
        self.angle.push((handle, constraint));
        Ok(handle)
    }

    /// Removes a constraint. Returns `false` for unknown handles.
    pub fn remove(&mut self, handle: ConstraintHandle) -> bool {
        if let Some(index) = self.distance.iter().position(|(h, _)| *h == handle) {
            self.distance.remove(index);
            return true;
        }
        if let Some(index) = self.angle.iter().position(|(h, _)| *h == handle) {
            self.angle.remove(index);
            return true;
        }
        false
    }

    pub fn drop_all(&mut self) {
        self.distance.clear();
        self.angle.clear();
    }

    /// Drops every constraint that references `id`, returning how many went.
    pub fn remove_body_constraints(&mut self, id: BodyId) -> usize {
        let before = self.len();
        self.distance.retain(|(_, c)| !c.involves(id));
        self.angle.retain(|(_, c)| !c.involves(id));
        before - self.len()
    }

    pub fn distance_constraints(&self) -> impl Iterator<Item = (ConstraintHandle, &DistanceConstraint)> {
        self.distance.iter().map(|(h, c)| (*h, c))
    }

    pub fn angle_constraints(&self) -> impl Iterator<Item = (ConstraintHandle, &AngleConstraint)> {
        self.angle.iter().map(|(h, c)| (*h, c))
    }

    pub fn len(&self) -> usize {
        self.distance.len() + self.angle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs the configured number of passes. Each pass corrects every
    /// distance constraint, then every angle constraint, by
    /// `stiffness / iterations` of its current error.
    pub fn solve(&self, bodies: &mut BodySet) {
        if self.is_empty() {
            return;
        }
        let coefficient = 1.0 / self.iterations as f64;
        for _ in 0..self.iterations {
            for (_, constraint) in &self.distance {
                constraint.solve_position(bodies, coefficient);
            }
            for (_, constraint) in &self.angle {
                constraint.solve_position(bodies, coefficient);
            }
        }
        debug!(
            distance = self.distance.len(),
            angle = self.angle.len(),
            iterations = self.iterations,
            "constraints solved"
        );
    }
}
