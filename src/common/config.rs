//! Tunables for the collision pipeline.

use crate::error::{PhysicsError, PhysicsResult};

/// Settings shared by the narrow phase, the impulse resolver and the
/// constraint solver.
///
/// With the `serde` feature enabled the struct deserializes from any serde
/// format; missing fields take their default values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PhysicsConfig {
    /// Accumulated corrections shorter than this are damped rather than applied in full.
    pub mtv_threshold: f64,
    /// Fraction of a sub-threshold correction that is actually applied.
    pub body_extract_dropoff: f64,
    /// Wake sleeping bodies whose correction exceeds `mtv_threshold`.
    pub force_wakeup_above_overlap_threshold: bool,
    pub gjk_max_iterations: usize,
    /// Termination tolerance of GJK distance refinement.
    pub gjk_accuracy: f64,
    /// Core margin increment, as a fraction of the smaller half-dimension of the pair.
    pub margin_step_fraction: f64,
    /// Relaxation passes per constraint solve.
    pub constraint_iterations: usize,
    pub default_constraint_stiffness: f64,
}

impl PhysicsConfig {
    pub const DEFAULT_MTV_THRESHOLD: f64 = 1.0;
    pub const DEFAULT_BODY_EXTRACT_DROPOFF: f64 = 0.5;
    pub const DEFAULT_GJK_MAX_ITERATIONS: usize = 100;
    pub const DEFAULT_GJK_ACCURACY: f64 = 1e-4;
    pub const DEFAULT_MARGIN_STEP_FRACTION: f64 = 0.01;
    pub const DEFAULT_CONSTRAINT_ITERATIONS: usize = 2;
    pub const DEFAULT_CONSTRAINT_STIFFNESS: f64 = 0.5;

    pub fn with_mtv_threshold(mut self, threshold: f64) -> Self {
        self.mtv_threshold = threshold;
        self
    }

    pub fn with_body_extract_dropoff(mut self, dropoff: f64) -> Self {
        self.body_extract_dropoff = dropoff;
        self
    }

    pub fn with_constraint_iterations(mut self, iterations: usize) -> Self {
        self.constraint_iterations = iterations;
        self
    }

    pub fn with_gjk_max_iterations(mut self, iterations: usize) -> Self {
        self.gjk_max_iterations = iterations;
        self
    }

    pub fn with_margin_step_fraction(mut self, fraction: f64) -> Self {
        self.margin_step_fraction = fraction;
        self
    }

    /// Checks every field for a usable value.
    pub fn validate(&self) -> PhysicsResult<()> {
        if !(self.mtv_threshold >= 0.0 && self.mtv_threshold.is_finite()) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "mtv_threshold must be a non-negative finite number",
            });
        }
        if !(0.0..=1.0).contains(&self.body_extract_dropoff) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "body_extract_dropoff must lie in [0, 1]",
            });
        }
        if self.gjk_max_iterations == 0 {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "gjk_max_iterations must be at least 1",
            });
        }
        if !(self.gjk_accuracy > 0.0) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "gjk_accuracy must be positive",
            });
        }
        if !(self.margin_step_fraction > 0.0 && self.margin_step_fraction <= 1.0) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "margin_step_fraction must lie in (0, 1]",
            });
        }
        if self.constraint_iterations == 0 {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "constraint_iterations must be at least 1",
            });
        }
        if !(0.0..=1.0).contains(&self.default_constraint_stiffness) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "default_constraint_stiffness must lie in [0, 1]",
            });
        }
        Ok(())
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            mtv_threshold: Self::DEFAULT_MTV_THRESHOLD,
            body_extract_dropoff: Self::DEFAULT_BODY_EXTRACT_DROPOFF,
            force_wakeup_above_overlap_threshold: true,
            gjk_max_iterations: Self::DEFAULT_GJK_MAX_ITERATIONS,
            gjk_accuracy: Self::DEFAULT_GJK_ACCURACY,
            margin_step_fraction: Self::DEFAULT_MARGIN_STEP_FRACTION,
            constraint_iterations: Self::DEFAULT_CONSTRAINT_ITERATIONS,
            default_constraint_stiffness: Self::DEFAULT_CONSTRAINT_STIFFNESS,
        }
    }
}
