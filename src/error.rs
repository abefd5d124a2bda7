//! Error type shared by every fallible construction in the crate.
//!
//! Only construction and registry misuse is fatal. Runtime conditions that a
//! step can survive (an inconclusive GJK run, coincident circle centres, a
//! pair of fixed bodies) are logged and skipped instead of surfacing here.

use thiserror::Error;

use crate::objects::BodyId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// Bodies must have a strictly positive, finite mass.
    #[error("body mass must be positive and finite, got {mass}")]
    NonPositiveMass { mass: f64 },

    #[error("circle radius must be non-negative and finite, got {radius}")]
    InvalidRadius { radius: f64 },

    #[error("convex polygon needs at least 3 vertices, got {count}")]
    TooFewVertices { count: usize },

    #[error("polygon vertices do not describe a convex polygon")]
    NonConvexPolygon,

    #[error("invalid bounding box: {reason}")]
    InvalidAabb { reason: &'static str },

    #[error("compound shape has no children")]
    EmptyCompound,

    #[error("unknown body {0}")]
    UnknownBody(BodyId),

    #[error("invalid constraint: {reason}")]
    InvalidConstraint { reason: &'static str },

    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: &'static str },
}

pub type PhysicsResult<T> = Result<T, PhysicsError>;
