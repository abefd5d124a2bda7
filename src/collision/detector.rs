use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use super::detection::{Collider, NarrowPhase, NarrowPhaseStats};
use super::manifold::CollisionManifold;
use super::sweep_prune::pair_key;
use crate::common::PhysicsConfig;
use crate::objects::{BodyId, BodySet};

/// Runs the narrow phase over broad-phase candidates and remembers which
/// pairs touched, so the next step can tell resting contacts from new ones.
#[derive(Debug, Default)]
pub struct CollisionDetector {
    previous_contacts: FxHashSet<u64>,
    stats: NarrowPhaseStats,
}

impl CollisionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces the manifolds for this step in candidate order.
    pub fn detect(
        &mut self,
        bodies: &BodySet,
        candidates: &[(BodyId, BodyId)],
        config: &PhysicsConfig,
    ) -> Vec<CollisionManifold> {
        let mut narrow = NarrowPhase::new(config);
        let mut manifolds = Vec::new();
        for &(id_a, id_b) in candidates {
            let (Some(body_a), Some(body_b)) = (bodies.get(id_a), bodies.get(id_b)) else {
                trace!(a = %id_a, b = %id_b, "candidate refers to a missing body");
                continue;
            };
            let a = Collider::from_body(id_a, body_a);
            let b = Collider::from_body(id_b, body_b);
            narrow.check_pair(&a, &b, &mut manifolds);
        }

        let mut contacts = FxHashSet::default();
        for manifold in &mut manifolds {
            let key = pair_key(manifold.body_a, manifold.body_b);
            manifold.collided_previously = self.previous_contacts.contains(&key);
            contacts.insert(key);
        }
        self.previous_contacts = contacts;
        self.stats = narrow.stats;

        debug!(
            candidates = candidates.len(),
            manifolds = manifolds.len(),
            gjk_cap_hits = self.stats.gjk_cap_hits,
            margin_exhausted = self.stats.margin_exhausted,
            "narrow phase finished"
        );
        manifolds
    }

    /// Narrow-phase counters from the last call to [`CollisionDetector::detect`].
    pub fn stats(&self) -> NarrowPhaseStats {
        self.stats
    }

    /// Whether `a` and `b` were in contact after the last detection.
    pub fn were_touching(&self, a: BodyId, b: BodyId) -> bool {
        self.previous_contacts.contains(&pair_key(a, b))
    }

    /// Forgets the contact history of a body leaving the simulation.
    pub fn forget_body(&mut self, id: BodyId) {
        self.previous_contacts
            .retain(|&key| (key >> 32) as u32 != id.raw() && key as u32 != id.raw());
    }
}
