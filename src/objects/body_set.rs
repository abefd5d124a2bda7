use std::fmt;

use rustc_hash::FxHashMap;

use super::RigidBody;

/// Stable handle to a body stored in a [`BodySet`]. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyId(u32);

impl BodyId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Ordered body storage. Iteration follows insertion order, and removing a
/// body keeps the relative order of the rest.
#[derive(Debug, Clone, Default)]
pub struct BodySet {
    bodies: Vec<(BodyId, RigidBody)>,
    index: FxHashMap<BodyId, usize>,
    next_id: u32,
}

impl BodySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, body: RigidBody) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.index.insert(id, self.bodies.len());
        self.bodies.push((id, body));
        id
    }

    pub fn remove(&mut self, id: BodyId) -> Option<RigidBody> {
        let slot = self.index.remove(&id)?;
        let (_, body) = self.bodies.remove(slot);
        for (i, (other, _)) in self.bodies.iter().enumerate().skip(slot) {
            self.index.insert(*other, i);
        }
        Some(body)
    }

    pub fn get(&self, id: BodyId) -> Option<&RigidBody> {
        self.index.get(&id).map(|&i| &self.bodies[i].1)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        let i = *self.index.get(&id)?;
        Some(&mut self.bodies[i].1)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.index.contains_key(&id)
    }

    /// Borrows two distinct bodies mutably at once.
    /// Returns `None` if either id is unknown or both ids are the same.
    pub fn pair_mut(&mut self, a: BodyId, b: BodyId) -> Option<(&mut RigidBody, &mut RigidBody)> {
        let ia = *self.index.get(&a)?;
        let ib = *self.index.get(&b)?;
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (left, right) = self.bodies.split_at_mut(ib);
            Some((&mut left[ia].1, &mut right[0].1))
        } else {
            let (left, right) = self.bodies.split_at_mut(ia);
            Some((&mut right[0].1, &mut left[ib].1))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &RigidBody)> {
        self.bodies.iter().map(|(id, body)| (*id, body))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyId, &mut RigidBody)> {
        self.bodies.iter_mut().map(|(id, body)| (*id, body))
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
