//! Canonical decay trees and their structural comparison.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::trace;

use crate::domain::error::DomainError;
use crate::domain::particle::{ParticleTable, KAON, MUON, PHOTON, PION};
use crate::domain::record::DecayRecord;

/// Which ids stop the descent and which ids never appear as children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Ids treated as stable: their nodes never have children.
    pub final_state_ids: BTreeSet<u32>,
    /// Ids dropped from every daughter list (radiative photons).
    pub excluded_child_ids: BTreeSet<u32>,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            final_state_ids: [MUON, PION, KAON].iter().map(|c| c.unsigned_abs()).collect(),
            excluded_child_ids: [PHOTON.unsigned_abs()].into_iter().collect(),
        }
    }
}

impl MatchPolicy {
    pub fn new(
        final_state_ids: impl IntoIterator<Item = u32>,
        excluded_child_ids: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            final_state_ids: final_state_ids.into_iter().collect(),
            excluded_child_ids: excluded_child_ids.into_iter().collect(),
        }
    }

    pub fn is_final_state(&self, id: u32) -> bool {
        self.final_state_ids.contains(&id)
    }

    pub fn is_excluded(&self, id: u32) -> bool {
        self.excluded_child_ids.contains(&id)
    }
}

/// One particle of a decay tree, with children in canonical order.
///
/// Immutable once built: the only constructors are [`DecayNode::from_name`],
/// [`DecayNode::from_record`] and [`DecayNode::from_parts`], all of which apply
/// the leaf policy and sort the children.
#[derive(Debug, Clone, Eq)]
pub struct DecayNode {
    particle_id: u32,
    children: Vec<DecayNode>,
}

impl DecayNode {
    /// Build a pattern node from a particle name.
    ///
    /// Children passed for a final-state particle are discarded.
    pub fn from_name(
        name: &str,
        children: Vec<DecayNode>,
        table: &ParticleTable,
        policy: &MatchPolicy,
    ) -> Result<Self, DomainError> {
        let code = table.code_of(name)?;
        Ok(Self::from_parts(code.unsigned_abs(), children, policy))
    }

    /// Build the tree of a live candidate record.
    pub fn from_record<R: DecayRecord>(record: &R, policy: &MatchPolicy) -> Self {
        let particle_id = record.pdg_code().unsigned_abs();
        if policy.is_final_state(particle_id) {
            return Self::leaf(particle_id);
        }
        let children = record
            .daughters()
            .filter(|d| !policy.is_excluded(d.pdg_code().unsigned_abs()))
            .map(|d| Self::from_record(d, policy))
            .collect();
        Self::sorted(particle_id, children)
    }

    /// Build a node from an absolute id and already-built children.
    pub fn from_parts(particle_id: u32, children: Vec<DecayNode>, policy: &MatchPolicy) -> Self {
        if policy.is_final_state(particle_id) {
            if !children.is_empty() {
                trace!(particle_id, "dropping children of final-state particle");
            }
            return Self::leaf(particle_id);
        }
        Self::sorted(particle_id, children)
    }

    fn leaf(particle_id: u32) -> Self {
        Self {
            particle_id,
            children: Vec::new(),
        }
    }

    fn sorted(particle_id: u32, mut children: Vec<DecayNode>) -> Self {
        // stable: identical input always yields identical order
        children.sort_by(canonical_order);
        Self {
            particle_id,
            children,
        }
    }

    pub fn particle_id(&self) -> u32 {
        self.particle_id
    }

    pub fn children(&self) -> &[DecayNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of levels, a leaf being 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(DecayNode::depth)
            .max()
            .unwrap_or(0)
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(DecayNode::size).sum::<usize>()
    }

    /// Whether the tree built from `record` equals this pattern.
    pub fn matches<R: DecayRecord>(&self, record: &R, policy: &MatchPolicy) -> bool {
        equals(&DecayNode::from_record(record, policy), self)
    }
}

/// Total order used to sort siblings.
///
/// Primary key is the particle id; ties compare the child sequences element-wise
/// with the same order, then by child count.
pub fn canonical_order(a: &DecayNode, b: &DecayNode) -> Ordering {
    a.particle_id.cmp(&b.particle_id).then_with(|| {
        a.children
            .iter()
            .zip(&b.children)
            .map(|(x, y)| canonical_order(x, y))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.children.len().cmp(&b.children.len()))
    })
}

/// Structural equality of two canonical trees.
pub fn equals(a: &DecayNode, b: &DecayNode) -> bool {
    a.particle_id == b.particle_id
        && a.children.len() == b.children.len()
        && a.children.iter().zip(&b.children).all(|(x, y)| equals(x, y))
}

impl PartialEq for DecayNode {
    fn eq(&self, other: &Self) -> bool {
        equals(self, other)
    }
}
