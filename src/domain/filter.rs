//! Candidate selection by decay pattern.
//!
//! All functions are pure: they return the retained subset, never mutate the
//! candidate collection, and keep the original relative order.

use crate::domain::channel::DecayChannel;
use crate::domain::node::{equals, DecayNode, MatchPolicy};
use crate::domain::record::DecayRecord;

/// Indices of the candidates whose tree equals `pattern`.
///
/// A host that owns a mutable, index-shifting collection removes everything not
/// listed here in one batch.
pub fn retained_indices<R: DecayRecord>(
    candidates: &[R],
    pattern: &DecayNode,
    policy: &MatchPolicy,
) -> Vec<usize> {
    candidates
        .iter()
        .enumerate()
        .filter(|(_, record)| pattern.matches(*record, policy))
        .map(|(idx, _)| idx)
        .collect()
}

/// The candidates whose tree equals `pattern`, in input order.
pub fn filter_by_decay<'a, R: DecayRecord>(
    candidates: &'a [R],
    pattern: &DecayNode,
    policy: &MatchPolicy,
) -> Vec<&'a R> {
    candidates
        .iter()
        .filter(|record| pattern.matches(*record, policy))
        .collect()
}

/// First channel (in the given order) matching each candidate.
pub fn classify<R: DecayRecord>(
    candidates: &[R],
    channels: &[DecayChannel],
    policy: &MatchPolicy,
) -> Vec<Option<usize>> {
    candidates
        .iter()
        .map(|record| classify_one(record, channels, policy))
        .collect()
}

pub(crate) fn classify_one<R: DecayRecord>(
    record: &R,
    channels: &[DecayChannel],
    policy: &MatchPolicy,
) -> Option<usize> {
    // one tree per candidate, compared against every channel
    let tree = DecayNode::from_record(record, policy);
    channels
        .iter()
        .position(|channel| equals(&tree, &channel.pattern))
}
