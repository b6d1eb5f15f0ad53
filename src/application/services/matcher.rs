//! Decay matching service
//!
//! Wraps the pure domain matcher with logging, optional parallel evaluation and
//! per-channel bookkeeping.

use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::application::ApplicationResult;
use crate::domain::filter::classify_one;
use crate::domain::{
    filter, parse_pattern, DecayChannel, DecayNode, DecayRecord, MatchPolicy, ParticleTable,
};

/// Candidate count for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelCount {
    pub name: String,
    pub mode_id: u32,
    pub count: usize,
}

/// Outcome of classifying a candidate list against a set of channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub total: usize,
    pub channels: Vec<ChannelCount>,
    pub unmatched: usize,
}

impl MatchSummary {
    fn from_assignments(channels: &[DecayChannel], assignments: &[Option<usize>]) -> Self {
        let mut counts: Vec<ChannelCount> = channels
            .iter()
            .map(|c| ChannelCount {
                name: c.name.clone(),
                mode_id: c.mode_id,
                count: 0,
            })
            .collect();
        let mut unmatched = 0;
        for assignment in assignments {
            match assignment {
                Some(idx) => counts[*idx].count += 1,
                None => unmatched += 1,
            }
        }
        Self {
            total: assignments.len(),
            channels: counts,
            unmatched,
        }
    }

    /// Fraction of all candidates assigned to the first channel named `channel`.
    pub fn efficiency(&self, channel: &str) -> Option<f64> {
        self.channels
            .iter()
            .find(|c| c.name == channel)
            .map(|c| self.fraction(c))
    }

    /// Fraction of all candidates counted in `count`; 0 for an empty list.
    pub fn fraction(&self, count: &ChannelCount) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        count.count as f64 / self.total as f64
    }
}

/// Service selecting candidates by decay pattern.
pub struct MatcherService {
    table: Arc<ParticleTable>,
    policy: MatchPolicy,
    parallel: bool,
}

impl MatcherService {
    pub fn new(table: Arc<ParticleTable>, policy: MatchPolicy) -> Self {
        Self {
            table,
            policy,
            parallel: false,
        }
    }

    /// Evaluate candidates on the rayon pool. Results keep input order.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn table(&self) -> &ParticleTable {
        &self.table
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Build a pattern tree from a descriptor.
    #[instrument(level = "debug", skip(self))]
    pub fn pattern(&self, descriptor: &str) -> ApplicationResult<DecayNode> {
        let pattern = parse_pattern(descriptor, &self.table, &self.policy)?;
        debug!("pattern: {}", pattern.display(&self.table));
        Ok(pattern)
    }

    /// Build a channel from a `NAME=DESCRIPTOR` assignment.
    pub fn channel(&self, assignment: &str, mode_id: u32) -> ApplicationResult<DecayChannel> {
        Ok(DecayChannel::parse_assignment(
            assignment,
            mode_id,
            &self.table,
            &self.policy,
        )?)
    }

    /// Canonical tree of a candidate under the service policy.
    pub fn tree_of<R: DecayRecord>(&self, record: &R) -> DecayNode {
        DecayNode::from_record(record, &self.policy)
    }

    pub fn matches<R: DecayRecord>(&self, record: &R, pattern: &DecayNode) -> bool {
        pattern.matches(record, &self.policy)
    }

    /// Indices of candidates matching `pattern`, ascending.
    #[instrument(level = "debug", skip_all, fields(candidates = candidates.len(), parallel = self.parallel))]
    pub fn retained_indices<R: DecayRecord + Sync>(
        &self,
        candidates: &[R],
        pattern: &DecayNode,
    ) -> Vec<usize> {
        let retained = if self.parallel {
            candidates
                .par_iter()
                .enumerate()
                .filter(|(_, record)| pattern.matches(*record, &self.policy))
                .map(|(idx, _)| idx)
                .collect()
        } else {
            filter::retained_indices(candidates, pattern, &self.policy)
        };
        info!(
            "retained {} of {} candidates",
            retained.len(),
            candidates.len()
        );
        retained
    }

    /// Candidates matching `pattern`, in input order.
    pub fn filter_by_decay<'a, R: DecayRecord + Sync>(
        &self,
        candidates: &'a [R],
        pattern: &DecayNode,
    ) -> Vec<&'a R> {
        self.retained_indices(candidates, pattern)
            .into_iter()
            .map(|idx| &candidates[idx])
            .collect()
    }

    /// First matching channel per candidate.
    #[instrument(level = "debug", skip_all, fields(candidates = candidates.len(), channels = channels.len()))]
    pub fn classify<R: DecayRecord + Sync>(
        &self,
        candidates: &[R],
        channels: &[DecayChannel],
    ) -> Vec<Option<usize>> {
        if self.parallel {
            candidates
                .par_iter()
                .map(|record| classify_one(record, channels, &self.policy))
                .collect()
        } else {
            filter::classify(candidates, channels, &self.policy)
        }
    }

    /// Per-channel counts for a candidate list.
    pub fn summarize<R: DecayRecord + Sync>(
        &self,
        candidates: &[R],
        channels: &[DecayChannel],
    ) -> MatchSummary {
        let assignments = self.classify(candidates, channels);
        let summary = MatchSummary::from_assignments(channels, &assignments);
        info!(
            "classified {} candidates, {} unmatched",
            summary.total, summary.unmatched
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::McParticle;

    fn service(parallel: bool) -> MatcherService {
        MatcherService::new(Arc::new(ParticleTable::new()), MatchPolicy::default())
            .with_parallel(parallel)
    }

    #[test]
    fn given_empty_candidates_when_summarizing_then_zero_efficiency() {
        let svc = service(false);
        let channels = vec![svc.channel("Kpi=D0 -> K- pi+", 0).unwrap()];
        let summary = svc.summarize::<McParticle>(&[], &channels);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.efficiency("Kpi"), Some(0.0));
        assert_eq!(summary.efficiency("missing"), None);
    }

    #[test]
    fn given_channels_sharing_a_name_when_summarizing_then_each_row_has_own_fraction() {
        let svc = service(false);
        let channels = vec![
            svc.channel("D0=D0 -> K- pi+", 0).unwrap(),
            svc.channel("D0=D0 -> K- pi+ pi+ pi-", 1).unwrap(),
        ];
        let candidates = vec![
            McParticle::with_daughters(421, vec![McParticle::new(-321), McParticle::new(211)]),
            McParticle::with_daughters(
                421,
                vec![
                    McParticle::new(-321),
                    McParticle::new(211),
                    McParticle::new(211),
                    McParticle::new(-211),
                ],
            ),
            McParticle::with_daughters(
                421,
                vec![
                    McParticle::new(-321),
                    McParticle::new(211),
                    McParticle::new(211),
                    McParticle::new(-211),
                ],
            ),
            McParticle::new(421),
        ];

        let summary = svc.summarize(&candidates, &channels);

        let fractions: Vec<f64> = summary
            .channels
            .iter()
            .map(|c| summary.fraction(c))
            .collect();
        assert_eq!(fractions, vec![0.25, 0.5]);
    }

    #[test]
    fn given_parallel_and_sequential_when_filtering_then_same_indices() {
        let candidates: Vec<McParticle> = (0..200)
            .map(|i| {
                let extra = if i % 3 == 0 { vec![McParticle::new(211)] } else { vec![] };
                let mut daughters = vec![McParticle::new(-321), McParticle::new(211)];
                daughters.extend(extra);
                McParticle::with_daughters(421, daughters)
            })
            .collect();
        let seq = service(false);
        let par = service(true);
        let pattern = seq.pattern("D0 -> K- pi+").unwrap();

        let a = seq.retained_indices(&candidates, &pattern);
        let b = par.retained_indices(&candidates, &pattern);
        assert_eq!(a, b);
        assert_eq!(a.len(), 133);
    }
}
