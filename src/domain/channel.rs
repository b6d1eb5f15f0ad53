//! Named decay channels, e.g. `Kpi` (mode 0) and `K3pi` (mode 1).

use crate::domain::descriptor::parse_pattern;
use crate::domain::error::DomainError;
use crate::domain::node::{DecayNode, MatchPolicy};
use crate::domain::particle::ParticleTable;

/// A reference decay with the mode id it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecayChannel {
    pub name: String,
    pub mode_id: u32,
    pub pattern: DecayNode,
}

impl DecayChannel {
    pub fn new(name: impl Into<String>, mode_id: u32, pattern: DecayNode) -> Self {
        Self {
            name: name.into(),
            mode_id,
            pattern,
        }
    }

    /// Build from a descriptor string.
    pub fn parse(
        name: impl Into<String>,
        mode_id: u32,
        descriptor: &str,
        table: &ParticleTable,
        policy: &MatchPolicy,
    ) -> Result<Self, DomainError> {
        Ok(Self::new(
            name,
            mode_id,
            parse_pattern(descriptor, table, policy)?,
        ))
    }

    /// Parse `NAME=DESCRIPTOR`; the mode id is supplied by the caller.
    pub fn parse_assignment(
        assignment: &str,
        mode_id: u32,
        table: &ParticleTable,
        policy: &MatchPolicy,
    ) -> Result<Self, DomainError> {
        let (name, descriptor) = assignment
            .split_once('=')
            .map(|(n, d)| (n.trim(), d.trim()))
            .filter(|(n, _)| !n.is_empty())
            .ok_or_else(|| DomainError::InvalidDescriptor {
                input: assignment.to_string(),
                message: "expected NAME=DESCRIPTOR".to_string(),
            })?;
        Self::parse(name, mode_id, descriptor, table, policy)
    }
}
