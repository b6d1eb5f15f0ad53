//! Candidate records as seen by the matcher.

use serde::{Deserialize, Serialize};

/// Read-only view of a particle candidate and its decay products.
///
/// Implemented by whatever store holds the candidates. The matcher only borrows
/// records for the duration of one tree construction.
pub trait DecayRecord {
    /// Signed PDG code of the candidate.
    fn pdg_code(&self) -> i32;

    /// Direct daughters, in the order the store lists them.
    fn daughters(&self) -> impl Iterator<Item = &Self>;
}

/// Generator-level particle with its full daughter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McParticle {
    pub pdg: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub daughters: Vec<McParticle>,
}

impl McParticle {
    pub fn new(pdg: i32) -> Self {
        Self {
            pdg,
            daughters: Vec::new(),
        }
    }

    pub fn with_daughters(pdg: i32, daughters: Vec<McParticle>) -> Self {
        Self { pdg, daughters }
    }
}

impl DecayRecord for McParticle {
    fn pdg_code(&self) -> i32 {
        self.pdg
    }

    fn daughters(&self) -> impl Iterator<Item = &Self> {
        self.daughters.iter()
    }
}
