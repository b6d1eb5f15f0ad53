//! Domain layer: decay trees, particle table and descriptors
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod channel;
pub mod descriptor;
pub mod display;
pub mod error;
pub mod filter;
pub mod node;
pub mod particle;
pub mod record;

pub use channel::DecayChannel;
pub use descriptor::{parse_descriptor, parse_pattern, DescriptorTree};
pub use display::{DecayDisplay, TreeNodeConvert};
pub use error::DomainError;
pub use filter::{classify, filter_by_decay, retained_indices};
pub use node::{canonical_order, equals, DecayNode, MatchPolicy};
pub use particle::ParticleTable;
pub use record::{DecayRecord, McParticle};

/// Expand environment variables in a path string.
///
/// Supports `$VAR`, `${VAR}` and `~`. Uses shellexpand crate for robust expansion.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
