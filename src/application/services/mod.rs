//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem)
//! but are themselves concrete structs, not traits.

mod candidates;
mod matcher;

pub use candidates::{parse_candidates, CandidateService};
pub use matcher::{ChannelCount, MatchSummary, MatcherService};
