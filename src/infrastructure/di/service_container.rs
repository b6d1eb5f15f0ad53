//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{CandidateService, MatcherService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{DecayChannel, MatchPolicy, ParticleTable};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
///
/// The particle table and match policy are resolved once from the settings.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    table: Arc<ParticleTable>,
    policy: MatchPolicy,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> ApplicationResult<Self> {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> ApplicationResult<Self> {
        let table = settings.particle_table()?;
        let policy = settings.match_policy(&table)?;

        Ok(Self {
            settings: Arc::new(settings),
            fs,
            table: Arc::new(table),
            policy,
        })
    }

    pub fn table(&self) -> &ParticleTable {
        &self.table
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Matcher using the configured policy; `parallel` is OR-ed with the config flag.
    pub fn matcher(&self, parallel: bool) -> MatcherService {
        MatcherService::new(Arc::clone(&self.table), self.policy.clone())
            .with_parallel(parallel || self.settings.matching.parallel)
    }

    pub fn candidates(&self) -> CandidateService {
        CandidateService::new(Arc::clone(&self.fs))
    }

    /// Channels from the configuration file.
    pub fn configured_channels(&self) -> ApplicationResult<Vec<DecayChannel>> {
        self.settings.decay_channels(&self.table, &self.policy)
    }
}
