//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/decaymatch/decaymatch.toml`
//! 3. Local config: `<project_dir>/.decaymatch.toml`
//! 4. Environment variables: `DECAYMATCH_*` prefix

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, DecayChannel, MatchPolicy, ParticleTable};

/// Leaf and exclusion rules, as particle names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MatchingConfig {
    /// Particles never decomposed further (e.g. ["mu-", "pi+", "K+"])
    pub final_state: Vec<String>,
    /// Particles dropped from daughter lists (e.g. ["gamma"])
    pub excluded_children: Vec<String>,
    /// Evaluate candidates on all cores
    pub parallel: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            final_state: vec!["mu-".into(), "pi+".into(), "K+".into()],
            excluded_children: vec!["gamma".into()],
            parallel: false,
        }
    }
}

/// Raw matching config for intermediate parsing (arrays are Option to detect "not specified").
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty array
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawMatchingConfig {
    pub final_state: Option<Vec<String>>,
    pub excluded_children: Option<Vec<String>>,
    pub parallel: Option<bool>,
}

/// A named reference decay, e.g. `Kpi = "D0 -> K- pi+"` with mode id 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelConfig {
    pub name: String,
    pub mode_id: u32,
    pub pattern: String,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub matching: RawMatchingConfig,
    pub particles: Option<BTreeMap<String, i32>>,
    pub particles_file: Option<PathBuf>,
    pub channels: Option<Vec<ChannelConfig>>,
}

impl MatchingConfig {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["pi+", "K+"], &["p+"])        // → ["K+", "p+", "pi+"]
    /// merge_array(&["pi+", "K+"], &["!K+", "p+"]) // → ["p+", "pi+"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for name in overlay {
            if let Some(negated) = name.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(name.clone());
            }
        }

        // Convert to sorted Vec for deterministic output
        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    /// Merge overlay config onto self (base).
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - Arrays: union merge with negation support (if overlay specified)
    pub fn merge(&self, overlay: &RawMatchingConfig) -> Self {
        Self {
            final_state: overlay
                .final_state
                .as_ref()
                .map(|o| Self::merge_array(&self.final_state, o))
                .unwrap_or_else(|| self.final_state.clone()),
            excluded_children: overlay
                .excluded_children
                .as_ref()
                .map(|o| Self::merge_array(&self.excluded_children, o))
                .unwrap_or_else(|| self.excluded_children.clone()),
            parallel: overlay.parallel.unwrap_or(self.parallel),
        }
    }

    /// Apply global config onto defaults.
    ///
    /// Unlike `merge()`, arrays specified by the global config replace the
    /// defaults entirely.
    pub fn apply_global(&self, global: &RawMatchingConfig) -> Self {
        Self {
            final_state: global
                .final_state
                .clone()
                .unwrap_or_else(|| self.final_state.clone()),
            excluded_children: global
                .excluded_children
                .clone()
                .unwrap_or_else(|| self.excluded_children.clone()),
            parallel: global.parallel.unwrap_or(self.parallel),
        }
    }
}

/// Unified configuration for decaymatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// TOML file with further `name = code` entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particles_file: Option<PathBuf>,
    /// Leaf and exclusion rules
    pub matching: MatchingConfig,
    /// Extra particle names (name → signed PDG code)
    pub particles: BTreeMap<String, i32>,
    /// Channels used by `classify` when none are given on the command line
    pub channels: Vec<ChannelConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            particles_file: None,
            matching: MatchingConfig::default(),
            particles: BTreeMap::new(),
            channels: vec![
                ChannelConfig {
                    name: "Kpi".into(),
                    mode_id: 0,
                    pattern: "D0 -> K- pi+".into(),
                },
                ChannelConfig {
                    name: "K3pi".into(),
                    mode_id: 1,
                    pattern: "D0 -> K- pi+ pi+ pi-".into(),
                },
            ],
        }
    }
}

/// Get the XDG config directory for decaymatch.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "decaymatch").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("decaymatch.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".decaymatch.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl RawSettings {
    /// Resolve a relative `particles_file` against the directory of the config file naming it.
    fn anchor_paths(&mut self, config_dir: &Path) {
        if let Some(path) = &self.particles_file {
            let expanded = PathBuf::from(expand_env_vars(path.to_string_lossy().as_ref()));
            self.particles_file = Some(if expanded.is_relative() {
                config_dir.join(expanded)
            } else {
                expanded
            });
        }
    }
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(path) = &self.particles_file {
            let expanded = expand_env_vars(path.to_string_lossy().as_ref());
            self.particles_file = Some(PathBuf::from(expanded));
        }
    }

    /// Merge overlay config onto self (base) with union semantics for arrays.
    ///
    /// Particle entries are merged key by key, overlay winning. A channel list in
    /// the overlay replaces the inherited one.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut particles = self.particles.clone();
        if let Some(extra) = &overlay.particles {
            particles.extend(extra.iter().map(|(k, v)| (k.clone(), *v)));
        }
        Self {
            matching: self.matching.merge(&overlay.matching),
            particles,
            particles_file: overlay
                .particles_file
                .clone()
                .or_else(|| self.particles_file.clone()),
            channels: overlay
                .channels
                .clone()
                .unwrap_or_else(|| self.channels.clone()),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            matching: self.matching.apply_global(&global.matching),
            particles: global
                .particles
                .clone()
                .unwrap_or_else(|| self.particles.clone()),
            particles_file: global
                .particles_file
                .clone()
                .or_else(|| self.particles_file.clone()),
            channels: global
                .channels
                .clone()
                .unwrap_or_else(|| self.channels.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE (global defines the real baseline)
    /// - Global → Local: UNION with negation support
    /// - Any → Env vars: REPLACE (explicit user override)
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                let mut raw = load_raw_settings(&global_path)?;
                if let Some(config_dir) = global_path.parent() {
                    raw.anchor_paths(config_dir);
                }
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("loading local config {}", local_path.display());
                let mut raw = load_raw_settings(&local_path)?;
                raw.anchor_paths(dir);
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply DECAYMATCH_* environment variables as explicit overrides.
    ///
    /// `DECAYMATCH_MATCHING__FINAL_STATE=pi+,K+` replaces the final-state list.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("DECAYMATCH")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("matching.final_state")
                .with_list_parse_key("matching.excluded_children")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get::<Vec<String>>("matching.final_state") {
            settings.matching.final_state = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("matching.excluded_children") {
            settings.matching.excluded_children = val;
        }
        if let Ok(val) = config.get_bool("matching.parallel") {
            settings.matching.parallel = val;
        }
        if let Ok(val) = config.get_string("particles_file") {
            settings.particles_file = Some(PathBuf::from(val));
        }

        Ok(settings)
    }

    /// Particle table with the configured extra entries.
    ///
    /// Entries from `particles_file` are registered before the inline `particles`.
    pub fn particle_table(&self) -> Result<ParticleTable, ApplicationError> {
        let mut table = ParticleTable::new();
        if let Some(path) = &self.particles_file {
            let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
                message: format!("read {}: {}", path.display(), e),
            })?;
            let entries: BTreeMap<String, i32> =
                toml::from_str(&content).map_err(|e| ApplicationError::Config {
                    message: format!("parse {}: {}", path.display(), e),
                })?;
            table = table.with_extra(entries)?;
        }
        Ok(table.with_extra(self.particles.clone())?)
    }

    /// Resolve the configured names into a match policy.
    pub fn match_policy(&self, table: &ParticleTable) -> Result<MatchPolicy, ApplicationError> {
        let resolve = |names: &[String]| -> Result<Vec<u32>, ApplicationError> {
            names
                .iter()
                .map(|n| {
                    table
                        .code_of(n)
                        .map(i32::unsigned_abs)
                        .map_err(ApplicationError::from)
                })
                .collect()
        };
        Ok(MatchPolicy::new(
            resolve(&self.matching.final_state)?,
            resolve(&self.matching.excluded_children)?,
        ))
    }

    /// Parse the configured channels.
    pub fn decay_channels(
        &self,
        table: &ParticleTable,
        policy: &MatchPolicy,
    ) -> Result<Vec<DecayChannel>, ApplicationError> {
        self.channels
            .iter()
            .map(|c| {
                DecayChannel::parse(&c.name, c.mode_id, &c.pattern, table, policy)
                    .map_err(ApplicationError::from)
            })
            .collect()
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# decaymatch configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/decaymatch/decaymatch.toml  (defines your baseline)
#   Local:  <project_dir>/.decaymatch.toml        (analysis-specific additions)
#   Env:    DECAYMATCH_* environment variables    (explicit overrides)
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS with global.
#   Use "!name" in local config to REMOVE an inherited item:
#     final_state = ["p+", "!K+"]  # adds protons, decomposes kaons

# File with further name = PDG code entries
# particles_file = "~/analysis/particles.toml"

[matching]
# Particles treated as stable (never decomposed further)
# final_state = ["mu-", "pi+", "K+"]

# Particles dropped from every daughter list
# excluded_children = ["gamma"]

# Evaluate candidates in parallel
# parallel = false

[particles]
# "X(3872)" = 9920443

# [[channels]]
# name = "Kpi"
# mode_id = 0
# pattern = "D0 -> K- pi+"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
