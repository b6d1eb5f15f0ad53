//! Particle-name table: Belle II style names to signed PDG codes.

use std::collections::BTreeMap;

use crate::domain::error::DomainError;

/// PDG code of the photon.
pub const PHOTON: i32 = 22;
/// PDG code of the negative muon.
pub const MUON: i32 = 13;
/// PDG code of the positive pion.
pub const PION: i32 = 211;
/// PDG code of the positive kaon.
pub const KAON: i32 = 321;

/// Names and codes known without any configuration.
///
/// Every entry with a nonzero charge or a distinct antiparticle is followed by its
/// charge conjugate so lookups work for either name.
const BUILTIN: &[(&str, i32)] = &[
    // leptons
    ("e-", 11),
    ("e+", -11),
    ("nu_e", 12),
    ("anti-nu_e", -12),
    ("mu-", MUON),
    ("mu+", -MUON),
    ("nu_mu", 14),
    ("anti-nu_mu", -14),
    ("tau-", 15),
    ("tau+", -15),
    ("nu_tau", 16),
    ("anti-nu_tau", -16),
    // gauge bosons
    ("gamma", PHOTON),
    // light mesons
    ("pi0", 111),
    ("pi+", PION),
    ("pi-", -PION),
    ("rho0", 113),
    ("rho+", 213),
    ("rho-", -213),
    ("eta", 221),
    ("omega", 223),
    ("eta'", 331),
    ("phi", 333),
    ("K_L0", 130),
    ("K_S0", 310),
    ("K0", 311),
    ("anti-K0", -311),
    ("K+", KAON),
    ("K-", -KAON),
    ("K*0", 313),
    ("anti-K*0", -313),
    ("K*+", 323),
    ("K*-", -323),
    // charm mesons
    ("D+", 411),
    ("D-", -411),
    ("D0", 421),
    ("anti-D0", -421),
    ("D*+", 413),
    ("D*-", -413),
    ("D*0", 423),
    ("anti-D*0", -423),
    ("D_s+", 431),
    ("D_s-", -431),
    ("D_s*+", 433),
    ("D_s*-", -433),
    ("J/psi", 443),
    ("psi(2S)", 100443),
    // beauty mesons
    ("B0", 511),
    ("anti-B0", -511),
    ("B+", 521),
    ("B-", -521),
    ("B_s0", 531),
    ("anti-B_s0", -531),
    ("Upsilon(4S)", 300553),
    // baryons
    ("p+", 2212),
    ("anti-p-", -2212),
    ("n0", 2112),
    ("anti-n0", -2112),
    ("Lambda0", 3122),
    ("anti-Lambda0", -3122),
    ("Lambda_c+", 4122),
    ("anti-Lambda_c-", -4122),
];

/// Lookup table between particle names and signed PDG codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticleTable {
    by_name: BTreeMap<String, i32>,
    by_code: BTreeMap<i32, String>,
}

impl Default for ParticleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleTable {
    /// Table containing the built-in entries.
    pub fn new() -> Self {
        let mut table = Self {
            by_name: BTreeMap::new(),
            by_code: BTreeMap::new(),
        };
        for &(name, code) in BUILTIN {
            table.by_name.insert(name.to_string(), code);
            table.by_code.entry(code).or_insert_with(|| name.to_string());
        }
        table
    }

    /// Register additional names.
    ///
    /// Re-registering a known name with the same code is a no-op; a different
    /// code is rejected.
    pub fn with_extra<I, S>(mut self, entries: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        for (name, code) in entries {
            let name = name.into();
            match self.by_name.get(&name) {
                Some(&existing) if existing != code => {
                    return Err(DomainError::ConflictingParticle {
                        name,
                        existing,
                        requested: code,
                    });
                }
                Some(_) => {}
                None => {
                    self.by_code.entry(code).or_insert_with(|| name.clone());
                    self.by_name.insert(name, code);
                }
            }
        }
        Ok(self)
    }

    /// Signed PDG code for `name`; a bare integer is taken as the code itself.
    pub fn code_of(&self, name: &str) -> Result<i32, DomainError> {
        self.by_name
            .get(name)
            .copied()
            .or_else(|| name.parse::<i32>().ok())
            .ok_or_else(|| DomainError::UnknownParticle(name.to_string()))
    }

    /// First registered name for a signed code.
    pub fn name_of(&self, code: i32) -> Option<&str> {
        self.by_code.get(&code).map(String::as_str)
    }

    /// Render an absolute id, preferring the name of the positive code.
    pub fn display_name(&self, id: u32) -> String {
        i32::try_from(id)
            .ok()
            .and_then(|code| self.name_of(code).or_else(|| self.name_of(-code)))
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    /// All entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> + '_ {
        self.by_name.iter().map(|(name, &code)| (name.as_str(), code))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
