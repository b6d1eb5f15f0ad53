//! Truth-matching of Monte Carlo decay chains against reference decay patterns.
//!
//! A reference decay such as `D0 -> K- pi+` is parsed into a canonical
//! [`domain::DecayNode`]; candidate records are reduced to the same canonical
//! form and compared structurally, ignoring daughter order, charge and
//! radiated photons.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
