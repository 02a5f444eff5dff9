//! Matches of the identification hierarchy, as handed out by a [`MatchStore`]
//!
//! protein group → peptide → spectrum match → search engine assumption
//!
//! [`MatchStore`]: crate::store::MatchStore

use serde::{Deserialize, Serialize};

use crate::modification::LocalizationScores;
use crate::peptide::Peptide;

/// Opaque key of a match in the store
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchKey(pub String);

impl From<&str> for MatchKey {
    fn from(s: &str) -> Self {
        MatchKey(s.into())
    }
}

impl From<String> for MatchKey {
    fn from(s: String) -> Self {
        MatchKey(s)
    }
}

impl std::fmt::Display for MatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Statistical validation of a match, attached to its key
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationParameter {
    pub score: f64,
    /// Percent
    pub confidence: f64,
    pub validated: bool,
    pub decoy: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProteinGroupMatch {
    pub key: MatchKey,
    /// The first accession is the leading protein of the group
    pub accessions: Vec<String>,
    pub peptides: Vec<MatchKey>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ProteinGroupMatch {
    pub fn main_accession(&self) -> &str {
        self.accessions.first().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeptideMatch {
    pub key: MatchKey,
    pub peptide: Peptide,
    pub spectra: Vec<MatchKey>,
    /// Absent when no localization scoring was run for this peptide
    #[serde(default)]
    pub localization: Option<LocalizationScores>,
}

/// A single search engine's candidate peptide for a spectrum
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assumption {
    pub key: MatchKey,
    /// Search engine that produced the assumption
    pub engine: String,
    pub peptide: Peptide,
    pub charge: u8,
    pub e_value: f64,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpectrumMatch {
    pub key: MatchKey,
    pub file: String,
    pub title: String,
    pub precursor_mz: f64,
    #[serde(default)]
    pub charge: Option<u8>,
    /// Seconds
    #[serde(default)]
    pub retention_time: Option<f64>,
    /// The assumption retained as main PSM, if the spectrum was identified
    #[serde(default)]
    pub best: Option<Assumption>,
    #[serde(default)]
    pub assumptions: Vec<Assumption>,
}

/// Run metadata displayed by the project details section
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDetails {
    pub name: String,
    pub sample: String,
    pub replicate: u32,
    pub created: String,
    pub identification_algorithms: Vec<String>,
    pub spectrum_files: Vec<String>,
    pub database: String,
}
