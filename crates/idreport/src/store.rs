use std::collections::HashMap;

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

use crate::identification::{
    MatchKey, PeptideMatch, ProteinGroupMatch, SpectrumMatch, ValidationParameter,
};
use crate::Error;

/// Keyed access to the identification hierarchy.
///
/// Implementations may be backed by blocking disk or database I/O: every
/// lookup is fallible, and `Ok(None)` signals a key that is no longer in the
/// store, which callers skip rather than treat as an error.
pub trait MatchStore {
    fn protein_keys(&self) -> Result<Vec<MatchKey>, Error>;
    fn peptide_keys(&self) -> Result<Vec<MatchKey>, Error>;
    fn spectrum_keys(&self) -> Result<Vec<MatchKey>, Error>;

    fn contains(&self, key: &MatchKey) -> Result<bool, Error>;
    fn protein_group(&self, key: &MatchKey) -> Result<Option<ProteinGroupMatch>, Error>;
    fn peptide(&self, key: &MatchKey) -> Result<Option<PeptideMatch>, Error>;
    fn spectrum(&self, key: &MatchKey) -> Result<Option<SpectrumMatch>, Error>;
    fn validation(&self, key: &MatchKey) -> Result<Option<ValidationParameter>, Error>;

    fn protein_sequence(&self, accession: &str) -> Result<Option<String>, Error>;
}

/// Serialized form of a [`MemoryStore`]
#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreData {
    pub proteins: Vec<ProteinGroupMatch>,
    pub peptides: Vec<PeptideMatch>,
    pub spectra: Vec<SpectrumMatch>,
    pub validation: HashMap<MatchKey, ValidationParameter>,
    pub sequences: HashMap<String, String>,
}

/// A match store held entirely in memory, keys listed in insertion order.
///
/// Matches are indexed per level, so a protein group and a peptide sharing a
/// key do not shadow each other. Validation parameters are keyed by the
/// match key alone and are shared by every level using that key.
#[derive(Default)]
pub struct MemoryStore {
    proteins: Vec<ProteinGroupMatch>,
    peptides: Vec<PeptideMatch>,
    spectra: Vec<SpectrumMatch>,
    /// Position in the level's vector, one map per [`Level`]
    index: [FnvHashMap<MatchKey, usize>; 4],
    validation: FnvHashMap<MatchKey, ValidationParameter>,
    sequences: FnvHashMap<String, String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Level {
    // discriminants index `MemoryStore::index`
    Protein,
    Peptide,
    Spectrum,
    Assumption,
}

impl MemoryStore {
    pub fn insert_protein(&mut self, protein: ProteinGroupMatch) {
        let ix = self.proteins.len();
        self.index[Level::Protein as usize].insert(protein.key.clone(), ix);
        self.proteins.push(protein);
    }

    pub fn insert_peptide(&mut self, peptide: PeptideMatch) {
        let ix = self.peptides.len();
        self.index[Level::Peptide as usize].insert(peptide.key.clone(), ix);
        self.peptides.push(peptide);
    }

    pub fn insert_spectrum(&mut self, spectrum: SpectrumMatch) {
        let ix = self.spectra.len();
        for assumption in spectrum.assumptions.iter().chain(spectrum.best.iter()) {
            self.index[Level::Assumption as usize].insert(assumption.key.clone(), ix);
        }
        self.index[Level::Spectrum as usize].insert(spectrum.key.clone(), ix);
        self.spectra.push(spectrum);
    }

    pub fn set_validation<K: Into<MatchKey>>(&mut self, key: K, parameter: ValidationParameter) {
        self.validation.insert(key.into(), parameter);
    }

    pub fn insert_sequence<A, S>(&mut self, accession: A, sequence: S)
    where
        A: Into<String>,
        S: Into<String>,
    {
        self.sequences.insert(accession.into(), sequence.into());
    }

    fn lookup(&self, key: &MatchKey, level: Level) -> Option<usize> {
        self.index[level as usize].get(key).copied()
    }
}

impl From<StoreData> for MemoryStore {
    fn from(data: StoreData) -> Self {
        let mut store = MemoryStore::default();
        data.proteins
            .into_iter()
            .for_each(|p| store.insert_protein(p));
        data.peptides
            .into_iter()
            .for_each(|p| store.insert_peptide(p));
        data.spectra
            .into_iter()
            .for_each(|s| store.insert_spectrum(s));
        store.validation.extend(data.validation);
        store.sequences.extend(data.sequences);
        log::debug!(
            "loaded {} protein groups, {} peptides, {} spectrum matches",
            store.proteins.len(),
            store.peptides.len(),
            store.spectra.len()
        );
        store
    }
}

impl MatchStore for MemoryStore {
    fn protein_keys(&self) -> Result<Vec<MatchKey>, Error> {
        Ok(self.proteins.iter().map(|p| p.key.clone()).collect())
    }

    fn peptide_keys(&self) -> Result<Vec<MatchKey>, Error> {
        Ok(self.peptides.iter().map(|p| p.key.clone()).collect())
    }

    fn spectrum_keys(&self) -> Result<Vec<MatchKey>, Error> {
        Ok(self.spectra.iter().map(|s| s.key.clone()).collect())
    }

    fn contains(&self, key: &MatchKey) -> Result<bool, Error> {
        Ok(self.index.iter().any(|level| level.contains_key(key)))
    }

    fn protein_group(&self, key: &MatchKey) -> Result<Option<ProteinGroupMatch>, Error> {
        Ok(self
            .lookup(key, Level::Protein)
            .map(|ix| self.proteins[ix].clone()))
    }

    fn peptide(&self, key: &MatchKey) -> Result<Option<PeptideMatch>, Error> {
        Ok(self
            .lookup(key, Level::Peptide)
            .map(|ix| self.peptides[ix].clone()))
    }

    fn spectrum(&self, key: &MatchKey) -> Result<Option<SpectrumMatch>, Error> {
        Ok(self
            .lookup(key, Level::Spectrum)
            .map(|ix| self.spectra[ix].clone()))
    }

    fn validation(&self, key: &MatchKey) -> Result<Option<ValidationParameter>, Error> {
        Ok(self.validation.get(key).copied())
    }

    fn protein_sequence(&self, accession: &str) -> Result<Option<String>, Error> {
        Ok(self.sequences.get(accession).cloned())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::peptide::Peptide;

    #[test]
    fn keys_keep_insertion_order() {
        let mut store = MemoryStore::default();
        for key in ["b", "a", "c"] {
            store.insert_peptide(PeptideMatch {
                key: key.into(),
                peptide: Peptide::new("PEPTIDE"),
                spectra: vec![],
                localization: None,
            });
        }
        assert_eq!(
            store.peptide_keys().unwrap(),
            vec![MatchKey::from("b"), MatchKey::from("a"), MatchKey::from("c")]
        );
        assert!(store.contains(&"a".into()).unwrap());
        assert!(!store.contains(&"z".into()).unwrap());
        // a peptide key is not a protein key
        assert!(store.protein_group(&"a".into()).unwrap().is_none());
        assert!(store.peptide(&"z".into()).unwrap().is_none());
    }

    #[test]
    fn levels_do_not_shadow() {
        let mut store = MemoryStore::default();
        store.insert_protein(ProteinGroupMatch {
            key: "x".into(),
            accessions: vec!["P1".into()],
            peptides: vec!["x".into()],
            description: None,
        });
        store.insert_peptide(PeptideMatch {
            key: "x".into(),
            peptide: Peptide::new("PEPTIDEK"),
            spectra: vec![],
            localization: None,
        });
        assert!(store.protein_group(&"x".into()).unwrap().is_some());
        assert!(store.peptide(&"x".into()).unwrap().is_some());
        assert!(store.spectrum(&"x".into()).unwrap().is_none());
    }

    #[test]
    fn deserialize() {
        let json = r#"{
            "proteins": [{"key": "pg1", "accessions": ["P1"], "peptides": ["pep1"]}],
            "peptides": [{"key": "pep1", "peptide": {"sequence": "PEPTIDEK", "proteins": ["P1"]}, "spectra": ["s1"]}],
            "spectra": [{"key": "s1", "file": "run.mgf", "title": "scan=1", "precursor_mz": 450.2,
                         "best": {"key": "a1", "engine": "Sage", "peptide": {"sequence": "PEPTIDEK"}, "charge": 2, "e_value": 0.001}}],
            "validation": {"s1": {"score": 12.0, "confidence": 99.0, "validated": true, "decoy": false}},
            "sequences": {"P1": "MPEPTIDEKR"}
        }"#;
        let store = MemoryStore::from(serde_json::from_str::<StoreData>(json).unwrap());
        assert_eq!(store.protein_keys().unwrap(), vec![MatchKey::from("pg1")]);
        assert!(store.contains(&"a1".into()).unwrap());
        assert!(store.validation(&"s1".into()).unwrap().unwrap().validated);
        assert_eq!(
            store.protein_sequence("P1").unwrap().as_deref(),
            Some("MPEPTIDEKR")
        );
        assert!(store.protein_sequence("P2").unwrap().is_none());
    }
}
