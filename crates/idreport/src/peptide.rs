use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::mass::sequence_mass;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// A modification placed on a peptide residue
pub struct ModificationMatch {
    pub name: String,
    /// Mass shift in Da
    pub mass: f64,
    /// 1-based residue index on the peptide
    pub site: usize,
    #[serde(default = "default_variable")]
    pub variable: bool,
}

fn default_variable() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// The theoretical peptide behind a peptide match or a search engine assumption
pub struct Peptide {
    pub sequence: String,
    /// Accessions of every protein this sequence maps to
    #[serde(default)]
    pub proteins: Vec<String>,
    #[serde(default)]
    pub modifications: Vec<ModificationMatch>,
}

impl Peptide {
    pub fn new<S: Into<String>>(sequence: S) -> Self {
        Peptide {
            sequence: sequence.into(),
            proteins: Vec::new(),
            modifications: Vec::new(),
        }
    }

    pub fn with_proteins<I, S>(mut self, proteins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.proteins = proteins.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_modification<S: Into<String>>(
        mut self,
        name: S,
        mass: f64,
        site: usize,
        variable: bool,
    ) -> Self {
        self.modifications.push(ModificationMatch {
            name: name.into(),
            mass,
            site,
            variable,
        });
        self
    }

    /// Identity used to compare peptides coming from different matches:
    /// the sequence plus every modification name and site, order independent
    pub fn matching_key(&self) -> String {
        let mut mods = self
            .modifications
            .iter()
            .map(|m| (m.name.as_str(), m.site))
            .collect::<Vec<_>>();
        mods.sort_unstable();

        let mut key = self.sequence.clone();
        for (name, site) in mods {
            let _ = write!(key, "_{}@{}", name, site);
        }
        key
    }

    pub fn is_same_peptide(&self, other: &Peptide) -> bool {
        self.sequence == other.sequence && self.matching_key() == other.matching_key()
    }

    pub fn variable_modifications(&self) -> impl Iterator<Item = &ModificationMatch> {
        self.modifications.iter().filter(|m| m.variable)
    }

    pub fn fixed_modifications(&self) -> impl Iterator<Item = &ModificationMatch> {
        self.modifications.iter().filter(|m| !m.variable)
    }

    /// Neutral monoisotopic mass including modification shifts
    pub fn monoisotopic(&self) -> Option<f64> {
        let shifts = self.modifications.iter().map(|m| m.mass).sum::<f64>();
        sequence_mass(&self.sequence).map(|mass| mass + shifts)
    }

    /// Sequence with variable modification shifts inlined, e.g. `PEPS[+79.96633]TIDE`
    pub fn modified_sequence(&self) -> String {
        let mut out = String::with_capacity(self.sequence.len() + 12);
        for (idx, residue) in self.sequence.chars().enumerate() {
            out.push(residue);
            for m in self.variable_modifications().filter(|m| m.site == idx + 1) {
                if m.mass.is_sign_positive() {
                    let _ = write!(out, "[+{}]", m.mass);
                } else {
                    let _ = write!(out, "[{}]", m.mass);
                }
            }
        }
        out
    }

    /// Modifications grouped by name (sorted), with their residues and sites,
    /// e.g. `Oxidation of M (M1); Phosphorylation of S (S4, S6)`
    pub fn modification_summary<'a, I>(&self, mods: I) -> String
    where
        I: Iterator<Item = &'a ModificationMatch>,
    {
        let mut mods = mods.collect::<Vec<_>>();
        mods.sort_by(|a, b| a.name.cmp(&b.name).then(a.site.cmp(&b.site)));

        let mut out = String::new();
        let mut current: Option<&str> = None;
        for m in mods {
            let residue = self
                .sequence
                .as_bytes()
                .get(m.site.saturating_sub(1))
                .map(|&b| b as char)
                .unwrap_or('?');
            if current == Some(m.name.as_str()) {
                let _ = write!(out, ", {}{}", residue, m.site);
            } else {
                if current.is_some() {
                    out.push_str("); ");
                }
                let _ = write!(out, "{} ({}{}", m.name, residue, m.site);
                current = Some(m.name.as_str());
            }
        }
        if current.is_some() {
            out.push(')');
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn matching_key_ignores_modification_order() {
        let a = Peptide::new("PEPSTIDE")
            .with_modification("Phosphorylation of S", 79.96633, 4, true)
            .with_modification("Phosphorylation of T", 79.96633, 5, true);
        let b = Peptide::new("PEPSTIDE")
            .with_modification("Phosphorylation of T", 79.96633, 5, true)
            .with_modification("Phosphorylation of S", 79.96633, 4, true);
        let c = Peptide::new("PEPSTIDE").with_modification(
            "Phosphorylation of T",
            79.96633,
            5,
            true,
        );

        assert!(a.is_same_peptide(&b));
        assert!(!a.is_same_peptide(&c));
        assert!(!a.is_same_peptide(&Peptide::new("PEPSTIDE")));
    }

    #[test]
    fn modified_sequence() {
        let peptide = Peptide::new("MPEPSK")
            .with_modification("Oxidation of M", 15.994915, 1, true)
            .with_modification("Phosphorylation of S", 79.96633, 5, true)
            .with_modification("Carbamidomethylation of C", 57.021464, 6, false);
        assert_eq!(peptide.modified_sequence(), "M[+15.994915]PEPS[+79.96633]K");
    }

    #[test]
    fn summary_sorted_by_name() {
        let peptide = Peptide::new("SPESMSK")
            .with_modification("Phosphorylation of S", 79.96633, 6, true)
            .with_modification("Oxidation of M", 15.994915, 5, true)
            .with_modification("Phosphorylation of S", 79.96633, 1, true);
        assert_eq!(
            peptide.modification_summary(peptide.variable_modifications()),
            "Oxidation of M (M5); Phosphorylation of S (S1, S6)"
        );
        assert_eq!(peptide.modification_summary(peptide.fixed_modifications()), "");
    }

    #[test]
    fn modified_mass() {
        let plain = Peptide::new("PEPTIDE").monoisotopic().unwrap();
        let phospho = Peptide::new("PEPTIDE")
            .with_modification("Phosphorylation of T", 79.96633, 4, true)
            .monoisotopic()
            .unwrap();
        assert!((phospho - plain - 79.96633).abs() < 1e-9);
    }
}
