use serde::{Deserialize, Serialize};

use crate::enzyme::{DigestionParameters, EnzymeBuilder};
use crate::mass::Tolerance;
use crate::modification::ProbabilisticScore;
use crate::Error;

/// Identification parameters the report sections need: the cleavage rule
/// behind emPAI and possible coverage, and everything shown in the search
/// parameters and validation summary sections
#[derive(Clone, Debug)]
pub struct ReportSettings {
    pub enzyme: String,
    pub digestion: DigestionParameters,
    pub precursor_tol: Tolerance,
    pub fragment_tol: Tolerance,
    pub fixed_modifications: Vec<String>,
    pub variable_modifications: Vec<String>,
    pub decoy_tag: String,
    /// Percent
    pub protein_fdr: f64,
    /// Percent
    pub peptide_fdr: f64,
    /// Percent
    pub psm_fdr: f64,
    /// Residues shown on each side of a unique peptide
    pub flanking_residues: usize,
    /// Raw name as configured; only parsed when a report asks for the score
    pub localization_score: String,
}

impl ReportSettings {
    pub fn probabilistic_score(&self) -> Result<ProbabilisticScore, Error> {
        self.localization_score.parse()
    }
}

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
/// Parameters as written in the project file; anything left out is defaulted
pub struct Builder {
    pub enzyme: Option<EnzymeBuilder>,
    pub precursor_tol: Option<Tolerance>,
    pub fragment_tol: Option<Tolerance>,
    pub fixed_modifications: Option<Vec<String>>,
    pub variable_modifications: Option<Vec<String>>,
    pub decoy_tag: Option<String>,
    pub protein_fdr: Option<f64>,
    pub peptide_fdr: Option<f64>,
    pub psm_fdr: Option<f64>,
    pub flanking_residues: Option<usize>,
    pub localization_score: Option<String>,
}

impl Builder {
    fn check_fdr(level: &str, fdr: f64) -> f64 {
        if !(0.0..=100.0).contains(&fdr) {
            log::warn!("{} FDR of {}% is outside [0, 100], clamping", level, fdr);
        } else if fdr > 10.0 {
            log::warn!("{} FDR of {}% is higher than expected", level, fdr);
        }
        fdr.clamp(0.0, 100.0)
    }

    fn check_tolerance(name: &str, tolerance: Tolerance) -> Tolerance {
        let (lo, hi) = match tolerance {
            Tolerance::Ppm(lo, hi) | Tolerance::Da(lo, hi) => (lo, hi),
        };
        if lo > hi {
            log::warn!("{} lower bound ({}) is greater than upper bound ({})", name, lo, hi);
        }
        tolerance
    }

    pub fn build(self) -> Result<ReportSettings, Error> {
        let enzyme = self.enzyme.unwrap_or_default();
        Ok(ReportSettings {
            digestion: enzyme.build()?,
            enzyme: enzyme.name(),
            precursor_tol: Self::check_tolerance(
                "precursor_tol",
                self.precursor_tol.unwrap_or(Tolerance::Ppm(-10.0, 10.0)),
            ),
            fragment_tol: Self::check_tolerance(
                "fragment_tol",
                self.fragment_tol.unwrap_or(Tolerance::Da(-0.02, 0.02)),
            ),
            fixed_modifications: self
                .fixed_modifications
                .unwrap_or_else(|| vec!["Carbamidomethylation of C".into()]),
            variable_modifications: self
                .variable_modifications
                .unwrap_or_else(|| vec!["Oxidation of M".into()]),
            decoy_tag: self.decoy_tag.unwrap_or_else(|| "rev_".into()),
            protein_fdr: Self::check_fdr("Protein", self.protein_fdr.unwrap_or(1.0)),
            peptide_fdr: Self::check_fdr("Peptide", self.peptide_fdr.unwrap_or(1.0)),
            psm_fdr: Self::check_fdr("PSM", self.psm_fdr.unwrap_or(1.0)),
            flanking_residues: self.flanking_residues.unwrap_or(1),
            localization_score: self
                .localization_score
                .unwrap_or_else(|| ProbabilisticScore::PhosphoRs.to_string()),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Builder::default().build().unwrap();
        assert_eq!(settings.enzyme, "Trypsin");
        assert_eq!(settings.digestion.missed_cleavages, 2);
        assert_eq!(settings.precursor_tol, Tolerance::Ppm(-10.0, 10.0));
        assert_eq!(settings.flanking_residues, 1);
        assert_eq!(
            settings.probabilistic_score().unwrap(),
            ProbabilisticScore::PhosphoRs
        );
    }

    #[test]
    fn from_json() {
        let builder: Builder = serde_json::from_str(
            r#"{
                "enzyme": {"name": "Lys-C", "cleave_at": "K", "missed_cleavages": 1},
                "precursor_tol": {"da": [-0.5, 0.5]},
                "psm_fdr": 150.0,
                "localization_score": "D-score"
            }"#,
        )
        .unwrap();
        let settings = builder.build().unwrap();
        assert_eq!(settings.enzyme, "Lys-C");
        assert_eq!(settings.digestion.missed_cleavages, 1);
        assert_eq!(settings.precursor_tol, Tolerance::Da(-0.5, 0.5));
        assert_eq!(settings.psm_fdr, 100.0);
        assert!(matches!(
            settings.probabilistic_score(),
            Err(Error::UnsupportedScore(name)) if name == "D-score"
        ));
    }

    #[test]
    fn invalid_cleavage_rule() {
        let builder: Builder =
            serde_json::from_str(r#"{"enzyme": {"cleave_at": "K1"}}"#).unwrap();
        assert!(matches!(builder.build(), Err(Error::InvalidEnzyme(_))));
    }
}
