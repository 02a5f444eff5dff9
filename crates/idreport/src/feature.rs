//! Catalog of every reportable column, grouped by section family.
//!
//! The catalog is fixed at build time. Section identifiers double as the
//! section titles written in reports, and feature keys are only unique
//! within their family.

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Family {
    ProjectDetails,
    SearchParameters,
    ValidationSummary,
    Protein,
    Peptide,
    Psm,
    Assumption,
}

impl Family {
    pub const ALL: [Family; 7] = [
        Family::ProjectDetails,
        Family::SearchParameters,
        Family::ValidationSummary,
        Family::Protein,
        Family::Peptide,
        Family::Psm,
        Family::Assumption,
    ];

    /// Stable section identifier, also used as the section title
    pub fn id(&self) -> &'static str {
        match self {
            Family::ProjectDetails => "Project Details",
            Family::SearchParameters => "Search Parameters",
            Family::ValidationSummary => "Validation Summary",
            Family::Protein => "Protein Identification Summary",
            Family::Peptide => "Peptide Identification Summary",
            Family::Psm => "PSM Identification Summary",
            Family::Assumption => "Identification Algorithm Results",
        }
    }

    pub fn from_id(id: &str) -> Option<Family> {
        Family::ALL.iter().copied().find(|family| family.id() == id)
    }

    fn features(&self) -> &'static [Feature] {
        match self {
            Family::ProjectDetails => PROJECT_FEATURES,
            Family::SearchParameters => SEARCH_FEATURES,
            Family::ValidationSummary => VALIDATION_FEATURES,
            Family::Protein => PROTEIN_FEATURES,
            Family::Peptide => PEPTIDE_FEATURES,
            Family::Psm => PSM_FEATURES,
            Family::Assumption => ASSUMPTION_FEATURES,
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Feature {
    /// Stable key, unique within the family
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub family: Family,
    /// Detail columns shown after this one when sub-features are requested
    pub children: &'static [Feature],
}

impl Feature {
    const fn new(
        family: Family,
        key: &'static str,
        title: &'static str,
        description: &'static str,
    ) -> Feature {
        Feature {
            key,
            title,
            description,
            family,
            children: &[],
        }
    }

    const fn with_children(self, children: &'static [Feature]) -> Feature {
        Feature { children, ..self }
    }
}

/// Top-level features of a section, in catalog order; empty for a section
/// the catalog does not describe
pub fn features_of(section: &str) -> &'static [Feature] {
    Family::from_id(section)
        .map(|family| family.features())
        .unwrap_or(&[])
}

/// Flatten a feature tree depth-first. With `include_parent` the feature
/// comes first, followed by its descendants; otherwise only the descendants
/// are returned, so a leaf expands to nothing.
pub fn expand(feature: &'static Feature, include_parent: bool) -> Vec<&'static Feature> {
    fn visit(feature: &'static Feature, out: &mut Vec<&'static Feature>) {
        out.push(feature);
        for child in feature.children {
            visit(child, out);
        }
    }

    let mut out = Vec::new();
    if include_parent {
        out.push(feature);
    }
    for child in feature.children {
        visit(child, &mut out);
    }
    out
}

/// Every feature of a section, sub-features included, in traversal order
pub fn all_features_of(section: &str) -> Vec<&'static Feature> {
    features_of(section)
        .iter()
        .flat_map(|feature| expand(feature, true))
        .collect()
}

/// Look up a (possibly nested) feature by key within a section
pub fn find(section: &str, key: &str) -> Option<&'static Feature> {
    all_features_of(section)
        .into_iter()
        .find(|feature| feature.key == key)
}

/// Like [`find`], but distinguishes a feature of another family from one
/// that does not exist at all
pub fn resolve(section: &str, key: &str) -> Result<&'static Feature, Error> {
    if let Some(feature) = find(section, key) {
        return Ok(feature);
    }
    let owner = Family::ALL
        .iter()
        .find(|family| find(family.id(), key).is_some());
    match owner {
        Some(family) => Err(Error::FamilyMismatch {
            section: section.into(),
            feature: key.into(),
            family: family.id().into(),
        }),
        None => Err(Error::UnknownFeature {
            section: section.into(),
            feature: key.into(),
        }),
    }
}

use Family::{
    Assumption as A, Peptide as Pep, ProjectDetails as Proj, Protein as Prot, Psm,
    SearchParameters as Search, ValidationSummary as Val,
};

static PROJECT_FEATURES: &[Feature] = &[
    Feature::new(Proj, "project_name", "Project Name", "Name of the project."),
    Feature::new(Proj, "sample", "Sample", "Sample analyzed."),
    Feature::new(Proj, "replicate", "Replicate", "Replicate number."),
    Feature::new(Proj, "creation_date", "Creation Date", "When the project was created."),
    Feature::new(Proj, "software_version", "Software Version", "Version of the report engine."),
    Feature::new(
        Proj,
        "identification_algorithms",
        "Identification Algorithms",
        "Search engines whose results were imported.",
    ),
    Feature::new(Proj, "spectrum_files", "Spectrum Files", "Spectrum files searched."),
    Feature::new(Proj, "database", "Protein Database", "Protein sequence database searched."),
];

static SEARCH_FEATURES: &[Feature] = &[
    Feature::new(Search, "enzyme", "Enzyme", "Enzyme used for the digestion."),
    Feature::new(
        Search,
        "missed_cleavages",
        "Maximum Missed Cleavages",
        "Maximum number of missed cleavages allowed.",
    ),
    Feature::new(Search, "peptide_length", "Peptide Length", "Peptide length bounds."),
    Feature::new(
        Search,
        "precursor_tolerance",
        "Precursor Tolerance",
        "Precursor mass tolerance.",
    ),
    Feature::new(
        Search,
        "fragment_tolerance",
        "Fragment Tolerance",
        "Fragment ion mass tolerance.",
    ),
    Feature::new(
        Search,
        "fixed_modifications",
        "Fixed Modifications",
        "Modifications searched as fixed.",
    ),
    Feature::new(
        Search,
        "variable_modifications",
        "Variable Modifications",
        "Modifications searched as variable.",
    ),
    Feature::new(Search, "decoy_tag", "Decoy Tag", "Accession tag of decoy sequences."),
];

static VALIDATION_FEATURES: &[Feature] = &[
    Feature::new(
        Val,
        "validated_proteins",
        "#Validated Proteins",
        "Number of validated protein groups.",
    )
    .with_children(&[Feature::new(
        Val,
        "total_proteins",
        "#Proteins",
        "Number of protein groups.",
    )]),
    Feature::new(
        Val,
        "validated_peptides",
        "#Validated Peptides",
        "Number of validated peptides.",
    )
    .with_children(&[Feature::new(
        Val,
        "total_peptides",
        "#Peptides",
        "Number of peptides.",
    )]),
    Feature::new(
        Val,
        "validated_psms",
        "#Validated PSMs",
        "Number of validated peptide-spectrum matches.",
    )
    .with_children(&[Feature::new(
        Val,
        "total_psms",
        "#PSMs",
        "Number of peptide-spectrum matches.",
    )]),
    Feature::new(Val, "protein_fdr", "Protein FDR [%]", "Protein level FDR threshold."),
    Feature::new(Val, "peptide_fdr", "Peptide FDR [%]", "Peptide level FDR threshold."),
    Feature::new(Val, "psm_fdr", "PSM FDR [%]", "PSM level FDR threshold."),
];

static PROTEIN_FEATURES: &[Feature] = &[
    Feature::new(Prot, "accession", "Main Accession", "Accession of the leading protein."),
    Feature::new(
        Prot,
        "other_proteins",
        "Other Protein(s)",
        "Accessions of the other proteins of the group.",
    ),
    Feature::new(Prot, "group_size", "#Proteins in Group", "Number of proteins in the group."),
    Feature::new(Prot, "description", "Description", "Description of the leading protein."),
    Feature::new(Prot, "sequence_length", "Protein Length", "Length of the leading protein."),
    Feature::new(
        Prot,
        "coverage",
        "Coverage [%]",
        "Sequence coverage of the leading protein by validated peptides.",
    )
    .with_children(&[Feature::new(
        Prot,
        "possible_coverage",
        "Possible Coverage [%]",
        "Coverage reachable by the theoretical peptides of the cleavage rule.",
    )]),
    Feature::new(Prot, "peptides", "#Peptides", "Number of peptides."),
    Feature::new(
        Prot,
        "validated_peptides",
        "#Validated Peptides",
        "Number of validated peptides.",
    ),
    Feature::new(
        Prot,
        "unique_peptides",
        "#Unique Peptides",
        "Number of peptides mapping to this group only.",
    ),
    Feature::new(Prot, "spectra", "#PSMs", "Number of peptide-spectrum matches."),
    Feature::new(
        Prot,
        "validated_spectra",
        "#Validated PSMs",
        "Number of validated peptide-spectrum matches.",
    ),
    Feature::new(Prot, "empai", "emPAI", "Exponentially modified protein abundance index.")
        .with_children(&[Feature::new(
            Prot,
            "observable_peptides",
            "#Observable Peptides",
            "Number of theoretical peptides under the cleavage rule.",
        )]),
    Feature::new(Prot, "nsaf", "NSAF", "Spectral abundance factor of the protein."),
    Feature::new(
        Prot,
        "modifications",
        "Variable Modifications",
        "Variable modification sites observed on the protein.",
    )
    .with_children(&[
        Feature::new(
            Prot,
            "confident_sites",
            "Confident Modification Sites",
            "Sites confidently localized in every observation.",
        ),
        Feature::new(
            Prot,
            "confident_sites_count",
            "#Confident Modification Sites",
            "Number of confidently localized sites.",
        ),
        Feature::new(
            Prot,
            "ambiguous_sites",
            "Ambiguous Modification Sites",
            "Sites lacking a confident localization in at least one observation.",
        ),
        Feature::new(
            Prot,
            "ambiguous_sites_count",
            "#Ambiguous Modification Sites",
            "Number of ambiguously localized sites.",
        ),
    ]),
    Feature::new(Prot, "score", "Score", "Protein group score."),
    Feature::new(Prot, "confidence", "Confidence [%]", "Protein group confidence."),
    Feature::new(Prot, "decoy", "Decoy", "1 for a decoy group, 0 otherwise."),
    Feature::new(Prot, "validated", "Validation", "Validation status of the group."),
];

static PEPTIDE_FEATURES: &[Feature] = &[
    Feature::new(Pep, "proteins", "Protein(s)", "Proteins the peptide maps to."),
    Feature::new(Pep, "sequence", "Sequence", "Amino acid sequence."),
    Feature::new(
        Pep,
        "modified_sequence",
        "Modified Sequence",
        "Sequence annotated with variable modifications.",
    ),
    Feature::new(
        Pep,
        "variable_modifications",
        "Variable Modifications",
        "Variable modifications and their sites.",
    )
    .with_children(&[
        Feature::new(
            Pep,
            "localization_confidence",
            "Localization Confidence",
            "Localization confidence of each variable modification site.",
        ),
        Feature::new(
            Pep,
            "probabilistic_score",
            "Probabilistic Localization Score",
            "Probabilistic localization score of each variable modification site.",
        ),
        Feature::new(
            Pep,
            "confident_sites",
            "Confident Modification Sites",
            "Sites confidently localized on every occurrence of the peptide.",
        ),
        Feature::new(
            Pep,
            "confident_sites_count",
            "#Confident Modification Sites",
            "Number of confidently localized sites.",
        ),
        Feature::new(
            Pep,
            "ambiguous_sites",
            "Ambiguous Modification Sites",
            "Sites not confidently localized on some occurrence of the peptide.",
        ),
        Feature::new(
            Pep,
            "ambiguous_sites_count",
            "#Ambiguous Modification Sites",
            "Number of ambiguously localized sites.",
        ),
    ]),
    Feature::new(
        Pep,
        "fixed_modifications",
        "Fixed Modifications",
        "Fixed modifications and their sites.",
    ),
    Feature::new(Pep, "position", "Position", "1-based start of the peptide in each protein."),
    Feature::new(
        Pep,
        "aa_before",
        "AAs Before",
        "Residues preceding the peptide, for peptides mapping to a single protein.",
    ),
    Feature::new(
        Pep,
        "aa_after",
        "AAs After",
        "Residues following the peptide, for peptides mapping to a single protein.",
    ),
    Feature::new(Pep, "unique", "Unique", "1 if the peptide maps to a single protein."),
    Feature::new(Pep, "spectra", "#PSMs", "Number of peptide-spectrum matches."),
    Feature::new(
        Pep,
        "validated_spectra",
        "#Validated PSMs",
        "Number of validated peptide-spectrum matches.",
    ),
    Feature::new(Pep, "theoretical_mass", "Theoretical Mass", "Neutral monoisotopic mass."),
    Feature::new(Pep, "score", "Score", "Peptide score."),
    Feature::new(Pep, "confidence", "Confidence [%]", "Peptide confidence."),
    Feature::new(Pep, "decoy", "Decoy", "1 for a decoy peptide, 0 otherwise."),
    Feature::new(Pep, "validated", "Validation", "Validation status of the peptide."),
];

static PSM_FEATURES: &[Feature] = &[
    Feature::new(Psm, "proteins", "Protein(s)", "Proteins the peptide maps to."),
    Feature::new(Psm, "sequence", "Sequence", "Amino acid sequence."),
    Feature::new(
        Psm,
        "modified_sequence",
        "Modified Sequence",
        "Sequence annotated with variable modifications.",
    ),
    Feature::new(
        Psm,
        "variable_modifications",
        "Variable Modifications",
        "Variable modifications and their sites.",
    ),
    Feature::new(
        Psm,
        "fixed_modifications",
        "Fixed Modifications",
        "Fixed modifications and their sites.",
    ),
    Feature::new(Psm, "spectrum_file", "Spectrum File", "File containing the spectrum."),
    Feature::new(Psm, "spectrum_title", "Spectrum Title", "Title of the spectrum."),
    Feature::new(Psm, "retention_time", "RT", "Retention time in seconds."),
    Feature::new(Psm, "measured_mz", "m/z", "Measured precursor m/z."),
    Feature::new(Psm, "measured_charge", "Measured Charge", "Precursor charge in the spectrum file."),
    Feature::new(
        Psm,
        "identification_charge",
        "Identification Charge",
        "Charge of the retained identification.",
    ),
    Feature::new(Psm, "theoretical_mass", "Theoretical Mass", "Neutral monoisotopic mass."),
    Feature::new(
        Psm,
        "precursor_error",
        "Precursor m/z Error [ppm]",
        "Deviation of the measured precursor from the theoretical m/z.",
    ),
    Feature::new(
        Psm,
        "algorithms",
        "Identification Algorithm(s)",
        "Search engines that proposed the retained peptide.",
    )
    .with_children(&[Feature::new(
        Psm,
        "best_e_value",
        "Best e-value",
        "Lowest e-value given to the retained peptide.",
    )]),
    Feature::new(Psm, "score", "Score", "PSM score."),
    Feature::new(Psm, "confidence", "Confidence [%]", "PSM confidence."),
    Feature::new(Psm, "decoy", "Decoy", "1 for a decoy match, 0 otherwise."),
    Feature::new(Psm, "validated", "Validation", "Validation status of the match."),
];

static ASSUMPTION_FEATURES: &[Feature] = &[
    Feature::new(A, "search_engine", "Search Engine", "Search engine of the assumption."),
    Feature::new(A, "rank", "Rank", "Rank of the assumption within its search engine."),
    Feature::new(A, "proteins", "Protein(s)", "Proteins the peptide maps to."),
    Feature::new(A, "sequence", "Sequence", "Amino acid sequence."),
    Feature::new(
        A,
        "modified_sequence",
        "Modified Sequence",
        "Sequence annotated with variable modifications.",
    ),
    Feature::new(
        A,
        "variable_modifications",
        "Variable Modifications",
        "Variable modifications and their sites.",
    ),
    Feature::new(A, "spectrum_file", "Spectrum File", "File containing the spectrum."),
    Feature::new(A, "spectrum_title", "Spectrum Title", "Title of the spectrum."),
    Feature::new(A, "charge", "Identification Charge", "Charge of the assumption."),
    Feature::new(A, "theoretical_mass", "Theoretical Mass", "Neutral monoisotopic mass."),
    Feature::new(
        A,
        "precursor_error",
        "Precursor m/z Error [ppm]",
        "Deviation of the measured precursor from the theoretical m/z.",
    ),
    Feature::new(A, "e_value", "e-value", "Expectation value given by the search engine."),
    Feature::new(A, "algorithm_score", "Algorithm Score", "Raw search engine score."),
    Feature::new(A, "decoy", "Decoy", "1 for a decoy assumption, 0 otherwise."),
    Feature::new(A, "validated", "Validation", "Validation status of the assumption."),
    Feature::new(
        A,
        "retained",
        "Retained as Main PSM",
        "1 if the assumption carries the peptide retained for the spectrum.",
    ),
];

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn section_ids_round_trip() {
        for family in Family::ALL {
            assert_eq!(Family::from_id(family.id()), Some(family));
        }
        assert_eq!(Family::from_id("Fragment Ions"), None);
    }

    #[test]
    fn unknown_section_is_empty() {
        assert!(features_of("Fragment Ions").is_empty());
        assert!(find("Fragment Ions", "mz").is_none());
    }

    #[test]
    fn catalog_is_consistent() {
        for family in Family::ALL {
            let features = all_features_of(family.id());
            assert!(!features.is_empty());
            let keys = features.iter().map(|f| f.key).collect::<HashSet<_>>();
            assert_eq!(keys.len(), features.len(), "duplicate key in {}", family);
            for feature in features {
                assert_eq!(feature.family, family, "{} in {}", feature.key, family);
            }
        }
    }

    #[test]
    fn expand_depth_first() {
        let modifications = find(Family::Protein.id(), "modifications").unwrap();
        assert_eq!(
            expand(modifications, true)
                .iter()
                .map(|f| f.key)
                .collect::<Vec<_>>(),
            vec![
                "modifications",
                "confident_sites",
                "confident_sites_count",
                "ambiguous_sites",
                "ambiguous_sites_count"
            ]
        );
        assert_eq!(
            expand(modifications, false)
                .iter()
                .map(|f| f.key)
                .collect::<Vec<_>>(),
            vec![
                "confident_sites",
                "confident_sites_count",
                "ambiguous_sites",
                "ambiguous_sites_count"
            ]
        );

        let leaf = find(Family::Protein.id(), "accession").unwrap();
        assert_eq!(expand(leaf, true), vec![leaf]);
        assert!(expand(leaf, false).is_empty());
    }

    #[test]
    fn stable_across_calls() {
        let a = features_of(Family::Psm.id());
        let b = features_of(Family::Psm.id());
        assert_eq!(a, b);
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn resolution_errors() {
        let peptide = Family::Peptide.id();
        assert!(resolve(peptide, "localization_confidence").is_ok());
        assert!(matches!(
            resolve(peptide, "empai"),
            Err(Error::FamilyMismatch { family, .. }) if family == Family::Protein.id()
        ));
        assert!(matches!(
            resolve(peptide, "not_a_feature"),
            Err(Error::UnknownFeature { .. })
        ));
    }
}
