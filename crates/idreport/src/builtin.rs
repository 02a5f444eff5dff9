//! Report schemes shipped with the engine
//!
//! Recomputed on every call and never persisted.

use crate::feature::Family;
use crate::scheme::Scheme;

pub const PROTEIN_REPORT: &str = "Default Protein Report";
pub const PEPTIDE_REPORT: &str = "Default Peptide Report";
pub const PSM_REPORT: &str = "Default PSM Report";
pub const EXTENDED_PSM_REPORT: &str = "Extended PSM Report";
pub const PROTEIN_PHOSPHO_REPORT: &str = "Default Protein Phosphorylation Report";
pub const PEPTIDE_PHOSPHO_REPORT: &str = "Default Peptide Phosphorylation Report";
pub const HIERARCHICAL_REPORT: &str = "Default Hierarchical Report";
pub const CERTIFICATE_OF_ANALYSIS: &str = "Certificate of Analysis";

const PROTEIN_COLUMNS: &[&str] = &[
    "accession",
    "other_proteins",
    "description",
    "coverage",
    "possible_coverage",
    "peptides",
    "validated_peptides",
    "unique_peptides",
    "spectra",
    "validated_spectra",
    "nsaf",
    "confident_sites",
    "confident_sites_count",
    "ambiguous_sites",
    "ambiguous_sites_count",
    "score",
    "confidence",
    "decoy",
    "validated",
];

const PEPTIDE_COLUMNS: &[&str] = &[
    "proteins",
    "sequence",
    "modified_sequence",
    "variable_modifications",
    "localization_confidence",
    "fixed_modifications",
    "position",
    "aa_before",
    "aa_after",
    "spectra",
    "validated_spectra",
    "score",
    "confidence",
    "decoy",
    "validated",
];

const PSM_COLUMNS: &[&str] = &[
    "proteins",
    "sequence",
    "modified_sequence",
    "variable_modifications",
    "fixed_modifications",
    "spectrum_file",
    "spectrum_title",
    "retention_time",
    "measured_mz",
    "measured_charge",
    "identification_charge",
    "theoretical_mass",
    "precursor_error",
    "score",
    "confidence",
    "decoy",
    "validated",
];

/// Names of the built-in schemes, in factory order
pub fn names() -> Vec<&'static str> {
    vec![
        PROTEIN_REPORT,
        PEPTIDE_REPORT,
        PSM_REPORT,
        EXTENDED_PSM_REPORT,
        PROTEIN_PHOSPHO_REPORT,
        PEPTIDE_PHOSPHO_REPORT,
        HIERARCHICAL_REPORT,
        CERTIFICATE_OF_ANALYSIS,
    ]
}

/// Every built-in scheme
pub fn schemes() -> Vec<Scheme> {
    names().into_iter().filter_map(scheme).collect()
}

/// Built-in scheme by name
pub fn scheme(name: &str) -> Option<Scheme> {
    let scheme = match name {
        PROTEIN_REPORT => Scheme::default().with_section(Family::Protein.id(), PROTEIN_COLUMNS),
        PEPTIDE_REPORT => Scheme::default().with_section(Family::Peptide.id(), PEPTIDE_COLUMNS),
        PSM_REPORT => Scheme::default().with_section(Family::Psm.id(), PSM_COLUMNS),
        EXTENDED_PSM_REPORT => Scheme::default()
            .with_section(Family::Psm.id(), PSM_COLUMNS)
            .with_section(Family::Psm.id(), &["algorithms", "best_e_value"])
            .with_section(
                Family::Assumption.id(),
                &[
                    "search_engine",
                    "rank",
                    "sequence",
                    "modified_sequence",
                    "spectrum_title",
                    "charge",
                    "theoretical_mass",
                    "precursor_error",
                    "e_value",
                    "algorithm_score",
                    "decoy",
                    "validated",
                    "retained",
                ],
            ),
        PROTEIN_PHOSPHO_REPORT => Scheme::default().with_section(
            Family::Protein.id(),
            &[
                "accession",
                "description",
                "coverage",
                "validated_peptides",
                "validated_spectra",
                "modifications",
                "confident_sites",
                "confident_sites_count",
                "ambiguous_sites",
                "ambiguous_sites_count",
                "confidence",
                "validated",
            ],
        ),
        PEPTIDE_PHOSPHO_REPORT => Scheme::default().with_section(
            Family::Peptide.id(),
            &[
                "proteins",
                "sequence",
                "modified_sequence",
                "variable_modifications",
                "localization_confidence",
                "probabilistic_score",
                "confident_sites",
                "ambiguous_sites",
                "position",
                "validated_spectra",
                "confidence",
                "validated",
            ],
        ),
        HIERARCHICAL_REPORT => Scheme::default()
            .with_section(Family::Protein.id(), PROTEIN_COLUMNS)
            .with_section(Family::Peptide.id(), PEPTIDE_COLUMNS)
            .with_section(Family::Psm.id(), PSM_COLUMNS),
        CERTIFICATE_OF_ANALYSIS => Scheme::default()
            .with_section(
                Family::ProjectDetails.id(),
                &[
                    "project_name",
                    "sample",
                    "replicate",
                    "creation_date",
                    "software_version",
                    "identification_algorithms",
                    "spectrum_files",
                    "database",
                ],
            )
            .with_section(
                Family::SearchParameters.id(),
                &[
                    "enzyme",
                    "missed_cleavages",
                    "peptide_length",
                    "precursor_tolerance",
                    "fragment_tolerance",
                    "fixed_modifications",
                    "variable_modifications",
                    "decoy_tag",
                ],
            )
            .with_section(
                Family::ValidationSummary.id(),
                &[
                    "validated_proteins",
                    "validated_peptides",
                    "validated_psms",
                    "protein_fdr",
                    "peptide_fdr",
                    "psm_fdr",
                ],
            )
            .with_sub_features(true)
            .with_index(false)
            .with_separation_lines(1)
            .with_main_title(CERTIFICATE_OF_ANALYSIS),
        _ => return None,
    };

    let mut scheme = scheme.with_editable(false);
    scheme.name = name.into();
    Some(scheme)
}
