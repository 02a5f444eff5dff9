use crate::coverage::{occurrences, possible_coverage, sequence_coverage};
use crate::feature::{Family, Feature};
use crate::identification::{MatchKey, ProteinGroupMatch, ValidationParameter};
use crate::modification::{site_confidence, SiteClassifier};
use crate::spectrum_counting::{empai, nsaf};
use crate::store::MatchStore;
use crate::Error;

use super::{
    count_validated, int, optional, percent, unknown, validation_value, Filters, ReportContext,
    SectionGenerator, SectionRows,
};

pub struct ProteinSection;

/// Aggregates of one protein group over its peptides
#[derive(Debug, Default)]
pub(crate) struct ProteinSummary {
    /// Sequence of the leading protein, when the store knows it
    pub sequence: Option<String>,
    pub peptides: usize,
    pub validated_peptides: usize,
    pub unique_peptides: usize,
    pub spectra: usize,
    pub validated_spectra: usize,
    /// Sequences of the validated peptides, the basis of sequence coverage
    pub validated_sequences: Vec<String>,
    pub sites: SiteClassifier,
}

impl ProteinSummary {
    pub fn collect(store: &dyn MatchStore, group: &ProteinGroupMatch) -> Result<Self, Error> {
        let mut summary = ProteinSummary {
            sequence: store.protein_sequence(group.main_accession())?,
            ..Default::default()
        };

        for key in &group.peptides {
            let peptide_match = match store.peptide(key)? {
                Some(peptide_match) => peptide_match,
                None => {
                    log::debug!(
                        "peptide {} of protein group {} is not in the store",
                        key,
                        group.key
                    );
                    continue;
                }
            };
            let peptide = &peptide_match.peptide;
            let validated = super::is_validated(store.validation(key)?.as_ref());

            summary.peptides += 1;
            if validated {
                summary.validated_peptides += 1;
                summary.validated_sequences.push(peptide.sequence.clone());
            }
            if peptide
                .proteins
                .iter()
                .all(|accession| group.accessions.contains(accession))
            {
                summary.unique_peptides += 1;
            }

            let (spectra, validated_spectra) = count_validated(store, &peptide_match.spectra)?;
            summary.spectra += spectra;
            summary.validated_spectra += validated_spectra;

            // Sites are placed on the leading protein, once per occurrence
            if let Some(protein) = summary.sequence.as_deref() {
                for start in occurrences(protein, &peptide.sequence) {
                    for modification in peptide.variable_modifications() {
                        let position = start + modification.site;
                        let residue = protein
                            .as_bytes()
                            .get(position.saturating_sub(1))
                            .map(|&b| b as char)
                            .unwrap_or('?');
                        let confidence = site_confidence(
                            peptide_match.localization.as_ref(),
                            &modification.name,
                            modification.site,
                        );
                        summary
                            .sites
                            .observe(&modification.name, position, residue, confidence);
                    }
                }
            }
        }
        Ok(summary)
    }

    pub fn coverage(&self) -> Option<f64> {
        let protein = self.sequence.as_deref()?;
        Some(sequence_coverage(
            protein,
            self.validated_sequences.iter().map(String::as_str),
        ))
    }
}

impl ProteinSection {
    fn value(
        ctx: &ReportContext,
        group: &ProteinGroupMatch,
        validation: Option<&ValidationParameter>,
        summary: &ProteinSummary,
        feature: &Feature,
    ) -> Result<String, Error> {
        let sequence = summary.sequence.as_deref();
        let observable = || sequence.map(|s| ctx.settings.digestion.digest(s).len());

        let value = match feature.key {
            "accession" => group.main_accession().to_string(),
            "other_proteins" => group.accessions[1.min(group.accessions.len())..].join("; "),
            "group_size" => int(group.accessions.len()),
            "description" => group.description.clone().unwrap_or_default(),
            "sequence_length" => optional(sequence, |s| int(s.len())),
            "coverage" => optional(summary.coverage(), percent),
            "possible_coverage" => optional(sequence, |s| {
                percent(possible_coverage(s, &ctx.settings.digestion))
            }),
            "peptides" => int(summary.peptides),
            "validated_peptides" => int(summary.validated_peptides),
            "unique_peptides" => int(summary.unique_peptides),
            "spectra" => int(summary.spectra),
            "validated_spectra" => int(summary.validated_spectra),
            "empai" => optional(observable(), |n| {
                format!("{:.4}", empai(summary.validated_peptides, n))
            }),
            "observable_peptides" => optional(observable(), int),
            "nsaf" => optional(sequence, |s| {
                super::float(nsaf(summary.validated_spectra, s.len()))
            }),
            "modifications" => summary.sites.all(),
            "confident_sites" => summary.sites.confident(),
            "confident_sites_count" => int(summary.sites.confident_count()),
            "ambiguous_sites" => summary.sites.ambiguous(),
            "ambiguous_sites_count" => int(summary.sites.ambiguous_count()),
            key => validation_value(validation, key)
                .ok_or_else(|| unknown(Family::Protein.id(), feature))?,
        };
        Ok(value)
    }
}

impl SectionGenerator for ProteinSection {
    fn section(&self) -> &'static str {
        Family::Protein.id()
    }

    fn keys(&self, store: &dyn MatchStore) -> Result<Vec<MatchKey>, Error> {
        store.protein_keys()
    }

    fn write_section(
        &self,
        ctx: &ReportContext,
        columns: &[&'static Feature],
        keys: &[MatchKey],
        filters: Filters,
        rows: &mut SectionRows,
    ) -> Result<(), Error> {
        for key in keys {
            rows.check()?;
            let group = match ctx.store.protein_group(key)? {
                Some(group) => group,
                None => {
                    log::debug!("protein group {} is not in the store, skipping", key);
                    continue;
                }
            };
            let validation = ctx.store.validation(key)?;
            if !filters.admits(validation.as_ref()) {
                continue;
            }

            let summary = ProteinSummary::collect(ctx.store, &group)?;
            let row = columns
                .iter()
                .map(|feature| Self::value(ctx, &group, validation.as_ref(), &summary, feature))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::identification::PeptideMatch;
    use crate::modification::{Confidence, LocalizationScores, SiteScore};
    use crate::peptide::Peptide;
    use crate::section::test::validation;
    use crate::store::MemoryStore;

    const PROTEIN: &str = "MSPEPSTIDEKAAMSPEPSTIDEKR";

    fn phospho(key: &str, sequence: &str, confidence: Confidence) -> PeptideMatch {
        PeptideMatch {
            key: key.into(),
            peptide: Peptide::new(sequence)
                .with_proteins(["P1"])
                .with_modification("Phosphorylation of S", 79.96633, 1, true),
            spectra: vec![format!("{}_s1", key).into(), format!("{}_s2", key).into()],
            localization: Some(LocalizationScores {
                sites: vec![SiteScore {
                    modification: "Phosphorylation of S".into(),
                    site: 1,
                    confidence,
                    phosphors: Some(99.0),
                    ascore: None,
                }],
            }),
        }
    }

    fn store(confidences: &[Confidence]) -> MemoryStore {
        let mut store = MemoryStore::default();
        store.insert_sequence("P1", PROTEIN);
        let mut peptides = Vec::new();
        for (ix, &confidence) in confidences.iter().enumerate() {
            let key = format!("pep{}", ix);
            store.insert_peptide(phospho(&key, "SPEPSTIDEK", confidence));
            store.set_validation(key.as_str(), validation(ix % 2 == 0, false));
            store.set_validation(format!("{}_s1", key), validation(true, false));
            store.set_validation(format!("{}_s2", key), validation(ix == 0, false));
            peptides.push(MatchKey::from(key));
        }
        store.insert_protein(ProteinGroupMatch {
            key: "pg".into(),
            accessions: vec!["P1".into()],
            peptides,
            description: None,
        });
        store
    }

    fn summary(store: &MemoryStore) -> ProteinSummary {
        let group = store.protein_group(&"pg".into()).unwrap().unwrap();
        ProteinSummary::collect(store, &group).unwrap()
    }

    #[test]
    fn confident_in_every_observation() {
        // 2 peptides x 2 occurrences: 4 observations of each site
        let store = store(&[Confidence::Confident, Confidence::VeryConfident]);
        let summary = summary(&store);
        assert_eq!(summary.sites.is_confident("Phosphorylation of S", 2), Some(true));
        assert_eq!(summary.sites.is_confident("Phosphorylation of S", 15), Some(true));
        assert_eq!(summary.sites.confident(), "Phosphorylation of S (S2, S15)");
        assert_eq!(summary.sites.ambiguous_count(), 0);
    }

    #[test]
    fn one_doubtful_observation_makes_it_ambiguous() {
        let store = store(&[Confidence::Confident, Confidence::Doubtful]);
        let summary = summary(&store);
        assert_eq!(summary.sites.is_confident("Phosphorylation of S", 2), Some(false));
        assert_eq!(summary.sites.confident_count(), 0);
        assert_eq!(summary.sites.ambiguous(), "Phosphorylation of S (S2, S15)");
    }

    #[test]
    fn counts_ignore_filters() {
        let store = store(&[
            Confidence::Confident,
            Confidence::Confident,
            Confidence::Confident,
        ]);
        let summary = summary(&store);
        assert_eq!(summary.peptides, 3);
        assert_eq!(summary.validated_peptides, 2);
        assert_eq!(summary.unique_peptides, 3);
        assert_eq!(summary.spectra, 6);
        // every s1 plus pep0_s2
        assert_eq!(summary.validated_spectra, 4);
        assert_eq!(summary.coverage(), Some(20.0 / 25.0));
    }

    #[test]
    fn missing_peptides_are_skipped() {
        let mut store = store(&[Confidence::Confident]);
        store.insert_protein(ProteinGroupMatch {
            key: "pg2".into(),
            accessions: vec!["P1".into(), "P2".into()],
            peptides: vec!["pep0".into(), "gone".into()],
            description: Some("Kinase".into()),
        });
        let group = store.protein_group(&"pg2".into()).unwrap().unwrap();
        let summary = ProteinSummary::collect(&store, &group).unwrap();
        assert_eq!(summary.peptides, 1);
    }
}
