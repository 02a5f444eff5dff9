use std::fmt::Write;

use crate::coverage::occurrences;
use crate::feature::{Family, Feature};
use crate::identification::{MatchKey, PeptideMatch, ValidationParameter};
use crate::modification::{site_confidence, ProbabilisticScore, SiteClassifier};
use crate::peptide::ModificationMatch;
use crate::store::MatchStore;
use crate::Error;

use super::{
    count_validated, flag, int, optional, unknown, validation_value, Filters, ReportContext,
    SectionGenerator, SectionRows,
};

pub struct PeptideSection;

/// Variable modifications sorted by name then site, each rendered as
/// `Name (S4: value, S6: value)`
fn per_site<F>(peptide: &PeptideMatch, mut render: F) -> String
where
    F: FnMut(&ModificationMatch) -> String,
{
    let mut mods = peptide.peptide.variable_modifications().collect::<Vec<_>>();
    mods.sort_by(|a, b| a.name.cmp(&b.name).then(a.site.cmp(&b.site)));

    let sequence = peptide.peptide.sequence.as_bytes();
    let mut out = String::new();
    let mut current: Option<&str> = None;
    for m in mods {
        let residue = sequence
            .get(m.site.saturating_sub(1))
            .map(|&b| b as char)
            .unwrap_or('?');
        if current == Some(m.name.as_str()) {
            out.push_str(", ");
        } else {
            if current.is_some() {
                out.push_str("); ");
            }
            let _ = write!(out, "{} (", m.name);
            current = Some(m.name.as_str());
        }
        let _ = write!(out, "{}{}: {}", residue, m.site, render(m));
    }
    if current.is_some() {
        out.push(')');
    }
    out
}

/// Protein sequence and 0-based starts of the peptide in each parent protein
fn locate(
    store: &dyn MatchStore,
    peptide: &PeptideMatch,
) -> Result<Vec<(String, String, Vec<usize>)>, Error> {
    let mut located = Vec::with_capacity(peptide.peptide.proteins.len());
    for accession in &peptide.peptide.proteins {
        if let Some(sequence) = store.protein_sequence(accession)? {
            let starts = occurrences(&sequence, &peptide.peptide.sequence);
            located.push((accession.clone(), sequence, starts));
        }
    }
    Ok(located)
}

/// Residues flanking each occurrence in the single parent protein; empty when
/// the peptide maps to several proteins
fn flanking(
    store: &dyn MatchStore,
    peptide: &PeptideMatch,
    residues: usize,
    before: bool,
) -> Result<String, Error> {
    if peptide.peptide.proteins.len() != 1 {
        return Ok(String::new());
    }
    let len = peptide.peptide.sequence.len();
    let flanks = locate(store, peptide)?
        .into_iter()
        .flat_map(|(_, sequence, starts)| {
            starts
                .into_iter()
                .map(|start| {
                    let range = match before {
                        true => start.saturating_sub(residues)..start,
                        false => start + len..(start + len + residues).min(sequence.len()),
                    };
                    // a range splitting a non-ASCII character has no residues to show
                    match sequence.get(range) {
                        Some("") | None => "-".to_string(),
                        Some(flank) => flank.to_string(),
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    Ok(flanks.join("; "))
}

/// Classify the variable modification sites of one peptide over its
/// occurrences in the first parent protein holding it, positions relative to
/// that protein. A peptide placed in no known protein sequence is classified
/// once, on peptide positions.
fn classify_sites(
    store: &dyn MatchStore,
    peptide: &PeptideMatch,
) -> Result<SiteClassifier, Error> {
    let placed = locate(store, peptide)?
        .into_iter()
        .find(|(_, _, starts)| !starts.is_empty());
    let (sequence, starts) = match placed {
        Some((_, sequence, starts)) => (sequence, starts),
        None => (peptide.peptide.sequence.clone(), vec![0]),
    };

    let mut sites = SiteClassifier::default();
    for start in starts {
        for modification in peptide.peptide.variable_modifications() {
            let position = start + modification.site;
            let residue = sequence
                .as_bytes()
                .get(position.saturating_sub(1))
                .map(|&b| b as char)
                .unwrap_or('?');
            let confidence = site_confidence(
                peptide.localization.as_ref(),
                &modification.name,
                modification.site,
            );
            sites.observe(&modification.name, position, residue, confidence);
        }
    }
    Ok(sites)
}

const SITE_COLUMNS: [&str; 4] = [
    "confident_sites",
    "confident_sites_count",
    "ambiguous_sites",
    "ambiguous_sites_count",
];

impl PeptideSection {
    fn value(
        ctx: &ReportContext,
        peptide: &PeptideMatch,
        validation: Option<&ValidationParameter>,
        spectra: (usize, usize),
        sites: &SiteClassifier,
        feature: &Feature,
    ) -> Result<String, Error> {
        let value = match feature.key {
            "proteins" => peptide.peptide.proteins.join("; "),
            "sequence" => peptide.peptide.sequence.clone(),
            "modified_sequence" => peptide.peptide.modified_sequence(),
            "variable_modifications" => peptide
                .peptide
                .modification_summary(peptide.peptide.variable_modifications()),
            "fixed_modifications" => peptide
                .peptide
                .modification_summary(peptide.peptide.fixed_modifications()),
            "localization_confidence" => per_site(peptide, |m| {
                site_confidence(peptide.localization.as_ref(), &m.name, m.site).to_string()
            }),
            "probabilistic_score" => {
                let score: ProbabilisticScore = ctx.settings.probabilistic_score()?;
                per_site(peptide, |m| {
                    peptide
                        .localization
                        .as_ref()
                        .and_then(|scores| scores.site(&m.name, m.site))
                        .and_then(|site| site.probabilistic(score))
                        .map(|value| format!("{:.2}", value))
                        .unwrap_or_else(|| "-".into())
                })
            }
            "position" => locate(ctx.store, peptide)?
                .into_iter()
                .map(|(accession, _, starts)| {
                    let starts = starts
                        .into_iter()
                        .map(|start| int(start + 1))
                        .collect::<Vec<_>>();
                    format!("{} ({})", accession, starts.join(", "))
                })
                .collect::<Vec<_>>()
                .join("; "),
            "confident_sites" => sites.confident(),
            "confident_sites_count" => int(sites.confident_count()),
            "ambiguous_sites" => sites.ambiguous(),
            "ambiguous_sites_count" => int(sites.ambiguous_count()),
            "aa_before" => flanking(ctx.store, peptide, ctx.settings.flanking_residues, true)?,
            "aa_after" => flanking(ctx.store, peptide, ctx.settings.flanking_residues, false)?,
            "unique" => flag(peptide.peptide.proteins.len() == 1),
            "spectra" => int(spectra.0),
            "validated_spectra" => int(spectra.1),
            "theoretical_mass" => optional(peptide.peptide.monoisotopic(), super::float),
            key => validation_value(validation, key)
                .ok_or_else(|| unknown(Family::Peptide.id(), feature))?,
        };
        Ok(value)
    }
}

impl SectionGenerator for PeptideSection {
    fn section(&self) -> &'static str {
        Family::Peptide.id()
    }

    fn keys(&self, store: &dyn MatchStore) -> Result<Vec<MatchKey>, Error> {
        store.peptide_keys()
    }

    fn check_columns(&self, ctx: &ReportContext, columns: &[&'static Feature]) -> Result<(), Error> {
        if columns.iter().any(|f| f.key == "probabilistic_score") {
            ctx.settings.probabilistic_score()?;
        }
        Ok(())
    }

    fn write_section(
        &self,
        ctx: &ReportContext,
        columns: &[&'static Feature],
        keys: &[MatchKey],
        filters: Filters,
        rows: &mut SectionRows,
    ) -> Result<(), Error> {
        let wants_sites = columns.iter().any(|f| SITE_COLUMNS.contains(&f.key));
        for key in keys {
            rows.check()?;
            let peptide = match ctx.store.peptide(key)? {
                Some(peptide) => peptide,
                None => {
                    log::debug!("peptide {} is not in the store, skipping", key);
                    continue;
                }
            };
            let validation = ctx.store.validation(key)?;
            if !filters.admits(validation.as_ref()) {
                continue;
            }

            let spectra = count_validated(ctx.store, &peptide.spectra)?;
            let sites = match wants_sites {
                true => classify_sites(ctx.store, &peptide)?,
                false => SiteClassifier::default(),
            };
            let row = columns
                .iter()
                .map(|feature| {
                    Self::value(ctx, &peptide, validation.as_ref(), spectra, &sites, feature)
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row)?;
        }
        Ok(())
    }
}
