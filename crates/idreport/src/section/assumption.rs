use crate::feature::{Family, Feature};
use crate::identification::{Assumption, MatchKey, SpectrumMatch, ValidationParameter};
use crate::mass::ppm_error;
use crate::store::MatchStore;
use crate::Error;

use super::{
    flag, float, int, optional, unknown, validation_value, Filters, ReportContext,
    SectionGenerator, SectionRows,
};

pub struct AssumptionSection;

/// Rank assumptions per search engine by ascending e-value.
///
/// Engines appear in first-seen order. The sort is stable: assumptions with
/// equal e-values keep their original order and take consecutive ranks.
pub fn rank_assumptions(assumptions: &[Assumption]) -> Vec<(usize, &Assumption)> {
    let mut engines: Vec<&str> = Vec::new();
    for assumption in assumptions {
        if !engines.contains(&assumption.engine.as_str()) {
            engines.push(&assumption.engine);
        }
    }

    let mut ranked = Vec::with_capacity(assumptions.len());
    for engine in engines {
        let mut group = assumptions
            .iter()
            .filter(|a| a.engine == engine)
            .collect::<Vec<_>>();
        group.sort_by(|a, b| a.e_value.total_cmp(&b.e_value));
        ranked.extend(group.into_iter().enumerate().map(|(ix, a)| (ix + 1, a)));
    }
    ranked
}

impl AssumptionSection {
    fn value(
        spectrum: &SpectrumMatch,
        assumption: &Assumption,
        rank: usize,
        validation: Option<&ValidationParameter>,
        feature: &Feature,
    ) -> Result<String, Error> {
        let peptide = &assumption.peptide;
        let mass = peptide.monoisotopic();

        let value = match feature.key {
            "search_engine" => assumption.engine.clone(),
            "rank" => int(rank),
            "proteins" => peptide.proteins.join("; "),
            "sequence" => peptide.sequence.clone(),
            "modified_sequence" => peptide.modified_sequence(),
            "variable_modifications" => {
                peptide.modification_summary(peptide.variable_modifications())
            }
            "spectrum_file" => spectrum.file.clone(),
            "spectrum_title" => spectrum.title.clone(),
            "charge" => int(assumption.charge),
            "theoretical_mass" => optional(mass, float),
            "precursor_error" => optional(mass, |mass| {
                format!(
                    "{:.2}",
                    ppm_error(mass, spectrum.precursor_mz, assumption.charge)
                )
            }),
            "e_value" => float(assumption.e_value),
            "algorithm_score" => optional(assumption.score, float),
            "retained" => flag(
                spectrum
                    .best
                    .as_ref()
                    .map(|best| best.peptide.is_same_peptide(peptide))
                    .unwrap_or(false),
            ),
            key => validation_value(validation, key)
                .ok_or_else(|| unknown(Family::Assumption.id(), feature))?,
        };
        Ok(value)
    }
}

impl SectionGenerator for AssumptionSection {
    fn section(&self) -> &'static str {
        Family::Assumption.id()
    }

    fn keys(&self, store: &dyn MatchStore) -> Result<Vec<MatchKey>, Error> {
        store.spectrum_keys()
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
            let spectrum = match ctx.store.spectrum(key)? {
                Some(spectrum) => spectrum,
                None => {
                    log::debug!("spectrum match {} is not in the store, skipping", key);
                    continue;
                }
            };
            let spectrum_validation = ctx.store.validation(key)?;

            for (rank, assumption) in rank_assumptions(&spectrum.assumptions) {
                rows.check()?;
                let validation = ctx.store.validation(&assumption.key)?.or(spectrum_validation);
                if !filters.admits(validation.as_ref()) {
                    continue;
                }
                let row = columns
                    .iter()
                    .map(|feature| {
                        Self::value(&spectrum, assumption, rank, validation.as_ref(), feature)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                rows.push(row)?;
            }
        }
        Ok(())
    }
}
