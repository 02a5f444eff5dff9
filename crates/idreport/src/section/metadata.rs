//! Single-row sections describing the project rather than its matches
//!
//! Validation filters do not apply here.

use crate::feature::{Family, Feature};
use crate::identification::MatchKey;
use crate::store::MatchStore;
use crate::Error;

use super::{
    count_validated, int, unknown, Filters, ReportContext, SectionGenerator, SectionRows,
};

pub struct ProjectDetailsSection;
pub struct SearchParametersSection;
pub struct ValidationSummarySection;

/// Metadata sections have exactly one row, keyed by the section itself
fn single_row(section: &'static str) -> Vec<MatchKey> {
    vec![MatchKey::from(section)]
}

fn write_row<F>(
    columns: &[&'static Feature],
    rows: &mut SectionRows,
    mut value: F,
) -> Result<(), Error>
where
    F: FnMut(&Feature) -> Result<String, Error>,
{
    rows.check()?;
    let row = columns
        .iter()
        .map(|feature| value(feature))
        .collect::<Result<Vec<_>, _>>()?;
    rows.push(row)
}

impl SectionGenerator for ProjectDetailsSection {
    fn section(&self) -> &'static str {
        Family::ProjectDetails.id()
    }

    fn keys(&self, _: &dyn MatchStore) -> Result<Vec<MatchKey>, Error> {
        Ok(single_row(self.section()))
    }

    fn write_section(
        &self,
        ctx: &ReportContext,
        columns: &[&'static Feature],
        _: &[MatchKey],
        _: Filters,
        rows: &mut SectionRows,
    ) -> Result<(), Error> {
        let project = ctx.project;
        write_row(columns, rows, |feature| {
            Ok(match feature.key {
                "project_name" => project.name.clone(),
                "sample" => project.sample.clone(),
                "replicate" => int(project.replicate),
                "creation_date" => project.created.clone(),
                "software_version" => env!("CARGO_PKG_VERSION").to_string(),
                "identification_algorithms" => project.identification_algorithms.join(", "),
                "spectrum_files" => project.spectrum_files.join(", "),
                "database" => project.database.clone(),
                _ => return Err(unknown(self.section(), feature)),
            })
        })
    }
}

impl SectionGenerator for SearchParametersSection {
    fn section(&self) -> &'static str {
        Family::SearchParameters.id()
    }

    fn keys(&self, _: &dyn MatchStore) -> Result<Vec<MatchKey>, Error> {
        Ok(single_row(self.section()))
    }

    fn write_section(
        &self,
        ctx: &ReportContext,
        columns: &[&'static Feature],
        _: &[MatchKey],
        _: Filters,
        rows: &mut SectionRows,
    ) -> Result<(), Error> {
        let settings = ctx.settings;
        write_row(columns, rows, |feature| {
            Ok(match feature.key {
                "enzyme" => settings.enzyme.clone(),
                "missed_cleavages" => int(settings.digestion.missed_cleavages),
                "peptide_length" => format!(
                    "{}-{}",
                    settings.digestion.min_len, settings.digestion.max_len
                ),
                "precursor_tolerance" => settings.precursor_tol.to_string(),
                "fragment_tolerance" => settings.fragment_tol.to_string(),
                "fixed_modifications" => settings.fixed_modifications.join(", "),
                "variable_modifications" => settings.variable_modifications.join(", "),
                "decoy_tag" => settings.decoy_tag.clone(),
                _ => return Err(unknown(self.section(), feature)),
            })
        })
    }
}

impl SectionGenerator for ValidationSummarySection {
    fn section(&self) -> &'static str {
        Family::ValidationSummary.id()
    }

    fn keys(&self, _: &dyn MatchStore) -> Result<Vec<MatchKey>, Error> {
        Ok(single_row(self.section()))
    }

    fn write_section(
        &self,
        ctx: &ReportContext,
        columns: &[&'static Feature],
        _: &[MatchKey],
        _: Filters,
        rows: &mut SectionRows,
    ) -> Result<(), Error> {
        let wants = |level: &str| columns.iter().any(|f| f.key.ends_with(level));
        // Only walk the levels a column asks for
        let proteins = match wants("proteins") {
            true => count_validated(ctx.store, &ctx.store.protein_keys()?)?,
            false => (0, 0),
        };
        let peptides = match wants("peptides") {
            true => count_validated(ctx.store, &ctx.store.peptide_keys()?)?,
            false => (0, 0),
        };
        let psms = match wants("psms") {
            true => count_validated(ctx.store, &ctx.store.spectrum_keys()?)?,
            false => (0, 0),
        };

        let settings = ctx.settings;
        write_row(columns, rows, |feature| {
            Ok(match feature.key {
                "validated_proteins" => int(proteins.1),
                "total_proteins" => int(proteins.0),
                "validated_peptides" => int(peptides.1),
                "total_peptides" => int(peptides.0),
                "validated_psms" => int(psms.1),
                "total_psms" => int(psms.0),
                "protein_fdr" => format!("{:.2}", settings.protein_fdr),
                "peptide_fdr" => format!("{:.2}", settings.peptide_fdr),
                "psm_fdr" => format!("{:.2}", settings.psm_fdr),
                _ => return Err(unknown(self.section(), feature)),
            })
        })
    }
}
