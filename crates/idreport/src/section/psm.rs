use crate::feature::{Family, Feature};
use crate::identification::{Assumption, MatchKey, SpectrumMatch, ValidationParameter};
use crate::mass::ppm_error;
use crate::store::MatchStore;
use crate::Error;

use super::{
    float, int, optional, unknown, validation_value, Filters, ReportContext, SectionGenerator,
    SectionRows,
};

pub struct PsmSection;

/// Assumptions of any search engine that proposed the retained peptide
fn supporting<'a>(spectrum: &'a SpectrumMatch, best: &'a Assumption) -> Vec<&'a Assumption> {
    spectrum
        .assumptions
        .iter()
        .filter(|a| a.peptide.is_same_peptide(&best.peptide))
        .chain(std::iter::once(best))
        .collect()
}

impl PsmSection {
    fn value(
        spectrum: &SpectrumMatch,
        validation: Option<&ValidationParameter>,
        feature: &Feature,
    ) -> Result<String, Error> {
        let best = spectrum.best.as_ref();
        let peptide = best.map(|b| &b.peptide);
        let mass = peptide.and_then(|p| p.monoisotopic());

        let value = match feature.key {
            "proteins" => optional(peptide, |p| p.proteins.join("; ")),
            "sequence" => optional(peptide, |p| p.sequence.clone()),
            "modified_sequence" => optional(peptide, |p| p.modified_sequence()),
            "variable_modifications" => optional(peptide, |p| {
                p.modification_summary(p.variable_modifications())
            }),
            "fixed_modifications" => {
                optional(peptide, |p| p.modification_summary(p.fixed_modifications()))
            }
            "spectrum_file" => spectrum.file.clone(),
            "spectrum_title" => spectrum.title.clone(),
            "retention_time" => optional(spectrum.retention_time, float),
            "measured_mz" => float(spectrum.precursor_mz),
            "measured_charge" => optional(spectrum.charge, int),
            "identification_charge" => optional(best, |b| int(b.charge)),
            "theoretical_mass" => optional(mass, float),
            "precursor_error" => optional(mass.zip(best), |(mass, best)| {
                format!("{:.2}", ppm_error(mass, spectrum.precursor_mz, best.charge))
            }),
            "algorithms" => optional(best, |best| {
                let mut engines = supporting(spectrum, best)
                    .into_iter()
                    .map(|a| a.engine.as_str())
                    .collect::<Vec<_>>();
                engines.sort_unstable();
                engines.dedup();
                engines.join(", ")
            }),
            "best_e_value" => optional(best, |best| {
                let e_value = supporting(spectrum, best)
                    .into_iter()
                    .map(|a| a.e_value)
                    .fold(f64::INFINITY, f64::min);
                float(e_value)
            }),
            key => validation_value(validation, key)
                .ok_or_else(|| unknown(Family::Psm.id(), feature))?,
        };
        Ok(value)
    }
}

impl SectionGenerator for PsmSection {
    fn section(&self) -> &'static str {
        Family::Psm.id()
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
            let validation = ctx.store.validation(key)?;
            if !filters.admits(validation.as_ref()) {
                continue;
            }

            let row = columns
                .iter()
                .map(|feature| Self::value(&spectrum, validation.as_ref(), feature))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::feature::find;
    use crate::peptide::Peptide;

    fn assumption(key: &str, engine: &str, sequence: &str, e_value: f64) -> Assumption {
        Assumption {
            key: key.into(),
            engine: engine.into(),
            peptide: Peptide::new(sequence).with_proteins(["P1"]),
            charge: 2,
            e_value,
            score: None,
        }
    }

    fn spectrum() -> SpectrumMatch {
        SpectrumMatch {
            key: "s1".into(),
            file: "run.mgf".into(),
            title: "scan=1".into(),
            precursor_mz: 400.68,
            charge: Some(2),
            retention_time: None,
            best: Some(assumption("best", "Sage", "PEPTIDE", 0.001)),
            assumptions: vec![
                assumption("a1", "X!Tandem", "PEPTIDE", 0.0005),
                assumption("a2", "X!Tandem", "PEPTLDE", 0.01),
                assumption("a3", "MS-GF+", "PEPTIDE", 0.02),
            ],
        }
    }

    fn value(spectrum: &SpectrumMatch, key: &str) -> String {
        let feature = find(Family::Psm.id(), key).unwrap();
        PsmSection::value(spectrum, None, feature).unwrap()
    }

    #[test]
    fn algorithms_supporting_the_best_peptide() {
        let spectrum = spectrum();
        assert_eq!(value(&spectrum, "algorithms"), "MS-GF+, Sage, X!Tandem");
        assert_eq!(value(&spectrum, "best_e_value"), "0.0005");
        assert_eq!(value(&spectrum, "identification_charge"), "2");
        assert_eq!(value(&spectrum, "retention_time"), "");
    }

    #[test]
    fn precursor_error() {
        let spectrum = spectrum();
        let error = value(&spectrum, "precursor_error").parse::<f64>().unwrap();
        // PEPTIDE: 799.35995 Da, 2+ -> 400.68725 m/z
        assert!((error + 18.1).abs() < 0.1, "{}", error);
    }

    #[test]
    fn unidentified_spectrum() {
        let mut spectrum = spectrum();
        spectrum.best = None;
        assert_eq!(value(&spectrum, "sequence"), "");
        assert_eq!(value(&spectrum, "algorithms"), "");
        assert_eq!(value(&spectrum, "spectrum_title"), "scan=1");
    }
}
