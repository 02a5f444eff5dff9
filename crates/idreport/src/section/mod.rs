//! Section generators: one per section family, each streaming rows out of
//! the match store
//!
//! Generators walk the hierarchy one match at a time. Counts always describe
//! the unfiltered hierarchy below a row; filters only decide whether the row
//! itself is written.

use fnv::FnvHashMap;

use crate::export::Cancellation;
use crate::feature::Feature;
use crate::identification::{MatchKey, ProjectDetails, ValidationParameter};
use crate::settings::ReportSettings;
use crate::store::MatchStore;
use crate::writer::ReportWriter;
use crate::Error;

pub mod assumption;
pub mod metadata;
pub mod peptide;
pub mod protein;
pub mod psm;

/// Row selection predicates
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Filters {
    pub validated_only: bool,
    pub include_decoys: bool,
}

impl Filters {
    /// A match without validation parameters is neither validated nor a decoy
    pub fn admits(&self, validation: Option<&ValidationParameter>) -> bool {
        let validated = validation.map(|v| v.validated).unwrap_or(false);
        let decoy = validation.map(|v| v.decoy).unwrap_or(false);
        (validated || !self.validated_only) && (!decoy || self.include_decoys)
    }
}

/// Everything a generator reads from
#[derive(Copy, Clone)]
pub struct ReportContext<'a> {
    pub store: &'a dyn MatchStore,
    pub settings: &'a ReportSettings,
    pub project: &'a ProjectDetails,
}

/// Row sink for one section: numbers rows when the scheme asks for an index
/// and surfaces cancellation between rows
pub struct SectionRows<'a> {
    writer: &'a mut dyn ReportWriter,
    cancel: &'a Cancellation,
    index: bool,
    written: usize,
}

impl<'a> SectionRows<'a> {
    pub fn new(writer: &'a mut dyn ReportWriter, cancel: &'a Cancellation, index: bool) -> Self {
        SectionRows {
            writer,
            cancel,
            index,
            written: 0,
        }
    }

    /// Call before building each row
    pub fn check(&self) -> Result<(), Error> {
        match self.cancel.is_cancelled() {
            true => Err(Error::Cancelled),
            false => Ok(()),
        }
    }

    pub fn push(&mut self, mut row: Vec<String>) -> Result<(), Error> {
        self.written += 1;
        if self.index {
            row.insert(0, int(self.written));
        }
        self.writer.write_data_row(&row)
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

pub trait SectionGenerator {
    /// Section identifier this generator renders
    fn section(&self) -> &'static str;

    /// Keys of the matches that make up the rows of this section
    fn keys(&self, store: &dyn MatchStore) -> Result<Vec<MatchKey>, Error>;

    /// Reject column sets this generator cannot render before anything is written
    fn check_columns(&self, _: &ReportContext, _: &[&'static Feature]) -> Result<(), Error> {
        Ok(())
    }

    fn write_section(
        &self,
        ctx: &ReportContext,
        columns: &[&'static Feature],
        keys: &[MatchKey],
        filters: Filters,
        rows: &mut SectionRows,
    ) -> Result<(), Error>;
}

/// Dispatch table from section identifier to generator
pub struct Generators {
    generators: FnvHashMap<&'static str, Box<dyn SectionGenerator>>,
}

impl Generators {
    pub fn empty() -> Self {
        Generators {
            generators: FnvHashMap::default(),
        }
    }

    /// Register a generator, replacing any previous one for the same section
    pub fn register(&mut self, generator: Box<dyn SectionGenerator>) {
        self.generators.insert(generator.section(), generator);
    }

    pub fn get(&self, section: &str) -> Result<&dyn SectionGenerator, Error> {
        self.generators
            .get(section)
            .map(|g| g.as_ref())
            .ok_or_else(|| Error::SectionNotImplemented(section.into()))
    }
}

impl Default for Generators {
    fn default() -> Self {
        let mut generators = Generators::empty();
        generators.register(Box::new(metadata::ProjectDetailsSection));
        generators.register(Box::new(metadata::SearchParametersSection));
        generators.register(Box::new(metadata::ValidationSummarySection));
        generators.register(Box::new(protein::ProteinSection));
        generators.register(Box::new(peptide::PeptideSection));
        generators.register(Box::new(psm::PsmSection));
        generators.register(Box::new(assumption::AssumptionSection));
        generators
    }
}

/// A column the generator has no value for
pub(crate) fn unknown(section: &str, feature: &Feature) -> Error {
    Error::UnknownFeature {
        section: section.into(),
        feature: feature.key.into(),
    }
}

/// (total, validated) among `keys`. Keys the store no longer holds are
/// skipped; a key without validation parameters still counts towards the
/// total.
pub(crate) fn count_validated(
    store: &dyn MatchStore,
    keys: &[MatchKey],
) -> Result<(usize, usize), Error> {
    let (mut total, mut validated) = (0, 0);
    for key in keys {
        if !store.contains(key)? {
            log::debug!("match {} is not in the store, not counted", key);
            continue;
        }
        total += 1;
        if is_validated(store.validation(key)?.as_ref()) {
            validated += 1;
        }
    }
    Ok((total, validated))
}

pub(crate) fn is_validated(validation: Option<&ValidationParameter>) -> bool {
    validation.map(|v| v.validated).unwrap_or(false)
}

pub(crate) fn int<I: itoa::Integer>(value: I) -> String {
    itoa::Buffer::new().format(value).to_string()
}

pub(crate) fn float(value: f64) -> String {
    ryu::Buffer::new().format(value).to_string()
}

/// Fraction in [0, 1] shown as a percentage with two decimals
pub(crate) fn percent(fraction: f64) -> String {
    format!("{:.2}", fraction * 100.0)
}

pub(crate) fn flag(value: bool) -> String {
    match value {
        true => "1".into(),
        false => "0".into(),
    }
}

pub(crate) fn optional<T, F: FnOnce(T) -> String>(value: Option<T>, f: F) -> String {
    value.map(f).unwrap_or_default()
}

/// Columns every match level shares: score, confidence, decoy and validation
pub(crate) fn validation_value(
    validation: Option<&ValidationParameter>,
    key: &str,
) -> Option<String> {
    let value = match key {
        "score" => optional(validation, |v| float(v.score)),
        "confidence" => optional(validation, |v| format!("{:.2}", v.confidence)),
        "decoy" => flag(validation.map(|v| v.decoy).unwrap_or(false)),
        "validated" => match validation {
            Some(v) if v.validated => "Validated".into(),
            Some(_) => "Not Validated".into(),
            None => String::new(),
        },
        _ => return None,
    };
    Some(value)
}
