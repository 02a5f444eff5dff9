use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::feature::Feature;
use crate::scheme::Scheme;
use crate::section::{Filters, Generators, ReportContext, SectionGenerator, SectionRows};
use crate::writer::ReportWriter;
use crate::Error;

/// Cooperative cancellation flag, checked between rows
#[derive(Clone, Debug, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Data rows written per section, in scheme order
    pub rows: Vec<(String, usize)>,
}

impl ExportSummary {
    pub fn total_rows(&self) -> usize {
        self.rows.iter().map(|(_, n)| n).sum()
    }
}

struct Plan<'g> {
    section: &'g str,
    generator: &'g dyn SectionGenerator,
    columns: Vec<&'static Feature>,
}

/// Render `scheme` into `writer`.
///
/// Every section is resolved before anything is written, so configuration
/// errors leave the destination untouched. A failure or cancellation while
/// writing leaves partial output behind, for the caller to discard.
pub fn write_export(
    scheme: &Scheme,
    writer: &mut dyn ReportWriter,
    ctx: &ReportContext,
    generators: &Generators,
    cancel: &Cancellation,
) -> Result<ExportSummary, Error> {
    let mut plans = Vec::with_capacity(scheme.sections.len());
    for section in &scheme.sections {
        let generator = generators.get(section)?;
        let columns = scheme.columns(section)?;
        generator.check_columns(ctx, &columns)?;
        plans.push(Plan {
            section,
            generator,
            columns,
        });
    }

    let filters = Filters {
        validated_only: scheme.validated_only,
        include_decoys: scheme.include_decoys,
    };

    if let Some(title) = &scheme.main_title {
        writer.write_main_title(title)?;
    }

    let mut summary = ExportSummary::default();
    for (ix, plan) in plans.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if ix > 0 {
            writer.blank_lines(scheme.separation_lines)?;
        }

        writer.start_section(scheme.section_titles.then_some(plan.section))?;
        if scheme.header {
            let mut titles = Vec::with_capacity(plan.columns.len() + 1);
            if scheme.index {
                titles.push("");
            }
            titles.extend(plan.columns.iter().map(|f| f.title));
            writer.write_header_row(&titles)?;
        }

        let keys = plan.generator.keys(ctx.store)?;
        log::debug!("{}: {} candidate rows", plan.section, keys.len());
        let mut rows = SectionRows::new(writer, cancel, scheme.index);
        plan.generator
            .write_section(ctx, &plan.columns, &keys, filters, &mut rows)?;
        summary.rows.push((plan.section.to_string(), rows.written()));
    }

    writer.close()?;
    log::info!(
        "exported `{}`: {} rows in {} sections",
        scheme.name,
        summary.total_rows(),
        summary.rows.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::builtin;
    use crate::feature::Family;
    use crate::identification::{ProjectDetails, SpectrumMatch};
    use crate::settings::Builder;
    use crate::store::MemoryStore;
    use crate::writer::{DelimitedWriter, Workbook};

    fn export(scheme: &Scheme, cancel: &Cancellation) -> Result<String, Error> {
        let store = MemoryStore::default();
        let settings = Builder::default().build()?;
        let project = ProjectDetails {
            name: "Demo".into(),
            ..Default::default()
        };
        let ctx = ReportContext {
            store: &store,
            settings: &settings,
            project: &project,
        };
        let mut writer = DelimitedWriter::new(Vec::new(), scheme.separator.clone());
        write_export(scheme, &mut writer, &ctx, &Generators::default(), cancel)?;
        Ok(String::from_utf8(writer.into_inner()?).unwrap())
    }

    #[test]
    fn sections_are_separated() {
        let scheme = Scheme::default()
            .with_section(Family::ProjectDetails.id(), &["project_name"])
            .with_section(Family::SearchParameters.id(), &["enzyme"])
            .with_separation_lines(2)
            .with_index(false);
        assert_eq!(
            export(&scheme, &Cancellation::new()).unwrap(),
            "Project Details\nProject Name\nDemo\n\n\nSearch Parameters\nEnzyme\nTrypsin\n"
        );
    }

    #[test]
    fn index_and_titles() {
        let scheme = Scheme::default()
            .with_section(Family::ProjectDetails.id(), &["project_name", "replicate"])
            .with_section_titles(false)
            .with_main_title("Summary")
            .with_separator(";");
        assert_eq!(
            export(&scheme, &Cancellation::new()).unwrap(),
            "Summary\n;Project Name;Replicate\n1;Demo;0\n"
        );
    }

    #[test]
    fn configuration_errors_write_nothing() {
        let scheme = Scheme::default()
            .with_section(Family::ProjectDetails.id(), &["project_name"])
            .with_section("Fragment Ions", &[]);
        assert!(matches!(
            export(&scheme, &Cancellation::new()),
            Err(Error::SectionNotImplemented(s)) if s == "Fragment Ions"
        ));

        let scheme = Scheme::default().with_section(Family::Psm.id(), &["coverage"]);
        assert!(matches!(
            export(&scheme, &Cancellation::new()),
            Err(Error::FamilyMismatch { .. })
        ));
    }

    #[test]
    fn cancelled_before_start() {
        let cancel = Cancellation::new();
        cancel.clone().cancel();
        let scheme = builtin::scheme(builtin::CERTIFICATE_OF_ANALYSIS).unwrap();
        assert!(matches!(export(&scheme, &cancel), Err(Error::Cancelled)));
    }

    /// Forwards to a delimited writer and cancels the export after `limit`
    /// data rows
    struct CancelAfter {
        inner: DelimitedWriter<Vec<u8>>,
        cancel: Cancellation,
        limit: usize,
        rows: usize,
    }

    impl ReportWriter for CancelAfter {
        fn write_main_title(&mut self, title: &str) -> Result<(), Error> {
            self.inner.write_main_title(title)
        }

        fn start_section(&mut self, title: Option<&str>) -> Result<(), Error> {
            self.inner.start_section(title)
        }

        fn write_header_row(&mut self, titles: &[&str]) -> Result<(), Error> {
            self.inner.write_header_row(titles)
        }

        fn write_data_row(&mut self, values: &[String]) -> Result<(), Error> {
            self.inner.write_data_row(values)?;
            self.rows += 1;
            if self.rows == self.limit {
                self.cancel.cancel();
            }
            Ok(())
        }

        fn blank_lines(&mut self, n: usize) -> Result<(), Error> {
            self.inner.blank_lines(n)
        }

        fn close(&mut self) -> Result<(), Error> {
            self.inner.close()
        }
    }

    #[test]
    fn cancelled_mid_section() -> Result<(), Error> {
        let mut store = MemoryStore::default();
        for ix in 1..=5 {
            store.insert_spectrum(SpectrumMatch {
                key: format!("s{}", ix).into(),
                file: "run.mgf".into(),
                title: format!("scan={}", ix),
                precursor_mz: 400.0,
                charge: Some(2),
                retention_time: None,
                best: None,
                assumptions: vec![],
            });
        }
        let settings = Builder::default().build()?;
        let project = ProjectDetails::default();
        let ctx = ReportContext {
            store: &store,
            settings: &settings,
            project: &project,
        };
        let scheme = Scheme::default()
            .with_section(Family::Psm.id(), &["spectrum_title"])
            .with_index(false);

        let cancel = Cancellation::new();
        let mut writer = CancelAfter {
            inner: DelimitedWriter::new(Vec::new(), "\t"),
            cancel: cancel.clone(),
            limit: 2,
            rows: 0,
        };
        let result = write_export(&scheme, &mut writer, &ctx, &Generators::default(), &cancel);
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(writer.rows, 2);

        let text = String::from_utf8(writer.inner.into_inner()?).unwrap();
        assert!(text.contains("scan=2"));
        assert!(!text.contains("scan=3"));
        Ok(())
    }

    #[test]
    fn workbook_binding() -> Result<(), Error> {
        let store = MemoryStore::default();
        let settings = Builder::default().build()?;
        let project = ProjectDetails::default();
        let ctx = ReportContext {
            store: &store,
            settings: &settings,
            project: &project,
        };
        let scheme = builtin::scheme(builtin::CERTIFICATE_OF_ANALYSIS).unwrap();
        let mut book = Workbook::default();
        let summary = write_export(
            &scheme,
            &mut book,
            &ctx,
            &Generators::default(),
            &Cancellation::new(),
        )?;
        assert_eq!(summary.total_rows(), 3);
        assert_eq!(book.sheets.len(), 3);
        assert_eq!(book.title.as_deref(), Some(builtin::CERTIFICATE_OF_ANALYSIS));
        Ok(())
    }
}
