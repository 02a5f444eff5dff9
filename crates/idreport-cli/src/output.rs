use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use idreport_core::export::{write_export, Cancellation, ExportSummary};
use idreport_core::scheme::Scheme;
use idreport_core::section::{Generators, ReportContext};
use idreport_core::writer::{DelimitedWriter, Workbook};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// One delimited text file, sections one after another
    #[default]
    Text,
    /// A directory holding one CSV file per section
    Sheets,
}

impl FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Format::Text),
            "sheets" => Ok(Format::Sheets),
            _ => anyhow::bail!("unknown output format `{}`, expected `text` or `sheets`", s),
        }
    }
}

/// Render `scheme` to `path`, returning the files written.
///
/// A failed text export removes its partial file.
pub fn write_report(
    scheme: &Scheme,
    ctx: &ReportContext,
    format: Format,
    path: &Path,
    cancel: &Cancellation,
) -> anyhow::Result<(ExportSummary, Vec<PathBuf>)> {
    let generators = Generators::default();
    match format {
        Format::Text => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create `{}`", path.display()))?;
            let mut writer = DelimitedWriter::new(file, scheme.separator.clone());
            let written = write_export(scheme, &mut writer, ctx, &generators, cancel)
                .and_then(|summary| writer.into_inner().map(|_| summary));
            match written {
                Ok(summary) => Ok((summary, vec![path.to_path_buf()])),
                Err(e) => {
                    if let Err(rm) = std::fs::remove_file(path) {
                        log::warn!("failed to remove partial report {}: {}", path.display(), rm);
                    }
                    Err(e).with_context(|| format!("Failed to export `{}`", scheme.name))
                }
            }
        }
        Format::Sheets => {
            let mut book = Workbook::default();
            let summary = write_export(scheme, &mut book, ctx, &generators, cancel)
                .with_context(|| format!("Failed to export `{}`", scheme.name))?;
            let paths = book
                .write_csv_dir(path)
                .with_context(|| format!("Failed to write sheets to `{}`", path.display()))?;
            Ok((summary, paths))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_format() {
        assert_eq!("text".parse::<Format>().unwrap(), Format::Text);
        assert_eq!("sheets".parse::<Format>().unwrap(), Format::Sheets);
        assert!("xlsx".parse::<Format>().is_err());
        assert_eq!(Format::default(), Format::Text);
    }
}
