//! Output sinks for reports
//!
//! The export orchestrator only talks to [`ReportWriter`]; the bindings
//! decide how titles, headers and rows end up on disk.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::Error;

pub trait ReportWriter {
    fn write_main_title(&mut self, title: &str) -> Result<(), Error>;
    /// Begin a new section, with a title line when one is given
    fn start_section(&mut self, title: Option<&str>) -> Result<(), Error>;
    fn write_header_row(&mut self, titles: &[&str]) -> Result<(), Error>;
    fn write_data_row(&mut self, values: &[String]) -> Result<(), Error>;
    fn blank_lines(&mut self, n: usize) -> Result<(), Error>;
    /// Flush everything written so far
    fn close(&mut self) -> Result<(), Error>;
}

/// Separator-joined text, one row per line
pub struct DelimitedWriter<W: Write> {
    inner: BufWriter<W>,
    separator: String,
}

impl<W: Write> DelimitedWriter<W> {
    pub fn new<S: Into<String>>(inner: W, separator: S) -> Self {
        DelimitedWriter {
            inner: BufWriter::new(inner),
            separator: separator.into(),
        }
    }

    pub fn into_inner(self) -> Result<W, Error> {
        self.inner
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }

    fn line<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<(), Error> {
        for (ix, field) in fields.iter().enumerate() {
            if ix > 0 {
                self.inner.write_all(self.separator.as_bytes())?;
            }
            self.inner.write_all(field.as_ref().as_bytes())?;
        }
        self.inner.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> ReportWriter for DelimitedWriter<W> {
    fn write_main_title(&mut self, title: &str) -> Result<(), Error> {
        self.line(&[title])
    }

    fn start_section(&mut self, title: Option<&str>) -> Result<(), Error> {
        match title {
            Some(title) => self.line(&[title]),
            None => Ok(()),
        }
    }

    fn write_header_row(&mut self, titles: &[&str]) -> Result<(), Error> {
        self.line(titles)
    }

    fn write_data_row(&mut self, values: &[String]) -> Result<(), Error> {
        self.line(values)
    }

    fn blank_lines(&mut self, n: usize) -> Result<(), Error> {
        for _ in 0..n {
            self.inner.write_all(b"\n")?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(self.inner.flush()?)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Style {
    Title,
    Header,
    Data,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub value: String,
    pub style: Style,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

/// Spreadsheet-style sink: every section gets its own sheet
#[derive(Clone, Debug, Default)]
pub struct Workbook {
    pub title: Option<String>,
    pub sheets: Vec<Sheet>,
}

/// Longest sheet name spreadsheet applications accept
const MAX_SHEET_NAME: usize = 31;

impl Workbook {
    fn add_sheet(&mut self, name: &str) -> &mut Sheet {
        let base = name
            .chars()
            .map(|c| match c {
                '/' | '\\' | '?' | '*' | '[' | ']' | ':' => '_',
                c => c,
            })
            .take(MAX_SHEET_NAME)
            .collect::<String>();

        let mut name = base.clone();
        let mut n = 1;
        while self.sheets.iter().any(|s| s.name == name) {
            n += 1;
            let suffix = format!(" ({})", n);
            name = base
                .chars()
                .take(MAX_SHEET_NAME.saturating_sub(suffix.len()))
                .chain(suffix.chars())
                .collect();
        }

        let mut sheet = Sheet {
            name,
            rows: Vec::new(),
        };
        if let (true, Some(title)) = (self.sheets.is_empty(), &self.title) {
            sheet.rows.push(vec![Cell {
                value: title.clone(),
                style: Style::Title,
            }]);
        }
        self.sheets.push(sheet);
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }

    fn current(&mut self) -> &mut Sheet {
        if self.sheets.is_empty() {
            let name = format!("Section {}", self.sheets.len() + 1);
            return self.add_sheet(&name);
        }
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }

    fn push_row<S: AsRef<str>>(&mut self, values: &[S], style: Style) {
        let row = values
            .iter()
            .map(|v| Cell {
                value: v.as_ref().to_string(),
                style,
            })
            .collect();
        self.current().rows.push(row);
    }

    /// Write every sheet as `<dir>/<sheet name>.csv`, returning the paths written
    pub fn write_csv_dir<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>, Error> {
        std::fs::create_dir_all(dir.as_ref())?;
        let mut paths = Vec::with_capacity(self.sheets.len());
        for sheet in &self.sheets {
            let path = dir.as_ref().join(format!("{}.csv", sheet.name));
            let mut wtr = csv::WriterBuilder::new()
                .flexible(true)
                .from_path(&path)?;
            for row in &sheet.rows {
                wtr.write_record(row.iter().map(|cell| cell.value.as_bytes()))?;
            }
            wtr.flush()?;
            log::debug!("wrote sheet `{}` to {}", sheet.name, path.display());
            paths.push(path);
        }
        Ok(paths)
    }
}

impl ReportWriter for Workbook {
    fn write_main_title(&mut self, title: &str) -> Result<(), Error> {
        self.title = Some(title.into());
        Ok(())
    }

    fn start_section(&mut self, title: Option<&str>) -> Result<(), Error> {
        let name = match title {
            Some(title) => title.to_string(),
            None => format!("Section {}", self.sheets.len() + 1),
        };
        self.add_sheet(&name);
        if let Some(title) = title {
            self.push_row(&[title], Style::Title);
        }
        Ok(())
    }

    fn write_header_row(&mut self, titles: &[&str]) -> Result<(), Error> {
        self.push_row(titles, Style::Header);
        Ok(())
    }

    fn write_data_row(&mut self, values: &[String]) -> Result<(), Error> {
        self.push_row(values, Style::Data);
        Ok(())
    }

    /// Sections are already separated by sheets
    fn blank_lines(&mut self, _: usize) -> Result<(), Error> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
