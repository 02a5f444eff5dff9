pub mod builtin;
pub mod coverage;
pub mod enzyme;
pub mod export;
pub mod feature;
pub mod identification;
pub mod mass;
pub mod modification;
pub mod peptide;
pub mod registry;
pub mod scheme;
pub mod section;
pub mod settings;
pub mod spectrum_counting;
pub mod store;
pub mod writer;

use std::path::Path;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    /// The match store failed to answer a lookup
    Store(String),
    /// A scheme names a section that no generator is registered for
    SectionNotImplemented(String),
    /// A scheme names a feature the catalog does not know about
    UnknownFeature {
        section: String,
        feature: String,
    },
    /// A feature was listed under a section of another family
    FamilyMismatch {
        section: String,
        feature: String,
        family: String,
    },
    UnsupportedScore(String),
    UnknownScheme(String),
    InvalidEnzyme(String),
    Cancelled,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => e.fmt(f),
            Self::Json(e) => e.fmt(f),
            Self::Csv(e) => e.fmt(f),
            Self::Store(e) => write!(f, "match store error: {}", e),
            Self::SectionNotImplemented(section) => {
                write!(f, "section `{}` is not implemented", section)
            }
            Self::UnknownFeature { section, feature } => {
                write!(f, "unknown feature `{}` in section `{}`", feature, section)
            }
            Self::FamilyMismatch {
                section,
                feature,
                family,
            } => write!(
                f,
                "feature `{}` belongs to `{}` and cannot be listed under section `{}`",
                feature, family, section
            ),
            Self::UnsupportedScore(name) => {
                write!(f, "unsupported localization score `{}`", name)
            }
            Self::UnknownScheme(name) => write!(f, "no report scheme named `{}`", name),
            Self::InvalidEnzyme(rule) => write!(f, "invalid cleavage rule `{}`", rule),
            Self::Cancelled => f.write_str("export cancelled"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

pub fn read_json<P, T>(path: P) -> Result<T, Error>
where
    P: AsRef<Path>,
    T: for<'de> serde::Deserialize<'de>,
{
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
