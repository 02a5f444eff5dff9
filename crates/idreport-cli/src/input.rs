use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};
use clap::ArgMatches;
use idreport_core::identification::ProjectDetails;
use idreport_core::settings::{Builder, ReportSettings};
use idreport_core::store::{MemoryStore, StoreData};
use serde::Deserialize;

use crate::output::Format;

#[derive(Deserialize)]
/// Identification project as exported by the upstream pipeline: run
/// metadata, report parameters and the match hierarchy itself
pub struct Project {
    #[serde(default)]
    pub project: ProjectDetails,
    #[serde(default)]
    pub parameters: Builder,
    #[serde(flatten)]
    pub store: StoreData,
}

/// A loaded project, ready to be reported on
pub struct Loaded {
    pub details: ProjectDetails,
    pub settings: ReportSettings,
    pub store: MemoryStore,
}

impl Project {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        idreport_core::read_json(path).map_err(anyhow::Error::from)
    }

    pub fn build(self) -> anyhow::Result<Loaded> {
        let settings = self
            .parameters
            .build()
            .context("Invalid report parameters")?;
        if self.store.proteins.is_empty() && self.store.spectra.is_empty() {
            log::warn!("project contains no protein groups and no spectrum matches");
        }
        Ok(Loaded {
            details: self.project,
            settings,
            store: self.store.into(),
        })
    }
}

/// Arguments of the `export` subcommand
#[derive(Clone, Debug, PartialEq)]
pub struct ExportArgs {
    pub scheme: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub validated_only: bool,
    pub include_decoys: bool,
    pub format: Format,
}

impl ExportArgs {
    pub fn from_arguments(matches: &ArgMatches) -> anyhow::Result<Self> {
        let scheme = matches
            .get_one::<String>("scheme")
            .context("`--scheme` must be set. For more information try '--help'")?;
        let input = matches
            .get_one::<String>("input")
            .context("`--input` must be set. For more information try '--help'")?;
        let output = matches
            .get_one::<String>("output")
            .context("`--output` must be set. For more information try '--help'")?;
        let format = matches
            .get_one::<String>("format")
            .map(|f| f.parse::<Format>())
            .transpose()?
            .unwrap_or_default();

        let args = ExportArgs {
            scheme: scheme.clone(),
            input: input.into(),
            output: output.into(),
            validated_only: matches.get_flag("validated-only"),
            include_decoys: matches.get_flag("include-decoys"),
            format,
        };
        ensure!(
            args.input != args.output,
            "`--output` would overwrite the input project `{}`",
            args.input.display()
        );
        Ok(args)
    }
}
