use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{ensure, Context};
use idreport_core::export::{Cancellation, ExportSummary};
use idreport_core::feature;
use idreport_core::registry::SchemeRegistry;
use idreport_core::scheme::Scheme;
use idreport_core::section::ReportContext;

use crate::input::{ExportArgs, Project};
use crate::output::write_report;

/// Executes subcommands against one scheme registry
pub struct Runner {
    pub registry: SchemeRegistry,
}

impl Runner {
    pub fn new(registry: SchemeRegistry) -> Self {
        Runner { registry }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::new(SchemeRegistry::load(path))
    }

    /// Numbered scheme names, as accepted by `--scheme`
    pub fn list(&self) -> Vec<String> {
        self.registry
            .names()
            .into_iter()
            .enumerate()
            .map(|(ix, name)| {
                let origin = match self.registry.user_schemes().any(|s| s.name == name) {
                    true => "user",
                    false => "built-in",
                };
                format!("{:>3}  {} ({})", ix + 1, name, origin)
            })
            .collect()
    }

    /// Section by section column titles of a scheme, followed by its JSON form
    pub fn show(&self, selector: &str) -> anyhow::Result<String> {
        let scheme = self.registry.select(selector)?;
        let mut out = String::new();
        for section in &scheme.sections {
            out.push_str(section);
            out.push('\n');
            for column in scheme.columns(section)? {
                let depth = match feature::features_of(section)
                    .iter()
                    .any(|f| f.key == column.key)
                {
                    true => "  ",
                    false => "    ",
                };
                out.push_str(&format!("{}{} - {}\n", depth, column.title, column.description));
            }
        }
        out.push_str(&serde_json::to_string_pretty(&scheme)?);
        out.push('\n');
        Ok(out)
    }

    pub fn add<P: AsRef<Path>>(&mut self, path: P) -> anyhow::Result<String> {
        let path = path.as_ref();
        let scheme: Scheme = idreport_core::read_json(path)
            .with_context(|| format!("Failed to read scheme from `{}`", path.display()))?;
        ensure!(!scheme.name.is_empty(), "scheme in `{}` has no name", path.display());
        let name = scheme.name.clone();
        self.registry
            .add(scheme)
            .with_context(|| format!("Failed to add scheme `{}`", name))?;
        log::info!("added scheme `{}`", name);
        Ok(name)
    }

    pub fn remove(&mut self, name: &str) -> anyhow::Result<()> {
        let removed = self.registry.remove(name)?;
        ensure!(
            removed.is_some(),
            "`{}` is not a user scheme; built-in schemes cannot be removed",
            name
        );
        log::info!("removed scheme `{}`", name);
        Ok(())
    }

    pub fn export(&self, args: &ExportArgs) -> anyhow::Result<(ExportSummary, Vec<PathBuf>)> {
        let start = Instant::now();
        let mut scheme = self.registry.select(&args.scheme)?;
        scheme.validated_only |= args.validated_only;
        scheme.include_decoys |= args.include_decoys;

        let project = Project::load(&args.input)
            .with_context(|| format!("Failed to read project from `{}`", args.input.display()))?
            .build()?;
        log::trace!("project loaded in {}ms", start.elapsed().as_millis());

        let ctx = ReportContext {
            store: &project.store,
            settings: &project.settings,
            project: &project.details,
        };
        let (summary, paths) =
            write_report(&scheme, &ctx, args.format, &args.output, &Cancellation::new())?;
        for path in &paths {
            log::info!("wrote {}", path.display());
        }
        log::info!(
            "finished `{}` in {}ms",
            scheme.name,
            start.elapsed().as_millis()
        );
        Ok((summary, paths))
    }
}
