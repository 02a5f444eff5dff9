use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builtin;
use crate::feature;
use crate::scheme::Scheme;
use crate::Error;

/// On-disk format version written by [`SchemeRegistry::persist`]
pub const REGISTRY_VERSION: u32 = 2;

#[derive(Serialize, Deserialize)]
struct RegistryFile {
    version: u32,
    schemes: BTreeMap<String, Scheme>,
}

/// Flat scheme of the first registry format: a single feature list, each
/// entry naming its section
#[derive(Deserialize)]
struct LegacyScheme {
    features: Vec<LegacyFeature>,
    separator: Option<String>,
    index: Option<bool>,
    header: Option<bool>,
    separation_lines: Option<usize>,
    section_titles: Option<bool>,
    main_title: Option<String>,
    validated_only: Option<bool>,
    include_decoys: Option<bool>,
}

#[derive(Deserialize)]
struct LegacyFeature {
    section: String,
    key: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRegistry {
    Current(RegistryFile),
    Legacy(BTreeMap<String, LegacyScheme>),
}

impl LegacyScheme {
    fn convert(self, name: &str) -> Scheme {
        let features = self
            .features
            .iter()
            .filter_map(|f| {
                let found = feature::find(&f.section, &f.key);
                if found.is_none() {
                    log::warn!(
                        "scheme `{}`: dropping unknown feature `{}` of section `{}`",
                        name,
                        f.key,
                        f.section
                    );
                }
                found
            })
            .collect::<Vec<_>>();

        let defaults = Scheme::default();
        let mut scheme = Scheme::from_features(name, &features);
        scheme.separator = self.separator.unwrap_or(defaults.separator);
        scheme.index = self.index.unwrap_or(defaults.index);
        scheme.header = self.header.unwrap_or(defaults.header);
        scheme.separation_lines = self.separation_lines.unwrap_or(defaults.separation_lines);
        scheme.section_titles = self.section_titles.unwrap_or(defaults.section_titles);
        scheme.main_title = self.main_title;
        scheme.validated_only = self.validated_only.unwrap_or(defaults.validated_only);
        scheme.include_decoys = self.include_decoys.unwrap_or(defaults.include_decoys);
        scheme
    }
}

/// Built-in schemes plus the user's own, persisted to a single file.
///
/// A user scheme shadows a built-in scheme of the same name. Every mutation
/// is written back immediately. The registry assumes it is the only writer
/// of its file: the outcome of editing the file externally while a registry
/// is live is undefined.
#[derive(Debug, Default)]
pub struct SchemeRegistry {
    path: Option<PathBuf>,
    user: BTreeMap<String, Scheme>,
}

impl SchemeRegistry {
    /// A registry that never touches the disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the user schemes stored at `path`.
    ///
    /// Never fails: a missing or unreadable file yields an empty registry,
    /// which is written back to `path` right away.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let (user, rewrite) = match Self::read(&path) {
            Ok(Some((user, rewrite))) => (user, rewrite),
            Ok(None) => {
                log::info!("no scheme registry at {}, creating one", path.display());
                (BTreeMap::new(), true)
            }
            Err(e) => {
                log::warn!(
                    "failed to read scheme registry at {}, starting empty: {}",
                    path.display(),
                    e
                );
                (BTreeMap::new(), true)
            }
        };

        for scheme in user.values() {
            if let Err(e) = scheme.validate() {
                log::warn!("stored scheme `{}` no longer matches the catalog: {}", scheme.name, e);
            }
        }

        let registry = SchemeRegistry {
            path: Some(path),
            user,
        };
        if rewrite {
            if let Err(e) = registry.persist() {
                log::warn!("failed to write scheme registry: {}", e);
            }
        }
        registry
    }

    /// `Ok(None)` for a missing file; the flag asks for the file to be rewritten
    fn read(path: &Path) -> Result<Option<(BTreeMap<String, Scheme>, bool)>, Error> {
        if !path.exists() {
            return Ok(None);
        }
        let schemes = match crate::read_json::<_, StoredRegistry>(path)? {
            StoredRegistry::Current(file) if file.version <= REGISTRY_VERSION => {
                (file.schemes, false)
            }
            StoredRegistry::Current(file) => {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("unsupported registry version {}", file.version),
                )))
            }
            StoredRegistry::Legacy(legacy) => {
                log::info!("converting {} schemes from the flat registry format", legacy.len());
                let schemes = legacy
                    .into_iter()
                    .map(|(name, scheme)| {
                        let scheme = scheme.convert(&name);
                        (name, scheme)
                    })
                    .collect();
                (schemes, true)
            }
        };
        Ok(Some(schemes))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the user schemes back to disk; a no-op for in-memory registries
    pub fn persist(&self) -> Result<(), Error> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(()),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = RegistryFile {
            version: REGISTRY_VERSION,
            schemes: self.user.clone(),
        };
        std::fs::write(path, serde_json::to_vec_pretty(&file)?)?;
        log::debug!("persisted {} user schemes to {}", self.user.len(), path.display());
        Ok(())
    }

    /// User scheme of that name, else the built-in one
    pub fn get(&self, name: &str) -> Option<Scheme> {
        self.user
            .get(name)
            .cloned()
            .or_else(|| builtin::scheme(name))
    }

    /// Insert or replace a user scheme, after checking it against the catalog
    pub fn add(&mut self, mut scheme: Scheme) -> Result<(), Error> {
        scheme.validate()?;
        scheme.editable = true;
        if builtin::scheme(&scheme.name).is_some() {
            log::info!("user scheme `{}` shadows the built-in scheme", scheme.name);
        }
        let name = scheme.name.clone();
        let previous = self.user.insert(name.clone(), scheme);
        if let Err(e) = self.persist() {
            match previous {
                Some(previous) => self.user.insert(name, previous),
                None => self.user.remove(&name),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Remove a user scheme; built-in schemes cannot be removed
    pub fn remove(&mut self, name: &str) -> Result<Option<Scheme>, Error> {
        let removed = match self.user.remove(name) {
            Some(removed) => removed,
            None => return Ok(None),
        };
        if let Err(e) = self.persist() {
            self.user.insert(name.to_string(), removed);
            return Err(e);
        }
        Ok(Some(removed))
    }

    pub fn user_schemes(&self) -> impl Iterator<Item = &Scheme> {
        self.user.values()
    }

    pub fn builtin_names(&self) -> Vec<&'static str> {
        builtin::names()
    }

    /// Built-in and user scheme names, sorted and deduplicated. Positions in
    /// this list are the 1-based indices accepted by [`select`](Self::select).
    pub fn names(&self) -> Vec<String> {
        let mut names = builtin::names()
            .into_iter()
            .map(String::from)
            .chain(self.user.keys().cloned())
            .collect::<Vec<_>>();
        names.sort();
        names.dedup();
        names
    }

    /// Resolve a scheme by name, or by its 1-based position in [`names`](Self::names)
    pub fn select(&self, selector: &str) -> Result<Scheme, Error> {
        if let Some(scheme) = self.get(selector) {
            return Ok(scheme);
        }
        selector
            .parse::<usize>()
            .ok()
            .and_then(|ix| ix.checked_sub(1))
            .and_then(|ix| self.names().get(ix).cloned())
            .and_then(|name| self.get(&name))
            .ok_or_else(|| Error::UnknownScheme(selector.into()))
    }
}
