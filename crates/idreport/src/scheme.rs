use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::feature::{self, Feature};
use crate::Error;

/// A named report definition: which sections are rendered, in which order,
/// with which columns, and how the output is laid out
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scheme {
    pub name: String,
    /// Built-in schemes are not editable
    pub editable: bool,
    /// Section identifiers in rendering order
    pub sections: Vec<String>,
    /// Section identifier -> feature keys, in column order
    pub features: BTreeMap<String, Vec<String>>,
    pub separator: String,
    /// Prefix every data row with its 1-based index within the section
    pub index: bool,
    pub header: bool,
    /// Blank lines written between two sections
    pub separation_lines: usize,
    pub section_titles: bool,
    pub main_title: Option<String>,
    pub validated_only: bool,
    pub include_decoys: bool,
    /// Expand every listed feature with its sub-features
    pub include_sub_features: bool,
}

impl Default for Scheme {
    fn default() -> Self {
        Scheme {
            name: String::new(),
            editable: true,
            sections: Vec::new(),
            features: BTreeMap::new(),
            separator: "\t".into(),
            index: true,
            header: true,
            separation_lines: 3,
            section_titles: true,
            main_title: None,
            validated_only: false,
            include_decoys: false,
            include_sub_features: false,
        }
    }
}

impl Scheme {
    /// Build a scheme from an explicit section order and section -> feature keys map
    pub fn new<S: Into<String>>(
        name: S,
        sections: Vec<String>,
        features: BTreeMap<String, Vec<String>>,
    ) -> Self {
        Scheme {
            name: name.into(),
            sections,
            features,
            ..Default::default()
        }
    }

    /// Build a scheme from a flat feature list: sections are the families of
    /// the features, in first-seen order
    pub fn from_features<S: Into<String>>(name: S, features: &[&'static Feature]) -> Self {
        let mut sections: Vec<String> = Vec::new();
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for feature in features {
            let section = feature.family.id();
            if !sections.iter().any(|s| s == section) {
                sections.push(section.into());
            }
            map.entry(section.into())
                .or_default()
                .push(feature.key.into());
        }
        Scheme::new(name, sections, map)
    }

    /// Append a section with its feature keys
    pub fn with_section<S: Into<String>>(mut self, section: S, keys: &[&str]) -> Self {
        let section = section.into();
        self.features
            .entry(section.clone())
            .or_default()
            .extend(keys.iter().map(|k| k.to_string()));
        if !self.sections.contains(&section) {
            self.sections.push(section);
        }
        self
    }

    pub fn with_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_index(mut self, index: bool) -> Self {
        self.index = index;
        self
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn with_separation_lines(mut self, lines: usize) -> Self {
        self.separation_lines = lines;
        self
    }

    pub fn with_section_titles(mut self, titles: bool) -> Self {
        self.section_titles = titles;
        self
    }

    pub fn with_main_title<S: Into<String>>(mut self, title: S) -> Self {
        self.main_title = Some(title.into());
        self
    }

    pub fn with_validated_only(mut self, validated_only: bool) -> Self {
        self.validated_only = validated_only;
        self
    }

    pub fn with_include_decoys(mut self, include_decoys: bool) -> Self {
        self.include_decoys = include_decoys;
        self
    }

    pub fn with_sub_features(mut self, include: bool) -> Self {
        self.include_sub_features = include;
        self
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Feature keys listed for a section, empty if the section has none
    pub fn feature_keys(&self, section: &str) -> &[String] {
        self.features
            .get(section)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resolved columns of a section, in declared order, sub-features
    /// expanded when requested. A column listed twice is kept once.
    pub fn columns(&self, section: &str) -> Result<Vec<&'static Feature>, Error> {
        let mut columns: Vec<&'static Feature> = Vec::new();
        for key in self.feature_keys(section) {
            let feature = feature::resolve(section, key)?;
            let expanded = match self.include_sub_features {
                true => feature::expand(feature, true),
                false => vec![feature],
            };
            for column in expanded {
                if !columns.iter().any(|c| std::ptr::eq(*c, column)) {
                    columns.push(column);
                }
            }
        }
        Ok(columns)
    }

    /// Check that every listed feature exists in the family of its section
    pub fn validate(&self) -> Result<(), Error> {
        for (section, keys) in &self.features {
            for key in keys {
                feature::resolve(section, key)?;
            }
        }
        Ok(())
    }
}
