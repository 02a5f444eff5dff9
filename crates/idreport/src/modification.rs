use std::collections::BTreeMap;
use std::fmt::{Display, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Localization confidence of a modification site, from worst to best
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Confidence {
    NotFound,
    Random,
    Doubtful,
    Confident,
    VeryConfident,
}

impl Default for Confidence {
    fn default() -> Self {
        Self::NotFound
    }
}

impl Confidence {
    pub fn is_confident(&self) -> bool {
        *self >= Confidence::Confident
    }
}

impl Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Confidence::NotFound => "Not Found",
            Confidence::Random => "Random",
            Confidence::Doubtful => "Doubtful",
            Confidence::Confident => "Confident",
            Confidence::VeryConfident => "Very Confident",
        })
    }
}

/// Probabilistic localization scores a report can display
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProbabilisticScore {
    PhosphoRs,
    AScore,
}

impl FromStr for ProbabilisticScore {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "phosphors" => Ok(Self::PhosphoRs),
            "ascore" | "a-score" => Ok(Self::AScore),
            _ => Err(Error::UnsupportedScore(s.into())),
        }
    }
}

impl Display for ProbabilisticScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::PhosphoRs => "PhosphoRS",
            Self::AScore => "A-score",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SiteScore {
    pub modification: String,
    /// 1-based residue index on the peptide
    pub site: usize,
    pub confidence: Confidence,
    #[serde(default)]
    pub phosphors: Option<f64>,
    #[serde(default)]
    pub ascore: Option<f64>,
}

impl SiteScore {
    pub fn probabilistic(&self, score: ProbabilisticScore) -> Option<f64> {
        match score {
            ProbabilisticScore::PhosphoRs => self.phosphors,
            ProbabilisticScore::AScore => self.ascore,
        }
    }
}

/// Localization scoring attached to a peptide match
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizationScores {
    pub sites: Vec<SiteScore>,
}

impl LocalizationScores {
    pub fn site(&self, modification: &str, site: usize) -> Option<&SiteScore> {
        self.sites
            .iter()
            .find(|s| s.site == site && s.modification == modification)
    }
}

/// Confidence of one site; a peptide without scores, or a site without a
/// record, is `NotFound`
pub fn site_confidence(
    scores: Option<&LocalizationScores>,
    modification: &str,
    site: usize,
) -> Confidence {
    scores
        .and_then(|scores| scores.site(modification, site))
        .map(|s| s.confidence)
        .unwrap_or_default()
}

#[derive(Copy, Clone, Debug)]
struct SiteState {
    residue: char,
    confident: bool,
}

/// Collects every observation of a modification site and classifies each
/// site as confident only when all of its observations are confident
#[derive(Clone, Debug, Default)]
pub struct SiteClassifier {
    sites: BTreeMap<(String, usize), SiteState>,
}

impl SiteClassifier {
    pub fn observe(
        &mut self,
        modification: &str,
        position: usize,
        residue: char,
        confidence: Confidence,
    ) {
        let confident = confidence.is_confident();
        self.sites
            .entry((modification.to_string(), position))
            .and_modify(|state| state.confident &= confident)
            .or_insert(SiteState { residue, confident });
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn confident_count(&self) -> usize {
        self.sites.values().filter(|s| s.confident).count()
    }

    pub fn ambiguous_count(&self) -> usize {
        self.sites.values().filter(|s| !s.confident).count()
    }

    pub fn is_confident(&self, modification: &str, position: usize) -> Option<bool> {
        self.sites
            .get(&(modification.to_string(), position))
            .map(|s| s.confident)
    }

    /// Every observed site regardless of its classification
    pub fn all(&self) -> String {
        self.format(|_| true)
    }

    pub fn confident(&self) -> String {
        self.format(|s| s.confident)
    }

    pub fn ambiguous(&self) -> String {
        self.format(|s| !s.confident)
    }

    /// `Name (S12, T40); Other (M3)`, names and positions ascending
    fn format<F: Fn(&SiteState) -> bool>(&self, keep: F) -> String {
        let mut out = String::new();
        let mut current: Option<&str> = None;
        for ((name, position), state) in self.sites.iter().filter(|(_, s)| keep(s)) {
            if current == Some(name.as_str()) {
                let _ = write!(out, ", {}{}", state.residue, position);
            } else {
                if current.is_some() {
                    out.push_str("); ");
                }
                let _ = write!(out, "{} ({}{}", name, state.residue, position);
                current = Some(name.as_str());
            }
        }
        if current.is_some() {
            out.push(')');
        }
        out
    }
}
