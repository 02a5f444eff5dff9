use std::ops::Range;

use fnv::FnvHashSet;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::mass::VALID_AA;
use crate::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
/// A theoretical peptide produced by an in-silico digest
pub struct Digest {
    pub sequence: String,
    /// 0-based start on the protein
    pub start: usize,
    pub missed_cleavages: u8,
}

#[derive(Clone, Debug)]
pub struct Enzyme {
    // Skip cleaving if the site is followed matching this AA
    pub skip_suffix: Option<char>,
    // Regex for matching cleavage sites
    regex: Regex,
    // Cleave at c-terminal?
    pub c_terminal: bool,
}

impl Enzyme {
    /// Returns `Ok(None)` for an empty rule, which requests a non-specific digest
    pub fn new(
        cleave: &str,
        skip_suffix: Option<char>,
        c_terminal: bool,
    ) -> Result<Option<Self>, Error> {
        let valid = |c: char| c.is_ascii() && VALID_AA.contains(&(c as u8));
        if !(cleave.chars().all(valid) || cleave == "$") {
            return Err(Error::InvalidEnzyme(cleave.into()));
        }
        if let Some(skip) = skip_suffix {
            if !valid(skip) {
                return Err(Error::InvalidEnzyme(format!("{} (restrict {})", cleave, skip)));
            }
        }

        let compile =
            |pattern: &str| Regex::new(pattern).map_err(|_| Error::InvalidEnzyme(cleave.into()));

        match cleave {
            "" => Ok(None),
            "$" => Ok(Some(Enzyme {
                regex: compile("$")?,
                skip_suffix: None,
                c_terminal: true,
            })),
            _ => Ok(Some(Enzyme {
                regex: compile(&format!("[{}]", cleave))?,
                skip_suffix,
                c_terminal,
            })),
        }
    }

    fn cleavage_sites(&self, sequence: &str) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut left = 0;
        for mat in self.regex.find_iter(sequence) {
            let right = match self.c_terminal {
                true => mat.end(),
                false => mat.start(),
            };
            if let Some(skip) = self.skip_suffix {
                if right < sequence.len() && sequence[right..].starts_with(skip) {
                    continue;
                }
            }
            ranges.push(left..right);
            left = right;
        }
        ranges.push(left..sequence.len());
        ranges
    }
}

#[derive(Clone, Debug)]
pub struct DigestionParameters {
    /// Number of missed cleavages to produce
    pub missed_cleavages: u8,
    /// Inclusive
    pub min_len: usize,
    /// Inclusive
    pub max_len: usize,
    pub enzyme: Option<Enzyme>,
}

impl DigestionParameters {
    fn cleavage_sites(&self, sequence: &str) -> Vec<Range<usize>> {
        match &self.enzyme {
            Some(enzyme) => enzyme.cleavage_sites(sequence),
            None => {
                let mut v = Vec::new();
                for len in self.min_len..=self.max_len.min(sequence.len()) {
                    for i in 0..=sequence.len().saturating_sub(len) {
                        v.push(i..i + len)
                    }
                }
                v
            }
        }
    }

    /// Every peptide window within the length bounds, repeated sequences included
    pub fn windows(&self, sequence: &str) -> Vec<(Range<usize>, u8)> {
        let sites = self.cleavage_sites(sequence);
        // Missed cleavages are meaningless for a non-specific digest
        let missed_cleavages = match self.enzyme {
            None => 0,
            _ => self.missed_cleavages,
        };

        let mut windows = Vec::new();
        for cleavage in 1..=(1 + missed_cleavages as usize) {
            for win in sites.windows(cleavage) {
                let range = win[0].start..win[cleavage - 1].end;
                let len = range.len();
                if len > 0 && len >= self.min_len && len <= self.max_len {
                    windows.push((range, (cleavage - 1) as u8));
                }
            }
        }
        windows
    }

    /// Distinct theoretical peptides; a sequence repeated within the protein is reported once
    pub fn digest(&self, sequence: &str) -> Vec<Digest> {
        let mut seen = FnvHashSet::default();
        self.windows(sequence)
            .into_iter()
            .filter_map(|(range, missed_cleavages)| {
                let peptide = sequence.get(range.clone())?;
                seen.insert(peptide).then(|| Digest {
                    sequence: peptide.into(),
                    start: range.start,
                    missed_cleavages,
                })
            })
            .collect()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
/// Cleavage rule as written in the parameters file
pub struct EnzymeBuilder {
    pub name: Option<String>,
    /// How many missed cleavages to use
    pub missed_cleavages: Option<u8>,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub cleave_at: Option<String>,
    pub restrict: Option<char>,
    pub c_terminal: Option<bool>,
}

impl Default for EnzymeBuilder {
    fn default() -> Self {
        Self {
            name: Some("Trypsin".into()),
            missed_cleavages: Some(2),
            min_len: Some(7),
            max_len: Some(30),
            cleave_at: Some("KR".into()),
            restrict: Some('P'),
            c_terminal: Some(true),
        }
    }
}

impl EnzymeBuilder {
    pub fn name(&self) -> String {
        match (&self.name, self.cleave_at.as_deref()) {
            (Some(name), _) => name.clone(),
            (None, Some("")) => "Unspecific".into(),
            (None, Some(rule)) => format!("Cleave at {}", rule),
            (None, None) => "Trypsin".into(),
        }
    }

    pub fn build(&self) -> Result<DigestionParameters, Error> {
        let min_len = self.min_len.unwrap_or(7);
        let max_len = self.max_len.unwrap_or(30);
        if min_len > max_len {
            log::warn!(
                "Minimum peptide length ({}) is greater than maximum ({}): no peptide will be observable",
                min_len,
                max_len
            );
        }
        Ok(DigestionParameters {
            missed_cleavages: self.missed_cleavages.unwrap_or(2),
            min_len,
            max_len,
            enzyme: Enzyme::new(
                self.cleave_at.as_deref().unwrap_or("KR"),
                self.restrict,
                self.c_terminal.unwrap_or(true),
            )?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn trypsin(missed_cleavages: u8, min_len: usize) -> DigestionParameters {
        DigestionParameters {
            min_len,
            max_len: 50,
            missed_cleavages,
            enzyme: Enzyme::new("KR", Some('P'), true).unwrap(),
        }
    }

    fn sequences(params: &DigestionParameters, protein: &str) -> Vec<String> {
        params
            .digest(protein)
            .into_iter()
            .map(|d| d.sequence)
            .collect()
    }

    #[test]
    fn tryptic_digest() {
        let protein = "MADEEKLPPGWEKRMSRSSGRVYYFNHITNASQWERPSGN";
        let digests = trypsin(0, 2).digest(protein);
        assert_eq!(
            digests
                .iter()
                .map(|d| (d.sequence.as_str(), d.start))
                .collect::<Vec<_>>(),
            vec![
                ("MADEEK", 0),
                ("LPPGWEK", 6),
                ("MSR", 14),
                ("SSGR", 17),
                ("VYYFNHITNASQWERPSGN", 21),
            ]
        );
        assert!(digests.iter().all(|d| d.missed_cleavages == 0));
    }

    #[test]
    fn missed_cleavages() {
        let protein = "MADEEKLPPGWEKRMSRSSGRVYYFNHITNASQWERPSGN";
        assert_eq!(
            sequences(&trypsin(1, 0), protein),
            vec![
                "MADEEK",
                "LPPGWEK",
                "R",
                "MSR",
                "SSGR",
                "VYYFNHITNASQWERPSGN",
                "MADEEKLPPGWEK",
                "LPPGWEKR",
                "RMSR",
                "MSRSSGR",
                "SSGRVYYFNHITNASQWERPSGN",
            ]
        );
    }

    #[test]
    fn n_terminal_cleavage() {
        let params = DigestionParameters {
            min_len: 1,
            max_len: 50,
            missed_cleavages: 0,
            enzyme: Enzyme::new("D", None, false).unwrap(),
        };
        assert_eq!(
            sequences(&params, "MADEEKLPPGWEKRMSRSSGRVYYFNHITNASQWERPSGNW"),
            vec!["MA", "DEEKLPPGWEKRMSRSSGRVYYFNHITNASQWERPSGNW"]
        );
    }

    #[test]
    fn nonspecific() {
        let protein = "MADEEKLPPGW";
        let params = DigestionParameters {
            min_len: 5,
            max_len: 5,
            missed_cleavages: 3,
            enzyme: Enzyme::new("", None, true).unwrap(),
        };
        let expected = protein
            .as_bytes()
            .windows(5)
            .flat_map(std::str::from_utf8)
            .collect::<Vec<_>>();
        assert_eq!(sequences(&params, protein), expected);
    }

    #[test]
    fn repeated_peptides_counted_once() {
        let protein = "KVEGAQNQGKKVEGAQNQGK";
        let params = DigestionParameters {
            min_len: 2,
            max_len: usize::MAX,
            missed_cleavages: 0,
            enzyme: Enzyme::new("KR", None, true).unwrap(),
        };
        assert_eq!(sequences(&params, protein), vec!["VEGAQNQGK"]);
        // ... but both windows remain available for coverage
        assert_eq!(params.windows(protein).len(), 2);
    }

    #[test]
    fn invalid_rules() {
        assert!(matches!(
            Enzyme::new("KZ", None, true),
            Err(Error::InvalidEnzyme(_))
        ));
        assert!(matches!(
            Enzyme::new("KR", Some('1'), true),
            Err(Error::InvalidEnzyme(_))
        ));
        assert!(Enzyme::new("", None, true).unwrap().is_none());
    }

    #[test]
    fn builder_defaults() {
        let builder = EnzymeBuilder::default();
        assert_eq!(builder.name(), "Trypsin");
        let params = builder.build().unwrap();
        assert_eq!(params.missed_cleavages, 2);
        assert!(params.enzyme.is_some());
    }
}
