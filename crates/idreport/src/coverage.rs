use std::ops::Range;

use crate::enzyme::DigestionParameters;

/// 0-based start of every non-overlapping occurrence of `peptide` in `protein`
pub fn occurrences(protein: &str, peptide: &str) -> Vec<usize> {
    if peptide.is_empty() {
        return Vec::new();
    }
    protein.match_indices(peptide).map(|(ix, _)| ix).collect()
}

/// Number of residues spanned by the union of `intervals`
pub fn covered_residues(mut intervals: Vec<Range<usize>>) -> usize {
    intervals.retain(|r| !r.is_empty());
    intervals.sort_unstable_by_key(|r| (r.start, r.end));

    let mut covered = 0;
    let mut current: Option<Range<usize>> = None;
    for interval in intervals {
        current = match current {
            Some(cur) if interval.start <= cur.end => Some(cur.start..cur.end.max(interval.end)),
            Some(cur) => {
                covered += cur.len();
                Some(interval)
            }
            None => Some(interval),
        };
    }
    covered + current.map(|r| r.len()).unwrap_or(0)
}

/// Fraction of `protein` covered by every occurrence of `peptides`, in [0, 1]
pub fn sequence_coverage<'a, I>(protein: &str, peptides: I) -> f64
where
    I: IntoIterator<Item = &'a str>,
{
    if protein.is_empty() {
        return 0.0;
    }
    let intervals = peptides
        .into_iter()
        .flat_map(|peptide| {
            occurrences(protein, peptide)
                .into_iter()
                .map(move |start| start..start + peptide.len())
        })
        .collect();
    covered_residues(intervals) as f64 / protein.len() as f64
}

/// Fraction of `protein` reachable by the theoretical peptides of the
/// configured cleavage rule, in [0, 1]
pub fn possible_coverage(protein: &str, digestion: &DigestionParameters) -> f64 {
    if protein.is_empty() {
        return 0.0;
    }
    let intervals = digestion
        .windows(protein)
        .into_iter()
        .map(|(range, _)| range)
        .collect();
    covered_residues(intervals) as f64 / protein.len() as f64
}
