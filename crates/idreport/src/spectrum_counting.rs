//! Spectral counting abundance indices
//!
//! Ishihama et al., https://pubmed.ncbi.nlm.nih.gov/15665377/ (emPAI)
//! Zybailov et al., https://pubmed.ncbi.nlm.nih.gov/17138671/ (NSAF)

/// Exponentially modified protein abundance index: `10^(observed / observable) - 1`
///
/// Zero when the protein has no observable peptide under the cleavage rule.
pub fn empai(validated_peptides: usize, observable_peptides: usize) -> f64 {
    if observable_peptides == 0 {
        return 0.0;
    }
    10f64.powf(validated_peptides as f64 / observable_peptides as f64) - 1.0
}

/// Spectral abundance factor of a single protein, not normalized across
/// proteins: `validated spectra / sequence length`
pub fn nsaf(validated_spectra: usize, sequence_length: usize) -> f64 {
    if sequence_length == 0 {
        return 0.0;
    }
    validated_spectra as f64 / sequence_length as f64
}
