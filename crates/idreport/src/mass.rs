use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub const H2O: f64 = 18.010565;
pub const PROTON: f64 = 1.007276;

pub const VALID_AA: [u8; 22] = [
    b'A', b'C', b'D', b'E', b'F', b'G', b'H', b'I', b'K', b'L', b'M', b'N', b'P', b'Q', b'R', b'S',
    b'T', b'V', b'W', b'Y', b'U', b'O',
];

#[derive(Copy, Clone, Serialize, Deserialize, Debug, PartialEq, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum Tolerance {
    Ppm(f64, f64),
    Da(f64, f64),
}

impl Display for Tolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tolerance::Ppm(lo, hi) => write!(f, "[{}, {}] ppm", lo, hi),
            Tolerance::Da(lo, hi) => write!(f, "[{}, {}] Da", lo, hi),
        }
    }
}

/// Monoisotopic residue mass, `None` for anything outside the standard
/// (and selenocysteine/pyrrolysine) alphabet
pub fn residue_mass(residue: u8) -> Option<f64> {
    let mass = match residue {
        b'A' => 71.03711,
        b'R' => 156.10111,
        b'N' => 114.04293,
        b'D' => 115.02694,
        b'C' => 103.00919,
        b'E' => 129.04259,
        b'Q' => 128.05858,
        b'G' => 57.02146,
        b'H' => 137.05891,
        b'I' => 113.08406,
        b'L' => 113.08406,
        b'K' => 128.09496,
        b'M' => 131.04049,
        b'F' => 147.06841,
        b'P' => 97.05276,
        b'S' => 87.03203,
        b'T' => 101.04768,
        b'W' => 186.07931,
        b'Y' => 163.06333,
        b'V' => 99.06841,
        b'U' => 150.95363,
        b'O' => 237.14773,
        _ => return None,
    };
    Some(mass)
}

/// Neutral monoisotopic mass of an unmodified sequence
pub fn sequence_mass(sequence: &str) -> Option<f64> {
    sequence
        .bytes()
        .map(residue_mass)
        .sum::<Option<f64>>()
        .map(|residues| residues + H2O)
}

/// Mass error of an observed precursor, in ppm of the theoretical m/z
pub fn ppm_error(theoretical_mass: f64, observed_mz: f64, charge: u8) -> f64 {
    let charge = charge.max(1) as f64;
    let theoretical_mz = (theoretical_mass + PROTON * charge) / charge;
    (observed_mz - theoretical_mz) / theoretical_mz * 1_000_000.0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn smoke() {
        for ch in VALID_AA {
            assert!(residue_mass(ch).unwrap() > 0.0);
        }
        assert_eq!(residue_mass(b'X'), None);
        assert_eq!(residue_mass(b'B'), None);
    }

    #[test]
    fn peptide_mass() {
        let mass = sequence_mass("PEPTIDE").unwrap();
        assert!((mass - 799.35995).abs() < 1e-4, "{}", mass);
        assert_eq!(sequence_mass("PEPXIDE"), None);
    }

    #[test]
    fn precursor_error() {
        let mass = sequence_mass("PEPTIDE").unwrap();
        let mz = (mass + 2.0 * PROTON) / 2.0;
        assert!(ppm_error(mass, mz, 2).abs() < 1e-6);

        let shifted = mz + mz * 10.0 / 1_000_000.0;
        assert!((ppm_error(mass, shifted, 2) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn tolerance_display() {
        assert_eq!(Tolerance::Ppm(-10.0, 10.0).to_string(), "[-10, 10] ppm");
        assert_eq!(Tolerance::Da(-0.02, 0.02).to_string(), "[-0.02, 0.02] Da");
    }
}
