//! Adduct-to-neutral-mass conversion.
//!
//! The conversion rule is data, not code: deployments construct their own
//! table when the defaults do not match their ion source.

use std::collections::HashMap;

/// Proton mass in Dalton, the shift of the ubiquitous [M+H]+ / [M-H]- pair.
const PROTON: f64 = 1.007_276_466;

/// Maps adduct strings to the mass shift between precursor m/z and neutral
/// monoisotopic mass.
#[derive(Debug, Clone)]
pub struct AdductTable {
    shifts: HashMap<String, f64>,
}

impl AdductTable {
    pub fn from_shifts<I>(shifts: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        Self { shifts: shifts.into_iter().collect() }
    }

    /// Target neutral mass for a singly charged precursor. Unknown or absent
    /// adducts fall back to the raw precursor m/z (shift 0).
    pub fn neutral_mass(&self, precursor_mz: f64, adduct: Option<&str>) -> f64 {
        let shift = adduct
            .and_then(|a| self.shifts.get(a.trim()))
            .copied()
            .unwrap_or(0.0);
        precursor_mz - shift
    }

    pub fn contains(&self, adduct: &str) -> bool {
        self.shifts.contains_key(adduct)
    }
}

impl Default for AdductTable {
    fn default() -> Self {
        Self::from_shifts([
            ("[M+H]+".to_string(), PROTON),
            ("[M-H]-".to_string(), -PROTON),
            ("[M+Na]+".to_string(), 22.989_218),
            ("[M+K]+".to_string(), 38.963_158),
            ("[M+NH4]+".to_string(), 18.033_823),
        ])
    }
}
