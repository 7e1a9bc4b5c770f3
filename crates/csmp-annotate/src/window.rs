//! Symmetric mass tolerance window around a target neutral mass.

/// `[lo, hi]` around a target mass, with `δ = mass·ppm·1e-6 + floor`.
/// The absolute floor keeps the window finite near mass zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassWindow {
    pub lo: f64,
    pub hi: f64,
}

impl MassWindow {
    pub fn around(mass: f64, ppm: f64, floor: f64) -> Self {
        let delta = mass.abs() * ppm * 1e-6 + floor;
        Self { lo: mass - delta, hi: mass + delta }
    }

    pub fn contains(&self, mass: f64) -> bool {
        mass >= self.lo && mass <= self.hi
    }
}
