//! Molecule corpus access: a LanceDB-backed store with mass range scans and
//! an in-memory store for tests and small offline corpora.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

use std::cmp::Ordering;

use csmp_core::types::MoleculeCandidate;

pub mod lance;
pub mod memory;
pub mod schema;
pub mod table;
pub mod writer;

pub use lance::LanceCorpus;
pub use memory::MemoryCorpus;

/// Ascending mass, inchikey as tie-break: the deterministic order every
/// store returns.
pub(crate) fn by_mass_then_key(a: &MoleculeCandidate, b: &MoleculeCandidate) -> Ordering {
    a.monoisotopic_mass
        .partial_cmp(&b.monoisotopic_mass)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.inchikey.cmp(&b.inchikey))
}
