//! Unit-level checks for the mass window and cosine ranking stages.

use csmp_annotate::rank::{cosine, rank_candidates};
use csmp_annotate::window::MassWindow;
use csmp_core::types::MoleculeCandidate;

fn molecule(inchikey: &str, embedding: Vec<f32>) -> MoleculeCandidate {
    MoleculeCandidate {
        inchikey: inchikey.to_string(),
        smiles: format!("C{inchikey}"),
        formula: None,
        monoisotopic_mass: 100.0,
        embedding,
    }
}

#[test]
fn window_combines_ppm_and_absolute_floor() {
    // 10 ppm of 162.1150 is ~0.00162, plus the 0.001 floor.
    let w = MassWindow::around(162.1150, 10.0, 1e-3);
    let delta = 162.1150 * 10.0 * 1e-6 + 1e-3;
    assert!((w.lo - (162.1150 - delta)).abs() < 1e-12);
    assert!((w.hi - (162.1150 + delta)).abs() < 1e-12);
    assert!(w.contains(162.1150));
    assert!(w.contains(w.lo) && w.contains(w.hi), "bounds are inclusive");
    assert!(!w.contains(w.hi + 1e-9));
}

#[test]
fn window_floor_keeps_low_masses_searchable() {
    // Pure ppm collapses to nothing near zero mass; the floor does not.
    let w = MassWindow::around(0.5, 10.0, 1e-3);
    assert!(w.hi - w.lo >= 2e-3);
}

#[test]
fn cosine_handles_zero_vectors() {
    let zero = vec![0f32; 4];
    let unit = vec![1f32, 0.0, 0.0, 0.0];
    assert_eq!(cosine(&zero, &unit), 0.0);
    assert!((cosine(&unit, &unit) - 1.0).abs() < 1e-6);
}

#[test]
fn negative_similarity_is_clamped_to_zero() {
    let query = vec![1f32, 0.0];
    let opposite = molecule("NEG", vec![-1f32, 0.0]);
    let ranked = rank_candidates(&query, &[opposite], 5);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].score, 0.0);
}

#[test]
fn ranking_orders_by_score_then_inchikey() {
    let query = vec![1f32, 0.0];
    let pool = vec![
        molecule("LOW", vec![0.5f32, 0.866]),
        molecule("B", vec![1f32, 0.0]),
        molecule("A", vec![1f32, 0.0]),
    ];
    let ranked = rank_candidates(&query, &pool, 10);
    let smiles: Vec<&str> = ranked.iter().map(|c| c.smiles.as_str()).collect();
    assert_eq!(smiles, ["CA", "CB", "CLOW"]);
    assert!(ranked[0].score > ranked[2].score);
}

#[test]
fn ranking_truncates_to_top_k() {
    let query = vec![1f32, 0.0];
    let pool: Vec<_> = (0..6).map(|i| molecule(&format!("K{i}"), vec![1f32, 0.0])).collect();
    assert_eq!(rank_candidates(&query, &pool, 4).len(), 4);
    assert!(rank_candidates(&query, &[], 4).is_empty());
}
