//! Corpus seeding: batched inserts of molecule rows with embeddings.

use anyhow::{anyhow, Result};
use arrow_array::{FixedSizeListArray, Float64Array, RecordBatch, RecordBatchIterator, StringArray};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Connection;
use std::sync::Arc;

use csmp_core::types::MoleculeCandidate;

use crate::schema::{build_corpus_schema, EMBEDDING_DIM};

pub async fn seed_candidates(
    conn: &Connection,
    table_name: &str,
    candidates: &[MoleculeCandidate],
) -> Result<usize> {
    if candidates.is_empty() {
        return Ok(0);
    }
    for c in candidates {
        if c.embedding.len() != EMBEDDING_DIM as usize {
            return Err(anyhow!(
                "molecule {} has embedding dim {} (expected {})",
                c.inchikey,
                c.embedding.len(),
                EMBEDDING_DIM
            ));
        }
    }
    let pb = ProgressBar::new(candidates.len() as u64);
    pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} molecules ({percent}%) {msg}").unwrap().progress_chars("#>-") );

    let mut written = 0usize;
    for chunk in candidates.chunks(1000) {
        let record_batch = candidates_to_record_batch(chunk)?;
        let reader = Box::new(RecordBatchIterator::new(
            vec![Ok(record_batch)].into_iter(),
            build_corpus_schema(),
        ));
        if conn.table_names().execute().await?.contains(&table_name.to_string()) {
            conn.open_table(table_name).execute().await?.add(reader).execute().await?;
        } else {
            conn.create_table(table_name, reader).execute().await?;
        }
        written += chunk.len();
        pb.set_position(written as u64);
    }
    pb.finish_with_message("corpus seeding completed");
    Ok(written)
}

fn candidates_to_record_batch(candidates: &[MoleculeCandidate]) -> Result<RecordBatch> {
    let mut inchikeys = Vec::new();
    let mut smiles = Vec::new();
    let mut formulas: Vec<Option<String>> = Vec::new();
    let mut masses = Vec::new();
    let mut embeddings: Vec<Option<Vec<Option<f32>>>> = Vec::new();
    for c in candidates {
        inchikeys.push(c.inchikey.clone());
        smiles.push(c.smiles.clone());
        formulas.push(c.formula.clone());
        masses.push(c.monoisotopic_mass);
        embeddings.push(Some(c.embedding.iter().map(|&x| Some(x)).collect()));
    }
    let record_batch = RecordBatch::try_new(
        build_corpus_schema(),
        vec![
            Arc::new(StringArray::from(inchikeys)),
            Arc::new(StringArray::from(smiles)),
            Arc::new(StringArray::from(formulas)),
            Arc::new(Float64Array::from(masses)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(embeddings.into_iter(), EMBEDDING_DIM)),
        ],
    )?;
    Ok(record_batch)
}
