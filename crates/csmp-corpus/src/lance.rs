//! LanceDB-backed molecule corpus.
//!
//! The mass window filter runs as an `only_if` range predicate over
//! `monoisotopic_mass`; embeddings come back with the rows so similarity is
//! computed in-process by the ranker.

use anyhow::{anyhow, Result};
use arrow_array::cast::AsArray;
use arrow_array::{Array, FixedSizeListArray, Float64Array, RecordBatch, StringArray};
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::Connection;

use csmp_core::traits::CandidateStore;
use csmp_core::types::MoleculeCandidate;

use crate::table::open_db;

pub struct LanceCorpus {
    db: Connection,
    table_name: String,
}

impl LanceCorpus {
    pub async fn new(uri: &str, table_name: &str) -> Result<Self> {
        let db = open_db(uri).await?;
        Ok(Self { db, table_name: table_name.to_string() })
    }

    async fn scan(&self, predicate: Option<String>) -> Result<Vec<MoleculeCandidate>> {
        let table = self.db.open_table(&self.table_name).execute().await?;
        let mut query = table.query();
        if let Some(filter) = predicate {
            query = query.only_if(filter);
        }
        let mut stream = query.execute().await?;
        let mut out = Vec::new();
        while let Some(batch) = TryStreamExt::try_next(&mut stream).await? {
            decode_batch(&batch, &mut out)?;
        }
        out.sort_by(crate::by_mass_then_key);
        Ok(out)
    }
}

fn decode_batch(batch: &RecordBatch, out: &mut Vec<MoleculeCandidate>) -> Result<()> {
    let inchikey = batch
        .column_by_name("inchikey")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("inchikey column missing"))?;
    let smiles = batch
        .column_by_name("smiles")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("smiles column missing"))?;
    let formula = batch
        .column_by_name("formula")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>());
    let mass = batch
        .column_by_name("monoisotopic_mass")
        .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
        .ok_or_else(|| anyhow!("monoisotopic_mass column missing"))?;
    let embedding = batch
        .column_by_name("embedding")
        .and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>())
        .ok_or_else(|| anyhow!("embedding column missing"))?;

    for i in 0..batch.num_rows() {
        if !embedding.is_valid(i) {
            tracing::warn!(inchikey = inchikey.value(i), "corpus row without embedding skipped");
            continue;
        }
        let list = embedding.value(i);
        let values = list
            .as_primitive::<arrow_array::types::Float32Type>()
            .values()
            .iter()
            .copied()
            .collect::<Vec<f32>>();
        let formula_value = formula.and_then(|col| {
            if col.is_valid(i) {
                Some(col.value(i).to_string())
            } else {
                None
            }
        });
        out.push(MoleculeCandidate {
            inchikey: inchikey.value(i).to_string(),
            smiles: smiles.value(i).to_string(),
            formula: formula_value,
            monoisotopic_mass: mass.value(i),
            embedding: values,
        });
    }
    Ok(())
}

#[async_trait]
impl CandidateStore for LanceCorpus {
    async fn candidates_in_mass_range(
        &self,
        lo: f64,
        hi: f64,
    ) -> Result<Vec<MoleculeCandidate>> {
        self.scan(Some(format!("monoisotopic_mass >= {lo} AND monoisotopic_mass <= {hi}")))
            .await
    }

    async fn all_candidates(&self) -> Result<Vec<MoleculeCandidate>> {
        self.scan(None).await
    }
}
