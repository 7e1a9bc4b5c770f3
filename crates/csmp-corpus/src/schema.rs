use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const EMBEDDING_DIM: i32 = csmp_core::types::EMBEDDING_DIM as i32;

pub fn build_corpus_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("inchikey", DataType::Utf8, false),
        Field::new("smiles", DataType::Utf8, false),
        Field::new("formula", DataType::Utf8, true),
        Field::new("monoisotopic_mass", DataType::Float64, false),
        Field::new(
            "embedding",
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), EMBEDDING_DIM),
            true,
        ),
    ]))
}
