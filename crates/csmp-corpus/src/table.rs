//! LanceDB connection and housekeeping helpers for the corpus table.

use anyhow::Result;
use arrow_array::RecordBatchIterator;
use lancedb::{connect, Connection};

use crate::schema::build_corpus_schema;

pub async fn open_db(uri: &str) -> Result<Connection> {
    Ok(connect(uri).execute().await?)
}

pub async fn ensure_corpus_table(conn: &Connection, name: &str) -> Result<()> {
    let names = conn.table_names().execute().await?;
    if names.contains(&name.to_string()) {
        return Ok(());
    }
    // create empty table with 0 rows
    let schema = build_corpus_schema();
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema);
    conn.create_table(name, Box::new(iter)).execute().await?;
    Ok(())
}
