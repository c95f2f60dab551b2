//! LanceDB-backed store over a pre-built NSS table.
//!
//! Expected columns: `id`, `text`, `country`, `year`, `doc_name`, `page`
//! and a fixed-size float `vector` column. Rows are decoded into typed
//! chunks here; rows missing required values are logged and skipped.

use super::{MetadataStore, VectorStore};
use crate::predicate::{Condition, Predicate};
use crate::types::{Chunk, ChunkMetadata};
use arrow_array::{
    Array, ArrayRef, Float32Array, Int32Array, Int64Array, LargeStringArray, RecordBatch,
    StringArray, UInt32Array, UInt64Array,
};
use arrow_schema::DataType;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::Table;
use nss_core::{AppError, AppResult};
use std::path::Path;

/// Name of the embedding column.
pub const VECTOR_COLUMN: &str = "vector";

const METADATA_COLUMNS: [&str; 4] = ["country", "year", "doc_name", "page"];

/// Page size used when a metadata scan has no natural limit.
const SCAN_PAGE_SIZE: usize = 5000;

/// Read-only handle to an NSS LanceDB table.
pub struct LanceDbStore {
    table: Table,
    dimensions: usize,
}

impl LanceDbStore {
    /// Open an existing table.
    ///
    /// Fails with a configuration error when the database directory or the
    /// table is missing, or when the stored vectors have a different
    /// dimension than `dimensions`.
    pub async fn open(db_path: &Path, table_name: &str, dimensions: usize) -> AppResult<Self> {
        if !db_path.exists() {
            return Err(AppError::Config(format!(
                "Vector index not found at {}. Build or download the index first.",
                db_path.display()
            )));
        }

        let uri = db_path.to_string_lossy().to_string();
        let conn = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Failed to connect to LanceDB: {}", e)))?;

        let table_names = conn
            .table_names()
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Failed to list tables: {}", e)))?;

        if !table_names.iter().any(|name| name == table_name) {
            return Err(AppError::Config(format!(
                "Table '{}' not found in index at {}",
                table_name,
                db_path.display()
            )));
        }

        let table = conn
            .open_table(table_name)
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Failed to open table: {}", e)))?;

        let schema = table
            .schema()
            .await
            .map_err(|e| AppError::Store(format!("Failed to read table schema: {}", e)))?;

        match schema
            .field_with_name(VECTOR_COLUMN)
            .ok()
            .map(|field| field.data_type())
        {
            Some(DataType::FixedSizeList(_, size)) if *size as usize == dimensions => {}
            Some(DataType::FixedSizeList(_, size)) => {
                return Err(AppError::Config(format!(
                    "Index vectors have {} dimensions, configured embedding.dimensions is {}",
                    size, dimensions
                )));
            }
            _ => {
                return Err(AppError::Config(format!(
                    "Table '{}' has no fixed-size '{}' column",
                    table_name, VECTOR_COLUMN
                )));
            }
        }

        tracing::debug!("Opened LanceDB table '{}' at {:?}", table_name, db_path);

        Ok(Self { table, dimensions })
    }

    /// Read one page of metadata; returns the raw row count alongside the
    /// decoded rows so callers can detect the last page.
    async fn scan_page(
        &self,
        filter: Option<String>,
        limit: usize,
        offset: usize,
    ) -> AppResult<(usize, Vec<ChunkMetadata>)> {
        let mut query = self
            .table
            .query()
            .select(Select::columns(&METADATA_COLUMNS[..]))
            .limit(limit)
            .offset(offset);

        if let Some(filter) = filter {
            query = query.only_if(filter);
        }

        let batches: Vec<RecordBatch> = query
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Failed to execute scan: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| AppError::Store(format!("Failed to collect scan results: {}", e)))?;

        let mut rows = 0;
        let mut metadata = Vec::new();
        for batch in &batches {
            rows += batch.num_rows();
            for row in 0..batch.num_rows() {
                match decode_metadata(batch, row) {
                    Some(meta) => metadata.push(meta),
                    None => tracing::warn!("Skipping malformed metadata row {}", offset + row),
                }
            }
        }

        Ok((rows, metadata))
    }
}

#[async_trait::async_trait]
impl MetadataStore for LanceDbStore {
    async fn count(&self) -> AppResult<usize> {
        self.table
            .count_rows(None)
            .await
            .map_err(|e| AppError::Store(format!("Failed to count rows: {}", e)))
    }

    async fn fetch_page(&self, limit: usize, offset: usize) -> AppResult<Vec<ChunkMetadata>> {
        let (_, metadata) = self.scan_page(None, limit, offset).await?;
        Ok(metadata)
    }

    async fn fetch_where(&self, condition: &Condition) -> AppResult<Vec<ChunkMetadata>> {
        let filter = condition.to_string();
        let mut offset = 0;
        let mut all = Vec::new();

        loop {
            let (rows, metadata) = self
                .scan_page(Some(filter.clone()), SCAN_PAGE_SIZE, offset)
                .await?;
            all.extend(metadata);
            if rows < SCAN_PAGE_SIZE {
                break;
            }
            offset += rows;
        }

        tracing::debug!(filter = %filter, matched = all.len(), "Metadata scan complete");
        Ok(all)
    }
}

#[async_trait::async_trait]
impl VectorStore for LanceDbStore {
    async fn nearest(
        &self,
        embedding: &[f32],
        top_k: usize,
        predicate: &Predicate,
    ) -> AppResult<Vec<(Chunk, f32)>> {
        if embedding.len() != self.dimensions {
            return Err(AppError::Store(format!(
                "Query embedding dimension mismatch: expected {}, got {}",
                self.dimensions,
                embedding.len()
            )));
        }

        let mut query = self
            .table
            .vector_search(embedding)
            .map_err(|e| AppError::Store(format!("Failed to build search query: {}", e)))?
            .limit(top_k);

        if let Some(filter) = predicate.to_sql() {
            tracing::debug!(filter = %filter, "Applying search predicate");
            query = query.only_if(filter);
        }

        let batches: Vec<RecordBatch> = query
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Failed to execute search: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| AppError::Store(format!("Failed to collect results: {}", e)))?;

        let mut results = Vec::new();
        for batch in &batches {
            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>());

            for row in 0..batch.num_rows() {
                let Some(chunk) = decode_chunk(batch, row) else {
                    tracing::warn!("Skipping malformed search result row {}", row);
                    continue;
                };
                let distance = distances.map(|d| d.value(row)).unwrap_or(0.0);
                results.push((chunk, 1.0 / (1.0 + distance)));
            }
        }

        tracing::debug!(
            "Retrieved {} chunks (requested top-{})",
            results.len(),
            top_k
        );

        Ok(results)
    }
}

fn decode_metadata(batch: &RecordBatch, row: usize) -> Option<ChunkMetadata> {
    let year = int_at(batch.column_by_name("year"), row).and_then(|y| i32::try_from(y).ok());
    let page = int_at(batch.column_by_name("page"), row).and_then(|p| i32::try_from(p).ok())?;

    Some(ChunkMetadata {
        country: str_at(batch.column_by_name("country"), row),
        year,
        doc_name: str_at(batch.column_by_name("doc_name"), row)?,
        page,
    })
}

fn decode_chunk(batch: &RecordBatch, row: usize) -> Option<Chunk> {
    Some(Chunk {
        id: str_at(batch.column_by_name("id"), row).unwrap_or_default(),
        text: str_at(batch.column_by_name("text"), row)?,
        metadata: decode_metadata(batch, row)?,
    })
}

fn str_at(column: Option<&ArrayRef>, row: usize) -> Option<String> {
    let column = column?;
    if column.is_null(row) {
        return None;
    }
    if let Some(values) = column.as_any().downcast_ref::<StringArray>() {
        return Some(values.value(row).to_string());
    }
    column
        .as_any()
        .downcast_ref::<LargeStringArray>()
        .map(|values| values.value(row).to_string())
}

fn int_at(column: Option<&ArrayRef>, row: usize) -> Option<i64> {
    let column = column?;
    if column.is_null(row) {
        return None;
    }
    let any = column.as_any();
    if let Some(values) = any.downcast_ref::<Int64Array>() {
        return Some(values.value(row));
    }
    if let Some(values) = any.downcast_ref::<Int32Array>() {
        return Some(values.value(row) as i64);
    }
    if let Some(values) = any.downcast_ref::<UInt32Array>() {
        return Some(values.value(row) as i64);
    }
    any.downcast_ref::<UInt64Array>()
        .and_then(|values| i64::try_from(values.value(row)).ok())
}
