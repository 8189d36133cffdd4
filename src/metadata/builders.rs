use std::sync::Arc;

use super::column_chunk_metadata::ColumnChunkMetaData;
use super::column_descriptor::ColumnDescriptor;
use super::file_metadata::FileMetadata;
use super::row_metadata::RowGroupMetadata;
use super::schema_descriptor::SchemaDescriptor;
use super::KeyValue;
use crate::error::{Error, Result};
use crate::parquet_bridge::Version;

/// Accumulates the facts of one row group as its columns close; no I/O.
#[derive(Debug)]
pub struct RowGroupMetaDataBuilder {
    schema: Arc<SchemaDescriptor>,
    columns: Vec<ColumnChunkMetaData>,
    next_column: usize,
    num_rows: Option<i64>,
}

impl RowGroupMetaDataBuilder {
    pub(crate) fn new(schema: Arc<SchemaDescriptor>) -> Self {
        Self {
            schema,
            columns: vec![],
            next_column: 0,
            num_rows: None,
        }
    }

    /// Allocates the next column chunk, handing out its descriptor.
    ///
    /// Fails with [`Error::Sequence`] if the schema has no further columns.
    pub fn next_column_chunk(&mut self) -> Result<&ColumnDescriptor> {
        let descriptor = self.schema.columns().get(self.next_column).ok_or_else(|| {
            Error::sequence(format!(
                "the schema only has {} columns",
                self.schema.num_columns()
            ))
        })?;
        self.next_column += 1;
        Ok(descriptor)
    }

    /// The number of column chunks allocated so far.
    pub fn current_column(&self) -> usize {
        self.next_column
    }

    /// The row count established for this row group, or `None` if no column
    /// has reported one yet. This is distinct from an established count of 0.
    pub fn num_rows(&self) -> Option<i64> {
        self.num_rows
    }

    /// Establishes the row group's row count.
    pub fn set_num_rows(&mut self, num_rows: i64) {
        self.num_rows = Some(num_rows);
    }

    /// Records a closed column chunk.
    pub fn push_column_chunk(&mut self, chunk: ColumnChunkMetaData) {
        self.columns.push(chunk);
    }

    /// Freezes this row group's metadata with the total number of bytes its
    /// chunks occupy in the file.
    ///
    /// Fails with [`Error::Sequence`] unless every column of the schema was
    /// written and closed.
    pub fn finish(self, total_bytes_written: i64) -> Result<RowGroupMetadata> {
        if self.columns.len() != self.schema.num_columns() {
            return Err(Error::sequence(format!(
                "the row group closed with {} of the schema's {} columns written",
                self.columns.len(),
                self.schema.num_columns()
            )));
        }
        Ok(RowGroupMetadata::new(
            self.columns,
            self.num_rows.unwrap_or(0),
            total_bytes_written,
        ))
    }
}

/// Accumulates finalized row groups into the file's footer metadata; no I/O.
#[derive(Debug)]
pub struct FileMetaDataBuilder {
    schema: Arc<SchemaDescriptor>,
    version: Version,
    created_by: Option<String>,
    key_value_metadata: Option<Vec<KeyValue>>,
    row_groups: Vec<RowGroupMetadata>,
}

impl FileMetaDataBuilder {
    pub(crate) fn new(
        schema: Arc<SchemaDescriptor>,
        version: Version,
        created_by: Option<String>,
        key_value_metadata: Option<Vec<KeyValue>>,
    ) -> Self {
        Self {
            schema,
            version,
            created_by,
            key_value_metadata,
            row_groups: vec![],
        }
    }

    /// Allocates the builder for the next row group.
    pub fn append_row_group(&self) -> RowGroupMetaDataBuilder {
        RowGroupMetaDataBuilder::new(self.schema.clone())
    }

    /// Records a finalized row group, in append order.
    pub fn finish_row_group(&mut self, row_group: RowGroupMetadata) {
        self.row_groups.push(row_group);
    }

    /// The row groups finalized so far, in append order.
    pub fn row_groups(&self) -> &[RowGroupMetadata] {
        &self.row_groups
    }

    /// The key-value metadata this file will be closed with.
    pub fn key_value_metadata(&self) -> Option<&[KeyValue]> {
        self.key_value_metadata.as_deref()
    }

    /// Freezes the complete file metadata.
    ///
    /// Consuming the builder makes this callable at most once per file;
    /// `footer_start` is stamped later, when the footer is serialized.
    pub fn finish(self) -> FileMetadata {
        let num_rows = self.row_groups.iter().map(|rg| rg.num_rows()).sum();
        FileMetadata {
            version: self.version.into(),
            num_rows,
            created_by: self.created_by,
            row_groups: self.row_groups,
            key_value_metadata: self.key_value_metadata,
            schema_descr: (*self.schema).clone(),
            footer_start: 0,
        }
    }
}
