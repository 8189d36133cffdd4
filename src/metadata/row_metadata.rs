use parquet_format_safe::RowGroup;

use super::column_chunk_metadata::ColumnChunkMetaData;
use super::schema_descriptor::SchemaDescriptor;
use crate::error::{Error, Result};

/// Metadata of one row group: its column chunks in schema order plus the
/// totals frozen when the row group closed.
#[derive(Debug, Clone)]
pub struct RowGroupMetadata {
    columns: Vec<ColumnChunkMetaData>,
    num_rows: i64,
    total_byte_size: i64,
    total_compressed_size: i64,
}

impl RowGroupMetadata {
    pub(crate) fn new(
        columns: Vec<ColumnChunkMetaData>,
        num_rows: i64,
        total_compressed_size: i64,
    ) -> Self {
        let total_byte_size = columns.iter().map(|c| c.uncompressed_size()).sum();
        Self {
            columns,
            num_rows,
            total_byte_size,
            total_compressed_size,
        }
    }

    /// The [`ColumnChunkMetaData`] of this row group, in schema order.
    pub fn columns(&self) -> &[ColumnChunkMetaData] {
        &self.columns
    }

    /// The number of rows of this row group.
    pub fn num_rows(&self) -> i64 {
        self.num_rows
    }

    /// The total size of all uncompressed column data of this row group.
    pub fn total_byte_size(&self) -> i64 {
        self.total_byte_size
    }

    /// The number of bytes this row group occupies in the file, including the
    /// per-chunk trailing metadata.
    pub fn compressed_size(&self) -> i64 {
        self.total_compressed_size
    }

    /// Converts to thrift, stamping the row group's position in the file.
    pub(crate) fn into_thrift(self, ordinal: usize) -> RowGroup {
        // a row group starts where its first chunk does
        let file_offset = self
            .columns
            .first()
            .map(|c| {
                c.column_chunk()
                    .meta_data
                    .as_ref()
                    .and_then(|m| m.dictionary_page_offset.filter(|x| *x > 0))
                    .unwrap_or_else(|| c.data_page_offset())
            });

        RowGroup {
            columns: self.columns.into_iter().map(|c| c.into_thrift()).collect(),
            total_byte_size: self.total_byte_size,
            num_rows: self.num_rows,
            sorting_columns: None,
            file_offset,
            total_compressed_size: Some(self.total_compressed_size),
            ordinal: ordinal.try_into().ok(),
        }
    }

    /// Reconstructs the metadata from a decoded footer and the schema it was
    /// written with.
    pub fn try_from_thrift(schema_descr: &SchemaDescriptor, row_group: RowGroup) -> Result<Self> {
        if schema_descr.num_columns() != row_group.columns.len() {
            return Err(Error::oos(format!(
                "the row group has {} column chunks while the schema has {} columns",
                row_group.columns.len(),
                schema_descr.num_columns()
            )));
        }
        let total_compressed_size = row_group
            .total_compressed_size
            .unwrap_or(row_group.total_byte_size);
        let columns = row_group
            .columns
            .into_iter()
            .zip(schema_descr.columns().iter().cloned())
            .map(|(column_chunk, descriptor)| {
                ColumnChunkMetaData::try_from_thrift(descriptor, column_chunk)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            columns,
            num_rows: row_group.num_rows,
            total_byte_size: row_group.total_byte_size,
            total_compressed_size,
        })
    }
}
