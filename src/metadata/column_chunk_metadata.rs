use parquet_format_safe::{ColumnChunk, ColumnMetaData};

use super::column_descriptor::ColumnDescriptor;
use crate::error::{Error, Result};

/// Metadata of a column chunk: the thrift struct plus the leaf's descriptor.
#[derive(Debug, Clone)]
pub struct ColumnChunkMetaData {
    column_chunk: ColumnChunk,
    column_descr: ColumnDescriptor,
}

impl ColumnChunkMetaData {
    /// Creates the metadata. `column_chunk.meta_data` must be set.
    pub(crate) fn new(column_chunk: ColumnChunk, column_descr: ColumnDescriptor) -> Self {
        debug_assert!(column_chunk.meta_data.is_some());
        Self {
            column_chunk,
            column_descr,
        }
    }

    /// Reconstructs the metadata from a decoded footer.
    pub fn try_from_thrift(
        column_descr: ColumnDescriptor,
        column_chunk: ColumnChunk,
    ) -> Result<Self> {
        if column_chunk.meta_data.is_none() {
            return Err(Error::oos("the column chunk is missing its metadata"));
        }
        Ok(Self {
            column_chunk,
            column_descr,
        })
    }

    /// The column chunk's thrift struct.
    pub fn column_chunk(&self) -> &ColumnChunk {
        &self.column_chunk
    }

    /// The column's descriptor.
    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.column_descr
    }

    fn column_metadata(&self) -> &ColumnMetaData {
        // invariant of this struct, checked at construction
        self.column_chunk.meta_data.as_ref().unwrap()
    }

    /// The number of values of this column chunk.
    pub fn num_values(&self) -> i64 {
        self.column_metadata().num_values
    }

    /// The total size of this chunk's pages after compression, including page
    /// headers.
    pub fn compressed_size(&self) -> i64 {
        self.column_metadata().total_compressed_size
    }

    /// The total size of this chunk's pages before compression, including page
    /// headers.
    pub fn uncompressed_size(&self) -> i64 {
        self.column_metadata().total_uncompressed_size
    }

    /// The offset of this chunk's first data page in the file.
    pub fn data_page_offset(&self) -> i64 {
        self.column_metadata().data_page_offset
    }

    /// The range of bytes this chunk's pages occupy in the file.
    pub fn byte_range(&self) -> core::ops::Range<u64> {
        let start = self.data_page_offset() as u64;
        start..start + self.compressed_size() as u64
    }

    pub(crate) fn into_thrift(self) -> ColumnChunk {
        self.column_chunk
    }
}
