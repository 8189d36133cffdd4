//! In-memory representation of compressed pages before they hit the sink.
use parquet_format_safe::DataPageHeader;
pub use parquet_format_safe::PageHeader as ParquetPageHeader;

use crate::parquet_bridge::Compression;

/// A data page whose payload was already compressed, ready to be written.
#[derive(Debug, Clone)]
pub struct CompressedDataPage {
    pub(crate) header: DataPageHeader,
    pub(crate) buffer: Vec<u8>,
    pub(crate) uncompressed_size: usize,
    pub(crate) compression: Compression,
}

impl CompressedDataPage {
    pub(crate) fn new(
        header: DataPageHeader,
        buffer: Vec<u8>,
        uncompressed_size: usize,
        compression: Compression,
    ) -> Self {
        Self {
            header,
            buffer,
            uncompressed_size,
            compression,
        }
    }

    /// The number of values of the page.
    pub fn num_values(&self) -> i64 {
        self.header.num_values as i64
    }

    /// The size of the compressed payload, excluding the page header.
    pub fn compressed_size(&self) -> usize {
        self.buffer.len()
    }

    /// The size of the payload before compression, excluding the page header.
    pub fn uncompressed_size(&self) -> usize {
        self.uncompressed_size
    }

    /// The codec the payload was compressed with.
    pub fn compression(&self) -> Compression {
        self.compression
    }
}
