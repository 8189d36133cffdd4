use std::io::Write;

use parquet_format_safe::thrift::protocol::TCompactOutputProtocol;
use parquet_format_safe::{ColumnChunk, ColumnMetaData, DataPageHeader, Encoding, Type};

use super::page::{write_page, PageWriteSpec};
use crate::compression::compress;
use crate::error::{Error, Result};
use crate::metadata::{ColumnChunkMetaData, ColumnDescriptor, KeyValue};
use crate::page::CompressedDataPage;
use crate::parquet_bridge::CompressionOptions;
use crate::schema::types::PhysicalType;
use crate::types::NativeType;

/// Writes one column chunk of one row group.
///
/// Values are `PLAIN`-encoded, one data page per call, and compressed with
/// the codec the column resolved to. Pages are buffered in memory; they reach
/// the sink when the owning row group closes this writer.
#[derive(Debug)]
pub struct ColumnChunkWriter {
    descriptor: ColumnDescriptor,
    compression: CompressionOptions,
    extra_key_value_metadata: Option<Vec<KeyValue>>,
    pages: Vec<CompressedDataPage>,
    rows_written: i64,
}

impl ColumnChunkWriter {
    pub(crate) fn new(
        descriptor: ColumnDescriptor,
        compression: CompressionOptions,
        extra_key_value_metadata: Option<Vec<KeyValue>>,
    ) -> Self {
        Self {
            descriptor,
            compression,
            extra_key_value_metadata,
            pages: vec![],
            rows_written: 0,
        }
    }

    /// The descriptor of the column this writer writes.
    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    /// The number of rows written to this column so far.
    pub fn rows_written(&self) -> i64 {
        self.rows_written
    }

    /// Writes `values` as one `PLAIN`-encoded data page.
    pub fn write_values<T: NativeType>(&mut self, values: &[T]) -> Result<()> {
        self.check_physical_type(T::TYPE)?;
        let mut buffer = Vec::with_capacity(values.len() * std::mem::size_of::<T>());
        for value in values {
            buffer.extend_from_slice(value.to_le_bytes().as_ref());
        }
        self.push_page(buffer, values.len())
    }

    /// Writes booleans as one data page, bit-packed LSB-first.
    pub fn write_bools(&mut self, values: &[bool]) -> Result<()> {
        self.check_physical_type(PhysicalType::Boolean)?;
        let mut buffer = vec![0u8; values.len().div_ceil(8)];
        for (i, value) in values.iter().enumerate() {
            if *value {
                buffer[i / 8] |= 1 << (i % 8);
            }
        }
        self.push_page(buffer, values.len())
    }

    /// Writes byte arrays as one data page, each value length-prefixed.
    pub fn write_byte_arrays(&mut self, values: &[&[u8]]) -> Result<()> {
        self.check_physical_type(PhysicalType::ByteArray)?;
        let total = values.iter().map(|v| 4 + v.len()).sum();
        let mut buffer = Vec::with_capacity(total);
        for value in values {
            buffer.extend_from_slice(&(value.len() as u32).to_le_bytes());
            buffer.extend_from_slice(value);
        }
        self.push_page(buffer, values.len())
    }

    /// Writes fixed-length byte arrays as one data page.
    pub fn write_fixed_len_byte_arrays(&mut self, values: &[&[u8]]) -> Result<()> {
        let physical_type = self.descriptor.descriptor.primitive_type.physical_type;
        let length = match physical_type {
            PhysicalType::FixedLenByteArray(length) => length,
            _ => return Err(self.type_mismatch(physical_type)),
        };
        let mut buffer = Vec::with_capacity(values.len() * length);
        for value in values {
            if value.len() != length {
                return Err(Error::InvalidParameter(format!(
                    "column \"{}\" requires values of {length} bytes, got {}",
                    self.descriptor.path(),
                    value.len()
                )));
            }
            buffer.extend_from_slice(value);
        }
        self.push_page(buffer, values.len())
    }

    fn check_physical_type(&self, written: PhysicalType) -> Result<()> {
        let physical_type = self.descriptor.descriptor.primitive_type.physical_type;
        if physical_type != written {
            return Err(self.type_mismatch(written));
        }
        Ok(())
    }

    fn type_mismatch(&self, written: PhysicalType) -> Error {
        Error::InvalidParameter(format!(
            "column \"{}\" has physical type {:?}; cannot write {written:?} values to it",
            self.descriptor.path(),
            self.descriptor.descriptor.primitive_type.physical_type,
        ))
    }

    fn push_page(&mut self, buffer: Vec<u8>, num_values: usize) -> Result<()> {
        if self.descriptor.descriptor.max_def_level > 0
            || self.descriptor.descriptor.max_rep_level > 0
        {
            return Err(Error::FeatureNotSupported(format!(
                "column \"{}\" is not required at every level; writing levels is not supported",
                self.descriptor.path()
            )));
        }

        let uncompressed_size = buffer.len();
        let mut compressed = Vec::with_capacity(uncompressed_size);
        compress(self.compression, &buffer, &mut compressed)?;

        let header = DataPageHeader {
            num_values: num_values as i32,
            encoding: Encoding::PLAIN,
            definition_level_encoding: Encoding::RLE,
            repetition_level_encoding: Encoding::RLE,
            statistics: None,
        };
        self.pages.push(CompressedDataPage::new(
            header,
            compressed,
            uncompressed_size,
            self.compression.into(),
        ));
        self.rows_written += num_values as i64;
        Ok(())
    }

    /// Writes the buffered pages and the chunk's trailing metadata to the
    /// sink, which is positioned at `offset`. Returns the finalized metadata
    /// and the number of bytes written.
    pub(crate) fn close<W: Write>(
        self,
        writer: &mut W,
        mut offset: u64,
    ) -> Result<(ColumnChunkMetaData, u64)> {
        let initial = offset;

        let mut specs = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let spec = write_page(writer, offset, page)?;
            offset += spec.bytes_written;
            specs.push(spec);
        }
        let mut bytes_written = offset - initial;

        let column_chunk = build_column_chunk(
            &specs,
            &self.descriptor,
            self.compression,
            self.extra_key_value_metadata,
        );

        // write the chunk's metadata after its last page
        let mut protocol = TCompactOutputProtocol::new(writer);
        bytes_written += column_chunk
            .meta_data
            .as_ref()
            .unwrap()
            .write_to_out_protocol(&mut protocol)? as u64;

        Ok((
            ColumnChunkMetaData::new(column_chunk, self.descriptor),
            bytes_written,
        ))
    }
}

fn build_column_chunk(
    specs: &[PageWriteSpec],
    descriptor: &ColumnDescriptor,
    compression: CompressionOptions,
    key_value_metadata: Option<Vec<KeyValue>>,
) -> ColumnChunk {
    // the total sizes include the page headers
    let total_compressed_size = specs
        .iter()
        .map(|x| x.header_size as i64 + x.header.compressed_page_size as i64)
        .sum();
    let total_uncompressed_size = specs
        .iter()
        .map(|x| x.header_size as i64 + x.header.uncompressed_page_size as i64)
        .sum();
    let data_page_offset = specs.first().map(|spec| spec.offset).unwrap_or(0) as i64;
    let num_values = specs.iter().map(|spec| spec.num_values).sum();

    let mut encodings: Vec<Encoding> = specs
        .iter()
        .flat_map(|spec| {
            spec.header
                .data_page_header
                .as_ref()
                .map(|header| header.encoding)
                .into_iter()
                .chain(std::iter::once(Encoding::RLE))
        })
        .collect();
    // sort and deduplicate to have deterministic metadata
    encodings.sort();
    encodings.dedup();

    let (type_, _): (Type, Option<i32>) = descriptor.descriptor.primitive_type.physical_type.into();

    let metadata = ColumnMetaData {
        type_,
        encodings,
        path_in_schema: descriptor.path_in_schema.clone(),
        codec: compression.into(),
        num_values,
        total_uncompressed_size,
        total_compressed_size,
        key_value_metadata,
        data_page_offset,
        index_page_offset: None,
        dictionary_page_offset: None,
        statistics: None,
        encoding_stats: None,
        bloom_filter_offset: None,
    };

    ColumnChunk {
        file_path: None, // same file
        file_offset: data_page_offset + total_compressed_size,
        meta_data: Some(metadata),
        offset_index_offset: None,
        offset_index_length: None,
        column_index_offset: None,
        column_index_length: None,
        crypto_metadata: None,
        encrypted_column_metadata: None,
    }
}
