pub use parquet_format_safe::KeyValue;

use super::row_metadata::RowGroupMetadata;
use super::schema_descriptor::SchemaDescriptor;
use super::ThriftFileMetadata;
use crate::error::Result;

/// Metadata of a closed file: everything the footer records.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// version of this file.
    pub version: i32,
    /// number of rows in the file.
    pub num_rows: i64,
    /// String message for application that wrote this file.
    pub created_by: Option<String>,
    /// The row groups of this file, in append order.
    pub row_groups: Vec<RowGroupMetadata>,
    /// key_value_metadata of this file.
    pub key_value_metadata: Option<Vec<KeyValue>>,
    /// schema descriptor.
    pub schema_descr: SchemaDescriptor,
    /// The offset of the first byte of the serialized metadata block;
    /// equivalently, one past the end of the column data. An append to this
    /// file must position its sink exactly here.
    pub footer_start: u64,
}

impl FileMetadata {
    /// Returns the [`SchemaDescriptor`] that describes schema of this file.
    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema_descr
    }

    /// returns the metadata
    pub fn key_value_metadata(&self) -> Option<&[KeyValue]> {
        self.key_value_metadata.as_deref()
    }

    pub(crate) fn into_thrift(self) -> ThriftFileMetadata {
        ThriftFileMetadata::new(
            self.version,
            self.schema_descr.to_thrift(),
            self.num_rows,
            self.row_groups
                .into_iter()
                .enumerate()
                .map(|(ordinal, row_group)| row_group.into_thrift(ordinal))
                .collect(),
            self.key_value_metadata,
            self.created_by,
            None,
            None,
            None,
        )
    }

    /// Deserializes a decoded footer into this struct.
    ///
    /// `footer_start` is the offset at which the serialized metadata block
    /// began; a reader obtains it as
    /// `file length - FOOTER_SIZE - length field`.
    pub fn try_from_thrift(metadata: ThriftFileMetadata, footer_start: u64) -> Result<Self> {
        let schema_descr = SchemaDescriptor::try_from_thrift(&metadata.schema)?;

        let row_groups = metadata
            .row_groups
            .into_iter()
            .map(|rg| RowGroupMetadata::try_from_thrift(&schema_descr, rg))
            .collect::<Result<Vec<_>>>()?;

        Ok(FileMetadata {
            version: metadata.version,
            num_rows: metadata.num_rows,
            created_by: metadata.created_by,
            row_groups,
            key_value_metadata: metadata.key_value_metadata,
            schema_descr,
            footer_start,
        })
    }
}

/// Merges the key-value metadata of a previously written file with newly
/// supplied pairs: every prior pair is inserted first, then every new pair;
/// on a key collision the new value wins. An empty merge yields `None`, so
/// the footer omits the section entirely.
pub(crate) fn merge_key_value_metadata(
    prior: Option<Vec<KeyValue>>,
    new: Option<Vec<KeyValue>>,
) -> Option<Vec<KeyValue>> {
    let mut merged: Vec<KeyValue> = prior.unwrap_or_default();
    for kv in new.unwrap_or_default() {
        match merged.iter_mut().find(|existing| existing.key == kv.key) {
            Some(existing) => existing.value = kv.value,
            None => merged.push(kv),
        }
    }
    if merged.is_empty() {
        None
    } else {
        Some(merged)
    }
}
