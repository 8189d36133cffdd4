//! Metadata accumulated while writing and frozen into the footer.
mod builders;
mod column_chunk_metadata;
mod column_descriptor;
mod file_metadata;
mod row_metadata;
mod schema_descriptor;

pub use builders::{FileMetaDataBuilder, RowGroupMetaDataBuilder};
pub use column_chunk_metadata::ColumnChunkMetaData;
pub use column_descriptor::{ColumnDescriptor, Descriptor};
pub(crate) use file_metadata::merge_key_value_metadata;
pub use file_metadata::{FileMetadata, KeyValue};
pub use row_metadata::RowGroupMetadata;
pub use schema_descriptor::SchemaDescriptor;

pub use parquet_format_safe::FileMetaData as ThriftFileMetadata;
