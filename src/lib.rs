//! Write-side implementation of the [Apache Parquet](https://parquet.apache.org/)
//! file format.
//!
//! The entry point is [`write::FileWriter`]: it owns the byte sink, hands out
//! one [`write::RowGroupWriter`] at a time, and serializes the footer on
//! [`write::FileWriter::close`]. Opening with
//! [`write::FileWriter::new_append`] extends a previously closed file with new
//! row groups, merging the old and new footer metadata into a single footer
//! without rewriting existing column data.
//!
//! Structured metadata is (de)serialized through the thrift definitions of the
//! [`parquet_format_safe`] crate; page payloads are compressed through the
//! feature-gated codecs of [`compression`].

pub mod compression;
pub mod error;
pub mod metadata;
pub mod page;
mod parquet_bridge;
pub mod schema;
pub mod types;
pub mod write;

pub use parquet_bridge::{
    BrotliLevel, Compression, CompressionOptions, GzipLevel, Repetition, Version, ZstdLevel,
};

/// The file magic: a well-formed file starts and ends with these 4 bytes.
pub const PARQUET_MAGIC: [u8; 4] = [b'P', b'A', b'R', b'1'];

/// The number of bytes of the leading magic.
pub const HEADER_SIZE: u64 = PARQUET_MAGIC.len() as u64;

/// The number of bytes after the serialized metadata block: the 4-byte
/// little-endian length of that block followed by the trailing magic.
pub const FOOTER_SIZE: u64 = 8;
