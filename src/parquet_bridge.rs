// Bridges the thrift-generated constants of `parquet_format_safe` to
// idiomatic, exhaustive enums.
use parquet_format_safe::{CompressionCodec, FieldRepetitionType};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The repetition of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Repetition {
    /// The field is present exactly once per parent record.
    Required,
    /// The field is present zero or one times per parent record.
    Optional,
    /// The field is present zero or more times per parent record.
    Repeated,
}

impl From<Repetition> for FieldRepetitionType {
    fn from(repetition: Repetition) -> Self {
        match repetition {
            Repetition::Required => FieldRepetitionType::REQUIRED,
            Repetition::Optional => FieldRepetitionType::OPTIONAL,
            Repetition::Repeated => FieldRepetitionType::REPEATED,
        }
    }
}

impl TryFrom<FieldRepetitionType> for Repetition {
    type Error = Error;

    fn try_from(repetition: FieldRepetitionType) -> Result<Self> {
        Ok(match repetition {
            FieldRepetitionType::REQUIRED => Repetition::Required,
            FieldRepetitionType::OPTIONAL => Repetition::Optional,
            FieldRepetitionType::REPEATED => Repetition::Repeated,
            _ => return Err(Error::oos("the repetition type is not supported")),
        })
    }
}

/// Codecs of compressed pages, as they appear in a column chunk's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    Uncompressed,
    Snappy,
    Gzip,
    Lzo,
    Brotli,
    Lz4,
    Zstd,
    Lz4Raw,
}

impl From<Compression> for CompressionCodec {
    fn from(codec: Compression) -> Self {
        match codec {
            Compression::Uncompressed => CompressionCodec::UNCOMPRESSED,
            Compression::Snappy => CompressionCodec::SNAPPY,
            Compression::Gzip => CompressionCodec::GZIP,
            Compression::Lzo => CompressionCodec::LZO,
            Compression::Brotli => CompressionCodec::BROTLI,
            Compression::Lz4 => CompressionCodec::LZ4,
            Compression::Zstd => CompressionCodec::ZSTD,
            Compression::Lz4Raw => CompressionCodec::LZ4_RAW,
        }
    }
}

impl TryFrom<CompressionCodec> for Compression {
    type Error = Error;

    fn try_from(codec: CompressionCodec) -> Result<Self> {
        Ok(match codec {
            CompressionCodec::UNCOMPRESSED => Compression::Uncompressed,
            CompressionCodec::SNAPPY => Compression::Snappy,
            CompressionCodec::GZIP => Compression::Gzip,
            CompressionCodec::LZO => Compression::Lzo,
            CompressionCodec::BROTLI => Compression::Brotli,
            CompressionCodec::LZ4 => Compression::Lz4,
            CompressionCodec::ZSTD => Compression::Zstd,
            CompressionCodec::LZ4_RAW => Compression::Lz4Raw,
            _ => return Err(Error::oos("the compression codec is not supported")),
        })
    }
}

/// Compression selection for a write, including codec-specific levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionOptions {
    Uncompressed,
    Snappy,
    Gzip(Option<GzipLevel>),
    Lzo,
    Brotli(Option<BrotliLevel>),
    Lz4,
    Zstd(Option<ZstdLevel>),
    Lz4Raw,
}

impl From<CompressionOptions> for Compression {
    fn from(value: CompressionOptions) -> Self {
        match value {
            CompressionOptions::Uncompressed => Compression::Uncompressed,
            CompressionOptions::Snappy => Compression::Snappy,
            CompressionOptions::Gzip(_) => Compression::Gzip,
            CompressionOptions::Lzo => Compression::Lzo,
            CompressionOptions::Brotli(_) => Compression::Brotli,
            CompressionOptions::Lz4 => Compression::Lz4,
            CompressionOptions::Zstd(_) => Compression::Zstd,
            CompressionOptions::Lz4Raw => Compression::Lz4Raw,
        }
    }
}

impl From<CompressionOptions> for CompressionCodec {
    fn from(value: CompressionOptions) -> Self {
        Compression::from(value).into()
    }
}

/// A valid Gzip compression level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GzipLevel(u8);

impl Default for GzipLevel {
    fn default() -> Self {
        // the default as of miniz_oxide
        Self(6)
    }
}

impl GzipLevel {
    /// Returns the compression level, failing for levels above 9.
    pub fn try_new(level: u8) -> Result<Self> {
        if level > 9 {
            return Err(Error::InvalidParameter(format!(
                "valid gzip compression levels are 0..=9, got {level}"
            )));
        }
        Ok(Self(level))
    }

    /// The level as an integer understood by the codec.
    pub fn compression_level(&self) -> u8 {
        self.0
    }
}

#[cfg(feature = "gzip")]
impl From<GzipLevel> for flate2::Compression {
    fn from(level: GzipLevel) -> Self {
        Self::new(level.compression_level() as u32)
    }
}

/// A valid Brotli compression level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BrotliLevel(u32);

impl Default for BrotliLevel {
    fn default() -> Self {
        Self(1)
    }
}

impl BrotliLevel {
    /// Returns the compression level, failing for levels above 11.
    pub fn try_new(level: u32) -> Result<Self> {
        if level > 11 {
            return Err(Error::InvalidParameter(format!(
                "valid brotli compression levels are 0..=11, got {level}"
            )));
        }
        Ok(Self(level))
    }

    /// The level as an integer understood by the codec.
    pub fn compression_level(&self) -> u32 {
        self.0
    }
}

/// A valid Zstandard compression level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZstdLevel(i32);

impl Default for ZstdLevel {
    fn default() -> Self {
        Self(1)
    }
}

impl ZstdLevel {
    /// Returns the compression level, failing for levels outside `1..=22`.
    pub fn try_new(level: i32) -> Result<Self> {
        if !(1..=22).contains(&level) {
            return Err(Error::InvalidParameter(format!(
                "valid zstd compression levels are 1..=22, got {level}"
            )));
        }
        Ok(Self(level))
    }

    /// The level as an integer understood by the codec.
    pub fn compression_level(&self) -> i32 {
        self.0
    }
}

/// The version of the format to write. It governs the version field of the
/// footer's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    V1,
    V2,
}

impl From<Version> for i32 {
    fn from(version: Version) -> Self {
        match version {
            Version::V1 => 1,
            Version::V2 => 2,
        }
    }
}
