//! Errors surfaced by the write path.
use std::fmt::{Display, Formatter};

/// A compression codec that requires a cargo feature of this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// The `brotli` feature
    Brotli,
    /// The `gzip` feature
    Gzip,
    /// The `lz4` feature
    Lz4,
    /// The `snappy` feature
    Snappy,
    /// The `zstd` feature
    Zstd,
}

/// Errors generated by this crate.
///
/// All errors are surfaced synchronously to the caller of the operation that
/// detected them; nothing is retried internally.
#[derive(Debug, Clone)]
pub enum Error {
    /// An operation was invoked in a writer state that forbids it, e.g.
    /// appending a row group to a file that was already closed.
    State(String),
    /// More columns or row groups were requested than the schema or the
    /// single-pass write protocol allows.
    Sequence(String),
    /// The columns of one row group disagree on their row count.
    DataConsistency {
        /// Index of the offending column within the row group.
        column: usize,
        /// The row count established by the previous columns.
        previous: i64,
        /// The row count reported by the offending column.
        found: i64,
    },
    /// The underlying writer failed a write or flush.
    Transport(String),
    /// Structured metadata could not be thrift-encoded (or, for metadata
    /// supplied to append mode, decoded).
    Serialization(String),
    /// An argument is invalid, e.g. values written to a column of a different
    /// physical type.
    InvalidParameter(String),
    /// The requested codec requires a cargo feature that is not active.
    FeatureNotActive(Feature, String),
    /// The operation is valid in the format but not supported by this crate.
    FeatureNotSupported(String),
}

impl Error {
    pub(crate) fn state<I: Into<String>>(message: I) -> Self {
        Self::State(message.into())
    }

    pub(crate) fn sequence<I: Into<String>>(message: I) -> Self {
        Self::Sequence(message.into())
    }

    pub(crate) fn oos<I: Into<String>>(message: I) -> Self {
        Self::Serialization(message.into())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::State(message) => write!(f, "writer state error: {message}"),
            Error::Sequence(message) => write!(f, "sequence error: {message}"),
            Error::DataConsistency {
                column,
                previous,
                found,
            } => write!(
                f,
                "column {column} reported {found} rows while previous columns reported {previous}"
            ),
            Error::Transport(message) => write!(f, "underlying IO error: {message}"),
            Error::Serialization(message) => write!(f, "metadata serialization error: {message}"),
            Error::InvalidParameter(message) => write!(f, "invalid parameter: {message}"),
            Error::FeatureNotActive(feature, reason) => {
                write!(
                    f,
                    "the feature \"{feature:?}\" needs to be active to {reason}"
                )
            },
            Error::FeatureNotSupported(message) => write!(f, "not supported: {message}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Transport(e.to_string())
    }
}

impl From<parquet_format_safe::thrift::Error> for Error {
    fn from(e: parquet_format_safe::thrift::Error) -> Error {
        Error::Serialization(e.to_string())
    }
}

#[cfg(feature = "snappy")]
impl From<snap::Error> for Error {
    fn from(e: snap::Error) -> Error {
        Error::Transport(e.to_string())
    }
}

/// A `Result` alias with this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
