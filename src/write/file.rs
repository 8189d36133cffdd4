use std::io::Write;
use std::sync::Arc;

use parquet_format_safe::thrift::protocol::TCompactOutputProtocol;

use super::column_chunk::ColumnChunkWriter;
use super::row_group::RowGroupWriter;
use super::{State, WriterProperties};
use crate::error::{Error, Result};
use crate::metadata::{
    merge_key_value_metadata, FileMetaDataBuilder, FileMetadata, KeyValue,
    RowGroupMetaDataBuilder, SchemaDescriptor,
};
use crate::{FOOTER_SIZE, HEADER_SIZE, PARQUET_MAGIC};

/// The state of the row group currently accepting columns.
///
/// It lives in the [`FileWriter`] rather than in the [`RowGroupWriter`]
/// handle so that an implicitly dropped handle leaves the row group
/// closeable by the file writer.
pub(super) struct RowGroupState {
    pub(super) builder: RowGroupMetaDataBuilder,
    pub(super) column: Option<ColumnChunkWriter>,
    pub(super) total_bytes_written: i64,
}

/// An interface to write a file. The writer owns the byte sink, tracks its
/// write offset and never seeks.
///
/// A writer opened with [`FileWriter::new`] produces a fresh file. A writer
/// opened with [`FileWriter::new_append`] with prior metadata extends an
/// existing file, merging its footer with the newly written row groups.
///
/// Explicit [`FileWriter::close`] is part of the contract: it surfaces every
/// error and the file is not guaranteed durable without it. Dropping an
/// unclosed writer performs a best-effort close and logs - rather than
/// raises - any failure.
pub struct FileWriter<W: Write> {
    pub(super) sink: W,
    pub(super) offset: u64,
    pub(super) properties: WriterProperties,
    schema: Arc<SchemaDescriptor>,
    state: State,
    metadata: Option<FileMetaDataBuilder>,
    prior_metadata: Option<FileMetadata>,
    pub(super) row_group: Option<RowGroupState>,
    num_rows: i64,
    num_row_groups: usize,
    finalized: Option<FileMetadata>,
    total_size: u64,
}

impl<W: Write> FileWriter<W> {
    /// Opens a writer for a fresh file and writes the leading magic.
    pub fn new(
        sink: W,
        schema: SchemaDescriptor,
        properties: WriterProperties,
        key_value_metadata: Option<Vec<KeyValue>>,
    ) -> Result<Self> {
        Self::new_append(sink, schema, None, properties, key_value_metadata)
    }

    /// Opens a writer that extends a previously closed file with further row
    /// groups; without `prior_metadata` this degrades to [`FileWriter::new`].
    ///
    /// The caller must guarantee that the sink is positioned exactly at the
    /// prior file's [`FileMetadata::footer_start`] (the first byte after its
    /// column data) and that `schema` is compatible with the prior file's
    /// schema. Neither is re-validated here: a violation produces a
    /// structurally valid but semantically corrupt file.
    pub fn new_append(
        sink: W,
        schema: SchemaDescriptor,
        prior_metadata: Option<FileMetadata>,
        properties: WriterProperties,
        key_value_metadata: Option<Vec<KeyValue>>,
    ) -> Result<Self> {
        let schema = Arc::new(schema);
        let metadata = FileMetaDataBuilder::new(
            schema.clone(),
            properties.version,
            properties.created_by.clone(),
            key_value_metadata,
        );
        let mut writer = Self {
            sink,
            offset: 0,
            properties,
            schema,
            state: State::Initialised,
            metadata: Some(metadata),
            prior_metadata,
            row_group: None,
            num_rows: 0,
            num_row_groups: 0,
            finalized: None,
            total_size: 0,
        };
        writer.start()?;
        Ok(writer)
    }

    /// Writes the leading magic, except when continuing an existing byte
    /// stream, whose magic is already on disk.
    fn start(&mut self) -> Result<()> {
        if self.state != State::Initialised {
            return Err(Error::state("the file cannot be started twice"));
        }
        match &self.prior_metadata {
            None => {
                self.sink.write_all(&PARQUET_MAGIC)?;
                self.offset = HEADER_SIZE;
            },
            Some(prior) => {
                // resume absolute offsets where the prior column data ended
                self.offset = prior.footer_start;
            },
        }
        self.state = State::Started;
        Ok(())
    }

    /// The schema of the file.
    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    /// The properties assigned to the file.
    pub fn properties(&self) -> &WriterProperties {
        &self.properties
    }

    /// The key-value metadata the footer will carry (after close: the merged
    /// metadata it carries).
    pub fn key_value_metadata(&self) -> Option<&[KeyValue]> {
        match &self.finalized {
            Some(metadata) => metadata.key_value_metadata(),
            None => self
                .metadata
                .as_ref()
                .and_then(|builder| builder.key_value_metadata()),
        }
    }

    /// The number of leaf columns of the schema.
    pub fn num_columns(&self) -> usize {
        self.schema.num_columns()
    }

    /// The number of rows of the row groups written and closed so far.
    pub fn num_rows(&self) -> i64 {
        self.num_rows
    }

    /// The number of row groups appended so far.
    pub fn num_row_groups(&self) -> usize {
        self.num_row_groups
    }

    /// The finalized, possibly merged, metadata of the file. `None` until
    /// [`FileWriter::close`] succeeds.
    pub fn metadata(&self) -> Option<&FileMetadata> {
        self.finalized.as_ref()
    }

    /// The offset at which the serialized metadata block begins. `None` until
    /// [`FileWriter::close`] succeeds.
    pub fn footer_start(&self) -> Option<u64> {
        self.finalized.as_ref().map(|metadata| metadata.footer_start)
    }

    /// Appends a row group, closing the currently open one first; callers
    /// need not close a row group explicitly before opening the next.
    ///
    /// Fails with [`Error::State`] if the file was already closed.
    pub fn append_row_group(&mut self) -> Result<RowGroupWriter<'_, W>> {
        if self.state == State::Finished {
            return Err(Error::state(
                "cannot append a row group to a file that was closed",
            ));
        }
        self.close_open_row_group()?;

        let builder = self
            .metadata
            .as_ref()
            .ok_or_else(|| Error::state("the file metadata was already finalized"))?
            .append_row_group();
        self.row_group = Some(RowGroupState {
            builder,
            column: None,
            total_bytes_written: 0,
        });
        self.num_row_groups += 1;
        Ok(RowGroupWriter::new(self))
    }

    /// Closes the open row group, if any: closes its open column writer,
    /// finalizes its metadata and folds its row count into the file's total.
    pub(super) fn close_open_row_group(&mut self) -> Result<()> {
        if let Some(mut state) = self.row_group.take() {
            state.close_current_column(&mut self.sink, &mut self.offset)?;
            let row_group = state.builder.finish(state.total_bytes_written)?;
            self.num_rows += row_group.num_rows();
            self.metadata
                .as_mut()
                .ok_or_else(|| Error::state("the file metadata was already finalized"))?
                .finish_row_group(row_group);
        }
        Ok(())
    }

    pub(super) fn last_row_group_num_rows(&self) -> i64 {
        self.metadata
            .as_ref()
            .and_then(|builder| builder.row_groups().last())
            .map(|row_group| row_group.num_rows())
            .unwrap_or(0)
    }

    /// Closes the file: closes any open row group, finalizes and - in append
    /// mode - merges the metadata, and writes the footer. Returns the total
    /// number of bytes of the file.
    ///
    /// Idempotent: a second call returns the same total and writes nothing.
    pub fn close(&mut self) -> Result<u64> {
        if self.state == State::Finished {
            return Ok(self.total_size);
        }
        self.close_open_row_group()?;

        let builder = self
            .metadata
            .take()
            .ok_or_else(|| Error::state("the file metadata was already finalized"))?;
        let mut metadata = builder.finish();

        if let Some(prior) = self.prior_metadata.take() {
            let mut row_groups = prior.row_groups;
            row_groups.extend(metadata.row_groups);
            metadata.row_groups = row_groups;
            metadata.num_rows += prior.num_rows;
            metadata.key_value_metadata =
                merge_key_value_metadata(prior.key_value_metadata, metadata.key_value_metadata);
        }
        metadata.footer_start = self.offset;

        log::debug!(
            "writing footer: {} row groups, {} rows, metadata block at offset {}",
            metadata.row_groups.len(),
            metadata.num_rows,
            metadata.footer_start,
        );

        let thrift_metadata = metadata.clone().into_thrift();
        let mut protocol = TCompactOutputProtocol::new(&mut self.sink);
        let metadata_len = thrift_metadata.write_to_out_protocol(&mut protocol)? as u64;
        let metadata_len = u32::try_from(metadata_len)
            .map_err(|_| Error::oos("the metadata block exceeds the 4-byte length field"))?;

        let mut footer = [0u8; FOOTER_SIZE as usize];
        footer[..4].copy_from_slice(&metadata_len.to_le_bytes());
        footer[4..].copy_from_slice(&PARQUET_MAGIC);
        self.sink.write_all(&footer)?;
        self.sink.flush()?;

        self.offset += metadata_len as u64 + FOOTER_SIZE;
        self.total_size = self.offset;
        self.finalized = Some(metadata);
        self.state = State::Finished;
        Ok(self.total_size)
    }
}

impl<W: Write> Drop for FileWriter<W> {
    fn drop(&mut self) {
        // a writer that never started has nothing worth closing
        if self.state == State::Started {
            if let Err(error) = self.close() {
                log::warn!("writer dropped before close; best-effort close failed: {error}");
            }
        }
    }
}
