use std::io::Write;

use super::column_chunk::ColumnChunkWriter;
use super::file::{FileWriter, RowGroupState};
use crate::error::{Error, Result};
use crate::metadata::KeyValue;

/// Writes one row group: sequences its column chunk writers in schema order
/// and enforces that every column reports the same row count.
///
/// The handle borrows the [`FileWriter`] exclusively; the open row group's
/// state lives in the file writer itself, so a row group left open is closed
/// implicitly by the next [`FileWriter::append_row_group`] or
/// [`FileWriter::close`].
pub struct RowGroupWriter<'a, W: Write> {
    file: &'a mut FileWriter<W>,
}

impl<'a, W: Write> RowGroupWriter<'a, W> {
    pub(super) fn new(file: &'a mut FileWriter<W>) -> Self {
        Self { file }
    }

    /// Requests a writer for the next column in schema order.
    ///
    /// If a column writer is open, its row count is validated against the row
    /// group's established count, it is closed, and its compressed size is
    /// folded into the row group's total.
    ///
    /// Fails with [`Error::Sequence`] if the row group was closed or if more
    /// columns are requested than the schema defines.
    pub fn next_column(
        &mut self,
        extra_metadata: Option<Vec<KeyValue>>,
    ) -> Result<&mut ColumnChunkWriter> {
        let file = &mut *self.file;
        let state = file.row_group.as_mut().ok_or_else(|| {
            Error::sequence("cannot request a column writer from a closed row group")
        })?;

        state.close_current_column(&mut file.sink, &mut file.offset)?;

        let descriptor = state.builder.next_column_chunk()?.clone();
        let compression = file.properties.compression_for(&descriptor.path());
        Ok(state
            .column
            .insert(ColumnChunkWriter::new(descriptor, compression, extra_metadata)))
    }

    /// The row group's established row count, or 0 if no column established
    /// one yet.
    ///
    /// If a column writer is open, its row count is checked against the
    /// established count (establishing it for the first column) without
    /// closing the writer.
    pub fn num_rows(&mut self) -> Result<i64> {
        match self.file.row_group.as_mut() {
            Some(state) => {
                state.check_rows_written()?;
                Ok(state.builder.num_rows().unwrap_or(0))
            },
            // this handle already closed the row group
            None => Ok(self.file.last_row_group_num_rows()),
        }
    }

    /// The number of columns of the file's schema.
    pub fn num_columns(&self) -> usize {
        self.file.num_columns()
    }

    /// The number of column chunks requested so far.
    pub fn current_column(&self) -> usize {
        self.file
            .row_group
            .as_ref()
            .map(|state| state.builder.current_column())
            .unwrap_or_else(|| self.file.num_columns())
    }

    /// Closes the row group, finalizing its metadata. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        self.file.close_open_row_group()
    }
}

impl RowGroupState {
    /// Validates the open column writer, if any, against the row group's
    /// established row count, establishing it from the first column.
    pub(super) fn check_rows_written(&mut self) -> Result<()> {
        let Some(column) = &self.column else {
            return Ok(());
        };
        let found = column.rows_written();
        match self.builder.num_rows() {
            None => self.builder.set_num_rows(found),
            Some(previous) if previous == found => {},
            Some(previous) => {
                return Err(Error::DataConsistency {
                    column: self.builder.current_column().saturating_sub(1),
                    previous,
                    found,
                })
            },
        }
        Ok(())
    }

    /// Closes the open column writer, if any: validates its row count,
    /// flushes it to the sink and folds its size into the running total.
    pub(super) fn close_current_column<W: Write>(
        &mut self,
        sink: &mut W,
        offset: &mut u64,
    ) -> Result<()> {
        self.check_rows_written()?;
        if let Some(column) = self.column.take() {
            let (chunk, bytes_written) = column.close(sink, *offset)?;
            *offset += bytes_written;
            self.total_bytes_written += bytes_written as i64;
            self.builder.push_column_chunk(chunk);
        }
        Ok(())
    }
}
