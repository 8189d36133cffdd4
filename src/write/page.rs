use std::io::Write;

use parquet_format_safe::thrift::protocol::TCompactOutputProtocol;
use parquet_format_safe::PageType;

use crate::error::Result;
use crate::page::{CompressedDataPage, ParquetPageHeader};

/// Bookkeeping of one page written to the sink.
#[derive(Debug, Clone)]
pub(crate) struct PageWriteSpec {
    pub header: ParquetPageHeader,
    pub header_size: u64,
    pub offset: u64,
    pub bytes_written: u64,
    pub num_values: i64,
}

fn assemble_page_header(page: &CompressedDataPage) -> ParquetPageHeader {
    ParquetPageHeader {
        type_: PageType::DATA_PAGE,
        uncompressed_page_size: page.uncompressed_size() as i32,
        compressed_page_size: page.compressed_size() as i32,
        crc: None,
        data_page_header: Some(page.header.clone()),
        index_page_header: None,
        dictionary_page_header: None,
        data_page_header_v2: None,
    }
}

/// Writes one page to the sink: its thrift header followed by the compressed
/// payload. `offset` is the sink's position at the first header byte.
pub(crate) fn write_page<W: Write>(
    writer: &mut W,
    offset: u64,
    page: &CompressedDataPage,
) -> Result<PageWriteSpec> {
    let header = assemble_page_header(page);

    let mut protocol = TCompactOutputProtocol::new(&mut *writer);
    let header_size = header.write_to_out_protocol(&mut protocol)? as u64;

    writer.write_all(&page.buffer)?;

    Ok(PageWriteSpec {
        num_values: page.num_values(),
        header,
        header_size,
        offset,
        bytes_written: header_size + page.buffer.len() as u64,
    })
}
