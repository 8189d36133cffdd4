use std::io::{Read, Write};

use parquet_format_safe::thrift::protocol::TCompactInputProtocol;
use parquet_format_safe::{CompressionCodec, FileMetaData as ThriftFileMetadata, Type};

use parquet_write::error::Error;
use parquet_write::metadata::{FileMetadata, KeyValue, SchemaDescriptor};
use parquet_write::schema::types::{FieldInfo, ParquetType, PhysicalType, PrimitiveType};
use parquet_write::write::{FileWriter, WriterProperties};
use parquet_write::{CompressionOptions, Repetition, PARQUET_MAGIC};

fn schema() -> SchemaDescriptor {
    SchemaDescriptor::new(
        "schema".to_string(),
        vec![
            ParquetType::from_physical("a".to_string(), PhysicalType::Int64),
            ParquetType::from_physical("b".to_string(), PhysicalType::Double),
        ],
    )
}

fn kv(key: &str, value: &str) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: Some(value.to_string()),
    }
}

/// Checks both magic markers and the exactness of the length field, and
/// decodes the metadata block. Returns the decoded metadata and the offset at
/// which the block starts.
fn decode_footer(file: &[u8]) -> (ThriftFileMetadata, u64) {
    assert!(file.len() >= 12, "the file is too short to be well-formed");
    assert_eq!(&file[..4], &PARQUET_MAGIC[..]);
    assert_eq!(&file[file.len() - 4..], &PARQUET_MAGIC[..]);

    let length_field: [u8; 4] = file[file.len() - 8..file.len() - 4].try_into().unwrap();
    let metadata_len = u32::from_le_bytes(length_field) as usize;
    let footer_start = file.len() - 8 - metadata_len;

    let mut reader = &file[footer_start..file.len() - 8];
    let mut protocol = TCompactInputProtocol::new(&mut reader, usize::MAX);
    let metadata = ThriftFileMetadata::read_from_in_protocol(&mut protocol).unwrap();
    assert!(
        reader.is_empty(),
        "the length field must cover the metadata block exactly"
    );
    (metadata, footer_start as u64)
}

/// Writes two row groups of two columns each into `sink`.
fn write_two_row_groups<W: Write>(sink: W) -> Result<u64, Error> {
    let mut writer = FileWriter::new(sink, schema(), WriterProperties::default(), None)?;

    let mut row_group = writer.append_row_group()?;
    row_group.next_column(None)?.write_values(&[1i64, 2, 3])?;
    row_group
        .next_column(None)?
        .write_values(&[1.0f64, 2.0, 3.0])?;
    row_group.close()?;

    let mut row_group = writer.append_row_group()?;
    row_group.next_column(None)?.write_values(&[4i64, 5])?;
    row_group.next_column(None)?.write_values(&[4.0f64, 5.0])?;
    // left open: closing the file closes it

    writer.close()
}

#[test]
fn single_row_group_layout() {
    let mut buffer = vec![];
    let mut writer =
        FileWriter::new(&mut buffer, schema(), WriterProperties::default(), None).unwrap();

    let mut row_group = writer.append_row_group().unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[1i64, 2, 3])
        .unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[1.0f64, 2.0, 3.0])
        .unwrap();
    row_group.close().unwrap();

    assert_eq!(writer.num_rows(), 3);
    assert_eq!(writer.num_row_groups(), 1);
    assert_eq!(writer.num_columns(), 2);

    let total = writer.close().unwrap();
    let footer_start = writer.footer_start().unwrap();
    drop(writer);

    assert_eq!(buffer.len() as u64, total);

    let (metadata, decoded_start) = decode_footer(&buffer);
    assert_eq!(decoded_start, footer_start);
    assert_eq!(metadata.num_rows, 3);
    assert_eq!(metadata.row_groups.len(), 1);
    // root plus two leaves
    assert_eq!(metadata.schema.len(), 3);
    assert_eq!(metadata.schema[1].name, "a");
    assert_eq!(metadata.schema[1].type_, Some(Type::INT64));
    assert_eq!(metadata.schema[2].name, "b");

    let row_group = &metadata.row_groups[0];
    assert_eq!(row_group.num_rows, 3);
    assert_eq!(row_group.ordinal, Some(0));
    assert_eq!(row_group.columns.len(), 2);

    let first_chunk = row_group.columns[0].meta_data.as_ref().unwrap();
    assert_eq!(first_chunk.path_in_schema, vec!["a".to_string()]);
    assert_eq!(first_chunk.num_values, 3);
    // the first data page starts right after the leading magic
    assert_eq!(first_chunk.data_page_offset, 4);
}

#[test]
fn total_rows_accumulate_across_row_groups() {
    let mut buffer = vec![];
    let mut writer =
        FileWriter::new(&mut buffer, schema(), WriterProperties::default(), None).unwrap();

    for i in 0..3i64 {
        let mut row_group = writer.append_row_group().unwrap();
        row_group
            .next_column(None)
            .unwrap()
            .write_values(&[i, i + 1])
            .unwrap();
        row_group
            .next_column(None)
            .unwrap()
            .write_values(&[0.0f64, 1.0])
            .unwrap();
    }
    writer.close().unwrap();
    assert_eq!(writer.num_rows(), 6);
    assert_eq!(writer.num_row_groups(), 3);
    drop(writer);

    let (metadata, _) = decode_footer(&buffer);
    assert_eq!(metadata.num_rows, 6);
    let ordinals = metadata
        .row_groups
        .iter()
        .map(|rg| rg.ordinal.unwrap())
        .collect::<Vec<_>>();
    assert_eq!(ordinals, vec![0, 1, 2]);
}

#[test]
fn num_rows_is_zero_before_any_column_and_established_after() {
    let mut buffer = vec![];
    let mut writer =
        FileWriter::new(&mut buffer, schema(), WriterProperties::default(), None).unwrap();

    let mut row_group = writer.append_row_group().unwrap();
    assert_eq!(row_group.num_rows().unwrap(), 0);

    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[1i64, 2, 3])
        .unwrap();
    // the open column establishes the count without being closed
    assert_eq!(row_group.num_rows().unwrap(), 3);
    assert_eq!(row_group.current_column(), 1);

    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[1.0f64, 2.0, 3.0])
        .unwrap();
    row_group.close().unwrap();
    assert_eq!(row_group.num_rows().unwrap(), 3);
}

#[test]
fn row_count_mismatch_fails_the_row_group() {
    let mut buffer = vec![];
    let mut writer =
        FileWriter::new(&mut buffer, schema(), WriterProperties::default(), None).unwrap();

    let mut row_group = writer.append_row_group().unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[1i64, 2, 3])
        .unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[1.0f64, 2.0])
        .unwrap();

    match row_group.close() {
        Err(Error::DataConsistency {
            column,
            previous,
            found,
        }) => {
            assert_eq!(column, 1);
            assert_eq!(previous, 3);
            assert_eq!(found, 2);
        },
        other => panic!("expected a data consistency error, got {other:?}"),
    }
}

#[test]
fn equal_row_counts_close_cleanly() {
    let mut buffer = vec![];
    assert!(write_two_row_groups(&mut buffer).is_ok());
}

#[test]
fn requesting_a_column_past_the_schema_fails() {
    let mut buffer = vec![];
    let mut writer =
        FileWriter::new(&mut buffer, schema(), WriterProperties::default(), None).unwrap();

    let mut row_group = writer.append_row_group().unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[1i64])
        .unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[1.0f64])
        .unwrap();

    assert!(matches!(
        row_group.next_column(None),
        Err(Error::Sequence(_))
    ));

    // the failure leaves the previously finalized chunks untouched
    row_group.close().unwrap();
    writer.close().unwrap();
    drop(writer);

    let (metadata, _) = decode_footer(&buffer);
    assert_eq!(metadata.row_groups[0].columns.len(), 2);
    assert_eq!(metadata.num_rows, 1);
}

#[test]
fn close_is_idempotent() {
    let mut buffer = vec![];
    let mut writer =
        FileWriter::new(&mut buffer, schema(), WriterProperties::default(), None).unwrap();

    let mut row_group = writer.append_row_group().unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[1i64])
        .unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[1.0f64])
        .unwrap();
    row_group.close().unwrap();
    // closing a closed row group has no further effect
    row_group.close().unwrap();

    let total = writer.close().unwrap();
    assert_eq!(writer.close().unwrap(), total);
    drop(writer);

    assert_eq!(buffer.len() as u64, total);
    decode_footer(&buffer);
}

#[test]
fn operations_after_close_fail_with_a_state_error() {
    let mut buffer = vec![];
    let mut writer =
        FileWriter::new(&mut buffer, schema(), WriterProperties::default(), None).unwrap();
    writer.close().unwrap();

    assert!(matches!(writer.append_row_group(), Err(Error::State(_))));
}

#[test]
fn a_file_without_row_groups_is_well_formed() {
    let mut buffer = vec![];
    let mut writer =
        FileWriter::new(&mut buffer, schema(), WriterProperties::default(), None).unwrap();
    writer.close().unwrap();
    drop(writer);

    let (metadata, _) = decode_footer(&buffer);
    assert_eq!(metadata.num_rows, 0);
    assert!(metadata.row_groups.is_empty());
}

#[test]
fn dropping_an_unclosed_writer_still_writes_the_footer() {
    let mut buffer = vec![];
    {
        let mut writer =
            FileWriter::new(&mut buffer, schema(), WriterProperties::default(), None).unwrap();
        let mut row_group = writer.append_row_group().unwrap();
        row_group
            .next_column(None)
            .unwrap()
            .write_values(&[1i64, 2])
            .unwrap();
        row_group
            .next_column(None)
            .unwrap()
            .write_values(&[1.0f64, 2.0])
            .unwrap();
    }

    let (metadata, _) = decode_footer(&buffer);
    assert_eq!(metadata.num_rows, 2);
}

#[test]
fn append_equals_one_pass() {
    // one pass: row groups A and B
    let mut one_pass = vec![];
    write_two_row_groups(&mut one_pass).unwrap();

    // two passes: A, close, reopen in append mode, B
    let mut two_pass = vec![];
    let prior = {
        let mut writer =
            FileWriter::new(&mut two_pass, schema(), WriterProperties::default(), None).unwrap();
        let mut row_group = writer.append_row_group().unwrap();
        row_group
            .next_column(None)
            .unwrap()
            .write_values(&[1i64, 2, 3])
            .unwrap();
        row_group
            .next_column(None)
            .unwrap()
            .write_values(&[1.0f64, 2.0, 3.0])
            .unwrap();
        writer.close().unwrap();
        writer.metadata().cloned().unwrap()
    };

    // position the sink at the first byte of the prior footer
    two_pass.truncate(prior.footer_start as usize);

    let mut writer = FileWriter::new_append(
        &mut two_pass,
        schema(),
        Some(prior),
        WriterProperties::default(),
        None,
    )
    .unwrap();
    let mut row_group = writer.append_row_group().unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[4i64, 5])
        .unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[4.0f64, 5.0])
        .unwrap();
    writer.close().unwrap();
    drop(writer);

    assert_eq!(one_pass, two_pass);

    let (metadata, _) = decode_footer(&two_pass);
    assert_eq!(metadata.num_rows, 5);
    assert_eq!(metadata.row_groups.len(), 2);
    assert_eq!(metadata.row_groups[0].num_rows, 3);
    assert_eq!(metadata.row_groups[1].num_rows, 2);
    assert_eq!(metadata.row_groups[1].ordinal, Some(1));
}

#[test]
fn append_from_a_decoded_footer() {
    let mut buffer = vec![];
    {
        let mut writer = FileWriter::new(
            &mut buffer,
            schema(),
            WriterProperties::default(),
            Some(vec![kv("k1", "old"), kv("k2", "v2")]),
        )
        .unwrap();
        let mut row_group = writer.append_row_group().unwrap();
        row_group
            .next_column(None)
            .unwrap()
            .write_values(&[1i64])
            .unwrap();
        row_group
            .next_column(None)
            .unwrap()
            .write_values(&[1.0f64])
            .unwrap();
        writer.close().unwrap();
    }

    // recover the prior metadata the way a reader would
    let (thrift_metadata, footer_start) = decode_footer(&buffer);
    let prior = FileMetadata::try_from_thrift(thrift_metadata, footer_start).unwrap();
    assert_eq!(prior.num_rows, 1);

    buffer.truncate(footer_start as usize);
    let mut writer = FileWriter::new_append(
        &mut buffer,
        schema(),
        Some(prior),
        WriterProperties::default(),
        Some(vec![kv("k1", "new"), kv("k3", "v3")]),
    )
    .unwrap();
    let mut row_group = writer.append_row_group().unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[2i64, 3])
        .unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[2.0f64, 3.0])
        .unwrap();
    writer.close().unwrap();
    drop(writer);

    let (metadata, _) = decode_footer(&buffer);
    assert_eq!(metadata.num_rows, 3);
    assert_eq!(metadata.row_groups.len(), 2);
    assert_eq!(
        metadata.key_value_metadata,
        Some(vec![kv("k1", "new"), kv("k2", "v2"), kv("k3", "v3")])
    );
}

#[test]
fn append_without_prior_metadata_degrades_to_a_fresh_file() {
    let mut buffer = vec![];
    let mut writer = FileWriter::new_append(
        &mut buffer,
        schema(),
        None,
        WriterProperties::default(),
        None,
    )
    .unwrap();
    let mut row_group = writer.append_row_group().unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[1i64])
        .unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[1.0f64])
        .unwrap();
    writer.close().unwrap();
    drop(writer);

    let (metadata, _) = decode_footer(&buffer);
    assert_eq!(metadata.num_rows, 1);
}

#[test]
fn empty_merged_key_value_metadata_is_omitted() {
    let mut buffer = vec![];
    let prior = {
        let mut writer =
            FileWriter::new(&mut buffer, schema(), WriterProperties::default(), None).unwrap();
        let mut row_group = writer.append_row_group().unwrap();
        row_group
            .next_column(None)
            .unwrap()
            .write_values(&[1i64])
            .unwrap();
        row_group
            .next_column(None)
            .unwrap()
            .write_values(&[1.0f64])
            .unwrap();
        writer.close().unwrap();
        writer.metadata().cloned().unwrap()
    };

    buffer.truncate(prior.footer_start as usize);
    let mut writer = FileWriter::new_append(
        &mut buffer,
        schema(),
        Some(prior),
        WriterProperties::default(),
        None,
    )
    .unwrap();
    let mut row_group = writer.append_row_group().unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[2i64])
        .unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[2.0f64])
        .unwrap();
    writer.close().unwrap();
    drop(writer);

    let (metadata, _) = decode_footer(&buffer);
    assert_eq!(metadata.key_value_metadata, None);
}

#[test]
fn extra_metadata_lands_in_the_chunk() {
    let mut buffer = vec![];
    let mut writer =
        FileWriter::new(&mut buffer, schema(), WriterProperties::default(), None).unwrap();

    let mut row_group = writer.append_row_group().unwrap();
    row_group
        .next_column(Some(vec![kv("note", "x")]))
        .unwrap()
        .write_values(&[1i64])
        .unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&[1.0f64])
        .unwrap();
    writer.close().unwrap();
    drop(writer);

    let (metadata, _) = decode_footer(&buffer);
    let chunks = &metadata.row_groups[0].columns;
    assert_eq!(
        chunks[0].meta_data.as_ref().unwrap().key_value_metadata,
        Some(vec![kv("note", "x")])
    );
    assert_eq!(chunks[1].meta_data.as_ref().unwrap().key_value_metadata, None);
}

#[cfg(feature = "snappy")]
#[test]
fn per_column_compression_is_recorded() {
    let mut buffer = vec![];
    let mut properties = WriterProperties {
        compression: CompressionOptions::Snappy,
        ..Default::default()
    };
    properties
        .column_compression
        .insert("b".to_string(), CompressionOptions::Uncompressed);

    let mut writer = FileWriter::new(&mut buffer, schema(), properties, None).unwrap();
    let mut row_group = writer.append_row_group().unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&vec![0i64; 512])
        .unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_values(&vec![0.0f64; 512])
        .unwrap();
    writer.close().unwrap();
    drop(writer);

    let (metadata, _) = decode_footer(&buffer);
    let chunks = &metadata.row_groups[0].columns;

    let compressed = chunks[0].meta_data.as_ref().unwrap();
    assert_eq!(compressed.codec, CompressionCodec::SNAPPY);
    assert!(compressed.total_compressed_size < compressed.total_uncompressed_size);

    let stored = chunks[1].meta_data.as_ref().unwrap();
    assert_eq!(stored.codec, CompressionCodec::UNCOMPRESSED);
    assert_eq!(stored.total_compressed_size, stored.total_uncompressed_size);
}

#[test]
fn writing_the_wrong_physical_type_fails() {
    let mut buffer = vec![];
    let mut writer =
        FileWriter::new(&mut buffer, schema(), WriterProperties::default(), None).unwrap();

    let mut row_group = writer.append_row_group().unwrap();
    let column = row_group.next_column(None).unwrap();
    assert!(matches!(
        column.write_values(&[1.0f64]),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn writing_an_optional_column_is_not_supported() {
    let optional = ParquetType::PrimitiveType(PrimitiveType {
        field_info: FieldInfo {
            name: "a".to_string(),
            repetition: Repetition::Optional,
            id: None,
        },
        physical_type: PhysicalType::Int64,
    });
    let schema = SchemaDescriptor::new("schema".to_string(), vec![optional]);

    let mut buffer = vec![];
    let mut writer =
        FileWriter::new(&mut buffer, schema, WriterProperties::default(), None).unwrap();
    let mut row_group = writer.append_row_group().unwrap();
    let column = row_group.next_column(None).unwrap();
    assert!(matches!(
        column.write_values(&[1i64]),
        Err(Error::FeatureNotSupported(_))
    ));
}

#[test]
fn bools_byte_arrays_and_fixed_len_byte_arrays() {
    let schema = SchemaDescriptor::new(
        "schema".to_string(),
        vec![
            ParquetType::from_physical("flag".to_string(), PhysicalType::Boolean),
            ParquetType::from_physical("name".to_string(), PhysicalType::ByteArray),
            ParquetType::from_physical("id".to_string(), PhysicalType::FixedLenByteArray(4)),
        ],
    );

    let mut buffer = vec![];
    let mut writer =
        FileWriter::new(&mut buffer, schema, WriterProperties::default(), None).unwrap();
    let mut row_group = writer.append_row_group().unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_bools(&[true, false, true])
        .unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_byte_arrays(&[b"ab", b"", b"cdef"])
        .unwrap();
    row_group
        .next_column(None)
        .unwrap()
        .write_fixed_len_byte_arrays(&[b"0000", b"0001", b"0002"])
        .unwrap();
    writer.close().unwrap();
    drop(writer);

    let (metadata, _) = decode_footer(&buffer);
    let chunks = &metadata.row_groups[0].columns;
    assert_eq!(metadata.num_rows, 3);
    assert_eq!(chunks[0].meta_data.as_ref().unwrap().type_, Type::BOOLEAN);
    assert_eq!(
        chunks[1].meta_data.as_ref().unwrap().type_,
        Type::BYTE_ARRAY
    );
    assert_eq!(
        chunks[2].meta_data.as_ref().unwrap().type_,
        Type::FIXED_LEN_BYTE_ARRAY
    );
    assert_eq!(chunks[2].meta_data.as_ref().unwrap().num_values, 3);
}

#[test]
fn fixed_len_byte_arrays_of_the_wrong_length_fail() {
    let schema = SchemaDescriptor::new(
        "schema".to_string(),
        vec![ParquetType::from_physical(
            "id".to_string(),
            PhysicalType::FixedLenByteArray(4),
        )],
    );

    let mut buffer = vec![];
    let mut writer =
        FileWriter::new(&mut buffer, schema, WriterProperties::default(), None).unwrap();
    let mut row_group = writer.append_row_group().unwrap();
    let column = row_group.next_column(None).unwrap();
    assert!(matches!(
        column.write_fixed_len_byte_arrays(&[b"too long"]),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn writes_through_a_real_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let total = write_two_row_groups(file.reopen().unwrap()).unwrap();

    let mut bytes = vec![];
    file.reopen().unwrap().read_to_end(&mut bytes).unwrap();
    assert_eq!(bytes.len() as u64, total);

    let (metadata, _) = decode_footer(&bytes);
    assert_eq!(metadata.num_rows, 5);
    assert_eq!(metadata.row_groups.len(), 2);
}
