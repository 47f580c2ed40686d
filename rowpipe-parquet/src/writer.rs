//! Row-group writing through the Parquet store engine.
//!
//! [`RowGroupWriter`] owns one write session: the schema inferred from the
//! record source, one [`ColumnBuffer`] per field, and the underlying
//! [`ArrowWriter`]. Records accumulate column-wise until the configured
//! row-group size is reached, then the buffered columns are flushed as one
//! Parquet row group. Physical encoding, compression and footer management
//! are delegated entirely to the `parquet` crate.

use std::io::Write;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rowpipe_result::{Error, Result};

use crate::column::ColumnBuffer;
use crate::decimal::DECIMAL_SCALE;
use crate::source::RecordSource;
use crate::types::{arrow_schema, FieldDescriptor, LogicalType, Value};

/// Default rows per row group.
pub const DEFAULT_ROW_GROUP_SIZE: usize = 50_000;

/// Default write-progress notification interval, in rows.
pub const DEFAULT_WRITE_NOTIFY_AFTER: u64 = 200_000;

/// Configuration for a write session.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Rows per row group; also the capacity of every column buffer.
    pub row_group_size: usize,
    /// Compression applied by the store engine. Snappy by default.
    pub compression: Compression,
    /// Progress callback interval in rows; `0` disables notification.
    pub notify_after: u64,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            compression: Compression::SNAPPY,
            notify_after: DEFAULT_WRITE_NOTIFY_AFTER,
        }
    }
}

impl WriterConfig {
    /// Reject configurations the column index space cannot address.
    ///
    /// A single row group must not exceed `i32::MAX` rows; violating that is
    /// a fatal configuration error reported before any data is written.
    pub fn validate(&self) -> Result<()> {
        if self.row_group_size == 0 {
            return Err(Error::InvalidArgumentError(
                "row group size must be at least 1".into(),
            ));
        }
        if self.row_group_size > i32::MAX as usize {
            return Err(Error::InvalidArgumentError(format!(
                "row group size {} exceeds addressable column capacity {}",
                self.row_group_size,
                i32::MAX
            )));
        }
        Ok(())
    }
}

/// Writer for one Parquet file write session.
///
/// Finalization consumes the writer, so writing after finalize is
/// unrepresentable. Every successful exit path (including cancellation in
/// the pipeline above) seals the footer over the already-flushed groups.
pub struct RowGroupWriter<W: Write + Send> {
    fields: Vec<FieldDescriptor>,
    schema: SchemaRef,
    columns: Vec<ColumnBuffer>,
    writer: ArrowWriter<W>,
    row_group_size: usize,
    groups_flushed: u64,
}

impl<W: Write + Send> RowGroupWriter<W> {
    /// Infer the schema from the source's declared fields and open the
    /// Parquet writer against `sink`.
    ///
    /// The schema is built exactly once per session and is immutable
    /// thereafter: one [`FieldDescriptor`] per source field, classified via
    /// [`LogicalType::classify`], plus one column buffer per descriptor
    /// sized to the configured row-group capacity.
    pub fn open(sink: W, source: &dyn RecordSource, config: &WriterConfig) -> Result<Self> {
        config.validate()?;
        if source.field_count() == 0 {
            return Err(Error::InvalidArgumentError(
                "record source declares no fields".into(),
            ));
        }

        let fields: Vec<FieldDescriptor> = (0..source.field_count())
            .map(|ordinal| {
                FieldDescriptor::new(
                    source.field_name(ordinal),
                    ordinal,
                    source.declared_type(ordinal),
                )
            })
            .collect();
        let schema = arrow_schema(&fields);

        let columns = fields
            .iter()
            .map(|field| {
                ColumnBuffer::new(field.name.clone(), field.logical_type, config.row_group_size)
            })
            .collect();

        let props = WriterProperties::builder()
            .set_compression(config.compression)
            .set_max_row_group_size(config.row_group_size)
            .build();
        let writer = ArrowWriter::try_new(sink, schema.clone(), Some(props))?;

        Ok(RowGroupWriter {
            fields,
            schema,
            columns,
            writer,
            row_group_size: config.row_group_size,
            groups_flushed: 0,
        })
    }

    /// The inferred schema for this session.
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// The field descriptors for this session, in ordinal order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Rows currently buffered for the next row group.
    pub fn buffered_rows(&self) -> usize {
        self.columns.first().map_or(0, ColumnBuffer::len)
    }

    /// Append the source's current record, flushing automatically when the
    /// buffers reach the row-group capacity.
    ///
    /// Extraction is two-phase: every field value is pulled through its
    /// logical type's accessor first, and only then appended. A
    /// type-mismatch on any field aborts before the buffers are touched, so
    /// no partial row is ever persisted. Decimals are rescaled to the
    /// persistence scale during extraction so a rescale failure cannot
    /// leave earlier columns of the row appended.
    pub fn write(&mut self, source: &dyn RecordSource) -> Result<()> {
        let mut values: Vec<Option<Value>> = Vec::with_capacity(self.fields.len());
        for (ordinal, field) in self.fields.iter().enumerate() {
            // Unknown columns are never extracted; the placeholder slot
            // keeps ordinals aligned with the source schema.
            if field.logical_type == LogicalType::Unknown || source.is_null(ordinal)? {
                values.push(None);
                continue;
            }
            let value = match field.logical_type {
                LogicalType::Boolean => Value::Boolean(source.get_boolean(ordinal)?),
                LogicalType::Byte => Value::Byte(source.get_byte(ordinal)?),
                LogicalType::Integer => Value::Integer(source.get_integer(ordinal)?),
                LogicalType::Long => Value::Long(source.get_long(ordinal)?),
                LogicalType::Decimal => {
                    Value::Decimal(source.get_decimal(ordinal)?.rescale(DECIMAL_SCALE)?)
                }
                LogicalType::Double => Value::Double(source.get_double(ordinal)?),
                LogicalType::DateTime => Value::DateTime(source.get_datetime(ordinal)?),
                LogicalType::Guid => Value::Guid(source.get_guid(ordinal)?),
                LogicalType::String => Value::String(source.get_string(ordinal)?),
                LogicalType::Unknown => unreachable!("unknown columns are skipped above"),
            };
            values.push(Some(value));
        }

        for (column, value) in self.columns.iter_mut().zip(values) {
            column.append(value)?;
        }

        if self.buffered_rows() >= self.row_group_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Write all buffered rows as one row group and clear the buffers.
    ///
    /// A flush with zero buffered rows is a no-op, so no empty trailing
    /// group is ever produced.
    pub fn flush(&mut self) -> Result<()> {
        let rows = self.buffered_rows();
        if rows == 0 {
            return Ok(());
        }

        let arrays = self
            .columns
            .iter()
            .map(ColumnBuffer::to_array)
            .collect::<Result<Vec<_>>>()?;
        let batch = RecordBatch::try_new(self.schema.clone(), arrays)?;

        self.writer.write(&batch)?;
        // Force the row-group boundary; otherwise the engine would keep
        // buffering until max_row_group_size on its own clock.
        self.writer.flush()?;

        for column in &mut self.columns {
            column.clear();
        }
        self.groups_flushed += 1;
        tracing::debug!(
            "flushed row group {} with {} rows",
            self.groups_flushed,
            rows
        );
        Ok(())
    }

    /// Flush any remaining buffered rows and seal the file footer.
    pub fn finalize(mut self) -> Result<()> {
        self.flush()?;
        let RowGroupWriter {
            writer,
            groups_flushed,
            ..
        } = self;
        writer.close()?;
        tracing::debug!("finalized parquet file with {} row groups", groups_flushed);
        Ok(())
    }

    /// Seal the footer over the groups flushed so far, discarding any
    /// buffered rows.
    ///
    /// Used for cancelled and failed sessions: the file stays structurally
    /// valid but is truncated at the last completed flush.
    pub fn seal(self) -> Result<()> {
        let RowGroupWriter {
            writer,
            groups_flushed,
            ..
        } = self;
        writer.close()?;
        tracing::debug!(
            "sealed truncated parquet file with {} row groups",
            groups_flushed
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RowsCursor, SourceField};

    fn int_rows(n: i32) -> RowsCursor {
        RowsCursor::new(
            vec![SourceField::new("v", "System.Int32")],
            (0..n).map(|i| vec![Some(Value::Integer(i))]).collect(),
        )
    }

    #[test]
    fn test_config_rejects_unaddressable_row_groups() {
        let mut config = WriterConfig::default();
        config.row_group_size = 0;
        assert!(config.validate().is_err());
        config.row_group_size = i32::MAX as usize + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auto_flush_at_row_group_size() {
        let mut source = int_rows(5);
        let config = WriterConfig {
            row_group_size: 2,
            ..WriterConfig::default()
        };
        let mut sink = Vec::new();
        let mut writer = RowGroupWriter::open(&mut sink, &source, &config).unwrap();

        for expected_buffered in [1, 0, 1, 0, 1] {
            assert!(source.next_row().unwrap());
            writer.write(&source).unwrap();
            assert_eq!(writer.buffered_rows(), expected_buffered);
        }
        writer.finalize().unwrap();
        assert_eq!(&sink[0..4], b"PAR1");
    }

    #[test]
    fn test_failed_decimal_rescale_leaves_no_partial_row() {
        use crate::decimal::DecimalValue;
        let mut source = RowsCursor::new(
            vec![
                SourceField::new("name", "System.String"),
                SourceField::new("amount", "System.Decimal"),
            ],
            vec![vec![
                Some(Value::String("x".into())),
                // Representable at scale 0 but overflows i128 when brought
                // to the persistence scale.
                Some(Value::Decimal(
                    DecimalValue::new(10_i128.pow(30), 0).unwrap(),
                )),
            ]],
        );
        let mut sink = Vec::new();
        let mut writer =
            RowGroupWriter::open(&mut sink, &source, &WriterConfig::default()).unwrap();
        assert!(source.next_row().unwrap());
        assert!(writer.write(&source).is_err());
        // The row failed during extraction, so no column was touched.
        assert_eq!(writer.buffered_rows(), 0);
    }

    #[test]
    fn test_schema_is_built_from_declared_types() {
        let source = RowsCursor::new(
            vec![
                SourceField::new("flag", "System.Boolean"),
                SourceField::new("", "System.Int64"),
            ],
            vec![],
        );
        let mut sink = Vec::new();
        let writer = RowGroupWriter::open(&mut sink, &source, &WriterConfig::default()).unwrap();
        assert_eq!(writer.fields()[0].logical_type, LogicalType::Boolean);
        assert_eq!(writer.fields()[1].name, "Column1");
        assert_eq!(writer.fields()[1].logical_type, LogicalType::Long);
    }
}
