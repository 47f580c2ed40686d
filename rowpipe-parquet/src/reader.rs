//! Row-group reads and row reconstruction.
//!
//! [`RowGroupReader`] wraps the Parquet store engine for reading: it loads
//! the file metadata once, reports the row-group count, and materializes one
//! row group at a time as a column-major [`RecordBatch`]. A batch is owned
//! only while its rows are being consumed; nothing is cached across groups.

use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::{
    Array, ArrayRef, BooleanArray, Decimal128Array, Float64Array, Int32Array, Int64Array,
    StringArray, TimestampMicrosecondArray, UInt8Array,
};
use arrow::datatypes::{DataType, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReaderBuilder,
};
use rowpipe_result::{Error, Result};

use crate::decimal::DecimalValue;
use crate::types::Value;

/// Where the Parquet bytes live.
///
/// File-backed readers reopen the file per row group so the metadata is
/// parsed exactly once regardless of how many groups are read.
enum ReaderSource {
    File(PathBuf),
    Memory(Bytes),
}

/// Reader handle over one Parquet file.
///
/// The handle only exists once the footer has been parsed successfully, so
/// "read before open" is unrepresentable. The handle is exclusively owned by
/// one scanner or cursor at a time; there is no shared mutable state.
pub struct RowGroupReader {
    source: ReaderSource,
    metadata: ArrowReaderMetadata,
}

impl RowGroupReader {
    /// Open a Parquet file from disk, parsing footer metadata once.
    pub fn open(path: impl AsRef<Path>) -> Result<RowGroupReader> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let metadata = ArrowReaderMetadata::load(&file, ArrowReaderOptions::new())?;
        Ok(RowGroupReader {
            source: ReaderSource::File(path),
            metadata,
        })
    }

    /// Open an in-memory Parquet file.
    pub fn from_bytes(bytes: Bytes) -> Result<RowGroupReader> {
        let metadata = ArrowReaderMetadata::load(&bytes, ArrowReaderOptions::new())?;
        Ok(RowGroupReader {
            source: ReaderSource::Memory(bytes),
            metadata,
        })
    }

    /// The file's Arrow schema.
    pub fn schema(&self) -> SchemaRef {
        self.metadata.schema().clone()
    }

    /// Total number of row groups in the file.
    pub fn row_group_count(&self) -> usize {
        self.metadata.metadata().num_row_groups()
    }

    /// Row count of the group at `index`, validated against the addressable
    /// column index space before any column is materialized.
    pub fn row_group_rows(&self, index: usize) -> Result<usize> {
        let groups = self.row_group_count();
        if index >= groups {
            return Err(Error::InvalidArgumentError(format!(
                "row group index {index} out of range ({groups} groups)"
            )));
        }
        let rows = self.metadata.metadata().row_group(index).num_rows();
        if rows < 0 || rows > i64::from(i32::MAX) {
            return Err(Error::InvalidArgumentError(format!(
                "row group {index} reports {rows} rows, exceeding addressable capacity"
            )));
        }
        Ok(rows as usize)
    }

    /// Materialize the row group at `index` as one column-major batch.
    pub fn read_row_group(&self, index: usize) -> Result<RecordBatch> {
        let rows = self.row_group_rows(index)?;
        if rows == 0 {
            return Ok(RecordBatch::new_empty(self.schema()));
        }
        let mut batches = match &self.source {
            ReaderSource::File(path) => {
                let file = File::open(path)?;
                self.read_group_batches(file, index, rows)?
            }
            ReaderSource::Memory(bytes) => {
                self.read_group_batches(bytes.clone(), index, rows)?
            }
        };
        if batches.len() == 1 {
            return Ok(batches.swap_remove(0));
        }
        let schema = self.schema();
        Ok(arrow::compute::concat_batches(&schema, &batches)?)
    }

    fn read_group_batches<T>(&self, input: T, index: usize, rows: usize) -> Result<Vec<RecordBatch>>
    where
        T: parquet::file::reader::ChunkReader + 'static,
    {
        let reader =
            ParquetRecordBatchReaderBuilder::new_with_metadata(input, self.metadata.clone())
                .with_row_groups(vec![index])
                .with_batch_size(rows)
                .build()?;
        let mut batches = Vec::new();
        for batch in reader {
            batches.push(batch?);
        }
        Ok(batches)
    }

    /// Sequential cursor over every row of the file, in file order.
    pub fn rows(&self) -> RowIter<'_> {
        RowIter {
            reader: self,
            next_group: 0,
            batch: None,
            row: 0,
        }
    }
}

/// Iterator yielding each row as reconstructed field values.
///
/// Row groups are read lazily, one at a time, and discarded once their rows
/// are consumed.
pub struct RowIter<'a> {
    reader: &'a RowGroupReader,
    next_group: usize,
    batch: Option<RecordBatch>,
    row: usize,
}

impl Iterator for RowIter<'_> {
    type Item = Result<Vec<Option<Value>>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(batch) = &self.batch {
                if self.row < batch.num_rows() {
                    let values = row_values(batch, self.row);
                    self.row += 1;
                    return Some(values);
                }
                self.batch = None;
            }
            if self.next_group >= self.reader.row_group_count() {
                return None;
            }
            match self.reader.read_row_group(self.next_group) {
                Ok(batch) => {
                    self.next_group += 1;
                    self.row = 0;
                    self.batch = Some(batch);
                }
                Err(err) => {
                    self.next_group = self.reader.row_group_count();
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Reconstruct one row's field values from a column-major batch.
pub fn row_values(batch: &RecordBatch, row: usize) -> Result<Vec<Option<Value>>> {
    batch
        .columns()
        .iter()
        .map(|column| value_at(column, row))
        .collect()
}

/// Extract the value at `row` from one column array.
///
/// Guid and Unknown columns were persisted as UTF-8, so they come back as
/// `Value::String`; the Guid text round-trip is deliberate.
pub fn value_at(column: &ArrayRef, row: usize) -> Result<Option<Value>> {
    if column.is_null(row) {
        return Ok(None);
    }
    let value = match column.data_type() {
        DataType::Boolean => {
            let array = downcast::<BooleanArray>(column)?;
            Value::Boolean(array.value(row))
        }
        DataType::UInt8 => {
            let array = downcast::<UInt8Array>(column)?;
            Value::Byte(array.value(row))
        }
        DataType::Int32 => {
            let array = downcast::<Int32Array>(column)?;
            Value::Integer(array.value(row))
        }
        DataType::Int64 => {
            let array = downcast::<Int64Array>(column)?;
            Value::Long(array.value(row))
        }
        DataType::Float64 => {
            let array = downcast::<Float64Array>(column)?;
            Value::Double(array.value(row))
        }
        DataType::Decimal128(_, scale) => {
            let array = downcast::<Decimal128Array>(column)?;
            Value::Decimal(DecimalValue::new(array.value(row), *scale)?)
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            let array = downcast::<TimestampMicrosecondArray>(column)?;
            Value::DateTime(array.value(row))
        }
        DataType::Utf8 => {
            let array = downcast::<StringArray>(column)?;
            Value::String(array.value(row).to_string())
        }
        other => {
            return Err(Error::InvalidArgumentError(format!(
                "unsupported column type {other:?}"
            )));
        }
    };
    Ok(Some(value))
}

fn downcast<T: 'static>(column: &ArrayRef) -> Result<&T> {
    column
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::Internal("column array does not match its declared type".into()))
}
