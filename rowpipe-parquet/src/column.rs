//! Typed per-column accumulation buffers.
//!
//! A [`ColumnBuffer`] holds one column's values for the row group currently
//! being assembled. Storage is a tagged union of typed vectors selected once
//! at schema-build time, so appends dispatch on a closed enum instead of a
//! runtime type switch, and the store engine still receives one typed array
//! per column.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Decimal128Array, Float64Array, Int32Array, Int64Array, StringArray,
    TimestampMicrosecondArray, UInt8Array,
};
use rowpipe_result::{Error, Result};

use crate::decimal::{DECIMAL_PRECISION, DECIMAL_SCALE};
use crate::types::{LogicalType, Value};

/// Variant storage for one column, one vector per logical kind.
///
/// `String`, `Guid` and `Unknown` columns share text storage: Guids are
/// materialized as their canonical string form at append time and never
/// carried as native 128-bit values past this boundary.
#[derive(Debug)]
enum ColumnValues {
    Boolean(Vec<Option<bool>>),
    Byte(Vec<Option<u8>>),
    Integer(Vec<Option<i32>>),
    Long(Vec<Option<i64>>),
    Double(Vec<Option<f64>>),
    Decimal(Vec<Option<i128>>),
    DateTime(Vec<Option<i64>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    fn with_capacity(logical_type: LogicalType, capacity: usize) -> ColumnValues {
        match logical_type {
            LogicalType::Boolean => ColumnValues::Boolean(Vec::with_capacity(capacity)),
            LogicalType::Byte => ColumnValues::Byte(Vec::with_capacity(capacity)),
            LogicalType::Integer => ColumnValues::Integer(Vec::with_capacity(capacity)),
            LogicalType::Long => ColumnValues::Long(Vec::with_capacity(capacity)),
            LogicalType::Double => ColumnValues::Double(Vec::with_capacity(capacity)),
            LogicalType::Decimal => ColumnValues::Decimal(Vec::with_capacity(capacity)),
            LogicalType::DateTime => ColumnValues::DateTime(Vec::with_capacity(capacity)),
            LogicalType::Unknown | LogicalType::String | LogicalType::Guid => {
                ColumnValues::Text(Vec::with_capacity(capacity))
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            ColumnValues::Boolean(v) => v.len(),
            ColumnValues::Byte(v) => v.len(),
            ColumnValues::Integer(v) => v.len(),
            ColumnValues::Long(v) => v.len(),
            ColumnValues::Double(v) => v.len(),
            ColumnValues::Decimal(v) => v.len(),
            ColumnValues::DateTime(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    fn push_null(&mut self) {
        match self {
            ColumnValues::Boolean(v) => v.push(None),
            ColumnValues::Byte(v) => v.push(None),
            ColumnValues::Integer(v) => v.push(None),
            ColumnValues::Long(v) => v.push(None),
            ColumnValues::Double(v) => v.push(None),
            ColumnValues::Decimal(v) => v.push(None),
            ColumnValues::DateTime(v) => v.push(None),
            ColumnValues::Text(v) => v.push(None),
        }
    }

    fn clear(&mut self) {
        match self {
            ColumnValues::Boolean(v) => v.clear(),
            ColumnValues::Byte(v) => v.clear(),
            ColumnValues::Integer(v) => v.clear(),
            ColumnValues::Long(v) => v.clear(),
            ColumnValues::Double(v) => v.clear(),
            ColumnValues::Decimal(v) => v.clear(),
            ColumnValues::DateTime(v) => v.clear(),
            ColumnValues::Text(v) => v.clear(),
        }
    }
}

/// Accumulator for one column across one row group.
///
/// Invariant: `0 <= len <= capacity`. Appending at capacity is a logic
/// error ([`Error::Internal`]); the row-group writer flushes before that
/// can happen. [`clear`](ColumnBuffer::clear) resets the length and keeps
/// the backing allocation, so the same storage is reused across row groups.
#[derive(Debug)]
pub struct ColumnBuffer {
    name: String,
    logical_type: LogicalType,
    capacity: usize,
    values: ColumnValues,
}

impl ColumnBuffer {
    /// Allocate an empty buffer sized to the configured row-group capacity.
    pub fn new(name: impl Into<String>, logical_type: LogicalType, capacity: usize) -> ColumnBuffer {
        ColumnBuffer {
            name: name.into(),
            logical_type,
            capacity,
            values: ColumnValues::with_capacity(logical_type, capacity),
        }
    }

    pub fn logical_type(&self) -> LogicalType {
        self.logical_type
    }

    /// Number of buffered values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append one value (or null) to the buffer.
    ///
    /// The value's variant must match the buffer's logical type; there is no
    /// coercion. `Unknown` columns accept only nulls — they are placeholder
    /// columns that keep ordinal positions aligned with the source schema.
    pub fn append(&mut self, value: Option<Value>) -> Result<()> {
        if self.values.len() >= self.capacity {
            return Err(Error::Internal(format!(
                "append to full column buffer '{}' (capacity {})",
                self.name, self.capacity
            )));
        }
        let value = match value {
            None => {
                self.values.push_null();
                return Ok(());
            }
            Some(value) => value,
        };
        match (&mut self.values, value) {
            (ColumnValues::Boolean(v), Value::Boolean(b)) => v.push(Some(b)),
            (ColumnValues::Byte(v), Value::Byte(b)) => v.push(Some(b)),
            (ColumnValues::Integer(v), Value::Integer(i)) => v.push(Some(i)),
            (ColumnValues::Long(v), Value::Long(l)) => v.push(Some(l)),
            (ColumnValues::Double(v), Value::Double(d)) => v.push(Some(d)),
            (ColumnValues::Decimal(v), Value::Decimal(d)) => {
                v.push(Some(d.rescale(DECIMAL_SCALE)?.mantissa()));
            }
            (ColumnValues::DateTime(v), Value::DateTime(t)) => v.push(Some(t)),
            (ColumnValues::Text(v), Value::String(s)) if self.logical_type == LogicalType::String => {
                v.push(Some(s));
            }
            (ColumnValues::Text(v), Value::Guid(g)) if self.logical_type == LogicalType::Guid => {
                v.push(Some(g.to_string()));
            }
            (_, value) => {
                return Err(Error::TypeMismatch(format!(
                    "column '{}' is {:?}, cannot append {value:?}",
                    self.name, self.logical_type
                )));
            }
        }
        Ok(())
    }

    /// Materialize exactly the buffered values as a typed Arrow array.
    ///
    /// The array has length `len()`, never the full capacity; this is the
    /// array handed to the store engine for one row group.
    pub fn to_array(&self) -> Result<ArrayRef> {
        let array: ArrayRef = match &self.values {
            ColumnValues::Boolean(v) => Arc::new(BooleanArray::from(v.clone())),
            ColumnValues::Byte(v) => Arc::new(UInt8Array::from(v.clone())),
            ColumnValues::Integer(v) => Arc::new(Int32Array::from(v.clone())),
            ColumnValues::Long(v) => Arc::new(Int64Array::from(v.clone())),
            ColumnValues::Double(v) => Arc::new(Float64Array::from(v.clone())),
            ColumnValues::Decimal(v) => Arc::new(
                Decimal128Array::from(v.clone())
                    .with_precision_and_scale(DECIMAL_PRECISION, DECIMAL_SCALE)?,
            ),
            ColumnValues::DateTime(v) => {
                Arc::new(TimestampMicrosecondArray::from(v.clone()).with_timezone("UTC"))
            }
            ColumnValues::Text(v) => Arc::new(StringArray::from(v.clone())),
        };
        Ok(array)
    }

    /// Logically empty the buffer after a flush.
    ///
    /// Length drops to zero; the backing allocation is retained so the next
    /// row group refills the same storage.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}
