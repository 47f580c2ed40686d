//! Core type definitions: logical column types, field descriptors, and the
//! dynamic value representation shared by the write and read paths.

use std::fmt;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use uuid::Uuid;

use crate::decimal::{DecimalValue, DECIMAL_PRECISION, DECIMAL_SCALE};

/// Closed set of logical column kinds.
///
/// Every field in a schema is assigned exactly one `LogicalType` when the
/// schema is built, and it never changes for the lifetime of that schema.
/// The classification is independent of the record source's native type
/// system; sources report a fully-qualified runtime type name and
/// [`LogicalType::classify`] maps it into this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    /// Opaque byte sequence. Accepted into the schema as a placeholder so
    /// ordinal positions stay aligned with the source, but values are never
    /// converted or appended; the column only ever holds nulls.
    Unknown,
    Boolean,
    Byte,
    Integer,
    Long,
    Decimal,
    Double,
    DateTime,
    String,
    /// Guid columns are string-backed end-to-end: values are materialized as
    /// their canonical text form at append time and read back as strings.
    Guid,
}

impl LogicalType {
    /// Classify a fully-qualified runtime type name into a logical type.
    ///
    /// Pure and total: every input maps to exactly one logical type, with
    /// `String` as the catch-all. Evaluation order matters because the
    /// categories overlap in naming (`.int64` must be tested before `.int`,
    /// `.byte[]` before `.byte`); the tests are case-insensitive substring
    /// matches against the qualified name, most specific first.
    pub fn classify(type_name: &str) -> LogicalType {
        let name = type_name.to_ascii_lowercase();
        if name.contains(".byte[]") {
            LogicalType::Unknown
        } else if name.contains(".int64") {
            LogicalType::Long
        } else if name.contains(".byte") {
            LogicalType::Byte
        } else if name.contains(".int") {
            LogicalType::Integer
        } else if name.contains(".decimal") {
            LogicalType::Decimal
        } else if name.contains(".double") || name.contains(".float") {
            LogicalType::Double
        } else if name.contains(".date") {
            LogicalType::DateTime
        } else if name.contains(".bool") {
            LogicalType::Boolean
        } else if name.contains(".guid") {
            LogicalType::Guid
        } else {
            LogicalType::String
        }
    }

    /// The Arrow type used to persist columns of this logical type.
    ///
    /// Fixed at schema-build time, one per logical type. `Guid` and
    /// `Unknown` columns are stored as UTF-8 text.
    pub fn arrow_type(&self) -> DataType {
        match self {
            LogicalType::Boolean => DataType::Boolean,
            LogicalType::Byte => DataType::UInt8,
            LogicalType::Integer => DataType::Int32,
            LogicalType::Long => DataType::Int64,
            LogicalType::Decimal => DataType::Decimal128(DECIMAL_PRECISION, DECIMAL_SCALE),
            LogicalType::Double => DataType::Float64,
            LogicalType::DateTime => DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
            LogicalType::Unknown | LogicalType::String | LogicalType::Guid => DataType::Utf8,
        }
    }
}

/// Name and logical type of one schema field.
///
/// Uniqueness of names is not enforced; duplicate names are legal and fields
/// are addressed by ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub logical_type: LogicalType,
}

impl FieldDescriptor {
    /// Build a descriptor for the field at `ordinal`.
    ///
    /// The name defaults to `Column<ordinal>` when the source reports none.
    pub fn new(name: Option<&str>, ordinal: usize, type_name: &str) -> FieldDescriptor {
        let name = match name {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => format!("Column{ordinal}"),
        };
        FieldDescriptor {
            name,
            logical_type: LogicalType::classify(type_name),
        }
    }

    /// The Arrow field persisted for this descriptor. All fields are
    /// nullable.
    pub fn to_arrow_field(&self) -> Field {
        Field::new(&self.name, self.logical_type.arrow_type(), true)
    }
}

/// Assemble an Arrow schema from an ordered list of field descriptors.
pub fn arrow_schema(fields: &[FieldDescriptor]) -> SchemaRef {
    Arc::new(Schema::new(
        fields
            .iter()
            .map(FieldDescriptor::to_arrow_field)
            .collect::<Vec<_>>(),
    ))
}

/// Dynamic value for a single field.
///
/// A null field is represented as `Option<Value>::None`, never as a sentinel
/// variant. `DateTime` carries a timezone-normalized instant as microseconds
/// since the Unix epoch, UTC.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Byte(u8),
    Integer(i32),
    Long(i64),
    Double(f64),
    Decimal(DecimalValue),
    DateTime(i64),
    String(String),
    Guid(Uuid),
    Bytes(Vec<u8>),
}

impl Value {
    /// Numeric view for floating-point comparisons. Only `Double` and
    /// `Decimal` values participate; everything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Decimal(v) => Some(v.to_f64()),
            _ => None,
        }
    }

    /// Numeric view for integer-family comparisons (`Byte`, `Integer`,
    /// `Long`).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Integer(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Microseconds since the Unix epoch for `DateTime` values.
    pub fn as_datetime_micros(&self) -> Option<i64> {
        match self {
            Value::DateTime(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Guid(v) => write!(f, "{v}"),
            Value::Bytes(v) => {
                for byte in v {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_covers_every_kind() {
        assert_eq!(LogicalType::classify("System.Byte[]"), LogicalType::Unknown);
        assert_eq!(LogicalType::classify("System.Int64"), LogicalType::Long);
        assert_eq!(LogicalType::classify("System.Byte"), LogicalType::Byte);
        assert_eq!(LogicalType::classify("System.Int16"), LogicalType::Integer);
        assert_eq!(LogicalType::classify("System.Int32"), LogicalType::Integer);
        assert_eq!(LogicalType::classify("System.Decimal"), LogicalType::Decimal);
        assert_eq!(LogicalType::classify("System.Double"), LogicalType::Double);
        assert_eq!(LogicalType::classify("System.DateTime"), LogicalType::DateTime);
        assert_eq!(LogicalType::classify("System.Boolean"), LogicalType::Boolean);
        assert_eq!(LogicalType::classify("System.Guid"), LogicalType::Guid);
        assert_eq!(LogicalType::classify("System.String"), LogicalType::String);
    }

    #[test]
    fn test_classify_order_is_most_specific_first() {
        // `.byte[]` must win over `.byte`, and `.int64` over `.int`.
        assert_eq!(LogicalType::classify("system.byte[]"), LogicalType::Unknown);
        assert_eq!(LogicalType::classify("SYSTEM.INT64"), LogicalType::Long);
    }

    #[test]
    fn test_classify_falls_back_to_string() {
        assert_eq!(LogicalType::classify(""), LogicalType::String);
        assert_eq!(LogicalType::classify("System.Char"), LogicalType::String);
        // Unsigned integers carry no `.int` substring and land in the
        // catch-all, same as the original classifier.
        assert_eq!(LogicalType::classify("System.UInt32"), LogicalType::String);
    }

    #[test]
    fn test_field_descriptor_default_name() {
        let named = FieldDescriptor::new(Some("price"), 3, "System.Double");
        assert_eq!(named.name, "price");

        let unnamed = FieldDescriptor::new(None, 3, "System.Double");
        assert_eq!(unnamed.name, "Column3");

        let blank = FieldDescriptor::new(Some("   "), 7, "System.Int32");
        assert_eq!(blank.name, "Column7");
    }

    #[test]
    fn test_arrow_mapping_is_fixed() {
        assert_eq!(LogicalType::Guid.arrow_type(), DataType::Utf8);
        assert_eq!(LogicalType::Unknown.arrow_type(), DataType::Utf8);
        assert_eq!(LogicalType::Byte.arrow_type(), DataType::UInt8);
        assert_eq!(
            LogicalType::DateTime.arrow_type(),
            DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
        );
    }
}
