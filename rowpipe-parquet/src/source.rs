//! Record source abstraction.
//!
//! A [`RecordSource`] is a forward-only cursor over tabular rows: ordinal
//! addressed fields, per-ordinal name and declared runtime type, typed
//! getters, and a null predicate. The write pipeline consumes any such
//! source; [`RowsCursor`] is the in-memory implementation used by tests and
//! small exports.

use rowpipe_result::{Error, Result};
use uuid::Uuid;

use crate::decimal::DecimalValue;
use crate::types::Value;

/// A row-oriented sequential record source.
///
/// Field metadata (`field_count`, names, declared types) must be available
/// before the first [`next_row`](RecordSource::next_row) call; schema
/// inference happens once, up front. Typed getters are addressed by ordinal
/// and return an error when the underlying value does not have the requested
/// shape — that error is the type-mismatch path and aborts the write with no
/// partial row persisted.
pub trait RecordSource {
    /// Number of fields per row.
    fn field_count(&self) -> usize;

    /// Name of the field at `ordinal`, if the source provides one.
    fn field_name(&self, ordinal: usize) -> Option<&str>;

    /// Fully-qualified runtime type name of the field at `ordinal`, fed to
    /// [`LogicalType::classify`](crate::types::LogicalType::classify).
    fn declared_type(&self, ordinal: usize) -> &str;

    /// Advance to the next row. Returns `false` once the source is
    /// exhausted.
    fn next_row(&mut self) -> Result<bool>;

    /// Whether the field at `ordinal` is null in the current row.
    fn is_null(&self, ordinal: usize) -> Result<bool>;

    fn get_boolean(&self, ordinal: usize) -> Result<bool>;
    fn get_byte(&self, ordinal: usize) -> Result<u8>;
    fn get_integer(&self, ordinal: usize) -> Result<i32>;
    fn get_long(&self, ordinal: usize) -> Result<i64>;
    fn get_double(&self, ordinal: usize) -> Result<f64>;
    fn get_decimal(&self, ordinal: usize) -> Result<DecimalValue>;

    /// UTC microseconds since the Unix epoch.
    fn get_datetime(&self, ordinal: usize) -> Result<i64>;

    fn get_string(&self, ordinal: usize) -> Result<String>;
    fn get_guid(&self, ordinal: usize) -> Result<Uuid>;
}

/// Declared name and runtime type of one source field.
#[derive(Debug, Clone)]
pub struct SourceField {
    pub name: String,
    pub type_name: String,
}

impl SourceField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> SourceField {
        SourceField {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// In-memory [`RecordSource`] over pre-materialized rows.
///
/// Rows are `Vec<Option<Value>>` in field order. The cursor starts before
/// the first row; getters on an unpositioned cursor report an
/// [`Error::InvalidState`].
pub struct RowsCursor {
    fields: Vec<SourceField>,
    rows: Vec<Vec<Option<Value>>>,
    /// Index of the current row; `None` before the first `next_row`.
    position: Option<usize>,
    exhausted: bool,
}

impl RowsCursor {
    pub fn new(fields: Vec<SourceField>, rows: Vec<Vec<Option<Value>>>) -> RowsCursor {
        RowsCursor {
            fields,
            rows,
            position: None,
            exhausted: false,
        }
    }

    fn current(&self) -> Result<&Vec<Option<Value>>> {
        match self.position {
            Some(index) if !self.exhausted => Ok(&self.rows[index]),
            _ => Err(Error::InvalidState(
                "cursor is not positioned on a row".into(),
            )),
        }
    }

    fn value(&self, ordinal: usize) -> Result<&Value> {
        let row = self.current()?;
        row.get(ordinal)
            .ok_or_else(|| {
                Error::InvalidArgumentError(format!("field ordinal {ordinal} out of range"))
            })?
            .as_ref()
            .ok_or_else(|| Error::InvalidState(format!("field {ordinal} is null")))
    }

    fn mismatch(&self, ordinal: usize, expected: &str, actual: &Value) -> Error {
        Error::TypeMismatch(format!(
            "field '{}' (ordinal {ordinal}) expected {expected}, found {actual:?}",
            self.fields
                .get(ordinal)
                .map(|f| f.name.as_str())
                .unwrap_or("?")
        ))
    }
}

impl RecordSource for RowsCursor {
    fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn field_name(&self, ordinal: usize) -> Option<&str> {
        self.fields
            .get(ordinal)
            .map(|f| f.name.as_str())
            .filter(|n| !n.trim().is_empty())
    }

    fn declared_type(&self, ordinal: usize) -> &str {
        self.fields
            .get(ordinal)
            .map(|f| f.type_name.as_str())
            .unwrap_or("")
    }

    fn next_row(&mut self) -> Result<bool> {
        let next = self.position.map_or(0, |p| p + 1);
        if next < self.rows.len() {
            self.position = Some(next);
            Ok(true)
        } else {
            self.exhausted = true;
            Ok(false)
        }
    }

    fn is_null(&self, ordinal: usize) -> Result<bool> {
        let row = self.current()?;
        match row.get(ordinal) {
            Some(slot) => Ok(slot.is_none()),
            None => Err(Error::InvalidArgumentError(format!(
                "field ordinal {ordinal} out of range"
            ))),
        }
    }

    fn get_boolean(&self, ordinal: usize) -> Result<bool> {
        match self.value(ordinal)? {
            Value::Boolean(v) => Ok(*v),
            other => Err(self.mismatch(ordinal, "Boolean", other)),
        }
    }

    fn get_byte(&self, ordinal: usize) -> Result<u8> {
        match self.value(ordinal)? {
            Value::Byte(v) => Ok(*v),
            other => Err(self.mismatch(ordinal, "Byte", other)),
        }
    }

    fn get_integer(&self, ordinal: usize) -> Result<i32> {
        match self.value(ordinal)? {
            Value::Integer(v) => Ok(*v),
            other => Err(self.mismatch(ordinal, "Integer", other)),
        }
    }

    fn get_long(&self, ordinal: usize) -> Result<i64> {
        match self.value(ordinal)? {
            Value::Long(v) => Ok(*v),
            other => Err(self.mismatch(ordinal, "Long", other)),
        }
    }

    fn get_double(&self, ordinal: usize) -> Result<f64> {
        match self.value(ordinal)? {
            Value::Double(v) => Ok(*v),
            other => Err(self.mismatch(ordinal, "Double", other)),
        }
    }

    fn get_decimal(&self, ordinal: usize) -> Result<DecimalValue> {
        match self.value(ordinal)? {
            Value::Decimal(v) => Ok(*v),
            other => Err(self.mismatch(ordinal, "Decimal", other)),
        }
    }

    fn get_datetime(&self, ordinal: usize) -> Result<i64> {
        match self.value(ordinal)? {
            Value::DateTime(v) => Ok(*v),
            other => Err(self.mismatch(ordinal, "DateTime", other)),
        }
    }

    fn get_string(&self, ordinal: usize) -> Result<String> {
        match self.value(ordinal)? {
            Value::String(v) => Ok(v.clone()),
            other => Err(self.mismatch(ordinal, "String", other)),
        }
    }

    fn get_guid(&self, ordinal: usize) -> Result<Uuid> {
        match self.value(ordinal)? {
            Value::Guid(v) => Ok(*v),
            other => Err(self.mismatch(ordinal, "Guid", other)),
        }
    }
}
