//! Row-cursor to Parquet adapter.
//!
//! This crate is the glue between a row-oriented sequential record source (a
//! cursor exposing typed, nullable fields by ordinal) and a column-oriented
//! Parquet file organized into fixed-size row groups. Arbitrary tabular
//! producers — query results, in-memory tables — can be persisted as
//! columnar files and read back page by page, with per-row predicate
//! filtering.
//!
//! # Architecture
//!
//! The write path transposes row-major input into column-major batches with
//! bounded memory:
//!
//! - [`LogicalType`]: closed classification of a source field's runtime type
//!   into one of ten column kinds, decided once at schema-build time
//! - [`ColumnBuffer`]: typed accumulator for one column across one row
//!   group, with null tracking and storage reuse across flushes
//! - [`RowGroupWriter`]: owns the schema and buffers, applies the flush
//!   threshold, and hands finalized column arrays to the `parquet` engine
//! - [`WritePipeline`]: pulls records from a [`RecordSource`], reports
//!   progress, observes cooperative cancellation, and seals the footer on
//!   every exit path
//!
//! The read path reverses the transposition:
//!
//! - [`RowGroupReader`]: parses file metadata once and materializes one row
//!   group at a time as parallel column arrays
//! - [`FilterSet`]: kind-aware per-row predicates ([`ConditionKind`])
//! - [`Scanner`]: offset/limit pagination across row-group boundaries, with
//!   filtering applied before pagination
//!
//! Physical encoding, compression, and footer management are delegated
//! entirely to the `arrow`/`parquet` crates; this crate never touches the
//! on-disk byte layout.
//!
//! # Known limitations
//!
//! The `Between` and `In` filter conditions are part of the predicate
//! grammar but currently exclude every row. This behavior is pinned by a
//! regression test rather than fixed, pending a product decision. Guid
//! columns are persisted as UTF-8 text and read back as strings.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use rowpipe_parquet::{
//!     CancelToken, PageRequest, FilterSet, RowGroupReader, RowsCursor, Scanner,
//!     SourceField, Value, WritePipeline,
//! };
//!
//! # fn main() -> rowpipe_result::Result<()> {
//! let mut source = RowsCursor::new(
//!     vec![
//!         SourceField::new("id", "System.Int64"),
//!         SourceField::new("name", "System.String"),
//!     ],
//!     vec![
//!         vec![Some(Value::Long(1)), Some(Value::String("first".into()))],
//!         vec![Some(Value::Long(2)), None],
//!     ],
//! );
//!
//! let pipeline = WritePipeline::default();
//! let written = pipeline.write_path("rows.parquet", &mut source, None, &CancelToken::new())?;
//! assert_eq!(written, 2);
//!
//! let reader = RowGroupReader::open("rows.parquet")?;
//! let page = Scanner::default().scan(
//!     &reader,
//!     &PageRequest::new(1, 100, true),
//!     &FilterSet::new(),
//!     None,
//!     &CancelToken::new(),
//! )?;
//! assert_eq!(page.total_matched, 2);
//! # Ok(())
//! # }
//! ```

pub mod column;
pub mod decimal;
pub mod filter;
pub mod pipeline;
pub mod reader;
pub mod scan;
pub mod source;
pub mod types;
pub mod writer;

pub use column::ColumnBuffer;
pub use decimal::{DecimalValue, DECIMAL_PRECISION, DECIMAL_SCALE};
pub use filter::{ConditionKind, Filter, FilterSet};
pub use pipeline::{CancelToken, ProgressFn, WritePipeline};
pub use reader::{row_values, value_at, RowGroupReader, RowIter};
pub use scan::{PageRequest, ScanConfig, ScanResult, Scanner, DEFAULT_SCAN_NOTIFY_AFTER};
pub use source::{RecordSource, RowsCursor, SourceField};
pub use types::{arrow_schema, FieldDescriptor, LogicalType, Value};
pub use writer::{
    RowGroupWriter, WriterConfig, DEFAULT_ROW_GROUP_SIZE, DEFAULT_WRITE_NOTIFY_AFTER,
};
