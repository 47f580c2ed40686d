use std::io;
use thiserror::Error;

/// Unified error type for all rowpipe operations.
///
/// Errors propagate upward through the call stack using Rust's `?` operator.
/// There is no internal retry and no silent downgrade: every failure reaches
/// the caller, and the surrounding session layer decides whether a partially
/// written file should be deleted.
///
/// Cancellation is deliberately *not* an error. A cancelled write session
/// returns normally with the row count reached so far and leaves a
/// structurally valid file truncated at the last completed flush.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    ///
    /// Wraps standard library I/O errors raised while opening, reading or
    /// writing the underlying file or stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Arrow library error during columnar data operations.
    ///
    /// Raised while building column arrays or assembling record batches for
    /// a row group.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet library error from the store engine.
    ///
    /// Raised by the underlying Parquet encoder/decoder: writer creation,
    /// row-group serialization, footer finalization, or metadata reads.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Invalid user input or API parameter.
    ///
    /// Examples: a page number of zero, a row-group size that exceeds the
    /// addressable column index space, or a file whose columns use an Arrow
    /// type this library does not reconstruct.
    ///
    /// These errors are recoverable: fix the input and retry the operation.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// A field value's runtime shape disagrees with its column's classified
    /// logical type.
    ///
    /// The schema assigns every field exactly one logical type when it is
    /// built, and values are never silently coerced. A mismatch aborts the
    /// write before any part of the offending row reaches a column buffer.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Operation issued against an object in the wrong state.
    ///
    /// Example: reading a field from a cursor that has not been advanced onto
    /// a row, or has already run past the end of its data.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Internal invariant violation.
    ///
    /// Indicates a bug rather than a user-recoverable condition, such as an
    /// append against a column buffer that is already at capacity.
    #[error("Internal error: {0}")]
    Internal(String),
}
