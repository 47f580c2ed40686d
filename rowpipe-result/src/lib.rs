//! Error types and result definitions for the rowpipe crates.
//!
//! This crate provides a unified error type ([`Error`]) and result type alias
//! ([`Result<T>`]) used throughout rowpipe. All operations that can fail return
//! `Result<T>`, where the error variant carries enough detail for the caller to
//! decide what to do with a partially written or unreadable file.
//!
//! # Error Philosophy
//!
//! rowpipe uses a single error enum ([`Error`]) rather than crate-specific
//! error types. This approach:
//! - Simplifies error handling across crate boundaries
//! - Allows errors to propagate naturally with the `?` operator
//! - Provides clear error messages for end users
//!
//! # Error Categories
//!
//! - **I/O errors** ([`Error::Io`]): file creation, reads, writes
//! - **Data format errors** ([`Error::Arrow`], [`Error::Parquet`]): columnar
//!   serialization issues surfaced by the store engine
//! - **User input errors** ([`Error::InvalidArgumentError`]): bad page
//!   requests, oversized row-group configuration
//! - **Type mismatches** ([`Error::TypeMismatch`]): a field value whose
//!   runtime shape disagrees with its column's classified logical type
//! - **State errors** ([`Error::InvalidState`]): access to a cursor that is
//!   not positioned on a row
//! - **Internal errors** ([`Error::Internal`]): bugs or broken invariants,
//!   such as appending to a full column buffer

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
