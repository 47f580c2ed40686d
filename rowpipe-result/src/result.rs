use crate::error::Error;

/// Result type alias used throughout rowpipe.
///
/// A shorthand for `std::result::Result<T, Error>`. All rowpipe operations
/// that can fail return this type.
pub type Result<T> = std::result::Result<T, Error>;
