//! Invalid-argument errors raised when constructing a table.

use thiserror::Error;

/// Error returned by the table and map constructors.
///
/// Every other operation is total: a missing key is reported as `None`, never
/// as an error.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    /// The requested initial capacity exceeds
    /// [`MAXIMUM_CAPACITY`](crate::hash_table::MAXIMUM_CAPACITY).
    #[error("illegal initial capacity: {0}")]
    InvalidCapacity(usize),
    /// The load factor is zero, negative, or NaN.
    #[error("illegal load factor: {0}")]
    InvalidLoadFactor(f32),
}

/// Type to wrap a `Result<T, Error>`.
pub type Result<T> = core::result::Result<T, Error>;
