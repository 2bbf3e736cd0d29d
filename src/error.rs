//! Recoverable failures. Every error hands the rejected value back so the
//! caller keeps ownership of it.

use thiserror::Error;

/// Why `Table::add` refused a value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InsertError<V> {
    #[error("key is already present in the table")]
    DuplicateKey(V),
    #[error("key must not be empty")]
    EmptyKey(V),
}

impl<V> InsertError<V> {
    /// Recover the value that was not inserted.
    pub fn into_value(self) -> V {
        match self {
            InsertError::DuplicateKey(v) | InsertError::EmptyKey(v) => v,
        }
    }
}

/// Why `Table::set` refused a value. `set` never inserts, so a missing key
/// is a failure rather than an upsert.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetError<V> {
    #[error("key is not present in the table")]
    MissingKey(V),
    #[error("key must not be empty")]
    EmptyKey(V),
}

impl<V> SetError<V> {
    pub fn into_value(self) -> V {
        match self {
            SetError::MissingKey(v) | SetError::EmptyKey(v) => v,
        }
    }
}

/// Index rejected by a `DynamicArray` operation.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("index {index} out of bounds for length {len}")]
pub struct OutOfBounds<T> {
    pub index: usize,
    pub len: usize,
    pub value: T,
}

impl<T> OutOfBounds<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}
