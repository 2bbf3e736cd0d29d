//! chain-hashtable: a single-threaded, text-keyed hash table with separate
//! chaining that owns its values and disposes of them through an optional
//! cleanup callback.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small owning container stack where every way a value can
//!   leave the structure is explicit: destroyed through cleanup, or moved
//!   out to the caller.
//! - Layers:
//!   - DynamicArray<T>: growable, insertion-ordered sequence with an
//!     optional `Cleanup<T>` bound at construction. Separates destroying
//!     operations (remove_at, set, Drop) from moving ones (take_at,
//!     into_vec).
//!   - Table<V>: a `DynamicArray` of optional buckets, each bucket a
//!     `DynamicArray` of items (owned key copy + value). Handles hashing,
//!     chaining, and grow/shrink.
//!   - Cursor<'a, V>: borrowed, forward-only walk over a table's values in
//!     bucket order.
//!
//! Constraints
//! - Single-threaded: the cleanup capability is an `Rc<dyn Fn(V)>`, so
//!   tables are `!Send`/`!Sync`.
//! - Keys are non-empty text; the table stores its own copy.
//! - Unique keys: `add` fails on duplicates and hands the value back; `set`
//!   only overwrites and never inserts.
//! - Capacity never drops below the initial capacity.
//!
//! Load factor and resizing
//! - After an insert, `len >= capacity * 3 / 4` doubles the bucket count.
//! - After a removal, `capacity > initial` and `len <= capacity / 4`
//!   halves it.
//! - Resizing builds a fresh table and moves every item into it through
//!   `DynamicArray::into_vec`, which never calls cleanup. The old shells are
//!   dropped empty, so no value is destroyed by a resize.
//!
//! Hashing
//! - Deterministic byte-wise accumulation modulo the capacity (see
//!   `hash::bucket_index`). No `Hasher`/`BuildHasher`: chain layouts and
//!   iteration order are reproducible across runs.
//!
//! Ownership of values
//! - Cleanup runs on `remove`, on the old value in `set`, and for every
//!   remaining value when the table is dropped or released.
//! - `take` moves a value out without cleanup.
//! - Items never hold the capability; each bucket's item array wraps the
//!   table's shared callback.
//!
//! Failure policy
//! - Duplicate/missing/empty keys and bad sequence indices are ordinary
//!   `Err`/`None`/`false` results with no side effects.
//! - A zero capacity is a caller bug and panics. Allocation failure aborts,
//!   which also rules out a half-finished resize.
//!
//! Notes and non-goals
//! - No thread safety, persistence, or generic key types.
//! - Mutation while a cursor is alive is rejected by the borrow checker.

pub mod builder;
pub mod cursor;
pub mod dynamic_array;
pub mod error;
pub mod hash;
pub mod table;
mod table_proptest;

// Public surface
pub use builder::{TableBuilder, DEFAULT_INITIAL_CAPACITY};
pub use cursor::{Cursor, Iter};
pub use dynamic_array::{Cleanup, DynamicArray};
pub use error::{InsertError, OutOfBounds, SetError};
pub use table::{ChainStats, Table};
