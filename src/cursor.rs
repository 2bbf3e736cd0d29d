//! Forward-only cursor over a `Table`.
//!
//! The cursor borrows the table, so the table cannot be mutated while a
//! cursor over it is alive. Values come out in ascending bucket order and,
//! within a bucket, in insertion order.

use crate::table::{Item, Table};
use core::iter::FusedIterator;

/// Cursor yielding every value of a table exactly once.
///
/// Starts before the first item of bucket 0 and ends once the bucket
/// cursor reaches the table's capacity; `reset` rewinds it onto any table.
pub struct Cursor<'a, V> {
    table: &'a Table<V>,
    bucket: usize,
    item: Option<usize>,
}

impl<'a, V> Cursor<'a, V> {
    pub(crate) fn new(table: &'a Table<V>) -> Self {
        Self {
            table,
            bucket: 0,
            item: None,
        }
    }

    /// Rebind to `table` (the same one or another) and rewind.
    pub fn reset(&mut self, table: &'a Table<V>) {
        self.table = table;
        self.bucket = 0;
        self.item = None;
    }

    /// Bucket and chain position of the last produced item. The chain
    /// position is `None` before anything was produced from the current
    /// bucket, and the bucket equals the capacity once exhausted.
    pub fn position(&self) -> (usize, Option<usize>) {
        (self.bucket, self.item)
    }

    pub fn is_exhausted(&self) -> bool {
        self.bucket >= self.table.capacity()
    }

    fn advance(&mut self) -> Option<&'a Item<V>> {
        let table = self.table;
        while self.bucket < table.capacity() {
            let next = self.item.map_or(0, |i| i + 1);
            if let Some(item) = table.item_at(self.bucket, next) {
                self.item = Some(next);
                return Some(item);
            }
            self.bucket += 1;
            self.item = None;
        }
        None
    }
}

impl<'a, V> Iterator for Cursor<'a, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.advance().map(|item| &item.value)
    }
}

impl<V> FusedIterator for Cursor<'_, V> {}

/// `(key, value)` pairs in cursor order.
pub struct Iter<'a, V> {
    cursor: Cursor<'a, V>,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(cursor: Cursor<'a, V>) -> Self {
        Self { cursor }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.cursor
            .advance()
            .map(|item| (&*item.key, &item.value))
    }
}

impl<V> FusedIterator for Iter<'_, V> {}
