//! Hash-consing table: maps structurally equal values to one dense index.
//!
//! Values live in insertion order in `data`; each bucket heads a chain threaded
//! through `next`. Indices are stable for the lifetime of the table, so they can be
//! used directly as arena handles ([`StateId`][crate::state::StateId]).

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::ops::Index;

const NIL: u32 = u32::MAX;

pub struct Table<T> {
    data: Vec<T>,
    next: Vec<u32>,
    buckets: Vec<u32>,
    hasher: RandomState,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self::new(4)
    }
}

impl<T> Table<T> {
    /// Create a table with `2^bits` buckets.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Table bits should be in the range 0..=31");
        Self {
            data: Vec::new(),
            next: Vec::new(),
            buckets: vec![NIL; 1 << bits],
            hasher: RandomState::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn value(&self, index: usize) -> &T {
        &self.data[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T> Table<T>
where
    T: Hash + Eq,
{
    fn bucket_index(&self, value: &T) -> usize {
        (self.hasher.hash_one(value) as usize) & (self.buckets.len() - 1)
    }

    /// Index of a value equal to `value`, if present.
    pub fn get(&self, value: &T) -> Option<usize> {
        let mut index = self.buckets[self.bucket_index(value)];
        while index != NIL {
            if &self.data[index as usize] == value {
                return Some(index as usize);
            }
            index = self.next[index as usize];
        }
        None
    }

    /// Put a value into the table and return its index, plus `true` if it was new.
    pub fn put(&mut self, value: T) -> (usize, bool) {
        if let Some(index) = self.get(&value) {
            return (index, false);
        }
        if self.data.len() >= self.buckets.len() {
            self.grow();
        }
        let index = self.data.len();
        let b = self.bucket_index(&value);
        self.next.push(self.buckets[b]);
        self.buckets[b] = index as u32;
        self.data.push(value);
        (index, true)
    }

    /// Double the number of buckets and rethread every chain.
    fn grow(&mut self) {
        let size = self.buckets.len() * 2;
        self.buckets = vec![NIL; size];
        for index in 0..self.data.len() {
            let b = self.bucket_index(&self.data[index]);
            self.next[index] = self.buckets[b];
            self.buckets[b] = index as u32;
        }
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}
