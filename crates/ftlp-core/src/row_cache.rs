//! Process-wide cache of immutable sparse rows.
//!
//! Rows are keyed by a content [`RowSignature`] over the raw
//! `(index, coefficient)` sequence. The signature is only a bucket key: a hit
//! additionally requires bitwise equality of every index and coefficient, so a
//! signature collision never makes two different rows share an entry.
//!
//! Entries are published behind `Arc` and never mutated or evicted; models that
//! reference them keep them alive. Concurrent inserts of equal rows converge on
//! a single published entry.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::types::ColumnIndex;

/// Order-sensitive content hash of a sparse row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowSignature(u64);

impl RowSignature {
    /// Hash the row's length, then each raw index and coefficient bit pattern.
    pub fn compute<I: ColumnIndex>(coefficients: &[f64], indices: &[I]) -> Self {
        let mut hasher = DefaultHasher::new();
        indices.len().hash(&mut hasher);
        for (index, coefficient) in indices.iter().zip(coefficients) {
            index.raw().hash(&mut hasher);
            coefficient.to_bits().hash(&mut hasher);
        }
        Self(hasher.finish())
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// An immutable, validated sparse row owned by the cache.
#[derive(Debug, PartialEq)]
pub struct SparseRow {
    indices: Box<[u32]>,
    coefficients: Box<[f64]>,
    max_column: Option<u32>,
}

impl SparseRow {
    /// Build an entry from entries that already passed model validation.
    ///
    /// Indices are non-negative and below the validating model's column count,
    /// which never exceeds `i32::MAX`.
    pub fn from_validated<I: ColumnIndex>(coefficients: &[f64], indices: &[I]) -> Self {
        let indices: Box<[u32]> = indices
            .iter()
            .map(|index| index.to_position().unwrap_or_default() as u32)
            .collect();
        let max_column = indices.iter().copied().max();
        Self {
            indices,
            coefficients: coefficients.into(),
            max_column,
        }
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Largest referenced column, `None` for an empty row.
    pub fn max_column(&self) -> Option<usize> {
        self.max_column.map(|column| column as usize)
    }

    /// Bitwise comparison against caller input.
    fn matches<I: ColumnIndex>(&self, coefficients: &[f64], indices: &[I]) -> bool {
        self.indices.len() == indices.len()
            && self.coefficients.len() == coefficients.len()
            && self
                .indices
                .iter()
                .zip(indices)
                .all(|(&stored, index)| i64::from(stored) == index.raw())
            && self
                .coefficients
                .iter()
                .zip(coefficients)
                .all(|(stored, given)| stored.to_bits() == given.to_bits())
    }

    fn same_content(&self, other: &SparseRow) -> bool {
        self.matches(&other.coefficients, &other.indices[..])
    }
}

/// Hit/miss counters and entry count of a [`SparseRowCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups that were hits, `0.0` before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Concurrent content-addressed store of [`SparseRow`]s.
#[derive(Debug, Default)]
pub struct SparseRowCache {
    entries: RwLock<HashMap<RowSignature, Vec<Arc<SparseRow>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SparseRowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value-equal entry, counting the lookup as a hit or a miss.
    pub fn get<I: ColumnIndex>(
        &self,
        signature: RowSignature,
        coefficients: &[f64],
        indices: &[I],
    ) -> Option<Arc<SparseRow>> {
        let found = self
            .read()
            .get(&signature)
            .and_then(|bucket| {
                bucket
                    .iter()
                    .find(|entry| entry.matches(coefficients, indices))
            })
            .cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Publish `row` under `signature` and return the published entry.
    ///
    /// If another caller published a value-equal row in the meantime, that
    /// entry is returned and `row` is dropped.
    pub fn insert(&self, signature: RowSignature, row: SparseRow) -> Arc<SparseRow> {
        let mut entries = self.write();
        let bucket = entries.entry(signature).or_default();
        if let Some(existing) = bucket.iter().find(|entry| entry.same_content(&row)) {
            return Arc::clone(existing);
        }
        if !bucket.is_empty() {
            tracing::debug!(
                component = "row_cache",
                operation = "insert",
                signature = signature.value(),
                bucket_len = bucket.len(),
                "Signature collision between distinct rows"
            );
        }
        let entry = Arc::new(row);
        bucket.push(Arc::clone(&entry));
        entry
    }

    /// Number of distinct rows held.
    pub fn len(&self) -> usize {
        self.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<RowSignature, Vec<Arc<SparseRow>>>> {
        match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<RowSignature, Vec<Arc<SparseRow>>>> {
        match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
