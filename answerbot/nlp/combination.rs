//! Enumerates every way of splitting a query into contiguous groups.
//!
//! The `n - 1` gaps between entries are bits of a counter; a set bit closes
//! the current group. Counting from `0` to `2^(n-1) - 1` with the leftmost
//! gap as the most significant bit reproduces lexicographic product order:
//! `[abc]`, `[ab][c]`, `[a][bc]`, `[a][b][c]`.

use std::{fmt, iter::FusedIterator};

use serde::{Deserialize, Serialize};

use crate::error::NlpError;

/// Largest query whose gap count fits the 64-bit counter.
pub const MAX_QUERY_LEN: usize = 64;

/// One partition of a query into contiguous, non-empty groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Combination<T> {
    parts: Vec<Vec<T>>,
}

impl<T> Combination<T> {
    /// Groups in order.
    #[must_use]
    pub fn parts(&self) -> &[Vec<T>] {
        &self.parts
    }

    /// Consumes the combination, returning its groups.
    #[must_use]
    pub fn into_parts(self) -> Vec<Vec<T>> {
        self.parts
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether there are no groups. False for every combination the
    /// generator produces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl<T: Clone> Combination<T> {
    /// Concatenation of the groups, i.e. the query it was split from.
    #[must_use]
    pub fn flatten(&self) -> Vec<T> {
        self.parts.iter().flatten().cloned().collect()
    }
}

impl<T: fmt::Display> fmt::Display for Combination<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            f.write_str("[")?;
            for (idx, entry) in part.iter().enumerate() {
                if idx > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{entry}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// Lazy iterator over every [`Combination`] of a query.
#[derive(Debug, Clone)]
pub struct Combinations<'q, T> {
    entries: &'q [T],
    next: u64,
    total: u64,
}

impl<T> Combinations<'_, T> {
    /// Total number of combinations, `2^(n-1)`.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }
}

/// Starts enumerating the combinations of `query`.
///
/// Fails with [`NlpError::EmptyQuery`] for an empty query and with
/// [`NlpError::QueryTooLong`] above [`MAX_QUERY_LEN`] entries.
pub fn combinations<T: Clone>(query: &[T]) -> Result<Combinations<'_, T>, NlpError> {
    match query.len() {
        0 => Err(NlpError::EmptyQuery),
        len if len > MAX_QUERY_LEN => Err(NlpError::QueryTooLong { len }),
        len => Ok(Combinations {
            entries: query,
            next: 0,
            total: 1u64 << (len - 1),
        }),
    }
}

impl<T: Clone> Combinations<'_, T> {
    fn split(&self, pattern: u64) -> Combination<T> {
        let gaps = self.entries.len() - 1;
        let mut parts = Vec::new();
        let mut group = Vec::new();
        for (gap, entry) in self.entries[..gaps].iter().enumerate() {
            group.push(entry.clone());
            if (pattern >> (gaps - 1 - gap)) & 1 == 1 {
                parts.push(std::mem::take(&mut group));
            }
        }
        // the last entry never has a split after it
        group.push(self.entries[gaps].clone());
        parts.push(group);
        Combination { parts }
    }
}

impl<T: Clone> Iterator for Combinations<'_, T> {
    type Item = Combination<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let combination = self.split(self.next);
        self.next += 1;
        Some(combination)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        usize::try_from(self.total - self.next).map_or((usize::MAX, None), |n| (n, Some(n)))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        let skip = u64::try_from(n).unwrap_or(u64::MAX);
        self.next = self.next.saturating_add(skip).min(self.total);
        self.next()
    }
}

impl<T: Clone> ExactSizeIterator for Combinations<'_, T> {}

impl<T: Clone> FusedIterator for Combinations<'_, T> {}
