//! Shard interval type and the partitioning algebra.
//!
//! The key space is the closed range `[MIN_KEY, MAX_KEY]`, fixed at compile
//! time. Ownership is always expressed as a set of disjoint `Shard`
//! intervals whose union covers the whole space.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};

/// Inclusive lower bound of the partitioned key space.
pub const MIN_KEY: u32 = 0;
/// Inclusive upper bound of the partitioned key space.
pub const MAX_KEY: u32 = 999;

/// A contiguous closed range of keys, `lower..=upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    pub lower: u32,
    pub upper: u32,
}

impl Shard {
    pub fn new(lower: u32, upper: u32) -> Self {
        Self { lower, upper }
    }

    /// Number of keys covered, `upper - lower + 1`.
    pub fn size(&self) -> u64 {
        (self.upper - self.lower) as u64 + 1
    }

    pub fn contains(&self, key: u32) -> bool {
        self.lower <= key && key <= self.upper
    }
}

/// How shard `a` relates to shard `b`. Every pair of shards falls into
/// exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapStatus {
    /// The shards share no keys.
    NoOverlap,
    /// `a` lies fully inside `b` (bounds may coincide).
    ContainedInOther,
    /// `a` strictly surrounds `b` on both sides.
    ContainsOther,
    /// `a` covers the upper part of `b` and extends beyond it.
    CoversUpperEnd,
    /// `a` covers the lower part of `b` and extends below it.
    CoversLowerEnd,
}

/// Classifies the relation of `a` to `b`.
pub fn get_overlap(a: &Shard, b: &Shard) -> OverlapStatus {
    if a.upper < b.lower || b.upper < a.lower {
        OverlapStatus::NoOverlap
    } else if b.lower <= a.lower && a.upper <= b.upper {
        OverlapStatus::ContainedInOther
    } else if a.lower < b.lower && a.upper > b.upper {
        OverlapStatus::ContainsOther
    } else if a.lower >= b.lower && a.upper > b.upper {
        OverlapStatus::CoversUpperEnd
    } else if a.lower < b.lower && a.upper <= b.upper {
        OverlapStatus::CoversLowerEnd
    } else {
        // The four inequalities above exhaust all overlapping cases.
        unreachable!("overlap classification fell through for {:?} vs {:?}", a, b)
    }
}

/// Whether any shard in the list covers the given key.
pub fn covers(shards: &[Shard], key: u32) -> bool {
    shards.iter().any(|s| s.contains(key))
}

/// Splits a shard at its midpoint. The left half keeps the midpoint.
///
/// Requires `lower < upper`; a single-key shard has no midpoint.
pub fn split_shard(s: Shard) -> (Shard, Shard) {
    assert!(s.lower < s.upper, "cannot split single-key shard {:?}", s);
    let mid = s.lower + (s.upper - s.lower) / 2;
    (Shard::new(s.lower, mid), Shard::new(mid + 1, s.upper))
}

/// Cuts `[min, max]` into `n` disjoint shards covering the whole range,
/// sorted ascending by lower bound. Deterministic: the same inputs always
/// produce the same layout.
///
/// Even `n` halves the working set `log2(n)` times, then splits leading
/// shards once more until the count is exact. Odd `n` carves a leading
/// shard of one n-th off the front and applies the even rule for `n - 1`
/// to the remainder. Only powers of two (and their odd successors) come
/// out balanced; other counts are legal but uneven.
pub fn partition(n: usize, min: u32, max: u32) -> Result<Vec<Shard>, StoreError> {
    if n == 0 {
        return Err(StoreError::InvalidPartition(n));
    }
    if n == 1 {
        return Ok(vec![Shard::new(min, max)]);
    }
    if n % 2 == 0 {
        Ok(halve_into(n, min, max))
    } else {
        let lead_upper = min + (max - min) / n as u32;
        let mut shards = halve_into(n - 1, lead_upper + 1, max);
        shards.push(Shard::new(min, lead_upper));
        shards.sort_by_key(|s| s.lower);
        Ok(shards)
    }
}

/// Even-count partition of `[min, max]` by repeated midpoint halving.
fn halve_into(n: usize, min: u32, max: u32) -> Vec<Shard> {
    let mut shards = vec![Shard::new(min, max)];
    for _ in 0..n.ilog2() {
        let mut next = Vec::with_capacity(shards.len() * 2);
        for shard in shards.drain(..) {
            let (left, right) = split_shard(shard);
            next.push(left);
            next.push(right);
        }
        shards = next;
    }
    shards.sort_by_key(|s| s.lower);
    // Halving alone only reaches powers of two; split leading shards once
    // more until the count is exact.
    let deficit = n - shards.len();
    for i in 0..deficit {
        let (left, right) = split_shard(shards[i * 2]);
        shards.splice(i * 2..=i * 2, [left, right]);
    }
    shards
}
