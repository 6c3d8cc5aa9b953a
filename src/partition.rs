// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Splits a run of rows into contiguous, near-equal ranges.  The same
//! arithmetic assigns rows to workers and a worker's rows to its
//! threads, and because a range depends only on `(total, parts, rank)`
//! any stage can re-derive it without asking anybody.

use std::ops::Range;

use errors::{Error, Result};

/// `count` rows starting at `offset`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RowRange {
    /// First row of the range.
    pub offset: usize,
    /// Number of rows in the range.
    pub count: usize,
}

impl RowRange {
    /// Rows of the range as a `Range`.
    pub fn rows(&self) -> Range<usize> {
        self.offset..self.offset + self.count
    }

    /// Row past the end of the range.
    pub fn end(&self) -> usize {
        self.offset + self.count
    }

    /// Whether the range holds no rows.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// The partition of `total` rows across `parts` holders.  The first
/// `total % parts` holders get one extra row.
#[derive(Clone, Debug, PartialEq)]
pub struct RowPartition {
    total: usize,
    ranges: Vec<RowRange>,
}

impl RowPartition {
    /// Partition `total` rows into `parts` ranges.
    pub fn new(total: usize, parts: usize) -> Result<RowPartition> {
        if parts == 0 {
            return Err(Error::Partition {
                total,
                parts,
                covered: 0,
            });
        }
        let ranges: Vec<RowRange> = (0..parts).map(|r| range_of(total, parts, r)).collect();

        let mut covered = 0;
        for range in &ranges {
            if range.offset != covered {
                break;
            }
            covered += range.count;
        }
        if covered != total {
            return Err(Error::Partition {
                total,
                parts,
                covered,
            });
        }
        Ok(RowPartition { total, ranges })
    }

    /// Rows being partitioned.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The range belonging to `rank`.
    pub fn range(&self, rank: usize) -> RowRange {
        self.ranges[rank]
    }

    /// Every range, in rank order.
    pub fn ranges(&self) -> &[RowRange] {
        &self.ranges
    }

    /// Rows per rank.
    pub fn counts(&self) -> Vec<usize> {
        self.ranges.iter().map(|r| r.count).collect()
    }

    /// Elements per rank when every row holds `width` elements.
    pub fn element_counts(&self, width: usize) -> Vec<usize> {
        self.ranges.iter().map(|r| r.count * width).collect()
    }
}

/// The range of one rank, computed from nothing but the partition
/// parameters.
pub fn range_of(total: usize, parts: usize, rank: usize) -> RowRange {
    let base = total / parts;
    let remainder = total % parts;
    let count = base + if rank < remainder { 1 } else { 0 };
    let offset = rank * base + if rank < remainder { rank } else { remainder };
    RowRange { offset, count }
}

/// Exclusive prefix sum over per-rank counts: where each rank's block
/// starts in the concatenation.
pub fn displacements(counts: &[usize]) -> Vec<usize> {
    counts
        .iter()
        .scan(0, |position, &count| {
            let start = *position;
            *position += count;
            Some(start)
        })
        .collect()
}
