//! Barrel pool and the transfer rule
//!
//! Full and empty barrels form a fixed-size pool: a transfer moves exactly
//! one barrel between the two sides, or does nothing when the source side
//! is empty. The total never changes and neither side goes below zero.

use serde::{Deserialize, Serialize};

/// Direction of a single-barrel transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarrelDirection {
    /// Empty barrel refilled: full +1, empty -1
    IncreaseFull,
    /// Full barrel used: full -1, empty +1
    DecreaseFull,
}

/// Full/empty barrel counts of a fuel depot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarrelCounts {
    /// Full barrels
    #[serde(rename = "fullBarrels")]
    pub full: u32,
    /// Empty barrels
    #[serde(rename = "emptyBarrels")]
    pub empty: u32,
}

impl BarrelCounts {
    /// Create counts
    #[inline]
    #[must_use]
    pub fn new(full: u32, empty: u32) -> Self {
        Self { full, empty }
    }

    /// Total barrels in the pool
    #[inline]
    #[must_use]
    pub fn total(&self) -> u64 {
        u64::from(self.full) + u64::from(self.empty)
    }

    /// Move one barrel in `direction`; no-op when the source side is 0 or
    /// the destination side is already at `u32::MAX`
    #[must_use]
    pub fn transfer(self, direction: BarrelDirection) -> Self {
        let moved = match direction {
            BarrelDirection::IncreaseFull if self.empty > 0 => {
                self.full.checked_add(1).map(|full| Self {
                    full,
                    empty: self.empty - 1,
                })
            }
            BarrelDirection::DecreaseFull if self.full > 0 => {
                self.empty.checked_add(1).map(|empty| Self {
                    full: self.full - 1,
                    empty,
                })
            }
            _ => None,
        };
        moved.unwrap_or(self)
    }
}
