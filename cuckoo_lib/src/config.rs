use crate::error::{CuckooError, Result};

// --- Constants related to the Algorithm (can be adjusted here) ---
/// Number of independent hash functions, and so of parallel tables.
pub const DEFAULT_NUM_HASHES: usize = 3;
/// How many fresh hash families a failed insertion may try before giving up.
pub const DEFAULT_MAX_REBUILD_ATTEMPTS: usize = 100;

/// Dimensions of a [`CuckooHashTable`](crate::CuckooHashTable).
///
/// Fixed at construction. A rebuild swaps hash functions and slot placement
/// but never changes any of these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// Rows per hash table.
    pub table_size: usize,
    /// Width of every key in bytes.
    pub key_size: usize,
    /// Width of every value in bytes.
    pub value_size: usize,
    pub num_hashes: usize,
    pub max_rebuild_attempts: usize,
}

impl TableConfig {
    pub fn new(table_size: usize, key_size: usize, value_size: usize) -> Self {
        TableConfig {
            table_size,
            key_size,
            value_size,
            num_hashes: DEFAULT_NUM_HASHES,
            max_rebuild_attempts: DEFAULT_MAX_REBUILD_ATTEMPTS,
        }
    }

    pub fn with_num_hashes(mut self, num_hashes: usize) -> Self {
        self.num_hashes = num_hashes;
        self
    }

    pub fn with_max_rebuild_attempts(mut self, attempts: usize) -> Self {
        self.max_rebuild_attempts = attempts;
        self
    }

    /// Bytes taken by one slot: occupancy flag, key, value.
    #[inline(always)]
    pub fn slot_size(&self) -> usize {
        1 + self.key_size + self.value_size
    }

    /// Total number of slots across all tables.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.num_hashes * self.table_size
    }

    /// Checks the dimensions before any buffer is allocated.
    ///
    /// # Errors
    /// Returns [`CuckooError::InvalidConfig`] if any width or count is zero,
    /// if there are more than 256 hash functions (function ids must fit a
    /// byte), or if the packed store size would overflow `usize`.
    pub fn validate(&self) -> Result<()> {
        if self.table_size == 0 {
            return Err(CuckooError::InvalidConfig(
                "table_size must be at least 1".to_string(),
            ));
        }
        if self.key_size == 0 {
            return Err(CuckooError::InvalidConfig(
                "key_size must be at least 1".to_string(),
            ));
        }
        if self.value_size == 0 {
            return Err(CuckooError::InvalidConfig(
                "value_size must be at least 1".to_string(),
            ));
        }
        if self.num_hashes == 0 || self.num_hashes > 256 {
            return Err(CuckooError::InvalidConfig(format!(
                "num_hashes must be in 1..=256, got {}",
                self.num_hashes
            )));
        }
        self.slot_size()
            .checked_mul(self.table_size)
            .and_then(|bytes| bytes.checked_mul(self.num_hashes))
            .ok_or_else(|| {
                CuckooError::InvalidConfig(format!(
                    "packed store of {} x {} slots of {} bytes overflows usize",
                    self.num_hashes,
                    self.table_size,
                    self.slot_size()
                ))
            })?;
        Ok(())
    }
}
