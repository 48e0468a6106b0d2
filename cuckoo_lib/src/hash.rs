//! Keyed byte-substitution hash family.
//!
//! Every hash function owns one random permutation of the 256 byte values.
//! A key is folded through its function's permutation eight times, each
//! round seeded by a different round counter, and the eight resulting bytes
//! form a 64-bit value that is reduced to a row index.

use rand::seq::SliceRandom;
use rand::Rng;

/// One substitution row: a permutation of `0..=255`.
pub type SubstitutionRow = [u8; 256];

/// Number of output bytes (rounds) per hash evaluation.
const ROUNDS: usize = std::mem::size_of::<u64>();

/// The family of `num_hashes` hash functions used by one table.
///
/// Recreated wholesale on construction and on every rebuild; never edited
/// in place.
#[derive(Debug, Clone)]
pub struct HashFamily {
    rows: Vec<SubstitutionRow>,
    table_size: usize,
}

impl HashFamily {
    /// Draws `num_hashes` fresh permutations from `rng`.
    pub fn generate<R: Rng + ?Sized>(num_hashes: usize, table_size: usize, rng: &mut R) -> Self {
        let rows = (0..num_hashes)
            .map(|_| {
                let mut row = identity_row();
                row.shuffle(rng);
                row
            })
            .collect();
        HashFamily { rows, table_size }
    }

    #[cfg(test)]
    pub(crate) fn from_rows(rows: Vec<SubstitutionRow>, table_size: usize) -> Self {
        HashFamily { rows, table_size }
    }

    pub fn num_hashes(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, function_id: usize) -> &SubstitutionRow {
        &self.rows[function_id]
    }

    /// Row index of `key` under hash function `function_id`, in `0..table_size`.
    ///
    /// # Panics
    /// If `function_id` is out of range or `key` is empty.
    #[inline(always)]
    pub fn hash(&self, function_id: usize, key: &[u8]) -> usize {
        assert!(
            function_id < self.rows.len(),
            "hash function {} out of range (have {})",
            function_id,
            self.rows.len()
        );
        assert!(!key.is_empty(), "keys must be at least one byte wide");

        let row = &self.rows[function_id];
        let mut acc: u64 = 0;
        for round in 0..ROUNDS {
            // Round counter perturbs the first byte only.
            let mut h = row[key[0].wrapping_add(round as u8) as usize];
            for &b in &key[1..] {
                h = row[(h ^ b) as usize];
            }
            acc = (acc << 8) | h as u64;
        }
        (acc % self.table_size as u64) as usize
    }
}

fn identity_row() -> SubstitutionRow {
    let mut row = [0u8; 256];
    for (i, b) in row.iter_mut().enumerate() {
        *b = i as u8;
    }
    row
}

/// True if `row` contains every byte value exactly once.
pub fn is_permutation(row: &SubstitutionRow) -> bool {
    let mut seen = [false; 256];
    for &b in row.iter() {
        if seen[b as usize] {
            return false;
        }
        seen[b as usize] = true;
    }
    true
}
