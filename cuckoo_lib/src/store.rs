use crate::config::TableConfig;

/// Flat byte buffer holding `num_hashes` tables of `table_size` slots each.
///
/// Slot layout: `[occupied: u8][key: key_size][value: value_size]`.
/// Tables are laid out one after another, rows contiguous within a table.
/// Callers keep `table < num_hashes` and `row < table_size`; slice indexing
/// panics otherwise.
#[derive(Debug, Clone)]
pub struct PackedStore {
    data: Vec<u8>,
    table_size: usize,
    key_size: usize,
    value_size: usize,
}

impl PackedStore {
    /// Allocates a fully empty store for `config`, which must already be valid.
    pub fn new(config: &TableConfig) -> Self {
        PackedStore {
            data: vec![0u8; config.capacity() * config.slot_size()],
            table_size: config.table_size,
            key_size: config.key_size,
            value_size: config.value_size,
        }
    }

    pub fn table_size(&self) -> usize {
        self.table_size
    }

    #[inline(always)]
    fn slot_size(&self) -> usize {
        1 + self.key_size + self.value_size
    }

    #[inline(always)]
    fn slot_offset(&self, table: usize, row: usize) -> usize {
        (table * self.table_size + row) * self.slot_size()
    }

    #[inline(always)]
    pub fn key_offset(&self, table: usize, row: usize) -> usize {
        self.slot_offset(table, row) + 1
    }

    #[inline(always)]
    pub fn value_offset(&self, table: usize, row: usize) -> usize {
        self.key_offset(table, row) + self.key_size
    }

    #[inline(always)]
    pub fn exists(&self, table: usize, row: usize) -> bool {
        self.data[self.slot_offset(table, row)] != 0
    }

    #[inline(always)]
    pub fn set_exists(&mut self, table: usize, row: usize, flag: bool) {
        let offset = self.slot_offset(table, row);
        self.data[offset] = flag as u8;
    }

    pub fn key(&self, table: usize, row: usize) -> &[u8] {
        let start = self.key_offset(table, row);
        &self.data[start..start + self.key_size]
    }

    pub fn value(&self, table: usize, row: usize) -> &[u8] {
        let start = self.value_offset(table, row);
        &self.data[start..start + self.value_size]
    }

    /// Writes `key`/`value` into the slot and marks it occupied.
    pub fn put(&mut self, table: usize, row: usize, key: &[u8], value: &[u8]) {
        let key_start = self.key_offset(table, row);
        let value_start = self.value_offset(table, row);
        self.data[key_start..key_start + self.key_size].copy_from_slice(key);
        self.data[value_start..value_start + self.value_size].copy_from_slice(value);
        self.set_exists(table, row, true);
    }

    /// Exchanges the slot's key/value with the caller's buffers.
    ///
    /// Occupancy is left as is; the slot is expected to be occupied.
    pub fn swap_entry(&mut self, table: usize, row: usize, key: &mut [u8], value: &mut [u8]) {
        let key_start = self.key_offset(table, row);
        let value_start = self.value_offset(table, row);
        self.data[key_start..key_start + self.key_size].swap_with_slice(key);
        self.data[value_start..value_start + self.value_size].swap_with_slice(value);
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.data
            .iter()
            .step_by(self.slot_size())
            .filter(|&&flag| flag != 0)
            .count()
    }

    /// Marks every slot empty. Stale key/value bytes stay behind the cleared flags.
    pub fn clear(&mut self) {
        let step = self.slot_size();
        for flag in self.data.iter_mut().step_by(step) {
            *flag = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn offsets_follow_the_slot_layout() {
        let store = PackedStore::new(&TableConfig::new(4, 5, 2));
        // slot = 1 + 5 + 2 = 8 bytes, table = 32 bytes
        assert_eq!(store.key_offset(0, 0), 1);
        assert_eq!(store.value_offset(0, 0), 6);
        assert_eq!(store.key_offset(0, 3), 25);
        assert_eq!(store.key_offset(1, 0), 33);
        assert_eq!(store.value_offset(2, 1), 2 * 32 + 8 + 6);
    }

    #[test]
    fn put_sets_occupancy_and_contents() {
        let mut store = PackedStore::new(&TableConfig::new(2, 3, 1));
        assert!(!store.exists(1, 1));
        store.put(1, 1, &[1, 2, 3], &[9]);
        assert!(store.exists(1, 1));
        assert_eq!(store.key(1, 1), &[1, 2, 3]);
        assert_eq!(store.value(1, 1), &[9]);
        assert!(!store.exists(1, 0));
        assert!(!store.exists(2, 1));
        assert_eq!(store.occupied(), 1);

        store.set_exists(1, 1, false);
        assert!(!store.exists(1, 1));
        assert_eq!(store.occupied(), 0);
    }

    #[test]
    fn swap_entry_exchanges_contents() {
        let mut store = PackedStore::new(&TableConfig::new(2, 2, 2));
        store.put(0, 1, &[1, 1], &[2, 2]);
        let mut key = [3u8, 3];
        let mut value = [4u8, 4];
        store.swap_entry(0, 1, &mut key, &mut value);
        assert_eq!(key, [1, 1]);
        assert_eq!(value, [2, 2]);
        assert_eq!(store.key(0, 1), &[3, 3]);
        assert_eq!(store.value(0, 1), &[4, 4]);
        assert!(store.exists(0, 1));
    }

    #[test]
    fn clear_empties_every_slot() {
        let mut store = PackedStore::new(&TableConfig::new(3, 1, 1));
        for t in 0..3 {
            for r in 0..3 {
                store.put(t, r, &[t as u8], &[r as u8]);
            }
        }
        assert_eq!(store.occupied(), 9);
        store.clear();
        assert_eq!(store.occupied(), 0);
    }
}
