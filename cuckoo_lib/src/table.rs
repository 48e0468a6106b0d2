use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::TableConfig;
use crate::error::{CuckooError, Result};
use crate::hash::{HashFamily, SubstitutionRow};
use crate::store::PackedStore;

/// Counters describing how often the rebuild path has run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    /// Rebuild attempts started, successful or not.
    pub attempts: usize,
    /// Rebuild attempts that replaced the live store.
    pub successes: usize,
}

/// A d-ary Cuckoo Hash Table with fixed-width byte keys and values.
///
/// Each of the `num_hashes` hash functions addresses its own table of
/// `table_size` rows, so a key has exactly one candidate slot per table.
/// Insertion displaces occupants along a bounded eviction chain and falls
/// back to rebuilding the whole structure under a fresh hash family.
#[derive(Debug)]
pub struct CuckooHashTable {
    config: TableConfig,
    store: PackedStore,
    family: HashFamily,
    rng: StdRng,
    stats: RebuildStats,
}

impl CuckooHashTable {
    /// Creates a new CuckooHashTable with the default number of hash
    /// functions and rebuild attempts.
    ///
    /// # Arguments
    /// * `table_size` - Rows per hash table.
    /// * `key_size` - Width of every key in bytes.
    /// * `value_size` - Width of every value in bytes.
    /// * `seed` - Seeds the generator behind every hash family this table draws.
    ///
    /// # Errors
    /// Returns [`CuckooError::InvalidConfig`] if any dimension is zero.
    pub fn new(table_size: usize, key_size: usize, value_size: usize, seed: u32) -> Result<Self> {
        Self::with_config(TableConfig::new(table_size, key_size, value_size), seed)
    }

    /// Creates a table from a full [`TableConfig`].
    pub fn with_config(config: TableConfig, seed: u32) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed as u64);
        let family = HashFamily::generate(config.num_hashes, config.table_size, &mut rng);
        Ok(CuckooHashTable {
            store: PackedStore::new(&config),
            config,
            family,
            rng,
            stats: RebuildStats::default(),
        })
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn rebuild_stats(&self) -> RebuildStats {
        self.stats
    }

    /// Row index of `key` under hash function `function_id`.
    ///
    /// # Panics
    /// If `function_id >= num_hashes` or `key` is not `key_size` bytes wide.
    pub fn hash(&self, function_id: usize, key: &[u8]) -> usize {
        self.check_key(key);
        self.family.hash(function_id, key)
    }

    /// The substitution permutation currently backing hash function `function_id`.
    pub fn substitution_row(&self, function_id: usize) -> &SubstitutionRow {
        self.family.row(function_id)
    }

    /// Looks up a key. Returns a copy of the stored value.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.find_slot(key)
            .map(|(table, row)| self.store.value(table, row).to_vec())
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.find_slot(key).is_some()
    }

    /// Removes a key and returns the value it held. Other slots are untouched.
    pub fn remove(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        let (table, row) = self.find_slot(key)?;
        let value = self.store.value(table, row).to_vec();
        self.store.set_exists(table, row, false);
        Some(value)
    }

    /// Inserts a key-value pair, returning `true` if it was stored.
    ///
    /// `false` means the table is structurally full: every rebuild attempt
    /// failed and the table still holds exactly what it held before the call.
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> bool {
        self.insert(key, value).is_ok()
    }

    /// Inserts a key-value pair, reporting why it could not be stored.
    ///
    /// Inserting a key that is already present is not an update; it stores a
    /// second copy and lookups may return either one.
    ///
    /// # Errors
    /// Returns [`CuckooError::TableFull`] once `max_rebuild_attempts` rebuilds
    /// have failed.
    ///
    /// # Panics
    /// If `key` or `value` does not have the configured width.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.check_key(key);
        assert_eq!(
            value.len(),
            self.config.value_size,
            "value is {} bytes, table stores {}-byte values",
            value.len(),
            self.config.value_size
        );

        let in_place = place(&self.family, &mut self.store, key, value, true);
        let Err(insert_err) = in_place else {
            return Ok(());
        };
        debug!(
            "In-place insert failed ({}), rebuilding (load: {:.2}%)",
            insert_err,
            self.load_factor() * 100.0
        );

        let max_attempts = self.config.max_rebuild_attempts;
        for attempt in 1..=max_attempts {
            match self.rebuild(key, value) {
                Ok(()) => {
                    debug!("Rebuild succeeded on attempt {}/{}", attempt, max_attempts);
                    return Ok(());
                }
                Err(e) => trace!("Rebuild attempt {}/{} failed: {}", attempt, max_attempts, e),
            }
        }

        warn!(
            "All {} rebuild attempts failed, table is full ({} of {} slots occupied)",
            max_attempts,
            self.len(),
            self.capacity()
        );
        Err(CuckooError::TableFull {
            attempts: max_attempts,
        })
    }

    /// One rebuild attempt: a fresh hash family and a fresh store, into which
    /// every live entry and then the pending pair are inserted.
    ///
    /// The live store and family are only replaced when everything fits; on
    /// failure the provisional store is dropped and nothing observable changes
    /// apart from the generator having advanced.
    fn rebuild(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.stats.attempts += 1;
        let family = HashFamily::generate(
            self.config.num_hashes,
            self.config.table_size,
            &mut self.rng,
        );
        let mut provisional = PackedStore::new(&self.config);

        for table in 0..self.config.num_hashes {
            for row in 0..self.config.table_size {
                if !self.store.exists(table, row) {
                    continue;
                }
                place(
                    &family,
                    &mut provisional,
                    self.store.key(table, row),
                    self.store.value(table, row),
                    false,
                )
                .map_err(|e| {
                    CuckooError::RehashFailed(format!(
                        "re-insert from table {} row {}: {}",
                        table, row, e
                    ))
                })?;
            }
        }

        place(&family, &mut provisional, key, value, false)
            .map_err(|e| CuckooError::RehashFailed(format!("pending entry: {}", e)))?;

        self.store = provisional;
        self.family = family;
        self.stats.successes += 1;
        Ok(())
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.store.occupied()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total slots across all tables.
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    /// Calculates the current load factor (0.0 to 1.0).
    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    /// Empties every slot. The current hash family is kept.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Diagnostic rendering of every table and slot.
    ///
    /// Each occupied row shows its key bytes as decimal numbers run together.
    ///
    /// # Panics
    /// Only reasonably small tables can be dumped: `table_size <= 100` and
    /// `key_size < 10`.
    pub fn dump(&self) -> String {
        assert!(self.config.table_size <= 100, "table too large to dump");
        assert!(self.config.key_size < 10, "keys too wide to dump");

        const RULE: &str = "=============================";
        let mut out = String::new();
        out.push_str(RULE);
        out.push('\n');
        for table in 0..self.config.num_hashes {
            out.push_str(&format!("Table {}\n", table));
            for row in 0..self.config.table_size {
                out.push_str(&format!("[{}]: ", row));
                if self.store.exists(table, row) {
                    for b in self.store.key(table, row) {
                        out.push_str(&b.to_string());
                    }
                }
                out.push('\n');
            }
            out.push('\n');
        }
        out.push_str(RULE);
        out.push('\n');
        out
    }

    fn find_slot(&self, key: &[u8]) -> Option<(usize, usize)> {
        self.check_key(key);
        (0..self.config.num_hashes)
            .map(|table| (table, self.family.hash(table, key)))
            .find(|&(table, row)| self.store.exists(table, row) && self.store.key(table, row) == key)
    }

    #[inline(always)]
    fn check_key(&self, key: &[u8]) {
        assert_eq!(
            key.len(),
            self.config.key_size,
            "key is {} bytes, table stores {}-byte keys",
            key.len(),
            self.config.key_size
        );
    }
}

/// Runs one eviction chain for `key`/`value` against `store`.
///
/// Starting at hash function 0, the pair claims its candidate slot; an
/// occupant is swapped out and carried on to the next hash function. Gives up
/// after `table_size * num_hashes` steps. With `revert_on_failure` the chain
/// is unwound so `store` ends exactly as it started; otherwise a failed chain
/// leaves `store` permuted with one entry homeless.
fn place(
    family: &HashFamily,
    store: &mut PackedStore,
    key: &[u8],
    value: &[u8],
    revert_on_failure: bool,
) -> Result<()> {
    let num_hashes = family.num_hashes();
    let max_displacements = store.table_size() * num_hashes;

    let mut current_key = key.to_vec();
    let mut current_value = value.to_vec();
    let mut displacement_path: Vec<(usize, usize)> = Vec::new();
    let mut current_h = 0;

    for _ in 0..max_displacements {
        let row = family.hash(current_h, &current_key);
        if !store.exists(current_h, row) {
            store.put(current_h, row, &current_key, &current_value);
            return Ok(());
        }
        store.swap_entry(current_h, row, &mut current_key, &mut current_value);
        if revert_on_failure {
            displacement_path.push((current_h, row));
        }
        current_h = (current_h + 1) % num_hashes;
    }

    if revert_on_failure {
        revert_changes(store, &displacement_path, &mut current_key, &mut current_value);
    }
    Err(CuckooError::InsertionFailed(format!(
        "max displacements ({}) reached, potential cycle",
        max_displacements
    )))
}

/// Swaps the carried pair back through `path` in reverse, undoing an eviction chain.
fn revert_changes(store: &mut PackedStore, path: &[(usize, usize)], key: &mut [u8], value: &mut [u8]) {
    for &(table, row) in path.iter().rev() {
        store.swap_entry(table, row, key, value);
    }
}
