//! Fixed-capacity d-ary cuckoo hash table over fixed-width byte keys and values.
//!
//! Keys are placed by `num_hashes` independent substitution-table hash
//! functions, one table each. Insertion displaces occupants along a bounded
//! eviction chain and, when that fails, rebuilds the whole structure under a
//! freshly drawn hash family.

pub mod config;
pub mod error;
pub mod hash;
mod store;
pub mod table;

pub use crate::config::{TableConfig, DEFAULT_MAX_REBUILD_ATTEMPTS, DEFAULT_NUM_HASHES};
pub use crate::error::{CuckooError, Result};
pub use crate::hash::{is_permutation, HashFamily, SubstitutionRow};
pub use crate::table::{CuckooHashTable, RebuildStats};
