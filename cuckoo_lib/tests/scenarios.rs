use cuckoo_lib::{is_permutation, CuckooHashTable, TableConfig};
use std::collections::HashMap;
use test_log::test;

#[test]
fn small_table_keeps_every_key_through_evictions() {
    let keys: [[u8; 5]; 5] = [
        [1, 2, 3, 4, 5],
        [1, 2, 8, 4, 6],
        [1, 2, 3, 4, 7],
        [1, 3, 3, 4, 8],
        [1, 5, 5, 4, 10],
    ];

    for seed in 0..50u32 {
        let mut table = CuckooHashTable::new(2, 5, 1, seed).unwrap();
        let mut stored = Vec::new();
        for key in keys.iter() {
            if table.add(key, &[4]) {
                stored.push(key);
            } else {
                assert_eq!(table.get(key), None);
            }
            for k in &stored {
                assert_eq!(table.get(&k[..]), Some(vec![4]), "seed {}", seed);
            }
        }
        // Six slots: the first three always fit.
        assert!(stored.len() >= 3, "seed {} stored {}", seed, stored.len());
        assert_eq!(table.len(), stored.len());
    }
}

#[test]
fn absent_keys_are_not_found() {
    let mut table = CuckooHashTable::new(32, 4, 4, 9).unwrap();
    for i in 0..20u32 {
        assert!(table.add(&i.to_le_bytes(), &(i * 3).to_le_bytes()));
    }
    for i in 100..200u32 {
        assert_eq!(table.get(&i.to_le_bytes()), None);
        assert_eq!(table.remove(&i.to_le_bytes()), None);
    }
    assert_eq!(table.len(), 20);
}

#[test]
fn freed_slot_is_reused_without_disturbing_others() {
    let mut table = CuckooHashTable::new(16, 2, 1, 4).unwrap();
    for i in 0..10u8 {
        assert!(table.add(&[i, i], &[i]));
    }
    assert_eq!(table.remove(&[5, 5]), Some(vec![5]));
    assert_eq!(table.get(&[5, 5]), None);

    assert!(table.add(&[200, 1], &[77]));
    assert_eq!(table.get(&[200, 1]), Some(vec![77]));
    for i in (0..10u8).filter(|&i| i != 5) {
        assert_eq!(table.get(&[i, i]), Some(vec![i]));
    }
    assert_eq!(table.len(), 10);
}

#[test]
fn no_key_is_stored_twice() {
    let mut table = CuckooHashTable::new(64, 2, 2, 2024).unwrap();
    let mut accepted = HashMap::new();
    for i in 0..140u16 {
        let key = i.wrapping_mul(7919).to_be_bytes();
        let value = i.to_le_bytes();
        if table.add(&key, &value) {
            accepted.insert(key, value);
        }
    }
    // Distinct keys each inserted once: one occupied slot per accepted key.
    assert_eq!(table.len(), accepted.len());
    for (key, value) in &accepted {
        assert_eq!(table.get(key), Some(value.to_vec()));
    }
    for key in accepted.keys() {
        assert!(table.remove(key).is_some());
        assert_eq!(table.get(key), None);
    }
    assert!(table.is_empty());
}

#[test]
fn saturating_the_table_eventually_fails() {
    let config = TableConfig::new(8, 2, 1).with_max_rebuild_attempts(20);
    let mut table = CuckooHashTable::with_config(config, 31).unwrap();
    let capacity = table.capacity();

    let mut accepted = Vec::new();
    let mut rejected = 0;
    for i in 0..(capacity as u16 + 8) {
        let key = i.to_be_bytes();
        if table.add(&key, &[i as u8]) {
            accepted.push(key);
        } else {
            rejected += 1;
        }
    }
    assert!(rejected >= 8);
    assert!(accepted.len() <= capacity);
    assert_eq!(table.len(), accepted.len());
    assert!(table.rebuild_stats().attempts >= 20);
    for key in &accepted {
        assert!(table.contains_key(key));
    }
}

#[test]
fn light_load_always_succeeds() {
    for seed in 0..10u32 {
        let mut table = CuckooHashTable::new(256, 8, 8, seed).unwrap();
        for i in 0..64u64 {
            assert!(table.add(&i.to_le_bytes(), &(!i).to_le_bytes()));
        }
        for i in 0..64u64 {
            assert_eq!(table.get(&i.to_le_bytes()), Some((!i).to_le_bytes().to_vec()));
        }
    }
}

#[test]
fn hash_family_stays_valid_across_rebuilds() {
    let config = TableConfig::new(4, 1, 1).with_max_rebuild_attempts(5);
    let mut table = CuckooHashTable::with_config(config, 8).unwrap();
    for k in 0..=255u8 {
        table.add(&[k], &[k]);
        for h in 0..3 {
            assert!(is_permutation(table.substitution_row(h)));
        }
    }
    for k in 0..=255u8 {
        for h in 0..3 {
            let row = table.hash(h, &[k]);
            assert!(row < 4);
            assert_eq!(row, table.hash(h, &[k]));
        }
    }
}
