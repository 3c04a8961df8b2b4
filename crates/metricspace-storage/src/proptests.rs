//! Property-based tests for the persistence store.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::store::PersistenceStore;
    use metricspace_core::Row;
    use proptest::collection::{btree_map, vec};
    use proptest::prelude::*;

    fn rows() -> impl Strategy<Value = Vec<Row>> {
        vec(btree_map("[a-zA-Z]{1,12}", "(-?[0-9]{1,6}(\\.[0-9]{1,3})?)?", 0..4), 0..8)
    }

    proptest! {
        #[test]
        fn test_rows_survive_write_read(key in "[a-z_]{1,24}", value in rows()) {
            let store = PersistenceStore::in_memory();
            store.write(&key, &value);
            prop_assert_eq!(store.read(&key, Vec::<Row>::new()), value);
        }

        #[test]
        fn test_never_written_key_returns_initial(key in "[a-z_]{1,24}", initial in rows()) {
            let store = PersistenceStore::in_memory();
            prop_assert_eq!(store.read(&key, initial.clone()), initial);
        }

        #[test]
        fn test_remove_twice_equals_once(key in "[a-z_]{1,24}", n in any::<i64>()) {
            let store = PersistenceStore::in_memory();
            store.write(&key, &n);
            store.remove(&key);
            let once = store.list_keys("");
            store.remove(&key);
            prop_assert_eq!(store.list_keys(""), once);
            prop_assert!(store.list_keys(&key).is_empty());
        }
    }
}
