//! Property-based tests for the session counter
//!
//! - N sequential increments land on `initial + N` with no skipped values
//! - Reset always yields a fresh id and the configured baseline

use super::{MemoryStore, SessionStore};
use proptest::prelude::*;

proptest! {
    #[test]
    fn increments_are_sequential(initial in 0u64..10_000, n in 0usize..50) {
        let store = SessionStore::new(MemoryStore::new());
        store.set_message_count(initial).unwrap();

        let seen: Vec<u64> = (0..n)
            .map(|_| store.increment_message_count().unwrap())
            .collect();

        let expected: Vec<u64> = (1..=n as u64).map(|i| initial + i).collect();
        prop_assert_eq!(seen, expected);
        prop_assert_eq!(store.message_count().unwrap(), initial + n as u64);
    }

    #[test]
    fn reset_yields_fresh_id_and_baseline(baseline in 0u64..2, count in 0u64..100) {
        let store = SessionStore::new(MemoryStore::new()).with_reset_baseline(baseline);
        let before = store.session_id().unwrap();
        store.set_message_count(count).unwrap();

        let after = store.reset_session().unwrap();
        prop_assert_ne!(before, after);
        prop_assert_eq!(store.message_count().unwrap(), baseline);
    }
}
