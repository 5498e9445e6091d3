//! Per-table reader/writer locks.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

/// How a table is locked for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LockMode {
    Read,
    Write,
}

/// Registry of `(database, table)` locks, created on first use.
///
/// Lock sets are always acquired in sorted key order, so two operations
/// touching overlapping tables cannot deadlock.
#[derive(Default)]
pub struct TableLocks {
    tables: DashMap<(String, String), Arc<RwLock<()>>>,
}

impl TableLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, database: &str, table: &str) -> Arc<RwLock<()>> {
        self.tables
            .entry((database.to_string(), table.to_string()))
            .or_default()
            .clone()
    }

    /// Run `f` while holding every requested table lock.
    ///
    /// A table requested more than once is locked once, in the strongest
    /// mode asked for.
    pub fn with_locked<R>(
        &self,
        database: &str,
        requests: &[(&str, LockMode)],
        f: impl FnOnce() -> R,
    ) -> R {
        let mut merged: BTreeMap<&str, LockMode> = BTreeMap::new();
        for &(table, mode) in requests {
            let entry = merged.entry(table).or_insert(mode);
            *entry = (*entry).max(mode);
        }

        let locks: Vec<(Arc<RwLock<()>>, LockMode)> = merged
            .into_iter()
            .map(|(table, mode)| (self.lock_for(database, table), mode))
            .collect();

        tracing::trace!(database, tables = locks.len(), "Acquiring table locks");
        hold_all(&locks, f)
    }

    /// Number of tables that have been locked at least once
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn hold_all<R>(locks: &[(Arc<RwLock<()>>, LockMode)], f: impl FnOnce() -> R) -> R {
    match locks.split_first() {
        None => f(),
        Some(((lock, LockMode::Read), rest)) => {
            let _guard = lock.read();
            hold_all(rest, f)
        }
        Some(((lock, LockMode::Write), rest)) => {
            let _guard = lock.write();
            hold_all(rest, f)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_duplicate_requests_lock_once() {
        let locks = TableLocks::new();
        // Would deadlock if `t` were locked twice
        let value = locks.with_locked(
            "db",
            &[("t", LockMode::Read), ("t", LockMode::Write)],
            || 7,
        );
        assert_eq!(value, 7);
        assert_eq!(locks.len(), 1);
    }

    #[test]
    fn test_databases_have_separate_locks() {
        let locks = TableLocks::new();
        locks.with_locked("a", &[("t", LockMode::Write)], || {
            locks.with_locked("b", &[("t", LockMode::Write)], || {});
        });
        assert_eq!(locks.len(), 2);
    }

    #[test]
    fn test_writers_are_exclusive() {
        let locks = Arc::new(TableLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let locks = locks.clone();
                let inside = inside.clone();
                let max_seen = max_seen.clone();
                // Alternate request order; sorted acquisition keeps this safe
                let tables = if i % 2 == 0 { ["a", "b"] } else { ["b", "a"] };
                thread::spawn(move || {
                    for _ in 0..50 {
                        locks.with_locked(
                            "db",
                            &[(tables[0], LockMode::Write), (tables[1], LockMode::Read)],
                            || {
                                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                                max_seen.fetch_max(now, Ordering::SeqCst);
                                inside.fetch_sub(1, Ordering::SeqCst);
                            },
                        );
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}
