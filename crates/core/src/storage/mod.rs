//! Module of MemStorage, the key store owned by every ring member.

pub mod memory;

pub use crate::storage::memory::MemStorage;

/// Key value storage interface
pub trait KvStorageInterface<V> {
    /// Get an entry by `key`.
    fn get(&self, key: &str) -> Option<V>;

    /// Put `value` under `key`, returning the value it replaced.
    fn put(&self, key: &str, value: V) -> Option<V>;

    /// Get all entries.
    fn get_all(&self) -> Vec<(String, V)>;

    /// Remove an entry by `key`.
    fn remove(&self, key: &str) -> Option<V>;

    /// Remove and return every entry whose key matches `predicate`.
    fn take_where(&self, predicate: &dyn Fn(&str) -> bool) -> Vec<(String, V)>;

    /// Delete all values.
    fn clear(&self);

    /// Get the current storage usage.
    fn count(&self) -> usize;
}
