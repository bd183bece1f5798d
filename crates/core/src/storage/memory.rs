use dashmap::DashMap;

use crate::storage::KvStorageInterface;

#[derive(Debug, Default)]
pub struct MemStorage<V>
where V: Clone
{
    table: DashMap<String, V>,
}

impl<V> MemStorage<V>
where V: Clone
{
    pub fn new() -> Self {
        Self {
            table: DashMap::default(),
        }
    }
}

impl<V> KvStorageInterface<V> for MemStorage<V>
where V: Clone + Send + Sync
{
    fn get(&self, key: &str) -> Option<V> {
        self.table.get(key).map(|v| v.value().clone())
    }

    fn put(&self, key: &str, value: V) -> Option<V> {
        self.table.insert(key.to_string(), value)
    }

    fn get_all(&self) -> Vec<(String, V)> {
        let mut items: Vec<(String, V)> = self
            .table
            .iter()
            .map(|kv| (kv.key().clone(), kv.value().clone()))
            .collect();
        items.sort_by(|a, b| a.0.cmp(&b.0));
        items
    }

    fn remove(&self, key: &str) -> Option<V> {
        self.table.remove(key).map(|(_, v)| v)
    }

    fn take_where(&self, predicate: &dyn Fn(&str) -> bool) -> Vec<(String, V)> {
        let keys: Vec<String> = self
            .table
            .iter()
            .filter(|kv| predicate(kv.key()))
            .map(|kv| kv.key().clone())
            .collect();
        keys.into_iter()
            .filter_map(|k| self.table.remove(&k))
            .collect()
    }

    fn clear(&self) {
        self.table.clear()
    }

    fn count(&self) -> usize {
        self.table.len()
    }
}
