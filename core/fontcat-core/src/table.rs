//! In-memory record store shared by the catalog tables.

use std::collections::hash_map::{self, HashMap};
use std::hash::Hash;
use std::path::Path;

use crate::paths::{file_stem, file_suffix};
use crate::value::{FontKey, Location, Record, Value};

/// A mapping from composite keys to composite values.
#[derive(Debug, Clone)]
pub struct Table<K, V> {
    entries: HashMap<K, V>,
}

impl<K: Eq + Hash, V: PartialEq> PartialEq for Table<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq + Hash, V: Eq> Eq for Table<K, V> {}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> Table<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Bind `key` to `value`, returning the previous binding.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, K, V> {
        self.entries.iter()
    }

    pub fn keys(&self) -> hash_map::Keys<'_, K, V> {
        self.entries.keys()
    }
}

impl<K: Eq + Hash, T: PartialEq> Table<K, Vec<T>> {
    /// Add `item` to the sequence bound to `key` unless it is already there.
    ///
    /// Returns whether the sequence changed.
    pub fn insert_unique(&mut self, key: K, item: T) -> bool {
        let items = self.entries.entry(key).or_default();
        if items.contains(&item) {
            return false;
        }
        items.push(item);
        true
    }
}

impl<K: Record + Eq + Hash, V: Record> Table<K, V> {
    /// One `(key value)` record per entry, in arbitrary order.
    pub fn to_pairs(&self) -> Vec<Value> {
        self.entries
            .iter()
            .map(|(key, value)| Value::tuple([key.to_value(), value.to_value()]))
            .collect()
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for Table<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a Table<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = hash_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// `(family, style)` → every location where that face lives.
pub type FontTable = Table<FontKey, Vec<Location>>;

/// Style identifier → encoded feature tags.
pub type FeatureTable = Table<Value, Vec<Value>>;

/// First feature tag ("variant") → feature-table keys carrying it.
pub type VariantIndex = Table<Value, Vec<Value>>;

/// `(family, style)` → metric characteristic atoms.
pub type CharacteristicsTable = Table<FontKey, Vec<String>>;

/// Family name → raw substitution rules that mention it.
pub type SubstitutionTable = Table<String, Vec<Value>>;

/// File stem → suffixes seen for files sharing that stem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuffixIndex {
    table: Table<String, Vec<String>>,
}

impl SuffixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the suffix of `path` under its stem; suffix-less names are ignored.
    pub fn register(&mut self, path: &Path) {
        let (Some(stem), Some(suffix)) = (file_stem(path), file_suffix(path)) else {
            return;
        };
        self.table.insert_unique(stem, suffix);
    }

    pub fn contains(&self, stem: &str) -> bool {
        self.table.contains(&stem.to_string())
    }

    pub fn suffixes(&self, stem: &str) -> &[String] {
        self.table
            .get(&stem.to_string())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_unique_is_idempotent() {
        let key = FontKey::new("Foo", "Regular");
        let loc = Location::new("foo.ttf", 0, 1000);

        let mut once = FontTable::new();
        assert!(once.insert_unique(key.clone(), loc.clone()));

        let mut twice = FontTable::new();
        twice.insert_unique(key.clone(), loc.clone());
        assert!(!twice.insert_unique(key.clone(), loc));

        assert_eq!(once, twice);
        assert_eq!(twice.get(&key).map(Vec::len), Some(1));
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let a = FontKey::new("A", "Regular");
        let b = FontKey::new("B", "Regular");

        let mut left = FontTable::new();
        left.insert_unique(a.clone(), Location::new("a.ttf", 0, 1));
        left.insert_unique(b.clone(), Location::new("b.ttf", 0, 2));

        let mut right = FontTable::new();
        right.insert_unique(b.clone(), Location::new("b.ttf", 0, 2));
        right.insert_unique(a, Location::new("a.ttf", 0, 1));
        assert_eq!(left, right);

        right.insert(b, vec![Location::new("b.ttf", 0, 3)]);
        assert_ne!(left, right);
    }

    #[test]
    fn insert_rebinds_whole_value() {
        let mut table: Table<String, Vec<String>> = Table::new();
        table.insert_unique("a".into(), "x".into());
        let previous = table.insert("a".into(), vec!["y".into()]);
        assert_eq!(previous, Some(vec!["x".to_string()]));
        assert_eq!(table.get(&"a".to_string()), Some(&vec!["y".to_string()]));
    }

    #[test]
    fn to_pairs_emits_key_value_records() {
        let mut table = FontTable::new();
        table.insert_unique(FontKey::new("Foo", "Bold"), Location::new("f.ttf", 0, 7));
        let pairs = table.to_pairs();
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].is_tuple_of(2));
    }

    #[test]
    fn suffix_index_groups_by_stem() {
        let mut index = SuffixIndex::new();
        index.register(Path::new("/fonts/a/Foo.ttf"));
        index.register(Path::new("/fonts/b/Foo.otf"));
        index.register(Path::new("/fonts/b/Foo.ttf"));
        index.register(Path::new("/fonts/README"));

        assert!(index.contains("Foo"));
        assert_eq!(index.suffixes("Foo"), ["ttf", "otf"]);
        assert!(!index.contains("README"));
        assert!(index.suffixes("Bar").is_empty());
    }
}
