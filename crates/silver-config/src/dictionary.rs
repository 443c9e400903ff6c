// crates/silver-config/src/dictionary.rs

//! A key/value map that serializes to XML as a list of `<item>` elements.
//!
//! `quick-xml` has no natural XML shape for a map with arbitrary keys, so
//! [`XmlDictionary`] defines one:
//!
//! ```xml
//! <FieldName>
//!   <item><key>a</key><value>1</value></item>
//!   <item><key>b</key><value>2</value></item>
//! </FieldName>
//! ```
//!
//! Keys and values use their own serde representation inside `<key>` and
//! `<value>`, so a struct value renders as nested elements.

use core::borrow::Borrow;
use core::fmt;
use core::hash::Hash;
use core::ops::Deref;

use indexmap::IndexMap;
use log::debug;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Element name used when a dictionary is serialized on its own.
const ROOT_NAME: &str = "dictionary";
const ITEM: &str = "item";

/// An insertion-ordered map with an XML-friendly serde representation.
///
/// Read access goes through [`Deref`] to the inner [`IndexMap`]; mutation
/// goes through the methods below.
///
/// Two dictionaries are equal when they hold the same keys mapped to equal
/// values, regardless of order.
#[derive(Clone)]
pub struct XmlDictionary<K, V> {
    map: IndexMap<K, V>,
}

impl<K, V> XmlDictionary<K, V> {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self {
            map: IndexMap::new(),
        }
    }

    /// Consumes the dictionary, returning the inner map.
    pub fn into_inner(self) -> IndexMap<K, V> {
        self.map
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<K: Hash + Eq, V> XmlDictionary<K, V> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: IndexMap::with_capacity(capacity),
        }
    }

    /// Inserts a pair, returning the previous value of `key` if any.
    ///
    /// Replacing an existing key keeps its original position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.map.insert(key, value)
    }

    /// Removes `key`, preserving the order of the remaining entries.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.shift_remove(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get_mut(key)
    }

    /// Returns the value for `key`, inserting `V::default()` first if absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.map.entry(key).or_default()
    }

    /// Returns `true` if every entry of `self` is present in `other` with an
    /// equal value. Entries that exist only in `other` are not checked.
    pub fn is_subset_of(&self, other: &Self) -> bool
    where
        V: PartialEq,
    {
        self.map
            .iter()
            .all(|(key, value)| other.map.get(key).is_some_and(|v| v == value))
    }
}

impl<K, V> Default for XmlDictionary<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Deref for XmlDictionary<K, V> {
    type Target = IndexMap<K, V>;

    fn deref(&self) -> &Self::Target {
        &self.map
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for XmlDictionary<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

impl<K: Hash + Eq, V: PartialEq> PartialEq for XmlDictionary<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.map.len() == other.map.len() && self.is_subset_of(other)
    }
}

impl<K: Hash + Eq, V: Eq> Eq for XmlDictionary<K, V> {}

impl<K, V> From<IndexMap<K, V>> for XmlDictionary<K, V> {
    fn from(map: IndexMap<K, V>) -> Self {
        Self { map }
    }
}

impl<K: Hash + Eq, V, const N: usize> From<[(K, V); N]> for XmlDictionary<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for XmlDictionary<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            map: IndexMap::from_iter(iter),
        }
    }
}

impl<K: Hash + Eq, V> Extend<(K, V)> for XmlDictionary<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.map.extend(iter);
    }
}

impl<K, V> IntoIterator for XmlDictionary<K, V> {
    type Item = (K, V);
    type IntoIter = indexmap::map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a XmlDictionary<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = indexmap::map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

// --- serde ---

/// Borrowed `<item>` used when writing.
#[derive(Serialize)]
struct EntryRef<'a, K, V> {
    key: &'a K,
    value: &'a V,
}

/// Writes the entries as a sequence, one `<item>` per entry.
struct Items<'a, K, V>(&'a IndexMap<K, V>);

impl<K: Serialize, V: Serialize> Serialize for Items<'_, K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|(key, value)| EntryRef { key, value }))
    }
}

impl<K: Serialize, V: Serialize> Serialize for XmlDictionary<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct(ROOT_NAME, 1)?;
        if !self.map.is_empty() {
            state.serialize_field(ITEM, &Items(&self.map))?;
        }
        state.end()
    }
}

/// Owned `<item>` used when reading.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// The dictionary element: zero or more `<item>` children and nothing else.
#[derive(Deserialize)]
#[serde(
    rename = "dictionary",
    deny_unknown_fields,
    bound(deserialize = "K: Deserialize<'de>, V: Deserialize<'de>")
)]
struct Repr<K, V> {
    #[serde(rename = "item", default)]
    items: Vec<Entry<K, V>>,
}

impl<'de, K, V> Deserialize<'de> for XmlDictionary<K, V>
where
    K: Deserialize<'de> + Hash + Eq,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = Repr::<K, V>::deserialize(deserializer)?;
        let mut map = IndexMap::with_capacity(repr.items.len());
        for Entry { key, value } in repr.items {
            // A repeated key keeps the last value, like any map insert.
            if map.insert(key, value).is_some() {
                debug!("Duplicate key in <{}> list, keeping the last value", ITEM);
            }
        }
        Ok(Self { map })
    }
}
