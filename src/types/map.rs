//! The map item type: an immutable, insertion-ordered association from
//! atomic keys to sequences.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use super::{AtomicValue, XdmValue};

#[derive(Debug, Clone)]
pub struct XdmMap<N> {
    entries: IndexMap<AtomicValue, XdmValue<N>>,
}

impl<N: Clone> XdmMap<N> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn from_entries(entries: Vec<(AtomicValue, XdmValue<N>)>) -> Self {
        let mut map = Self {
            entries: IndexMap::with_capacity(entries.len()),
        };
        for (key, value) in entries {
            map.entries.insert(key, value);
        }
        map
    }

    pub fn get(&self, key: &AtomicValue) -> Option<&XdmValue<N>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &AtomicValue) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns a new map with the entry added or replaced.
    pub fn put(&self, key: AtomicValue, value: XdmValue<N>) -> Self {
        let mut new_map = self.clone();
        new_map.entries.insert(key, value);
        new_map
    }

    pub fn keys(&self) -> impl Iterator<Item = &AtomicValue> {
        self.entries.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&AtomicValue, &XdmValue<N>)> {
        self.entries.iter()
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Clone> Default for XdmMap<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: PartialEq + Clone> PartialEq for XdmMap<N> {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.entries.get(k) == Some(v))
    }
}

impl<N: Eq + Clone> Eq for XdmMap<N> {}

impl<N: Hash + Clone> Hash for XdmMap<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries.len().hash(state);
        for (k, v) in &self.entries {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<N: fmt::Debug + Clone> fmt::Display for XdmMap<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map{{")?;
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}
