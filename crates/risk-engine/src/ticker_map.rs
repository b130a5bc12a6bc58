//! Ticker-keyed Map
//!
//! Insertion-ordered map used for both the price input and the risk dataset,
//! so results always come back in request order.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Map from ticker to `V` that remembers insertion order.
///
/// Re-inserting an existing ticker replaces the value in place, keeping its
/// original position. Entries live in a `Vec` with a hash index beside it.
#[derive(Clone, Debug)]
pub struct TickerMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for TickerMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PartialEq> PartialEq for TickerMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<V> TickerMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Insert a value, returning the previous one if the ticker was present
    pub fn insert(&mut self, ticker: impl Into<String>, value: V) -> Option<V> {
        let ticker = ticker.into();
        if let Some(&slot) = self.index.get(&ticker) {
            return Some(std::mem::replace(&mut self.entries[slot].1, value));
        }
        self.index.insert(ticker.clone(), self.entries.len());
        self.entries.push((ticker, value));
        None
    }

    pub fn get(&self, ticker: &str) -> Option<&V> {
        self.index.get(ticker).map(|&slot| &self.entries[slot].1)
    }

    pub fn contains_key(&self, ticker: &str) -> bool {
        self.index.contains_key(ticker)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tickers in insertion order
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v))
    }

    /// Raw entries, for callers that need slice access (e.g. parallel iteration)
    pub fn entries(&self) -> &[(String, V)] {
        &self.entries
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for TickerMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (ticker, value) in iter {
            map.insert(ticker, value);
        }
        map
    }
}

impl<V> IntoIterator for TickerMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Serialize> Serialize for TickerMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (ticker, value) in &self.entries {
            map.serialize_entry(ticker, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for TickerMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TickerMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for TickerMapVisitor<V> {
            type Value = TickerMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map keyed by ticker")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                // Cap the preallocation; the hint comes from the request body
                let capacity = access.size_hint().unwrap_or(0).min(4096);
                let mut map = TickerMap::with_capacity(capacity);
                while let Some((ticker, value)) = access.next_entry::<String, V>()? {
                    map.insert(ticker, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(TickerMapVisitor(PhantomData))
    }
}
