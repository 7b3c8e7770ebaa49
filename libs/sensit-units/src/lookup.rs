//! Exact-match classification tables
//!
//! Named presets (sensitivity levels, ...) are stored on the device as one or
//! more raw values. Decoding is an exact match against the canonical raw
//! values of every preset, never a range test: a raw value that belongs to no
//! preset has no name.

/// Static table of `(raw key, preset)` pairs
#[derive(Debug, Clone, Copy)]
pub struct ExactMatchTable<K: 'static, V: 'static> {
    entries: &'static [(K, V)],
}

impl<K, V> ExactMatchTable<K, V> {
    pub const fn new(entries: &'static [(K, V)]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [(K, V)] {
        self.entries
    }
}

impl<K, V> ExactMatchTable<K, V>
where
    K: PartialEq + Copy,
    V: PartialEq + Copy,
{
    /// Preset whose canonical key equals `key`
    pub fn classify(&self, key: K) -> Option<V> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, value)| *value)
    }

    /// Canonical key of `value`, if it is in the table
    pub fn key_of(&self, value: V) -> Option<K> {
        self.entries
            .iter()
            .find(|(_, candidate)| *candidate == value)
            .map(|(key, _)| *key)
    }
}
