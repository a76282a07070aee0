//! Layered header sets.
//!
//! Request headers are assembled from layers of increasing precedence (fixed
//! defaults, client overrides, computed headers). Names compare
//! case-insensitively, as they do on the wire: a later layer replaces an
//! earlier value for the same name whatever its spelling, and the later
//! spelling is kept. There are no multi-value headers.

use std::collections::BTreeMap;
use std::collections::btree_map;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const ACCEPT: &str = "Accept";
pub const AUTHORIZATION: &str = "authorization";
pub const APPLICATION_JSON: &str = "application/json";

/// Header name/value map with last-layer-wins merging.
///
/// Entries are keyed by the lowercased name and iterate in that order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderSet(BTreeMap<String, (String, String)>);

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Content-Type` and `Accept` set to `application/json`.
    pub fn json_defaults() -> Self {
        Self::from_iter([(CONTENT_TYPE, APPLICATION_JSON), (ACCEPT, APPLICATION_JSON)])
    }

    /// Sets `name` to `value`, replacing any previous value under any spelling
    /// of `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.0
            .insert(name.to_ascii_lowercase(), (name, value.into()));
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Yields each header with the spelling it was last inserted under.
    pub fn iter(&self) -> HeaderIter<'_> {
        HeaderIter(self.0.values())
    }

    /// Overlays `layer` onto `self`; names in `layer` win.
    #[must_use]
    pub fn layered(mut self, layer: &HeaderSet) -> Self {
        for (key, entry) in &layer.0 {
            self.0.insert(key.clone(), entry.clone());
        }
        self
    }

    /// Merges `layers` in order of increasing precedence.
    pub fn merge<'a>(layers: impl IntoIterator<Item = &'a HeaderSet>) -> Self {
        layers
            .into_iter()
            .fold(Self::new(), |merged, layer| merged.layered(layer))
    }
}

/// Iterator over the `(name, value)` pairs of a [`HeaderSet`].
#[derive(Clone, Debug)]
pub struct HeaderIter<'a>(btree_map::Values<'a, String, (String, String)>);

impl<'a> Iterator for HeaderIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.0
            .next()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for HeaderIter<'_> {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for HeaderSet {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a> IntoIterator for &'a HeaderSet {
    type Item = (&'a str, &'a str);
    type IntoIter = HeaderIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
