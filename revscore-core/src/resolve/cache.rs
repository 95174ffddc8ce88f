//! Per-request value cache.
//!
//! A cache maps node ids to resolved values. The caller may seed it before a
//! solve, either with decoded values or with raw strings; raw strings are
//! decoded through the node's declared type the first time the resolver
//! touches them. The resolver adds every value it computes, so a cache can be
//! carried into a later request that shares upstream data.

use std::collections::HashMap;

use crate::graph::NodeId;
use crate::value::{DecodeError, Value, ValueType};

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Resolved(Value),
    /// Seeded as text, not yet decoded.
    Encoded(String),
}

/// Node id to value mapping for one resolution request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cache {
    entries: HashMap<NodeId, Entry>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value. An existing entry for the node is replaced.
    pub fn seed(&mut self, id: NodeId, value: impl Into<Value>) -> &mut Self {
        self.entries.insert(id, Entry::Resolved(value.into()));
        self
    }

    /// Seed a string-encoded value, decoded on first use.
    pub fn seed_encoded(&mut self, id: NodeId, raw: impl Into<String>) -> &mut Self {
        self.entries.insert(id, Entry::Encoded(raw.into()));
        self
    }

    /// Builder-style [`Cache::seed`].
    pub fn with(mut self, id: NodeId, value: impl Into<Value>) -> Self {
        self.seed(id, value);
        self
    }

    /// Get a resolved value. Entries still awaiting decoding are not returned.
    pub fn get(&self, id: NodeId) -> Option<&Value> {
        match self.entries.get(&id) {
            Some(Entry::Resolved(value)) => Some(value),
            _ => None,
        }
    }

    /// Whether the node has an entry, decoded or not.
    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Value> {
        match self.entries.remove(&id) {
            Some(Entry::Resolved(value)) => Some(value),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over resolved entries.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Value)> {
        self.entries.iter().filter_map(|(id, entry)| match entry {
            Entry::Resolved(value) => Some((*id, value)),
            Entry::Encoded(_) => None,
        })
    }

    /// Make sure an entry for `id` is decoded.
    ///
    /// Returns whether the node has a value at all.
    pub(crate) fn materialize(
        &mut self,
        id: NodeId,
        returns: ValueType,
    ) -> Result<bool, DecodeError> {
        let Some(entry) = self.entries.get_mut(&id) else {
            return Ok(false);
        };
        if let Entry::Encoded(raw) = entry {
            let value = returns.decode(raw)?;
            *entry = Entry::Resolved(value);
        }
        Ok(true)
    }

    pub(crate) fn store(&mut self, id: NodeId, value: Value) {
        self.entries.insert(id, Entry::Resolved(value));
    }
}

impl<V: Into<Value>> FromIterator<(NodeId, V)> for Cache {
    fn from_iter<I: IntoIterator<Item = (NodeId, V)>>(iter: I) -> Self {
        let mut cache = Cache::new();
        cache.extend(iter);
        cache
    }
}

impl<V: Into<Value>> Extend<(NodeId, V)> for Cache {
    fn extend<I: IntoIterator<Item = (NodeId, V)>>(&mut self, iter: I) {
        for (id, value) in iter {
            self.seed(id, value);
        }
    }
}
