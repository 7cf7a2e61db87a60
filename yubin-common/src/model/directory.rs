//! Directory shard: all groups whose zip codes share a 3-digit prefix

use super::AddressGroup;
use crate::kana::KanaDictionary;
use std::collections::BTreeMap;

/// One shard of the postal directory
///
/// `keys` keeps first-seen order for iteration; `groups` is keyed by zip code.
/// The kana dictionary is derived from `groups` and rebuilt after every
/// mutation (see `merge.rs`).
#[derive(Debug, Clone, Default)]
pub struct Directory {
    prefix: String,
    pub(crate) keys: Vec<String>,
    pub(crate) groups: BTreeMap<String, AddressGroup>,
    pub(crate) dictionary: KanaDictionary,
}

impl Directory {
    /// Create an empty shard for `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Zip codes in iteration order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn get(&self, zip_code: &str) -> Option<&AddressGroup> {
        self.groups.get(zip_code)
    }

    /// zip code → group, ordered by zip code
    pub fn groups(&self) -> &BTreeMap<String, AddressGroup> {
        &self.groups
    }

    /// Groups in key-list order
    pub fn iter(&self) -> impl Iterator<Item = &AddressGroup> {
        self.keys.iter().filter_map(|key| self.groups.get(key))
    }

    /// Kana dictionary derived from the current contents
    pub fn dictionary(&self) -> &KanaDictionary {
        &self.dictionary
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of addresses across all groups
    pub fn address_count(&self) -> usize {
        self.groups.values().map(|g| g.addresses.len()).sum()
    }
}

impl PartialEq for Directory {
    /// Shards are equal when they hold the same groups; key order and the
    /// derived dictionary do not matter
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix && self.groups == other.groups
    }
}
