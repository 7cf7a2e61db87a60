//! Merging address groups into directory shards
//!
//! Merges take values and return values: callers always hold the latest
//! shard. The kana dictionary travels with the shard and is rebuilt after
//! every mutation.

use crate::diagnostics::Diagnostics;
use crate::kana::KanaDictionary;
use crate::model::{shard_prefix, Address, AddressGroup, Directory};
use std::collections::BTreeMap;
use tracing::{debug, warn};

impl AddressGroup {
    /// Whether `other` may be merged into this group
    pub fn can_merge(&self, other: &AddressGroup) -> bool {
        self.prefix() == other.prefix() && self.prefecture == other.prefecture
    }

    /// Fold `incoming` into this group
    ///
    /// **Algorithm:**
    /// 1. Guard: differing shard prefix or prefecture → return `self` unchanged
    /// 2. Incoming address already present by identity: its kana fills the
    ///    existing address's empty kana fields, nothing else changes
    /// 3. A new address without town kana borrows city/town kana from an
    ///    existing sibling with the same (city, town)
    /// 4. Replenish remaining empty kana from `dict`, then append
    ///
    /// Populated fields of existing addresses are never overwritten.
    pub fn merge(mut self, incoming: AddressGroup, dict: &KanaDictionary) -> AddressGroup {
        if !self.can_merge(&incoming) {
            warn!(
                zip_code = %self.zip_code,
                incoming_zip_code = %incoming.zip_code,
                prefecture = %self.prefecture,
                incoming_prefecture = %incoming.prefecture,
                "Merge skipped: prefix or prefecture mismatch"
            );
            return self;
        }

        for mut address in incoming.addresses {
            if let Some(existing) = self.addresses.iter_mut().find(|a| a.same_place(&address)) {
                fill_missing_kana(existing, address);
                continue;
            }
            if address.town_kana.is_empty() {
                if let Some(sibling) = self
                    .addresses
                    .iter()
                    .find(|a| a.city == address.city && a.town == address.town)
                {
                    address.city_kana = sibling.city_kana.clone();
                    address.town_kana = sibling.town_kana.clone();
                }
            }
            self.addresses.push(dict.replenish(address));
        }
        self
    }
}

/// Copy each kana reading of `incoming` into the matching empty field of `existing`
fn fill_missing_kana(existing: &mut Address, incoming: Address) {
    for (target, source) in [
        (&mut existing.city_kana, incoming.city_kana),
        (&mut existing.town_kana, incoming.town_kana),
        (&mut existing.street_kana, incoming.street_kana),
        (&mut existing.address_kana, incoming.address_kana),
        (&mut existing.office_kana, incoming.office_kana),
    ] {
        if target.is_empty() && !source.is_empty() {
            *target = source;
        }
    }
}

impl Directory {
    /// Merge one group into the shard
    ///
    /// New zip codes are replenished and inserted (key appended in first-seen
    /// order); existing ones go through [`AddressGroup::merge`]. Merging the
    /// same group twice changes nothing.
    pub fn merge(self, group: AddressGroup) -> Directory {
        let mut diag = Diagnostics::default();
        self.merge_counted(group, &mut diag)
    }

    /// [`Directory::merge`], recording duplicate keys and guard violations
    pub fn merge_counted(mut self, group: AddressGroup, diag: &mut Diagnostics) -> Directory {
        if shard_prefix(&group.zip_code) != self.prefix() {
            warn!(
                shard = %self.prefix(),
                zip_code = %group.zip_code,
                "Group does not belong to this shard"
            );
            diag.guard_violations += 1;
            return self;
        }

        let zip_code = group.zip_code.clone();
        let merged = match self.groups.remove(&zip_code) {
            Some(existing) => {
                debug!(zip_code = %zip_code, "Duplicate key, merging addresses");
                diag.duplicate_keys += 1;
                if !existing.can_merge(&group) {
                    diag.guard_violations += 1;
                }
                existing.merge(group, &self.dictionary)
            }
            None => self.dictionary.replenish_group(group),
        };
        self.groups.insert(zip_code.clone(), merged);
        if !self.keys.contains(&zip_code) {
            self.keys.push(zip_code);
        }
        self.rebuild_dictionary();
        self
    }

    /// Merge a batch of groups in order
    pub fn merge_all(self, groups: impl IntoIterator<Item = AddressGroup>, diag: &mut Diagnostics) -> Directory {
        groups
            .into_iter()
            .fold(self, |dir, group| dir.merge_counted(group, diag))
    }

    /// Combine persisted shard contents with groups staged in memory
    ///
    /// Persisted entries are the merge target, staged entries the incoming
    /// side. Keys come out sorted by zip code. Staged groups refused by the
    /// merge guard are counted in `diag`.
    pub fn from_persisted(
        prefix: impl Into<String>,
        persisted: BTreeMap<String, AddressGroup>,
        staged: &Directory,
        diag: &mut Diagnostics,
    ) -> Directory {
        let mut dir = Directory::new(prefix);
        dir.groups = persisted;
        dir.rebuild_dictionary();

        for group in staged.iter() {
            let merged = match dir.groups.remove(&group.zip_code) {
                Some(existing) => {
                    if !existing.can_merge(group) {
                        diag.guard_violations += 1;
                    }
                    existing.merge(group.clone(), &dir.dictionary)
                }
                None => dir.dictionary.replenish_group(group.clone()),
            };
            dir.groups.insert(group.zip_code.clone(), merged);
        }

        dir.keys = dir.groups.keys().cloned().collect();
        dir.rebuild_dictionary();
        dir
    }

    /// Shard whose contents are exactly `groups`, keys sorted
    pub fn from_groups(prefix: impl Into<String>, groups: BTreeMap<String, AddressGroup>) -> Directory {
        Directory::from_persisted(prefix, groups, &Directory::default(), &mut Diagnostics::default())
    }

    fn rebuild_dictionary(&mut self) {
        // keys may still be empty while a persisted shard is being assembled
        self.dictionary = if self.keys.len() == self.groups.len() {
            KanaDictionary::from_groups(self.iter())
        } else {
            KanaDictionary::from_groups(self.groups.values())
        };
    }
}
