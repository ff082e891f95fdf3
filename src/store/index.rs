//! Entry Index Module
//!
//! Keeps three views over one set of entries in step with each other:
//!
//! - exact-key lookup (`HashMap`)
//! - key-ordered traversal (`BTreeMap`, byte-wise order)
//! - expiration-ordered traversal (`BTreeSet` of `(expiration, slot)`)
//!
//! The arena owns the entries. The views only hold slot handles, plus the
//! entry's own key where ordering needs it.

use std::collections::{BTreeMap, BTreeSet, HashMap, TryReserveError};
use std::ops::Bound;

use bytes::Bytes;

use crate::store::arena::{SlotArena, SlotId};
use crate::store::{Entry, NEVER_EXPIRES};

// == Entry Index ==
#[derive(Debug, Default)]
pub struct EntryIndex {
    /// Canonical owner of entry data
    arena: SlotArena<Entry>,
    /// Exact-key view
    by_key: HashMap<Bytes, SlotId>,
    /// Key-ordered view
    by_key_sorted: BTreeMap<Bytes, SlotId>,
    /// Expiration-ordered view, permanent entries first
    by_expiration: BTreeSet<(u64, SlotId)>,
}

impl EntryIndex {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            by_key: HashMap::with_capacity(capacity),
            by_key_sorted: BTreeMap::new(),
            by_expiration: BTreeSet::new(),
        }
    }

    // == Lookup ==
    /// Returns the entry stored under `key`, expired or not.
    pub fn get(&self, key: &[u8]) -> Option<&Entry> {
        let slot = *self.by_key.get(key)?;
        self.arena.get(slot)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.by_key.contains_key(key)
    }

    // == Insert ==
    /// Adds `entry` to all three views.
    ///
    /// Keys are unique: if `entry.key` is already present nothing changes and
    /// `false` is returned.
    pub fn insert(&mut self, entry: Entry) -> bool {
        if self.by_key.contains_key(&entry.key) {
            return false;
        }
        self.insert_new(entry);
        true
    }

    // == Upsert ==
    /// Inserts a new entry under `key` or overwrites value and expiration of
    /// the existing one, with a single key lookup.
    ///
    /// Returns `true` if a new entry was inserted.
    pub fn upsert(&mut self, key: Bytes, value: Bytes, expiration: u64) -> bool {
        match self.by_key.get(&key) {
            Some(&slot) => {
                self.update_slot(slot, value, expiration);
                false
            }
            None => {
                self.insert_new(Entry::new(key, value, expiration));
                true
            }
        }
    }

    fn insert_new(&mut self, entry: Entry) {
        let key = entry.key.clone();
        let expiration = entry.expiration;
        let slot = self.arena.insert(entry);

        self.by_key.insert(key.clone(), slot);
        self.by_key_sorted.insert(key, slot);
        self.by_expiration.insert((expiration, slot));
    }

    /// Overwrites the entry in `slot`, repositioning it in the expiration view.
    fn update_slot(&mut self, slot: SlotId, value: Bytes, expiration: u64) {
        let Some(entry) = self.arena.get_mut(slot) else {
            return;
        };

        if entry.expiration != expiration {
            self.by_expiration.remove(&(entry.expiration, slot));
            self.by_expiration.insert((expiration, slot));
            entry.expiration = expiration;
        }
        entry.value = value;
    }

    // == Remove ==
    /// Removes the entry under `key` from all three views and returns it.
    pub fn remove(&mut self, key: &[u8]) -> Option<Entry> {
        let slot = self.by_key.remove(key)?;
        self.by_key_sorted.remove(key);

        let entry = self.arena.remove(slot)?;
        self.by_expiration.remove(&(entry.expiration, slot));
        Some(entry)
    }

    // == Range From ==
    /// Iterates entries in ascending key order, starting at the first key
    /// greater than or equal to `start`.
    pub fn range_from<'a>(&'a self, start: &'a [u8]) -> impl Iterator<Item = &'a Entry> + 'a {
        self.by_key_sorted
            .range::<[u8], _>((Bound::Included(start), Bound::Unbounded))
            .filter_map(move |(_, &slot)| self.arena.get(slot))
    }

    // == Iter Expiring ==
    /// Iterates entries that carry an expiration, earliest first.
    ///
    /// The permanent bucket is skipped entirely.
    pub fn iter_expiring(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.by_expiration
            .range((NEVER_EXPIRES + 1, SlotId::MIN)..)
            .filter_map(move |&(_, slot)| self.arena.get(slot))
    }

    // == Capacity ==
    /// Reserves room for `additional` new entries in the arena and the
    /// exact-key view.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.arena.try_reserve(additional)?;
        self.by_key.try_reserve(additional)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    // == Consistency Check ==
    /// Panics unless the three views and the arena describe the same entries.
    #[cfg(test)]
    pub(crate) fn check_consistency(&self) {
        let len = self.arena.len();
        assert_eq!(self.by_key.len(), len, "exact-key view size");
        assert_eq!(self.by_key_sorted.len(), len, "key-ordered view size");
        assert_eq!(self.by_expiration.len(), len, "expiration view size");

        for (slot, entry) in self.arena.iter() {
            assert_eq!(self.by_key.get(&entry.key), Some(&slot));
            assert_eq!(self.by_key_sorted.get(&entry.key), Some(&slot));
            assert!(self.by_expiration.contains(&(entry.expiration, slot)));
        }
    }
}
