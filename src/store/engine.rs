//! Storage Engine Module
//!
//! Main store combining the entry index with an injected clock. Expiration is
//! lazy: reads hide expired entries but never delete them. Only `remove` and
//! `remove_one_expired_entry` take entries out.

use bytes::Bytes;
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::store::{Entry, EntryIndex};

// == Kv Storage ==
/// In-memory key-value store with per-entry TTL and sorted range scans.
///
/// Single-threaded: callers sharing a store across threads must serialize
/// every call themselves (e.g. behind a `Mutex`).
#[derive(Debug)]
pub struct KvStorage<C: Clock = SystemClock> {
    /// The three synchronized views over the entry set
    index: EntryIndex,
    /// Source of the current time
    clock: C,
}

impl<C: Clock> KvStorage<C> {
    // == Constructor ==
    /// Creates a store pre-filled with `(key, value, ttl)` triples.
    ///
    /// TTLs count from the clock reading at construction; a TTL of 0 never
    /// expires. When a key repeats, the first occurrence wins and later ones
    /// are ignored.
    pub fn new<I, K, V>(initial: I, clock: C) -> Self
    where
        I: IntoIterator<Item = (K, V, u32)>,
        K: Into<Bytes>,
        V: Into<Bytes>,
    {
        let initial = initial.into_iter();
        let mut index = EntryIndex::with_capacity(initial.size_hint().0);
        let now = clock.now_secs();

        for (key, value, ttl) in initial {
            let key: Bytes = key.into();
            let entry = Entry::new(key.clone(), value.into(), Entry::expiration_for(now, ttl));
            if !index.insert(entry) {
                debug!("Ignoring duplicate initial key {:?}", key);
            }
        }

        debug!("Storage initialized with {} entries", index.len());
        Self { index, clock }
    }

    /// Creates an empty store.
    pub fn with_clock(clock: C) -> Self {
        Self {
            index: EntryIndex::new(),
            clock,
        }
    }

    // == Set ==
    /// Stores `value` under `key`.
    ///
    /// An existing entry, expired or not, is overwritten in place and its TTL
    /// is reset. A TTL of 0 makes the entry permanent.
    pub fn set(&mut self, key: impl Into<Bytes>, value: impl Into<Bytes>, ttl: u32) {
        let key = key.into();
        let value = value.into();
        let expiration = Entry::expiration_for(self.clock.now_secs(), ttl);

        trace!("set key={:?} ttl={}s", key, ttl);

        self.index.upsert(key, value, expiration);
    }

    // == Try Set ==
    /// Like [`set`](Self::set), but reports an allocation failure for a new
    /// key instead of aborting.
    pub fn try_set(
        &mut self,
        key: impl Into<Bytes>,
        value: impl Into<Bytes>,
        ttl: u32,
    ) -> Result<()> {
        let key = key.into();
        if !self.index.contains_key(&key) {
            self.try_reserve(1)?;
        }
        self.set(key, value, ttl);
        Ok(())
    }

    // == Try Reserve ==
    /// Reserves room for `additional` new entries.
    ///
    /// On failure the store is left untouched.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.index.try_reserve(additional)?;
        Ok(())
    }

    // == Get ==
    /// Returns the value for `key` if present and not expired.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<Bytes> {
        let now = self.clock.now_secs();
        self.index
            .get(key.as_ref())
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone())
    }

    // == Remove ==
    /// Deletes the entry for `key`, even if it has expired.
    ///
    /// Returns whether an entry was deleted.
    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> bool {
        match self.index.remove(key.as_ref()) {
            Some(entry) => {
                trace!("remove key={:?}", entry.key);
                true
            }
            None => false,
        }
    }

    // == Get Many Sorted ==
    /// Returns up to `count` live pairs in ascending key order, starting at the
    /// first key greater than or equal to `start`.
    ///
    /// Expired entries are skipped but left in place.
    pub fn get_many_sorted(&self, start: impl AsRef<[u8]>, count: u32) -> Vec<(Bytes, Bytes)> {
        let now = self.clock.now_secs();
        let limit = usize::try_from(count).unwrap_or(usize::MAX);

        self.index
            .range_from(start.as_ref())
            .filter(|entry| !entry.is_expired_at(now))
            .take(limit)
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }

    // == Remove One Expired Entry ==
    /// Deletes one expired entry and returns its pair, or `None` if nothing
    /// has expired.
    pub fn remove_one_expired_entry(&mut self) -> Option<(Bytes, Bytes)> {
        let now = self.clock.now_secs();

        // Candidates ascend by expiration: if the earliest is still live, so
        // is every one after it.
        let key = match self.index.iter_expiring().next() {
            Some(entry) if entry.is_expired_at(now) => entry.key.clone(),
            _ => return None,
        };

        let entry = self.index.remove(&key)?;
        debug!(
            "remove expired key={:?} (expired at {}, now {})",
            entry.key, entry.expiration, now
        );
        Some(entry.into_pair())
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet
    /// removed.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the clock this store reads time from.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> &EntryIndex {
        &self.index
    }
}

impl Default for KvStorage<SystemClock> {
    fn default() -> Self {
        Self::with_clock(SystemClock)
    }
}
