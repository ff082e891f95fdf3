//! Entry Module
//!
//! Defines the unit of storage: a key, a value and an absolute expiration.

use bytes::Bytes;

/// Expiration sentinel for entries that never expire.
pub const NEVER_EXPIRES: u64 = 0;

// == Entry ==
/// A single stored key-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The key, unique across the store
    pub key: Bytes,
    /// The stored value
    pub value: Bytes,
    /// Expiration (Unix seconds), `NEVER_EXPIRES` = permanent
    pub expiration: u64,
}

impl Entry {
    // == Constructor ==
    pub fn new(key: Bytes, value: Bytes, expiration: u64) -> Self {
        Self {
            key,
            value,
            expiration,
        }
    }

    // == Expiration For ==
    /// Computes the absolute expiration for a TTL measured from `now`.
    ///
    /// A TTL of 0 yields `NEVER_EXPIRES`.
    pub fn expiration_for(now: u64, ttl: u32) -> u64 {
        if ttl == 0 {
            NEVER_EXPIRES
        } else {
            now.saturating_add(u64::from(ttl))
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.expiration == NEVER_EXPIRES
    }

    // == Is Expired At ==
    /// Checks whether the entry is expired at `now`.
    ///
    /// Boundary condition: the entry is expired once `now` reaches the
    /// expiration, not only after it has passed.
    pub fn is_expired_at(&self, now: u64) -> bool {
        !self.is_permanent() && now >= self.expiration
    }

    /// Consumes the entry and returns its key-value pair.
    pub fn into_pair(self) -> (Bytes, Bytes) {
        (self.key, self.value)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn entry(expiration: u64) -> Entry {
        Entry::new(Bytes::from_static(b"k"), Bytes::from_static(b"v"), expiration)
    }

    #[test]
    fn test_expiration_for_zero_ttl_is_permanent() {
        assert_eq!(Entry::expiration_for(1_000, 0), NEVER_EXPIRES);
    }

    #[test]
    fn test_expiration_for_positive_ttl() {
        assert_eq!(Entry::expiration_for(1_000, 5), 1_005);
    }

    #[test]
    fn test_permanent_entry_never_expires() {
        let entry = entry(NEVER_EXPIRES);

        assert!(entry.is_permanent());
        assert!(!entry.is_expired_at(0));
        assert!(!entry.is_expired_at(u64::MAX));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = entry(100);

        assert!(!entry.is_expired_at(99));
        assert!(entry.is_expired_at(100), "Entry should be expired at boundary");
        assert!(entry.is_expired_at(101));
    }

    #[test]
    fn test_into_pair() {
        let (key, value) = entry(0).into_pair();
        assert_eq!(&key[..], b"k");
        assert_eq!(&value[..], b"v");
    }
}
