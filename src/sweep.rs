//! Expiration Sweep Helper
//!
//! The store never sweeps on its own. This helper lets a caller drain expired
//! entries in bounded batches at whatever cadence it chooses.

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::clock::Clock;
use crate::store::KvStorage;

// == Removed Entry ==
/// A key-value pair taken out of the store by a sweep, byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedEntry {
    /// The removed key
    pub key: Bytes,
    /// The value it held
    pub value: Bytes,
}

impl From<(Bytes, Bytes)> for RemovedEntry {
    fn from((key, value): (Bytes, Bytes)) -> Self {
        Self { key, value }
    }
}

// == Sweep Report ==
/// Outcome of one `drain_expired` call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    /// Entries removed, earliest expiration first
    pub removed: Vec<RemovedEntry>,
    /// Entries left in the store afterwards, expired or not
    pub remaining: usize,
}

impl SweepReport {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }
}

// == Drain Expired ==
/// Removes up to `limit` expired entries from `store`.
///
/// Stops early as soon as nothing expired is left.
pub fn drain_expired<C: Clock>(store: &mut KvStorage<C>, limit: usize) -> SweepReport {
    let removed: Vec<RemovedEntry> = std::iter::from_fn(|| store.remove_one_expired_entry())
        .take(limit)
        .map(RemovedEntry::from)
        .collect();

    let report = SweepReport {
        removed,
        remaining: store.len(),
    };

    debug!(
        "Expiration sweep: removed {} entries, {} remaining",
        report.removed_count(),
        report.remaining
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn store_with_expiring(count: u32) -> (KvStorage<ManualClock>, ManualClock) {
        let clock = ManualClock::from_secs(500);
        let mut store = KvStorage::with_clock(clock.clone());
        store.set("permanent", "value", 0);
        for i in 1..=count {
            store.set(format!("key{i}"), format!("value{i}"), i);
        }
        (store, clock)
    }

    #[test]
    fn test_drain_nothing_expired() {
        let (mut store, _) = store_with_expiring(3);

        let report = drain_expired(&mut store, 10);

        assert_eq!(report.removed_count(), 0);
        assert_eq!(report.remaining, 4);
    }

    #[test]
    fn test_drain_removes_only_expired() {
        let (mut store, clock) = store_with_expiring(3);
        clock.advance_secs(2);

        let report = drain_expired(&mut store, 10);

        let keys: Vec<&[u8]> = report.removed.iter().map(|e| &e.key[..]).collect();
        assert_eq!(keys, vec![&b"key1"[..], &b"key2"[..]]);
        assert_eq!(report.remaining, 2);
        assert!(store.get("key3").is_some());
        assert!(store.get("permanent").is_some());
    }

    #[test]
    fn test_drain_respects_limit() {
        let (mut store, clock) = store_with_expiring(5);
        clock.advance_secs(10);

        let first = drain_expired(&mut store, 2);
        let second = drain_expired(&mut store, 10);

        assert_eq!(first.removed_count(), 2);
        assert_eq!(second.removed_count(), 3);
        assert_eq!(second.remaining, 1);
    }

    #[test]
    fn test_drain_zero_limit() {
        let (mut store, clock) = store_with_expiring(2);
        clock.advance_secs(10);

        let report = drain_expired(&mut store, 0);

        assert_eq!(report.removed_count(), 0);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_sweep_report_serializes() {
        let report = SweepReport {
            removed: vec![RemovedEntry::from((Bytes::from("k"), Bytes::from("v")))],
            remaining: 1,
        };

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["remaining"], 1);
        assert_eq!(json["removed"][0]["key"], serde_json::json!([b'k']));
        assert_eq!(json["removed"][0]["value"], serde_json::json!([b'v']));
    }

    #[test]
    fn test_drain_keeps_non_utf8_bytes() {
        let clock = ManualClock::from_secs(500);
        let mut store = KvStorage::with_clock(clock.clone());
        store.set(vec![0xffu8, 0xfe], vec![0x80u8], 1);
        store.set(vec![0xfdu8], vec![0x81u8], 1);
        clock.advance_secs(2);

        let report = drain_expired(&mut store, 10);

        let mut removed: Vec<(Vec<u8>, Vec<u8>)> = report
            .removed
            .iter()
            .map(|e| (e.key.to_vec(), e.value.to_vec()))
            .collect();
        removed.sort();
        assert_eq!(
            removed,
            vec![(vec![0xfd], vec![0x81]), (vec![0xff, 0xfe], vec![0x80])]
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_non_utf8_bytes_serialize_exactly() {
        let report = SweepReport {
            removed: vec![RemovedEntry::from((
                Bytes::from_static(&[0xff, 0xfe]),
                Bytes::from_static(&[0x80]),
            ))],
            remaining: 0,
        };

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["removed"][0]["key"], serde_json::json!([255, 254]));
        assert_eq!(json["removed"][0]["value"], serde_json::json!([128]));
    }
}
