//! Per-hash build serialisation.
//!
//! Two threads asking for the same rule set at the same time must not both run
//! the toolchain over the same `{h}_scanner.*` files. Each hash gets its own
//! mutex for the duration of a build; builds of different hashes proceed in
//! parallel.

use std::sync::Arc;

use lexgen_rules::ContentHash;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub(crate) struct InFlight {
    slots: Mutex<FxHashMap<ContentHash, Arc<Mutex<()>>>>,
}

impl InFlight {
    /// Run `f` while holding the slot for `hash`.
    ///
    /// The slot is released and forgotten even if `f` panics.
    pub(crate) fn run<T>(&self, hash: ContentHash, f: impl FnOnce() -> T) -> T {
        let claim = Claim {
            in_flight: self,
            hash,
            slot: Arc::clone(self.slots.lock().entry(hash).or_default()),
        };
        let _held = claim.slot.lock();
        f()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().len()
    }
}

/// One caller's interest in a slot.
struct Claim<'a> {
    in_flight: &'a InFlight,
    hash: ContentHash,
    slot: Arc<Mutex<()>>,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        // Waiters clone the slot under the map lock, so a count of two (the map
        // and us) means nobody else wants it.
        let mut slots = self.in_flight.slots.lock();
        if Arc::strong_count(&self.slot) == 2 {
            slots.remove(&self.hash);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn same_hash_runs_one_at_a_time() {
        let in_flight = InFlight::default();
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let barrier = Barrier::new(4);

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    barrier.wait();
                    in_flight.run(ContentHash::new(7), || {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(5));
                        active.fetch_sub(1, Ordering::SeqCst);
                    });
                });
            }
        });

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(in_flight.len(), 0);
    }

    #[test]
    fn slot_is_dropped_after_use() {
        let in_flight = InFlight::default();
        let value = in_flight.run(ContentHash::new(1), || 42);
        assert_eq!(value, 42);
        assert_eq!(in_flight.len(), 0);
    }

    #[test]
    fn panicking_build_releases_its_slot() {
        let in_flight = InFlight::default();
        let hash = ContentHash::new(3);

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            in_flight.run::<()>(hash, || panic!("toolchain crashed"));
        }));
        assert!(outcome.is_err());
        assert_eq!(in_flight.len(), 0);

        assert_eq!(in_flight.run(hash, || 5), 5);
        assert_eq!(in_flight.len(), 0);
    }
}
