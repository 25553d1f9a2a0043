//! Process-wide subscription slot budget (§4.1 "Slot budget", §5
//! "Backpressure").
//!
//! A candidate that clears the gate pipeline is only subscribed to if
//! a slot is available; otherwise it stays `active` in the Watchlist
//! but unsubscribed, per the documented degradation. Slots return to
//! the pool only when the idle reaper evicts a subscribed market —
//! there is no other release path (§9 Open Questions).

use parking_lot::Mutex;
use sentinel_core::MarketKey;
use std::collections::HashSet;
use tokio::sync::mpsc;

/// A live subscription's stop handle: dropping (or sending to) this
/// tells the subscriber task to unsubscribe and exit.
pub struct StopHandle {
    tx: mpsc::Sender<()>,
}

impl StopHandle {
    pub fn new(tx: mpsc::Sender<()>) -> Self {
        Self { tx }
    }

    pub fn stop(&self) {
        let _ = self.tx.try_send(());
    }
}

struct Inner {
    used: HashSet<MarketKey>,
    capacity: usize,
}

/// Tracks which markets currently hold a subscription slot and
/// refuses to grant more than `capacity` at once.
pub struct SlotBudget {
    inner: Mutex<Inner>,
}

impl SlotBudget {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                used: HashSet::new(),
                capacity,
            }),
        }
    }

    /// Attempts to reserve a slot for `key`. Idempotent: a market that
    /// already holds a slot succeeds without consuming another.
    pub fn try_acquire(&self, key: MarketKey) -> bool {
        let mut inner = self.inner.lock();
        if inner.used.contains(&key) {
            return true;
        }
        if inner.used.len() >= inner.capacity {
            return false;
        }
        inner.used.insert(key);
        true
    }

    /// Releases `key`'s slot, called by the idle reaper when a
    /// subscribed market is evicted. No-op if the key didn't hold one.
    pub fn release(&self, key: &MarketKey) {
        self.inner.lock().used.remove(key);
    }

    pub fn in_use(&self) -> usize {
        self.inner.lock().used.len()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }
}
