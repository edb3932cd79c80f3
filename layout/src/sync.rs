//! Remote save scheduling.
//!
//! Every layout change schedules a save, but only one request is ever in
//! flight. Bursts collapse: a newer body replaces the pending one and restarts
//! the debounce window. Completions carry the sequence number they were
//! issued with, so a late response for a superseded request is ignored.
//! Failed saves are logged and not retried; the next change saves again.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use tracing::{debug, warn};

use crate::persist::LayoutSnapshot;

/// A save the host should send now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub seq: u64,
    pub body: LayoutSnapshot,
}

#[derive(Debug, Clone)]
struct Pending {
    body: LayoutSnapshot,
    due_ms: u64,
}

/// Debounced, single-flight save queue.
#[derive(Debug, Clone)]
pub struct SaveQueue {
    debounce_ms: u64,
    last_seq: u64,
    pending: Option<Pending>,
    in_flight: Option<u64>,
}

impl SaveQueue {
    #[must_use]
    pub fn new(debounce_ms: u64) -> Self {
        Self { debounce_ms, last_seq: 0, pending: None, in_flight: None }
    }

    /// Queue `body`, replacing anything not yet sent.
    pub fn schedule(&mut self, body: LayoutSnapshot, now_ms: u64) {
        if self.pending.is_some() {
            debug!("pending save superseded");
        }
        self.pending = Some(Pending { body, due_ms: now_ms.saturating_add(self.debounce_ms) });
    }

    /// Hand out the pending save once its window has passed and nothing is
    /// in flight.
    pub fn poll(&mut self, now_ms: u64) -> Option<SaveRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        if self.pending.as_ref().is_none_or(|p| p.due_ms > now_ms) {
            return None;
        }
        let pending = self.pending.take()?;
        self.last_seq += 1;
        self.in_flight = Some(self.last_seq);
        debug!(seq = self.last_seq, "save issued");
        Some(SaveRequest { seq: self.last_seq, body: pending.body })
    }

    /// Skip the debounce window for whatever is pending.
    pub fn flush(&mut self, now_ms: u64) -> Option<SaveRequest> {
        if let Some(pending) = &mut self.pending {
            pending.due_ms = now_ms;
        }
        self.poll(now_ms)
    }

    /// Record the response for `seq`. Returns `false` for a stale or unknown
    /// sequence number.
    pub fn complete(&mut self, seq: u64, ok: bool) -> bool {
        if self.in_flight != Some(seq) {
            debug!(seq, in_flight = ?self.in_flight, "stale save completion ignored");
            return false;
        }
        self.in_flight = None;
        if ok {
            debug!(seq, "save acknowledged");
        } else {
            warn!(seq, "layout save failed; will save again on next change");
        }
        true
    }

    /// Discard the pending body, if any. The request in flight is untouched.
    pub fn clear_pending(&mut self) {
        if self.pending.take().is_some() {
            debug!("pending save discarded");
        }
    }

    /// Sequence number of the request awaiting a response.
    #[must_use]
    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Nothing pending and nothing in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_none() && self.in_flight.is_none()
    }
}
