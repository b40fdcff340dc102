//! Single-slot, latest-value-wins mailbox.
//!
//! `publish` overwrites the slot and never blocks on readers. Readers keep a
//! [`ReadCursor`] and block in [`Mailbox::recv_timeout`] until a write newer
//! than their cursor arrives or the timeout expires; a timeout is an expected
//! outcome and the only liveness signal in the pipeline.
//!
//! The value and the time it was written are separate facts: `peek` returns
//! the latest value however old, `last_write`/`is_fresh` say how old it is.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    seq: u64,
    written_at: Option<Instant>,
}

/// Per-reader position in a mailbox's write sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadCursor {
    seen: u64,
}

#[derive(Debug)]
pub struct Mailbox<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T: Copy> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> Mailbox<T> {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                value: None,
                seq: 0,
                written_at: None,
            }),
            ready: Condvar::new(),
        }
    }

    /// Overwrite the slot and wake blocked readers.
    pub fn publish(&self, value: T) {
        {
            let mut slot = self.slot.lock();
            slot.value = Some(value);
            slot.seq = slot.seq.wrapping_add(1);
            slot.written_at = Some(Instant::now());
        }
        self.ready.notify_all();
    }

    /// Wait up to `timeout` for a write newer than `cursor`.
    ///
    /// Returns the latest value (intermediate writes are skipped) and advances
    /// the cursor, or `None` on timeout. A zero timeout polls.
    pub fn recv_timeout(&self, cursor: &mut ReadCursor, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock();
        while slot.seq == cursor.seen {
            if self.ready.wait_until(&mut slot, deadline).timed_out() {
                break;
            }
        }
        if slot.seq == cursor.seen {
            return None;
        }
        cursor.seen = slot.seq;
        slot.value
    }

    /// Non-blocking variant of [`Mailbox::recv_timeout`].
    #[inline]
    pub fn try_recv(&self, cursor: &mut ReadCursor) -> Option<T> {
        let slot = self.slot.lock();
        if slot.seq == cursor.seen {
            return None;
        }
        cursor.seen = slot.seq;
        slot.value
    }

    /// Latest value regardless of age or cursor.
    #[inline]
    pub fn peek(&self) -> Option<T> {
        self.slot.lock().value
    }

    /// Time of the latest write.
    #[inline]
    pub fn last_write(&self) -> Option<Instant> {
        self.slot.lock().written_at
    }

    /// True if the latest write is no older than `within`.
    pub fn is_fresh(&self, within: Duration) -> bool {
        self.last_write()
            .is_some_and(|t| t.elapsed() <= within)
    }

    /// Number of writes so far.
    #[inline]
    pub fn seq(&self) -> u64 {
        self.slot.lock().seq
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
