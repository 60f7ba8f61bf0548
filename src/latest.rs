//! Last-write-wins slot for derived values.
//!
//! Every recomputation takes a [`Ticket`] before it starts. When it finishes it
//! may publish only if no newer ticket has been issued for the same slot, so a
//! slow, stale provider response can never overwrite a newer one. Readers get
//! the whole previous value until the new one is swapped in.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Sequence number handed out when a recomputation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// Outcome of [`Latest::publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    Applied,
    /// A newer recomputation was started; the value was dropped.
    Superseded,
}

#[derive(Debug)]
struct Versioned<T> {
    seq: u64,
    value: Arc<T>,
}

#[derive(Debug)]
pub struct Latest<T> {
    issued: AtomicU64,
    slot: RwLock<Versioned<T>>,
}

impl<T> Latest<T> {
    pub fn new(initial: T) -> Self {
        Self {
            issued: AtomicU64::new(0),
            slot: RwLock::new(Versioned {
                seq: 0,
                value: Arc::new(initial),
            }),
        }
    }

    /// Starts a recomputation, superseding any still in flight.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is still the newest issued.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Replaces the stored value if `ticket` is still the newest.
    pub fn publish(&self, ticket: Ticket, value: T) -> Publish {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        // Checked under the write lock so two finishers cannot interleave.
        if !self.is_current(ticket) || ticket.0 <= slot.seq {
            return Publish::Superseded;
        }
        *slot = Versioned {
            seq: ticket.0,
            value: Arc::new(value),
        };
        Publish::Applied
    }

    /// The most recently published value.
    pub fn current(&self) -> Arc<T> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&slot.value)
    }

    /// Sequence number of the most recently published value; 0 before any.
    pub fn published_seq(&self) -> u64 {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).seq
    }
}

impl<T: Default> Default for Latest<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
