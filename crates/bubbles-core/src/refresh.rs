//! Last-fetch-wins sequencing for overlapping aggregation fetches.
//!
//! Every fetch takes a ticket when it starts. A result is applied only if no
//! fetch that started later has already been applied.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct FetchSequencer {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for a fetch that is starting now.
    pub fn begin(&self) -> FetchTicket {
        FetchTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Claim the right to apply a result. Returns false for a stale ticket,
    /// whose result must be discarded.
    pub fn try_apply(&self, ticket: FetchTicket) -> bool {
        let mut current = self.applied.load(Ordering::SeqCst);
        loop {
            if ticket.0 <= current {
                return false;
            }
            match self.applied.compare_exchange(
                current,
                ticket.0,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Generation of the newest applied result (0 before any).
    pub fn applied_generation(&self) -> u64 {
        self.applied.load(Ordering::SeqCst)
    }
}
