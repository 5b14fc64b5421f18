//! Latest-wins bookkeeping for overlapping requests.
//!
//! Every request takes a [`Ticket`] before it is sent. When its response
//! arrives it is applied only if no newer ticket has been applied already;
//! older responses are discarded on arrival. In-flight requests are never
//! cancelled.

use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicU64, Ordering},
};

/// Monotonically increasing request number, starting at 1.
pub type Ticket = u64;

struct Applied<T> {
    ticket: Ticket,
    value: Option<T>,
}

pub struct Sequenced<T> {
    issued: AtomicU64,
    applied: Mutex<Applied<T>>,
}

impl<T: Clone> Default for Sequenced<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Sequenced<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            applied: Mutex::new(Applied {
                ticket: 0,
                value: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Applied<T>> {
        self.applied.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Take the next ticket.
    pub fn issue(&self) -> Ticket {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Store `value` if `ticket` is newer than the last applied one.
    ///
    /// Returns `false` when the value was discarded as stale.
    pub fn apply(
        &self,
        ticket: Ticket,
        value: T,
    ) -> bool {
        let mut applied = self.lock();
        if ticket <= applied.ticket {
            return false;
        }
        applied.ticket = ticket;
        applied.value = Some(value);
        true
    }

    /// The value of the newest applied ticket.
    pub fn current(&self) -> Option<T> {
        self.lock().value.clone()
    }

    /// Ticket of the value returned by [`Sequenced::current`], 0 if none.
    pub fn last_applied(&self) -> Ticket {
        self.lock().ticket
    }
}

#[cfg(test)]
mod tests {
    use super::Sequenced;

    #[test]
    fn test_tickets_increase() {
        let seq: Sequenced<&str> = Sequenced::new();
        assert_eq!(seq.issue(), 1);
        assert_eq!(seq.issue(), 2);
        assert_eq!(seq.issue(), 3);
    }

    #[test]
    fn test_out_of_order_arrival_keeps_newest() {
        let seq = Sequenced::new();
        let t1 = seq.issue();
        let t2 = seq.issue();
        let t3 = seq.issue();

        assert!(seq.apply(t1, "one"));
        assert!(seq.apply(t3, "three"));
        assert!(!seq.apply(t2, "two"));

        assert_eq!(seq.current(), Some("three"));
        assert_eq!(seq.last_applied(), t3);
    }

    #[test]
    fn test_same_ticket_applies_once() {
        let seq = Sequenced::new();
        let t = seq.issue();
        assert!(seq.apply(t, 1));
        assert!(!seq.apply(t, 2));
        assert_eq!(seq.current(), Some(1));
    }

    #[test]
    fn test_nothing_applied() {
        let seq: Sequenced<u8> = Sequenced::new();
        seq.issue();
        assert_eq!(seq.current(), None);
        assert_eq!(seq.last_applied(), 0);
    }
}
