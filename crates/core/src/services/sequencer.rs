use std::collections::HashMap;
use std::hash::Hash;

/// A sequence number handed out when a fetch is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket<K> {
    pub kind: K,
    pub seq: u64,
}

/// What happened to a response when it came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// It was the newest fetch of its kind and its result is now in state.
    Applied,
    /// A newer fetch of the same kind was issued first; the result was dropped.
    Stale,
}

/// Per-kind monotonically increasing request numbers.
///
/// Issuing a new ticket of a kind makes every older ticket of that kind
/// stale. Requests are never cancelled; only their results are ignored.
#[derive(Debug)]
pub struct RequestSequencer<K> {
    next: u64,
    latest: HashMap<K, u64>,
}

impl<K> Default for RequestSequencer<K> {
    fn default() -> Self {
        Self {
            next: 0,
            latest: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> RequestSequencer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, kind: K) -> Ticket<K> {
        self.next += 1;
        self.latest.insert(kind, self.next);
        Ticket {
            kind,
            seq: self.next,
        }
    }

    /// Make any outstanding ticket of `kind` stale without starting a new fetch.
    pub fn invalidate(&mut self, kind: K) {
        self.issue(kind);
    }

    /// Whether a response for `ticket` may still be applied.
    pub fn is_current(&self, ticket: Ticket<K>) -> bool {
        self.latest.get(&ticket.kind) == Some(&ticket.seq)
    }

    pub fn latest(&self, kind: K) -> Option<u64> {
        self.latest.get(&kind).copied()
    }
}

/// Lifecycle of one fetch kind's derived value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState<T> {
    /// Nothing requested yet (or the value was cleared).
    Idle,
    /// Request `seq` is in flight; the previous value has been discarded.
    Pending(u64),
    /// Response to request `seq` is the current value.
    Applied(u64, T),
    /// Request `seq` failed; the derived value is cleared.
    Failed(u64),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Idle
    }
}

impl<T> FetchState<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            FetchState::Applied(_, value) => Some(value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, FetchState::Pending(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchState::Failed(_))
    }
}
