//! Staleness guard for in-flight fetches.
//!
//! At most one outstanding fetch per logical query key is meaningful: a newer fetch for the
//! same key supersedes interest in the outcome of an older one still in flight. Callers take
//! a [`Ticket`] before awaiting the store and commit the response only if the ticket is still
//! current, so a slow, stale response can never overwrite newer state.

use std::sync::atomic::{AtomicU64, Ordering};

/// The logical queries whose responses are cached and therefore need staleness protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKey {
    Expenses,
    MonthTotal,
    CategoryTotals,
}

impl QueryKey {
    fn index(self) -> usize {
        match self {
            QueryKey::Expenses => 0,
            QueryKey::MonthTotal => 1,
            QueryKey::CategoryTotals => 2,
        }
    }
}

/// Proof that a fetch was the most recent one issued for its key at the time it began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    key: QueryKey,
    generation: u64,
}

/// Per-key generation counters.
#[derive(Debug, Default)]
pub struct Generations {
    counters: [AtomicU64; 3],
}

impl Generations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of a new fetch for `key`, superseding any fetch still in flight.
    pub fn begin(&self, key: QueryKey) -> Ticket {
        let generation = self.counters[key.index()].fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { key, generation }
    }

    /// True when no newer fetch has been issued for the ticket's key.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.counters[ticket.key.index()].load(Ordering::SeqCst) == ticket.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_is_current_until_superseded() {
        let generations = Generations::new();
        let first = generations.begin(QueryKey::Expenses);
        assert!(generations.is_current(first));

        let second = generations.begin(QueryKey::Expenses);
        assert!(!generations.is_current(first));
        assert!(generations.is_current(second));
    }

    #[test]
    fn test_keys_are_independent() {
        let generations = Generations::new();
        let expenses = generations.begin(QueryKey::Expenses);
        let month = generations.begin(QueryKey::MonthTotal);

        // A new expense fetch must not invalidate an aggregate fetch.
        let _ = generations.begin(QueryKey::Expenses);
        assert!(!generations.is_current(expenses));
        assert!(generations.is_current(month));
    }
}
