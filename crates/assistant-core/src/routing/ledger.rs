use std::collections::HashMap;

use parking_lot::RwLock;

#[derive(Debug, Default)]
struct UserUsage {
    counts: HashMap<String, u64>,
    touched: u64,
}

#[derive(Debug, Default)]
struct LedgerState {
    users: HashMap<String, UserUsage>,
    tick: u64,
}

/// Per-user capability usage counts, used only to break ranking ties.
///
/// Counts only ever grow. Unbounded unless built with
/// [`UserPreferenceLedger::with_max_users`], in which case the user updated
/// least recently is dropped first.
#[derive(Debug, Default)]
pub struct UserPreferenceLedger {
    state: RwLock<LedgerState>,
    max_users: Option<usize>,
}

impl UserPreferenceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_users(max_users: usize) -> Self {
        Self {
            state: RwLock::default(),
            max_users: Some(max_users.max(1)),
        }
    }

    /// Increments the count and returns the new value.
    pub fn record(&self, user_id: &str, capability: &str) -> u64 {
        let mut state = self.state.write();
        state.tick += 1;
        let tick = state.tick;

        if let Some(max_users) = self.max_users {
            if !state.users.contains_key(user_id) && state.users.len() >= max_users {
                let stalest = state
                    .users
                    .iter()
                    .min_by_key(|(_, usage)| usage.touched)
                    .map(|(user, _)| user.clone());
                if let Some(stalest) = stalest {
                    state.users.remove(&stalest);
                    tracing::debug!(user_id = %stalest, "evicted user from preference ledger");
                }
            }
        }

        let usage = state.users.entry(user_id.to_string()).or_default();
        usage.touched = tick;
        let count = usage.counts.entry(capability.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, user_id: &str, capability: &str) -> u64 {
        self.state
            .read()
            .users
            .get(user_id)
            .and_then(|usage| usage.counts.get(capability))
            .copied()
            .unwrap_or(0)
    }

    pub fn user_count(&self) -> usize {
        self.state.read().users.len()
    }
}
