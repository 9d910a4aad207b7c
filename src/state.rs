use std::time::Instant;

/// Per-request bookkeeping driving one failover sequence.
///
/// Owned exclusively by the driver loop for the lifetime of a single
/// [`execute`](crate::FailoverClient::execute) call and dropped when that
/// call resolves; it is never attached to the caller's request descriptor.
/// Invariant: `retry_count` never exceeds the resolved standby list length.
#[derive(Debug, Default)]
pub(crate) struct RetryState {
    /// Number of standby substitutions performed so far.
    pub retry_count: usize,
    /// Gateway targeted by the most recent substitution.
    pub last_try_gateway: Option<String>,
    /// Start of the most recent attempt, used to shrink the timeout budget.
    pub last_request_time: Option<Instant>,
}

impl RetryState {
    /// Stamps the start of the next attempt.
    pub fn mark_attempt(&mut self) {
        self.last_request_time = Some(Instant::now());
    }

    /// Milliseconds elapsed since the current attempt started.
    pub fn elapsed_ms(&self) -> Option<u64> {
        self.last_request_time
            .map(|started| started.elapsed().as_millis() as u64)
    }
}

/// Shrinks a per-attempt timeout by the time already spent, so the retry
/// chain does not exceed the caller's original budget. Floors at 1 because
/// the transport treats a timeout of zero as "no timeout".
pub(crate) fn shrink_timeout(timeout_ms: u64, elapsed_ms: u64) -> u64 {
    timeout_ms.saturating_sub(elapsed_ms).max(1)
}

#[cfg(test)]
mod tests {
    use super::{shrink_timeout, RetryState};

    #[test]
    fn shrink_subtracts_elapsed_time() {
        assert_eq!(shrink_timeout(1000, 400), 600);
    }

    #[test]
    fn shrink_floors_at_one() {
        assert_eq!(shrink_timeout(1000, 1000), 1);
        assert_eq!(shrink_timeout(1000, 2500), 1);
    }

    #[test]
    fn mark_attempt_records_a_timestamp() {
        let mut state = RetryState::default();
        assert!(state.elapsed_ms().is_none());
        state.mark_attempt();
        assert!(state.elapsed_ms().is_some());
    }
}
