use tokio::sync::Semaphore;

use crate::error::{Result, SweepError};

/// Descriptors held back from the sweep for stdio, logging and the like.
pub const DEFAULT_FD_MARGIN: u64 = 10;

/// Maximum number of files the current process may open (the soft limit,
/// i.e. what `ulimit -n` reports).
#[cfg(unix)]
pub fn current_fd_limit() -> Result<u64> {
    let (soft, _hard) =
        rlimit::getrlimit(rlimit::Resource::NOFILE).map_err(SweepError::Environment)?;
    Ok(soft)
}

#[cfg(windows)]
pub fn current_fd_limit() -> Result<u64> {
    let max = rlimit::getmaxstdio();
    Ok(u64::from(max))
}

/// Turn a descriptor limit into the number of host probes allowed in flight.
///
/// Each in-flight host holds at most one socket, so the budget is the limit
/// minus `margin`, optionally capped by the caller, and never below 1.
pub fn concurrency_budget(fd_limit: u64, margin: u64, cap: Option<usize>) -> usize {
    let available = fd_limit.saturating_sub(margin).max(1);
    let budget = usize::try_from(available)
        .unwrap_or(usize::MAX)
        .min(Semaphore::MAX_PERMITS);
    match cap {
        Some(c) => budget.min(c.max(1)),
        None => budget,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_reserves_margin() {
        assert_eq!(concurrency_budget(1024, 10, None), 1014);
    }

    #[test]
    fn budget_never_drops_to_zero() {
        assert_eq!(concurrency_budget(5, 10, None), 1);
        assert_eq!(concurrency_budget(1024, 10, Some(0)), 1);
    }

    #[test]
    fn caller_cap_only_lowers_budget() {
        assert_eq!(concurrency_budget(1024, 10, Some(64)), 64);
        assert_eq!(concurrency_budget(100, 10, Some(5_000)), 90);
    }

    #[test]
    fn unlimited_descriptors_fit_semaphore() {
        assert_eq!(concurrency_budget(u64::MAX, 10, None), Semaphore::MAX_PERMITS);
    }

    #[cfg(unix)]
    #[test]
    fn reads_process_limit() {
        let limit = current_fd_limit().unwrap();
        assert!(limit > 0);
    }
}
