use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::probe::HostProbe;
use crate::sink::FoundSink;
use crate::types::SweepSummary;

/// Probe every host in `hosts`, at most `budget` at a time.
///
/// - Each host takes one `Semaphore` permit before its task is spawned; the
///   dispatch loop waits while the budget is exhausted.
/// - The permit lives in the task and is dropped when the probe finishes,
///   found or not.
/// - Hits are passed to `sink` from inside the task as soon as they arrive.
/// - A panicking probe is logged and counted as a miss; the sweep carries on.
///
/// Returns once every dispatched task has finished. Cancelling `cancel` stops
/// dispatch and interrupts probes still in flight.
pub async fn sweep<I>(
    hosts: I,
    budget: usize,
    prober: Arc<dyn HostProbe>,
    sink: Arc<dyn FoundSink>,
    cancel: CancellationToken,
) -> SweepSummary
where
    I: IntoIterator<Item = IpAddr>,
{
    let sem = Arc::new(Semaphore::new(budget.clamp(1, Semaphore::MAX_PERMITS)));
    let mut set = JoinSet::new();
    let mut summary = SweepSummary::default();

    for ip in hosts {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = sem.clone().acquire_owned() => match permit {
                Ok(p) => p,
                Err(_) => break,
            },
        };

        // Reap finished tasks so completed results don't pile up on long sweeps.
        while let Some(res) = set.try_join_next() {
            tally(&mut summary, res);
        }

        let prober = prober.clone();
        let sink = sink.clone();
        let cancel = cancel.clone();
        set.spawn(async move {
            let _permit = permit; // released when the task ends
            match prober.probe(ip, &cancel).await {
                Some(found) => {
                    sink.found(found);
                    true
                }
                None => false,
            }
        });
    }

    while let Some(res) = set.join_next().await {
        tally(&mut summary, res);
    }
    summary.cancelled = cancel.is_cancelled();
    summary
}

fn tally(summary: &mut SweepSummary, res: Result<bool, JoinError>) {
    summary.hosts_dispatched += 1;
    match res {
        Ok(true) => summary.hosts_found += 1,
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "host probe task failed"),
    }
}
