use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::ScanConfig;
use crate::error::Result;
use crate::limits::{concurrency_budget, current_fd_limit};
use crate::netdetect::{enumerate_hosts, resolve_subnet, LOCAL_SUBNET};
use crate::probe::HttpProber;
use crate::sink::FoundSink;
use crate::sweep::sweep;
use crate::types::{Found, SweepSummary};

/// Sweep the subnet named by `request` (CIDR or `local`) for web servers,
/// passing each hit to `sink` as it is found.
///
/// Only resolution and environment problems are errors; hosts that do not
/// answer just produce nothing.
pub async fn scan<S>(config: &ScanConfig, request: &str, sink: S) -> Result<SweepSummary>
where
    S: FoundSink + 'static,
{
    scan_with_cancel(config, request, sink, CancellationToken::new()).await
}

/// Like [`scan`], stopping early once `cancel` fires. Probes in flight are
/// abandoned and no further hosts are dispatched.
pub async fn scan_with_cancel<S>(
    config: &ScanConfig,
    request: &str,
    sink: S,
    cancel: CancellationToken,
) -> Result<SweepSummary>
where
    S: FoundSink + 'static,
{
    let subnet = resolve_subnet(request)?;
    let fd_limit = current_fd_limit()?;
    let budget = concurrency_budget(fd_limit, config.fd_margin, config.concurrency);
    let prober = HttpProber::new(config)?;

    tracing::info!(%subnet, budget, fd_limit, "scanning");
    let summary = sweep(
        enumerate_hosts(subnet),
        budget,
        Arc::new(prober),
        Arc::new(sink),
        cancel,
    )
    .await;
    tracing::info!(
        %subnet,
        probed = summary.hosts_dispatched,
        found = summary.hosts_found,
        cancelled = summary.cancelled,
        "scan finished"
    );
    Ok(summary)
}

/// Run a scan in the background, delivering results over a channel.
///
/// The receiver closes once the scan finishes; the handle yields its outcome.
pub fn scan_stream(
    config: ScanConfig,
    request: String,
    cancel: CancellationToken,
) -> (UnboundedReceiver<Found>, JoinHandle<Result<SweepSummary>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle =
        tokio::spawn(async move { scan_with_cancel(&config, &request, tx, cancel).await });
    (rx, handle)
}

/// Scan the local subnet on port 80 and 443.
pub async fn scan_local<S>(sink: S) -> Result<SweepSummary>
where
    S: FoundSink + 'static,
{
    let config = ScanConfig::default().with_ports(vec![80], vec![443]);
    scan(&config, LOCAL_SUBNET, sink).await
}
