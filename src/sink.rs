use tokio::sync::mpsc::UnboundedSender;

use crate::types::Found;

/// Receiver of discovered servers.
///
/// A sweep calls `found` from many tasks at once, so implementations must be
/// safe to call concurrently.
pub trait FoundSink: Send + Sync {
    fn found(&self, found: Found);
}

impl<F> FoundSink for F
where
    F: Fn(Found) + Send + Sync,
{
    fn found(&self, found: Found) {
        self(found)
    }
}

/// Results go down a channel; a dropped receiver discards them.
impl FoundSink for UnboundedSender<Found> {
    fn found(&self, found: Found) {
        let _ = self.send(found);
    }
}

/// A store that collects results.
pub trait Finder: Send + Sync {
    fn add_found(&self, found: Found) -> anyhow::Result<()>;
}

/// Adapts a [`Finder`] into a [`FoundSink`], logging store failures.
pub struct FinderSink<F>(pub F);

impl<F: Finder> FoundSink for FinderSink<F> {
    fn found(&self, found: Found) {
        let addr = format!("{}:{}", found.address, found.port);
        if let Err(e) = self.0.add_found(found) {
            tracing::warn!(%addr, error = %e, "failed to store result");
        }
    }
}
