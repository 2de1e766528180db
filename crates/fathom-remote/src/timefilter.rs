//! Time filter — publishes time-range changes to the orchestrator.

use fathom_core::types::TimeRange;
use tokio::sync::mpsc;

/// Publishing side of the time-range change stream.
///
/// The receiving end goes into the orchestrator's collaborator set; the view
/// owner keeps the `TimeFilter` and calls [`set_time`](TimeFilter::set_time)
/// whenever the user picks a new window.
#[derive(Debug, Clone)]
pub struct TimeFilter {
    tx: mpsc::UnboundedSender<TimeRange>,
}

impl TimeFilter {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TimeRange>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TimeFilter { tx }, rx)
    }

    /// Publish a new time window. Delivery failure means the owning view has
    /// already been torn down, which is fine for a fire-and-forget update.
    pub fn set_time(&self, range: TimeRange) {
        let _ = self.tx.send(range);
    }
}
