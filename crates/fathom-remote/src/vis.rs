//! Auxiliary-visualization host.

use async_trait::async_trait;
use fathom_core::error::FetchError;
use fathom_core::remote::{VisHandle, VisualizationHost};
use fathom_core::types::AuxVisualizationSpec;
use tokio::sync::oneshot;

/// [`VisualizationHost`] whose renderer is ready the moment it is built.
///
/// The readiness handshake is still explicit — construct, signal, await —
/// so the orchestrator exercises the same two-phase resolve it would against
/// a real renderer with slow setup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateVisHost;

impl ImmediateVisHost {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl VisualizationHost for ImmediateVisHost {
    async fn prepare(&self, spec: &AuxVisualizationSpec) -> Result<VisHandle, FetchError> {
        let (ready_tx, ready_rx) = oneshot::channel();

        // an in-memory renderer needs no setup; signal readiness right away
        let _ = ready_tx.send(());

        ready_rx
            .await
            .map_err(|_| FetchError("visualization never signaled readiness".to_string()))?;
        tracing::debug!(time_field = %spec.time_field, "visualization ready");
        Ok(VisHandle { spec: spec.clone() })
    }
}
