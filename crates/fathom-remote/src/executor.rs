//! Channel-backed fetch executor.
//!
//! Dispatches are recorded; deliveries travel over persistent tokio channels
//! that model the executor's result and error streams. Tests push responses
//! through the cloned senders; the demo binary installs a responder closure
//! that answers every dispatch synthetically.

use async_trait::async_trait;
use fathom_core::error::FetchError;
use fathom_core::remote::FetchExecutor;
use fathom_core::types::{FetchResponse, QueryDefinition};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::mpsc;

type Responder = Box<dyn Fn(&QueryDefinition, u64) -> Option<FetchResponse>>;

/// In-memory [`FetchExecutor`] with persistent result and error streams.
pub struct InMemoryExecutor {
    dispatched: Rc<RefCell<Vec<(QueryDefinition, u64)>>>,
    results_tx: mpsc::UnboundedSender<FetchResponse>,
    errors_tx: mpsc::UnboundedSender<FetchError>,
    responder: Option<Responder>,
}

impl InMemoryExecutor {
    /// Build an executor plus the receiving ends of its two streams. The
    /// receivers go into the orchestrator; the executor keeps the senders.
    pub fn new() -> (
        Self,
        mpsc::UnboundedReceiver<FetchResponse>,
        mpsc::UnboundedReceiver<FetchError>,
    ) {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        let executor = InMemoryExecutor {
            dispatched: Rc::new(RefCell::new(Vec::new())),
            results_tx,
            errors_tx,
            responder: None,
        };
        (executor, results_rx, errors_rx)
    }

    /// Answer every dispatch by running `responder` and delivering its
    /// response on the result stream.
    pub fn with_responder(
        mut self,
        responder: impl Fn(&QueryDefinition, u64) -> Option<FetchResponse> + 'static,
    ) -> Self {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Shared handle to the recorded `(definition, generation)` dispatch log.
    pub fn dispatch_log(&self) -> Rc<RefCell<Vec<(QueryDefinition, u64)>>> {
        Rc::clone(&self.dispatched)
    }

    /// Sender for injecting result deliveries from outside the executor.
    pub fn result_sender(&self) -> mpsc::UnboundedSender<FetchResponse> {
        self.results_tx.clone()
    }

    /// Sender for injecting error deliveries from outside the executor.
    pub fn error_sender(&self) -> mpsc::UnboundedSender<FetchError> {
        self.errors_tx.clone()
    }
}

#[async_trait(?Send)]
impl FetchExecutor for InMemoryExecutor {
    async fn dispatch(
        &mut self,
        def: &QueryDefinition,
        generation: u64,
    ) -> Result<(), FetchError> {
        tracing::debug!(index = %def.index, generation, "query dispatched");
        self.dispatched.borrow_mut().push((def.clone(), generation));

        if let Some(responder) = &self.responder {
            if let Some(response) = responder(def, generation) {
                self.results_tx
                    .send(response)
                    .map_err(|_| FetchError("result stream closed".to_string()))?;
            }
        }
        Ok(())
    }
}
