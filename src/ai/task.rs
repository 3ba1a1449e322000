//! Single-flight background tasks for assistant requests.
//!
//! Each [`AiKind`] has one slot. A request runs on the tokio runtime under a
//! timeout and reports back through a channel; the owner of [`AiTasks`]
//! picks completions up with [`AiTasks::next_completion`], which also frees
//! the slot.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::assistant::{AiRequest, AiResponse, Assistant};
use super::client::Generator;
use super::{AiError, AiKind};

/// Result of a finished assistant request.
#[derive(Debug, Clone)]
pub struct AiCompletion {
    pub kind: AiKind,
    pub result: Result<AiResponse, AiError>,
    id: u64,
}

struct InFlight {
    id: u64,
    handle: JoinHandle<()>,
}

pub struct AiTasks<G> {
    assistant: Arc<Assistant<G>>,
    timeout: Duration,
    in_flight: HashMap<AiKind, InFlight>,
    next_id: u64,
    tx: flume::Sender<AiCompletion>,
    rx: flume::Receiver<AiCompletion>,
}

impl<G: Generator> AiTasks<G> {
    pub fn new(assistant: Assistant<G>, timeout: Duration) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            assistant: Arc::new(assistant),
            timeout,
            in_flight: HashMap::new(),
            next_id: 0,
            tx,
            rx,
        }
    }

    pub fn is_busy(&self, kind: AiKind) -> bool {
        self.in_flight.contains_key(&kind)
    }

    /// Start a request in the background.
    ///
    /// Fails with [`AiError::Busy`] if a request of the same kind is still
    /// running. Must be called from within a tokio runtime.
    pub fn start(&mut self, request: AiRequest) -> Result<(), AiError> {
        let kind = request.kind();
        if self.is_busy(kind) {
            return Err(AiError::Busy(kind));
        }

        self.next_id += 1;
        let id = self.next_id;
        let assistant = Arc::clone(&self.assistant);
        let timeout = self.timeout;
        let tx = self.tx.clone();

        let handle = tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, assistant.handle(request)).await {
                Ok(result) => result,
                Err(_) => Err(AiError::Timeout(kind, timeout)),
            };
            if let Err(e) = &result {
                warn!(%kind, error = %e, "AI request failed");
            }
            // The receiver lives as long as `AiTasks`.
            let _ = tx.send(AiCompletion { kind, result, id });
        });

        info!(%kind, id, "Started AI request");
        self.in_flight.insert(kind, InFlight { id, handle });
        Ok(())
    }

    /// Abort the request of `kind`, if any. Returns whether one was running.
    pub fn cancel(&mut self, kind: AiKind) -> bool {
        match self.in_flight.remove(&kind) {
            Some(task) => {
                task.handle.abort();
                info!(%kind, id = task.id, "Cancelled AI request");
                true
            }
            None => false,
        }
    }

    /// Wait for the next completion of a request that is still tracked.
    ///
    /// Completions of cancelled requests are dropped.
    pub async fn next_completion(&mut self) -> AiCompletion {
        loop {
            // `self.tx` keeps the channel open, so this never disconnects.
            let completion = match self.rx.recv_async().await {
                Ok(completion) => completion,
                Err(_) => return std::future::pending().await,
            };

            match self.in_flight.get(&completion.kind) {
                Some(task) if task.id == completion.id => {
                    self.in_flight.remove(&completion.kind);
                    return completion;
                }
                _ => debug!(
                    kind = %completion.kind,
                    id = completion.id,
                    "Dropped stale AI completion"
                ),
            }
        }
    }
}

impl<G> Drop for AiTasks<G> {
    fn drop(&mut self) {
        for task in self.in_flight.values() {
            task.handle.abort();
        }
    }
}
