//! Cancellable upload tasks, at most one in flight per module.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use intake_model::{IngestReport, Module, UploadFailure, UploadFile};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::collaborator::Ingestor;

/// Identifier of one upload attempt; increases monotonically per supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct UploadAttempt(u64);

impl UploadAttempt {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UploadAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of an upload task.
#[derive(Debug)]
pub struct UploadCompletion {
    pub module: Module,
    pub attempt: UploadAttempt,
    pub result: Result<IngestReport, UploadFailure>,
}

struct InFlight {
    attempt: UploadAttempt,
    handle: JoinHandle<()>,
}

/// Reports a completion exactly once, even if the task is aborted or panics.
struct CompletionGuard {
    module: Module,
    attempt: UploadAttempt,
    tx: Option<mpsc::UnboundedSender<UploadCompletion>>,
}

impl CompletionGuard {
    fn finish(mut self, result: Result<IngestReport, UploadFailure>) {
        self.send(result);
    }

    fn send(&mut self, result: Result<IngestReport, UploadFailure>) {
        if let Some(tx) = self.tx.take() {
            // Receiver gone means the supervisor was dropped; nothing to report to.
            let _ = tx.send(UploadCompletion {
                module: self.module,
                attempt: self.attempt,
                result,
            });
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.send(Err(UploadFailure::Interrupted));
    }
}

/// Spawns ingestion tasks and hands back their completions in order of arrival.
///
/// Starting a new upload for a module aborts the previous one for that
/// module; completions from aborted attempts are discarded.
pub struct UploadSupervisor<I> {
    ingestor: Arc<I>,
    next_attempt: u64,
    in_flight: BTreeMap<Module, InFlight>,
    tx: mpsc::UnboundedSender<UploadCompletion>,
    rx: mpsc::UnboundedReceiver<UploadCompletion>,
}

impl<I: Ingestor> UploadSupervisor<I> {
    pub fn new(ingestor: I) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            ingestor: Arc::new(ingestor),
            next_attempt: 0,
            in_flight: BTreeMap::new(),
            tx,
            rx,
        }
    }

    pub fn ingestor(&self) -> &I {
        &self.ingestor
    }

    /// Allocate an attempt id without spawning anything.
    pub fn reserve_attempt(&mut self) -> UploadAttempt {
        self.next_attempt += 1;
        UploadAttempt(self.next_attempt)
    }

    /// Spawn ingestion of `file` for `module`, superseding any attempt in flight.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn begin(&mut self, module: Module, file: UploadFile) -> UploadAttempt {
        if let Some(previous) = self.cancel(module) {
            debug!(%module, %previous, "superseding in-flight upload");
        }
        let attempt = self.reserve_attempt();
        let ingestor = Arc::clone(&self.ingestor);
        let guard = CompletionGuard {
            module,
            attempt,
            tx: Some(self.tx.clone()),
        };
        let handle = tokio::spawn(async move {
            let result = ingestor.ingest(module, file).await;
            guard.finish(result);
        });
        self.in_flight.insert(module, InFlight { attempt, handle });
        attempt
    }

    /// Abort the in-flight upload for `module`, returning its attempt id.
    pub fn cancel(&mut self, module: Module) -> Option<UploadAttempt> {
        let in_flight = self.in_flight.remove(&module)?;
        in_flight.handle.abort();
        Some(in_flight.attempt)
    }

    pub fn cancel_all(&mut self) {
        for module in Module::ALL {
            self.cancel(module);
        }
    }

    pub fn in_flight(&self, module: Module) -> Option<UploadAttempt> {
        self.in_flight.get(&module).map(|f| f.attempt)
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Wait for the next completion of a live attempt.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<UploadCompletion> {
        loop {
            if self.is_idle() {
                return None;
            }
            let completion = self.rx.recv().await?;
            match self.in_flight.get(&completion.module) {
                Some(live) if live.attempt == completion.attempt => {
                    self.in_flight.remove(&completion.module);
                    if let Err(failure) = &completion.result {
                        warn!(
                            module = %completion.module,
                            attempt = %completion.attempt,
                            %failure,
                            "upload failed"
                        );
                    }
                    return Some(completion);
                }
                _ => {
                    debug!(
                        module = %completion.module,
                        attempt = %completion.attempt,
                        "discarding completion of superseded upload"
                    );
                }
            }
        }
    }
}
