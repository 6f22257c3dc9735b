use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};

/// Capacity of the intake and outlet channels between callers and the
/// coordinator. Producers only ever wait on this fixed buffer, never on
/// the backlog.
pub const HANDOFF_CAPACITY: usize = 2;

/// Unbounded FIFO for a single queue name.
///
/// All mutation of the pending backlog happens on one coordinator task,
/// spawned when the engine is created. Producers hand values to it through
/// a small intake channel; consumers take values from a small outlet
/// channel whose receiving end is shared behind an async mutex.
///
/// Must be created from within a Tokio runtime.
pub struct QueueEngine {
    name: String,
    intake: mpsc::Sender<String>,
    outlet: Mutex<mpsc::Receiver<String>>,
}

impl QueueEngine {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let (intake, intake_rx) = mpsc::channel(HANDOFF_CAPACITY);
        let (outlet_tx, outlet) = mpsc::channel(HANDOFF_CAPACITY);

        let coordinator = Coordinator {
            name: name.clone(),
            intake: intake_rx,
            outlet: outlet_tx,
            pending: VecDeque::new(),
        };
        tokio::spawn(coordinator.run());

        Self {
            name,
            intake,
            outlet: Mutex::new(outlet),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accepts a value for delivery. Waits only for room in the intake
    /// channel, which the coordinator drains regardless of backlog depth.
    pub async fn enqueue(&self, value: impl Into<String>) {
        if self.intake.send(value.into()).await.is_err() {
            // Only reachable if the coordinator task panicked.
            tracing::error!(queue = %self.name, "Coordinator stopped, value dropped");
        }
    }

    /// Removes and returns the oldest value, waiting until one is available
    /// or `cancel` resolves. A cancelled wait returns `None` and leaves the
    /// queue untouched.
    pub async fn dequeue<F>(&self, cancel: F) -> Option<String>
    where
        F: Future<Output = ()>,
    {
        // A value that is already deliverable wins over an expired signal.
        tokio::select! {
            biased;
            value = self.receive() => value,
            () = cancel => None,
        }
    }

    /// [`dequeue`](Self::dequeue) with an optional deadline. `None` waits
    /// until a value arrives or the returned future is dropped.
    pub async fn dequeue_within(&self, timeout: Option<Duration>) -> Option<String> {
        match timeout {
            Some(timeout) => self.dequeue(tokio::time::sleep(timeout)).await,
            None => self.dequeue(std::future::pending()).await,
        }
    }

    // Both the lock and `recv` are cancel-safe, so dropping this future
    // never loses a value.
    async fn receive(&self) -> Option<String> {
        let mut outlet = self.outlet.lock().await;
        outlet.recv().await
    }
}

/// Sole owner of the pending backlog for one queue.
struct Coordinator {
    name: String,
    intake: mpsc::Receiver<String>,
    outlet: mpsc::Sender<String>,
    pending: VecDeque<String>,
}

impl Coordinator {
    async fn run(mut self) {
        tracing::trace!(queue = %self.name, "Coordinator started");

        // Direct mode: the backlog is empty, hand values straight to the outlet.
        while let Some(value) = self.intake.recv().await {
            match self.outlet.try_send(value) {
                Ok(()) => continue,
                Err(TrySendError::Full(value)) => self.pending.push_back(value),
                Err(TrySendError::Closed(_)) => break,
            }

            tracing::trace!(queue = %self.name, "Switching to buffered mode");
            if !self.drain().await {
                break;
            }
            tracing::trace!(queue = %self.name, "Backlog drained, back to direct mode");
        }

        tracing::debug!(
            queue = %self.name,
            pending = self.pending.len(),
            "Coordinator stopped"
        );
    }

    /// Buffered mode. Runs until the backlog is empty, returning `false` if
    /// the engine went away in the meantime.
    async fn drain(&mut self) -> bool {
        while !self.pending.is_empty() {
            tokio::select! {
                accepted = self.intake.recv() => match accepted {
                    Some(value) => self.pending.push_back(value),
                    None => return false,
                },
                permit = self.outlet.reserve() => match permit {
                    Ok(permit) => {
                        if let Some(head) = self.pending.pop_front() {
                            permit.send(head);
                        }
                    }
                    Err(_) => return false,
                },
            }
        }
        true
    }
}
