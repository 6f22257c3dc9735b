use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use super::engine::QueueEngine;

/// Name to engine lookup. Engines are created on first reference and never
/// removed.
#[derive(Default)]
pub struct QueueRegistry {
    queues: DashMap<String, Arc<QueueEngine>>,
}

impl QueueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the engine for `name`, creating it if absent. Concurrent
    /// callers racing on the same name all observe the same instance.
    pub fn get_or_create(&self, name: &str) -> Arc<QueueEngine> {
        if let Some(engine) = self.queues.get(name) {
            return Arc::clone(engine.value());
        }

        let engine = self.queues.entry(name.to_owned()).or_insert_with(|| {
            tracing::debug!(queue = %name, "Creating queue");
            Arc::new(QueueEngine::new(name))
        });
        Arc::clone(engine.value())
    }

    pub fn get(&self, name: &str) -> Option<Arc<QueueEngine>> {
        self.queues.get(name).map(|engine| Arc::clone(engine.value()))
    }

    pub async fn enqueue(&self, name: &str, value: impl Into<String>) {
        self.get_or_create(name).enqueue(value).await;
    }

    pub async fn dequeue<F>(&self, name: &str, cancel: F) -> Option<String>
    where
        F: Future<Output = ()>,
    {
        self.get_or_create(name).dequeue(cancel).await
    }

    pub async fn dequeue_within(&self, name: &str, timeout: Option<Duration>) -> Option<String> {
        self.get_or_create(name).dequeue_within(timeout).await
    }

    /// Number of queues created so far.
    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}
