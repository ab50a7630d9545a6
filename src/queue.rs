//! Bounded batch queue between the generator and the writers.
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::mpsc::Receiver;
use tokio::sync::mpsc::Sender;

/// Fully rendered statements produced in one generation cycle.
pub type Batch = Vec<String>;

/// Fixed-capacity FIFO of batches.
///
/// Cloning shares the same channel. The single receiver is shared by every
/// writer behind an async mutex, so each batch is taken by exactly one writer.
#[derive(Clone)]
pub struct Queue {
    tx: Sender<Batch>,
    rx: Arc<Mutex<Receiver<Batch>>>,
}

impl Queue {
    pub fn new(limit: usize) -> Self {
        let (tx, rx) = tokio::sync::mpsc::channel::<Batch>(limit.max(1));
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }
    pub fn limit(&self) -> usize {
        self.tx.max_capacity()
    }
    /// Batches currently buffered (including reserved slots).
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn is_full(&self) -> bool {
        self.len() >= self.limit()
    }
    /// Enqueue, waiting for space. Returns `false` once the queue is closed.
    pub async fn push(&self, batch: Batch) -> bool {
        self.tx.send(batch).await.is_ok()
    }
    /// Dequeue the next batch. Returns `None` once closed and drained.
    pub async fn pop(&self) -> Option<Batch> {
        self.rx.lock().await.recv().await
    }
    /// Refuse further pushes; buffered batches can still be popped.
    pub async fn close(&self) {
        self.rx.lock().await.close();
    }
}
