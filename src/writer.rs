use crate::*;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Writer drains batches from the shared queue and executes them in order.
/// One writer per concurrency slot; writers share nothing but the queue,
/// the database handle, and the cancellation token.
pub struct Writer {
    index: usize,
    rows: usize,
    batches: AtomicUsize,
    statements: AtomicUsize,
}

impl Writer {
    pub fn new(index: usize, rows: usize) -> Self {
        Self {
            index,
            rows,
            batches: AtomicUsize::new(0),
            statements: AtomicUsize::new(0),
        }
    }
    pub fn index(&self) -> usize {
        self.index
    }
    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::Relaxed)
    }
    pub fn statements(&self) -> usize {
        self.statements.load(Ordering::Relaxed)
    }
    pub fn rows(&self) -> usize {
        self.statements() * self.rows
    }
}

impl Writer {
    /// Consume until cancelled, until the queue is closed and drained, or
    /// until a statement fails. A failure is reported on `faults` and ends
    /// this writer only; the controller decides what happens to the rest.
    pub async fn run<D>(
        self: Arc<Self>,
        db: Arc<D>,
        queue: Queue,
        token: CancellationToken,
        faults: UnboundedSender<Fault>,
    ) where
        D: Database,
    {
        'work: loop {
            if token.is_cancelled() {
                break 'work;
            }
            let batch = tokio::select! {
                biased;
                _ = token.cancelled() => break 'work,
                batch = queue.pop() => match batch {
                    Some(batch) => batch,
                    None => break 'work,
                },
            };
            for statement in batch {
                if token.is_cancelled() {
                    break 'work;
                }
                if let Err(source) = db.exec(&statement).await {
                    let fault = Fault {
                        writer: self.index,
                        statement,
                        source,
                    };
                    log::error!("{}", fault);
                    let _ = faults.send(fault);
                    break 'work;
                }
                self.statements.fetch_add(1, Ordering::Relaxed);
            }
            self.batches.fetch_add(1, Ordering::Relaxed);
        }
        log::debug!("[{}] writer {} stopped", CASE, self.index);
    }
}
