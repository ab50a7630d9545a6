use crate::*;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Single producer of query batches.
///
/// Each cycle picks one shard at random and renders a whole batch against it.
/// While the queue is saturated the freshly built batch is dropped and the
/// generator sleeps instead of blocking on the send.
pub struct Generator {
    encoder: Encoder,
    tables: usize,
    size: usize,
    throttle: Duration,
    queue: Queue,
    token: CancellationToken,
    produced: Arc<AtomicUsize>,
}

impl Generator {
    pub fn new(
        config: &Config,
        tuning: &Tuning,
        queue: Queue,
        token: CancellationToken,
        produced: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            encoder: Encoder::new(config.batch_size, config.raw_size),
            tables: config.table_num.max(1),
            size: tuning.queries_per_batch,
            throttle: tuning.throttle_interval,
            queue,
            token,
            produced,
        }
    }

    pub async fn run(mut self) {
        loop {
            let shard = self.encoder.shard(self.tables);
            let batch = self.encoder.batch(shard, self.size);
            if self.token.is_cancelled() {
                break;
            }
            if self.queue.len() < self.queue.limit() {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => break,
                    sent = self.queue.push(batch) => match sent {
                        true => self.produced.fetch_add(1, Ordering::Relaxed),
                        false => break,
                    },
                };
            } else {
                log::info!(
                    "[{}] [action: generate query] query channel is full, sleep {:?}",
                    CASE,
                    self.throttle
                );
                if !sleep(&self.token, self.throttle).await {
                    break;
                }
            }
            // rendering never awaits, so hand the thread back between cycles
            tokio::task::yield_now().await;
        }
        log::info!("[{}] [action: generate query] stopped", CASE);
    }
}
