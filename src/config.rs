//! Workload shape and engine tuning.
use crate::*;
use std::time::Duration;

/// Shape of the generated workload.
///
/// Only the table count is normalized (floored to one); every other field is
/// taken as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of shard tables written to.
    pub table_num: usize,
    /// Number of concurrent writers.
    pub concurrency: usize,
    /// Value tuples per INSERT statement.
    pub batch_size: usize,
    /// Payload characters per row.
    pub raw_size: usize,
}

impl Config {
    pub fn clamped(self) -> Self {
        Self {
            table_num: self.table_num.max(1),
            ..self
        }
    }
}

/// Timing, capacity, and failure handling of a running case.
///
/// [`Default`] reproduces the reference intervals; shorter values are useful
/// for embedding in test harnesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuning {
    pub queue_limit: usize,
    pub queries_per_batch: usize,
    pub poll_interval: Duration,
    pub throttle_interval: Duration,
    pub retry_interval: Duration,
    pub retry_timeout: Duration,
    pub on_fault: FaultPolicy,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            queue_limit: QUERY_QUEUE_LIMIT,
            queries_per_batch: QUERIES_PER_BATCH,
            poll_interval: POLL_INTERVAL,
            throttle_interval: THROTTLE_INTERVAL,
            retry_interval: RETRY_INTERVAL,
            retry_timeout: RETRY_TIMEOUT,
            on_fault: FaultPolicy::default(),
        }
    }
}
