#![allow(dead_code)]
use blockwriter::*;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// In-memory database that records every successful statement.
///
/// DDL can be made to fail a number of times, INSERTs can be made to fail,
/// held behind a gate, or slowed down.
pub struct Mock {
    creates: Mutex<Vec<String>>,
    inserts: Mutex<Vec<String>>,
    attempts: AtomicUsize,
    failing: AtomicUsize,
    broken: AtomicBool,
    gate: watch::Receiver<bool>,
    delay: Duration,
    inflight: AtomicUsize,
    peak: AtomicUsize,
}

impl Default for Mock {
    fn default() -> Self {
        let (_, gate) = watch::channel(true);
        Self::with_gate(gate)
    }
}

impl Mock {
    fn with_gate(gate: watch::Receiver<bool>) -> Self {
        Self {
            creates: Mutex::new(Vec::new()),
            inserts: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            failing: AtomicUsize::new(0),
            broken: AtomicBool::new(false),
            gate,
            delay: Duration::ZERO,
            inflight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
    /// INSERTs wait until the returned sender publishes `true`.
    pub fn gated() -> (Self, watch::Sender<bool>) {
        let (tx, gate) = watch::channel(false);
        (Self::with_gate(gate), tx)
    }
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }
    /// Fail the next `n` DDL attempts; `usize::MAX` fails them all.
    pub fn failing_creates(self, n: usize) -> Self {
        self.failing.store(n, Ordering::SeqCst);
        self
    }
    pub fn failing_inserts(self) -> Self {
        self.broken.store(true, Ordering::SeqCst);
        self
    }
    pub fn heal(&self) {
        self.failing.store(0, Ordering::SeqCst);
        self.broken.store(false, Ordering::SeqCst);
    }
    pub fn creates(&self) -> Vec<String> {
        self.creates.lock().unwrap().clone()
    }
    pub fn inserts(&self) -> Vec<String> {
        self.inserts.lock().unwrap().clone()
    }
    pub fn insert_count(&self) -> usize {
        self.inserts.lock().unwrap().len()
    }
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Database for Mock {
    async fn exec(&self, sql: &str) -> std::result::Result<(), DbError> {
        if sql.starts_with("CREATE TABLE") {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let fail = self
                .failing
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
                    0 => None,
                    usize::MAX => Some(usize::MAX),
                    n => Some(n - 1),
                })
                .is_ok();
            if fail {
                return Err(DbError::from("ddl unavailable"));
            }
            self.creates.lock().unwrap().push(sql.to_string());
            return Ok(());
        }
        let now = self.inflight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _ = self.gate.clone().wait_for(|open| *open).await;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.inflight.fetch_sub(1, Ordering::SeqCst);
        if self.broken.load(Ordering::SeqCst) {
            return Err(DbError::from("write rejected"));
        }
        self.inserts.lock().unwrap().push(sql.to_string());
        Ok(())
    }
}

/// Short intervals and a surfaced fault policy for tests.
pub fn tuning() -> Tuning {
    Tuning {
        queue_limit: 16,
        queries_per_batch: 4,
        poll_interval: Duration::from_millis(10),
        throttle_interval: Duration::from_millis(20),
        retry_interval: Duration::from_millis(10),
        retry_timeout: Duration::from_millis(60),
        on_fault: FaultPolicy::Surface,
    }
}

pub fn config(table_num: usize, concurrency: usize, batch_size: usize, raw_size: usize) -> Config {
    Config {
        table_num,
        concurrency,
        batch_size,
        raw_size,
    }
}

/// Run `start` on its own task.
pub fn launch(case: &Arc<Case>, db: &Arc<Mock>) -> JoinHandle<blockwriter::Result<()>> {
    let case = case.clone();
    let db = db.clone();
    tokio::spawn(async move { case.start(db).await })
}

/// Await a launched run, which must end within a few seconds.
pub async fn finish(handle: JoinHandle<blockwriter::Result<()>>) -> blockwriter::Result<()> {
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("start returns in time")
        .expect("start task completes")
}

/// Poll `check` until it holds or a few seconds pass.
pub async fn eventually<F>(check: F) -> bool
where
    F: Fn() -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}

/// Table targeted by an INSERT statement.
pub fn table(insert: &str) -> &str {
    insert
        .trim_start_matches("INSERT INTO ")
        .split('(')
        .next()
        .unwrap_or_default()
}

/// Value tuples of an INSERT statement.
pub fn tuples(insert: &str) -> Vec<&str> {
    insert
        .split_once(" VALUES ")
        .map(|(_, rows)| rows.split(',').collect())
        .unwrap_or_default()
}
