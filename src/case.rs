use crate::*;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use tokio::sync::Notify;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

/// Long-lived controller of the block writing workload.
///
/// Owns the writers and, for the duration of a run, the queue and the
/// cancellation token. At most one run is active at a time; the schema is
/// created before the first run that gets past initialization and never again.
pub struct Case {
    config: Config,
    tuning: Tuning,
    writers: Vec<Arc<Writer>>,
    produced: Arc<AtomicUsize>,
    queued: AtomicUsize,
    running: AtomicBool,
    initialized: AtomicBool,
    signal: Notify,
}

impl Case {
    pub fn new(config: Config) -> Self {
        Self::with_tuning(config, Tuning::default())
    }
    pub fn with_tuning(config: Config, tuning: Tuning) -> Self {
        let config = config.clamped();
        Self {
            writers: (0..config.concurrency)
                .map(|i| Writer::new(i, config.batch_size))
                .map(Arc::new)
                .collect(),
            produced: Arc::new(AtomicUsize::new(0)),
            queued: AtomicUsize::new(0),
            running: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
            signal: Notify::new(),
            config,
            tuning,
        }
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }
    pub fn writers(&self) -> &[Arc<Writer>] {
        &self.writers
    }
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }
    /// Cumulative counters over every run of this case.
    pub fn stats(&self) -> Stats {
        Stats {
            produced: self.produced.load(Ordering::Relaxed),
            consumed: self.writers.iter().map(|w| w.batches()).sum(),
            statements: self.writers.iter().map(|w| w.statements()).sum(),
            rows: self.writers.iter().map(|w| w.rows()).sum(),
            queued: self.queued.load(Ordering::Relaxed),
        }
    }
}

// lifecycle
impl Case {
    /// Run the workload against `db` until [`Case::stop`] is called.
    ///
    /// Fails fast with [`Error::AlreadyRunning`] if another run is active,
    /// and with [`Error::Initialize`] if the shard tables cannot be created.
    pub async fn start<D>(&self, db: Arc<D>) -> Result<()>
    where
        D: Database,
    {
        let _running = self.acquire()?;
        if !self.is_initialized() {
            initialize(db.as_ref(), self.config.table_num, &self.tuning).await?;
            self.initialized.store(true, Ordering::Release);
        }
        log::info!("[{}] start to execute case...", self);
        let token = CancellationToken::new();
        let queue = Queue::new(self.tuning.queue_limit);
        let (faults, mut reports) = tokio::sync::mpsc::unbounded_channel::<Fault>();
        let mut tasks = self
            .writers
            .iter()
            .cloned()
            .map(|w| w.run(db.clone(), queue.clone(), token.clone(), faults.clone()))
            .map(tokio::spawn)
            .collect::<Vec<_>>();
        tasks.push(tokio::spawn(
            Generator::new(
                &self.config,
                &self.tuning,
                queue.clone(),
                token.clone(),
                self.produced.clone(),
            )
            .run(),
        ));
        drop(faults);
        let fault = self.watch(&queue, &mut reports).await.map(|f| self.escalate(f));
        token.cancel();
        let joined = futures::future::join_all(tasks).await;
        // statements in flight at stop may still fail
        let fault = fault.or_else(|| reports.try_recv().ok().map(|f| self.escalate(f)));
        queue.close().await;
        self.queued.store(0, Ordering::Relaxed);
        joined.into_iter().collect::<std::result::Result<Vec<()>, _>>()?;
        match fault {
            Some(fault) => Err(Error::from(fault)),
            None => Ok(()),
        }
    }

    /// Signal the active run to stop. Calls made while no run is active are
    /// kept for the next run, and repeated calls collapse into one signal.
    pub fn stop(&self) {
        log::info!("[{}] stop requested", self);
        self.signal.notify_one();
    }

    /// Claim the running flag, released when the guard drops.
    fn acquire(&self) -> Result<Running<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Running(&self.running))
            .map_err(|_| Error::AlreadyRunning(self.to_string()))
            .inspect_err(|e| log::error!("{}", e))
    }

    /// Poll until a stop signal arrives or a writer reports a fault.
    async fn watch(&self, queue: &Queue, reports: &mut UnboundedReceiver<Fault>) -> Option<Fault> {
        let mut ticker = tokio::time::interval(self.tuning.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                Some(fault) = reports.recv() => return Some(fault),
                _ = self.signal.notified() => {
                    log::info!("[{}] stopping...", self);
                    return None;
                }
                _ = ticker.tick() => {
                    self.queued.store(queue.len(), Ordering::Relaxed);
                    log::info!("[{}] {}", self, self.stats());
                }
            }
        }
    }
}

impl Case {
    /// Apply the fault policy: terminate the process, or hand the fault
    /// back so the run ends with [`Error::Execute`].
    fn escalate(&self, fault: Fault) -> Fault {
        if self.tuning.on_fault.exits() {
            log::error!("[{}] aborting on write failure: {}", self, fault.source);
            std::process::exit(1);
        }
        log::error!("[{}] stopping on write failure: {}", self, fault.source);
        fault
    }
}

impl Display for Case {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", CASE)
    }
}

/// Running-flag guard; clears the flag on every exit path of a run.
struct Running<'a>(&'a AtomicBool);

impl Drop for Running<'_> {
    fn drop(&mut self) {
        log::info!("[{}] stopped", CASE);
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(concurrency: usize) -> Config {
        Config {
            table_num: 0,
            concurrency,
            batch_size: 5,
            raw_size: 8,
        }
    }

    #[test]
    fn allocates_one_writer_per_slot() {
        let case = Case::new(config(4));
        assert_eq!(case.writers().len(), 4);
        assert_eq!(
            case.writers().iter().map(|w| w.index()).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn construction_clamps_tables() {
        assert_eq!(Case::new(config(1)).config().table_num, 1);
    }

    #[test]
    fn displays_fixed_name() {
        assert_eq!(Case::new(config(1)).to_string(), "block_writer");
    }

    #[test]
    fn fresh_case_is_idle() {
        let case = Case::new(config(2));
        assert!(!case.is_running());
        assert!(!case.is_initialized());
        assert_eq!(case.stats(), Stats::default());
    }

    #[test]
    fn surfaced_fault_is_handed_back() {
        let tuning = Tuning {
            on_fault: FaultPolicy::Surface,
            ..Tuning::default()
        };
        let case = Case::with_tuning(config(1), tuning);
        let fault = case.escalate(Fault {
            writer: 0,
            statement: "INSERT INTO block_writer(raw_bytes) VALUES ('x')".to_string(),
            source: DbError::from("write rejected"),
        });
        assert_eq!(fault.writer, 0);
        assert!(fault.statement.starts_with("INSERT INTO block_writer"));
    }

    #[test]
    fn default_case_exits_on_fault() {
        assert!(Case::new(config(1)).tuning().on_fault.exits());
    }

    #[test]
    fn guard_rejects_overlap_and_releases() {
        let case = Case::new(config(1));
        let guard = case.acquire().expect("first claim");
        assert!(case.is_running());
        assert!(matches!(case.acquire(), Err(Error::AlreadyRunning(_))));
        drop(guard);
        assert!(!case.is_running());
        assert!(case.acquire().is_ok());
    }
}
