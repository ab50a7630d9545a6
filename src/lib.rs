//! Concurrent write-load generator for sharded tables.
//!
//! A single producer renders batches of multi-row INSERT statements into a
//! bounded queue; a pool of writers drains the queue into the target database
//! until the owning [`Case`] is stopped.
//!
//! ## Core Types
//!
//! - [`Case`] — Lifecycle controller: schema setup, run, stop
//! - [`Config`] — Workload shape (tables, concurrency, rows, payload)
//! - [`Tuning`] — Intervals, queue capacity, and fault policy
//! - [`Database`] — Statement execution seam for any driver
//!
//! ## Pipeline
//!
//! - [`Encoder`] — Random payloads rendered into INSERT text
//! - [`Generator`] — Producer feeding the [`Queue`]
//! - [`Writer`] — Consumer executing statements
//! - [`Shard`] — Table naming and DDL
mod case;
mod config;
mod database;
mod encoder;
mod error;
mod fault;
mod generator;
mod queue;
mod schema;
mod shard;
mod stats;
mod writer;

pub use case::*;
pub use config::*;
pub use database::*;
pub use encoder::*;
pub use error::*;
pub use fault::*;
pub use generator::*;
pub use queue::*;
pub use schema::*;
pub use shard::*;
pub use stats::*;
pub use writer::*;

use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ============================================================================
// IDENTITY
// ============================================================================
/// Display name of the case, used as a prefix in logs and errors.
pub const CASE: &str = "block_writer";
/// Base table name; shard `i > 0` appends its decimal index.
pub const TABLE: &str = "block_writer";

// ============================================================================
// QUEUE AND BATCHING
// ============================================================================
/// Maximum number of batches buffered between generator and writers.
pub const QUERY_QUEUE_LIMIT: usize = 10_000;
/// Statements rendered per generation cycle.
pub const QUERIES_PER_BATCH: usize = 100;

// ============================================================================
// TIMING
// ============================================================================
/// Interval at which a running case checks for a stop signal.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Generator back-off while the queue is saturated.
pub const THROTTLE_INTERVAL: Duration = Duration::from_secs(10);
/// Delay between schema creation attempts.
pub const RETRY_INTERVAL: Duration = Duration::from_secs(5);
/// Total budget for creating a single table.
pub const RETRY_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Sleep for `duration` unless `token` fires first.
/// Returns `true` if the full duration elapsed.
pub async fn sleep(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() -> anyhow::Result<()> {
    std::fs::create_dir_all("logs")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time))?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file])?;
    Ok(())
}

/// Parse duration string like "30s", "5m", "2h", "1d" into Duration.
#[cfg(feature = "server")]
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    let split = s.len().saturating_sub(1);
    if !s.is_char_boundary(split) {
        return Err(format!("invalid duration {:?}", s));
    }
    let (num, unit) = s.split_at(split);
    let value = num
        .parse::<u64>()
        .map_err(|e| format!("invalid duration {:?}: {}", s, e))?;
    let scale = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        _ => return Err(format!("invalid duration unit in {:?}", s)),
    };
    value
        .checked_mul(scale)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration {:?} is out of range", s))
}
