//! One-shot creation of every shard table.
use crate::*;
use backon::ConstantBuilder;
use backon::Retryable;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Create every shard table, retrying each statement until the retry budget
/// of `tuning` runs out. The first failing table aborts the whole pass.
pub async fn initialize<D>(db: &D, tables: usize, tuning: &Tuning) -> Result<()>
where
    D: Database + ?Sized,
{
    log::info!("[{}] start to init...", CASE);
    for shard in Shard::all(tables) {
        let ref statement = shard.creates();
        retry(db, statement, tuning.retry_interval, tuning.retry_timeout)
            .await
            .map_err(|(attempts, source)| Error::Initialize {
                table: shard.name(),
                attempts,
                source,
            })
            .inspect_err(|e| log::error!("{}", e))?;
    }
    log::info!("[{}] init end...", CASE);
    Ok(())
}

/// Execute `statement` immediately, then once per `interval`, as long as
/// the attempt starts within `timeout` of the first one.
/// On failure yields the attempt count and the last error.
async fn retry<D>(
    db: &D,
    statement: &str,
    interval: Duration,
    timeout: Duration,
) -> std::result::Result<(), (usize, DbError)>
where
    D: Database + ?Sized,
{
    let backoff = ConstantBuilder::default()
        .with_delay(interval)
        .with_max_times(retries(interval, timeout));
    let attempts = AtomicUsize::new(1);
    (|| db.exec(statement))
        .retry(backoff)
        .sleep(tokio::time::sleep)
        .notify(|e: &DbError, _| {
            attempts.fetch_add(1, Ordering::Relaxed);
            log::warn!(
                "[{}] exec sql [{}] failed, err: {}, retry...",
                CASE,
                statement,
                e
            );
        })
        .await
        .map_err(|e| (attempts.load(Ordering::Relaxed), e))
}

/// Retries that fit in `timeout` after the first attempt.
fn retries(interval: Duration, timeout: Duration) -> usize {
    timeout
        .as_nanos()
        .checked_div(interval.as_nanos())
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
        .unwrap_or(0)
}
