//! Block Writer Binary
//!
//! Drives concurrent INSERT load into the database at `DB_URL` until
//! interrupted with Ctrl+C or until `--duration` elapses.

use blockwriter::*;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of shard tables
    #[arg(long, default_value_t = 1)]
    tables: usize,
    /// Number of concurrent writers
    #[arg(long, default_value_t = num_cpus::get())]
    concurrency: usize,
    /// Rows per INSERT statement
    #[arg(long, default_value_t = 100)]
    batch_size: usize,
    /// Payload characters per row
    #[arg(long, default_value_t = 1024)]
    raw_size: usize,
    /// Stop after this long (e.g. "30s", "5m", "2h")
    #[arg(long, value_parser = parse_duration)]
    duration: Option<Duration>,
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            table_num: args.tables,
            concurrency: args.concurrency,
            batch_size: args.batch_size,
            raw_size: args.raw_size,
        }
    }
}

/// One pooled connection per writer plus one spare for schema setup.
fn connections(concurrency: usize) -> u32 {
    u32::try_from(concurrency)
        .unwrap_or(u32::MAX)
        .saturating_add(1)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log()?;
    let ref args = Args::parse();
    let case = Arc::new(Case::new(Config::from(args)));
    let db = db(connections(args.concurrency)).await?;
    let stopper = case.clone();
    let duration = args.duration;
    tokio::spawn(async move {
        match duration {
            Some(duration) => tokio::select! {
                _ = tokio::signal::ctrl_c() => log::warn!("interrupt received, stopping"),
                _ = tokio::time::sleep(duration) => log::info!("ran for {:?}, stopping", duration),
            },
            None => match tokio::signal::ctrl_c().await {
                Ok(()) => log::warn!("interrupt received, stopping"),
                Err(e) => log::error!("cannot listen for interrupt: {}", e),
            },
        }
        stopper.stop();
    });
    case.start(db).await?;
    log::info!("{}", case.stats());
    Ok(())
}
