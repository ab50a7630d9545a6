use crate::*;

/// Error returned by a [`Database`] implementation.
pub type DbError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("[{0}] is running, you can't start it again")]
    AlreadyRunning(String),
    #[error("[{case}] create table {table} failed after {attempts} attempts: {source}", case = CASE)]
    Initialize {
        table: String,
        attempts: usize,
        source: DbError,
    },
    #[error("[{case}] writer {writer} exec sql failed: {source}", case = CASE)]
    Execute {
        writer: usize,
        statement: String,
        source: DbError,
    },
    #[error("[{case}] task failed: {0}", case = CASE)]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
