//! Write failures reported by writers to the controller.
use crate::*;

/// What a running case does when a writer fails to execute a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Log and terminate the process with a non-zero status.
    #[default]
    Exit,
    /// Stop every task and return [`Error::Execute`] from [`Case::start`].
    Surface,
}

impl FaultPolicy {
    /// Whether a write failure terminates the process.
    pub fn exits(&self) -> bool {
        matches!(self, Self::Exit)
    }
}

/// A statement that a writer failed to execute.
#[derive(Debug)]
pub struct Fault {
    pub writer: usize,
    pub statement: String,
    pub source: DbError,
}

impl From<Fault> for Error {
    fn from(fault: Fault) -> Self {
        Error::Execute {
            writer: fault.writer,
            statement: fault.statement,
            source: fault.source,
        }
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] writer {} exec sql [{}] failed, err: {}",
            CASE,
            self.writer,
            clip(&self.statement),
            self.source
        )
    }
}

/// Leading part of a statement, for logs.
pub(crate) fn clip(statement: &str) -> &str {
    const WIDTH: usize = 96;
    statement.get(..WIDTH).unwrap_or(statement)
}
