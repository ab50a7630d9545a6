//! Progress snapshot of a case.
use std::fmt::Display;
use std::fmt::Formatter;

/// Counters summed over the generator and every writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Batches enqueued by the generator.
    pub produced: usize,
    /// Batches fully executed by writers.
    pub consumed: usize,
    /// Statements executed by writers.
    pub statements: usize,
    /// Rows inserted by writers.
    pub rows: usize,
    /// Batches waiting in the queue at snapshot time.
    pub queued: usize,
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<20}{:<20}{:<20}{:<20}{:<20}",
            format!("produced {}", self.produced),
            format!("consumed {}", self.consumed),
            format!("queued {}", self.queued),
            format!("stmts {}", self.statements),
            format!("rows {}", self.rows),
        )
    }
}
