//! Random INSERT rendering.
use crate::*;
use rand::Rng;
use rand::SeedableRng;
use rand::distr::Alphanumeric;
use rand::rngs::SmallRng;

/// Renders random multi-row INSERT statements.
///
/// Each row carries a fresh alphanumeric payload of `raw_size` characters, so
/// single-quote wrapping is enough to keep the statement well formed.
pub struct Encoder {
    rng: SmallRng,
    rows: usize,
    size: usize,
    values: Vec<String>,
}

impl Encoder {
    pub fn new(rows: usize, size: usize) -> Self {
        Self::from_rng(SmallRng::from_rng(&mut rand::rng()), rows, size)
    }
    /// Deterministic encoder for reproducible workloads.
    pub fn seeded(seed: u64, rows: usize, size: usize) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed), rows, size)
    }
    fn from_rng(rng: SmallRng, rows: usize, size: usize) -> Self {
        Self {
            rng,
            rows,
            size,
            values: Vec::with_capacity(rows),
        }
    }

    /// Uniformly random shard out of `tables`.
    pub fn shard(&mut self, tables: usize) -> Shard {
        debug_assert!(tables > 0);
        Shard::from(self.rng.random_range(0..tables))
    }

    /// One random row payload.
    pub fn payload(&mut self) -> String {
        (&mut self.rng)
            .sample_iter(Alphanumeric)
            .take(self.size)
            .map(char::from)
            .collect()
    }

    /// One INSERT statement with `rows` value tuples.
    pub fn statement(&mut self, shard: Shard) -> String {
        self.values.clear();
        for _ in 0..self.rows {
            let payload = self.payload();
            self.values.push(payload);
        }
        shard.inserts(&self.values)
    }

    /// `n` INSERT statements, all against the same shard.
    pub fn batch(&mut self, shard: Shard, n: usize) -> Batch {
        (0..n).map(|_| self.statement(shard)).collect()
    }
}
