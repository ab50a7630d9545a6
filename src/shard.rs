//! Shard table naming and SQL rendering.
use crate::*;
use std::fmt::Display;
use std::fmt::Formatter;

const CREATE: &str = const_format::concatcp!("CREATE TABLE IF NOT EXISTS ", TABLE);
const COLUMNS: &str = " (id BIGINT NOT NULL AUTO_INCREMENT, raw_bytes BLOB NOT NULL, PRIMARY KEY (id))";
const INSERT: &str = const_format::concatcp!("INSERT INTO ", TABLE);
const VALUES: &str = "(raw_bytes) VALUES ";

/// Index of one of the sharded tables.
///
/// Shard 0 is `block_writer`; shard `i > 0` is `block_writer{i}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Shard(usize);

impl From<usize> for Shard {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl From<Shard> for usize {
    fn from(shard: Shard) -> Self {
        shard.0
    }
}

impl Shard {
    /// Every shard of a case with `n` tables, in index order.
    pub fn all(n: usize) -> impl Iterator<Item = Self> {
        (0..n).map(Self)
    }
    pub fn index(&self) -> usize {
        self.0
    }
    fn suffix(&self) -> String {
        match self.0 {
            0 => String::new(),
            i => i.to_string(),
        }
    }
    pub fn name(&self) -> String {
        format!("{}{}", TABLE, self.suffix())
    }
    /// `CREATE TABLE IF NOT EXISTS` statement for this shard.
    pub fn creates(&self) -> String {
        format!("{}{}{}", CREATE, self.suffix(), COLUMNS)
    }
    /// Multi-row INSERT of the given payloads, each wrapped in single quotes.
    /// Payloads are not escaped.
    pub fn inserts<I, S>(&self, payloads: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = payloads
            .into_iter()
            .map(|p| format!("('{}')", p.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}{}{}{}", INSERT, self.suffix(), VALUES, rows)
    }
}

impl Display for Shard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
