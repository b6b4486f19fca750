//! Validated payline patterns.

use crate::config::ConfigError;
use reelhall_types::slots::{Payline, MAX_PAYLINES, REEL_COUNT, ROW_COUNT};

/// Immutable, ordered set of payline patterns.
///
/// Position within the set is a line's identity in spin results, so the
/// declaration order is preserved exactly; duplicate patterns are allowed
/// and pay independently.
#[derive(Clone, Debug)]
pub struct PaylineSet {
    lines: Vec<Payline>,
}

impl PaylineSet {
    /// Validate raw payline rows into a set.
    ///
    /// Rejects empty or oversized sets, patterns that do not supply exactly
    /// one row per reel, and row indices outside the grid.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self, ConfigError> {
        if rows.is_empty() {
            return Err(ConfigError::NoPaylines);
        }
        if rows.len() > MAX_PAYLINES {
            return Err(ConfigError::TooManyPaylines(rows.len()));
        }
        let mut lines = Vec::with_capacity(rows.len());
        for (index, rows_for_line) in rows.iter().enumerate() {
            if rows_for_line.len() != REEL_COUNT {
                return Err(ConfigError::WrongPaylineLength {
                    index,
                    got: rows_for_line.len(),
                });
            }
            let mut pattern = [0u8; REEL_COUNT];
            for (reel, &row) in rows_for_line.iter().enumerate() {
                if usize::from(row) >= ROW_COUNT {
                    return Err(ConfigError::PaylineRowOutOfRange { index, row });
                }
                pattern[reel] = row;
            }
            lines.push(Payline(pattern));
        }
        Ok(Self { lines })
    }

    /// Number of paylines in the set.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Pattern at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Payline> {
        self.lines.get(index)
    }

    /// Patterns in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Payline> {
        self.lines.iter()
    }

    /// All patterns as a slice, in declaration order.
    pub fn patterns(&self) -> &[Payline] {
        &self.lines
    }
}
