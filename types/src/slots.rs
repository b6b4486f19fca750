use serde::{Deserialize, Serialize};

/// Number of reels in a grid
pub const REEL_COUNT: usize = 5;

/// Number of visible rows per reel
pub const ROW_COUNT: usize = 3;

/// Number of multiplier slots per symbol (match counts 1 through 5)
pub const MULTIPLIER_SLOTS: usize = 5;

/// Shortest run that can pay
pub const MIN_PAYING_RUN: u8 = 3;

/// Maximum number of symbols in a table (indices must fit in a u8)
pub const MAX_SYMBOLS: usize = 32;

/// Maximum number of paylines in a set (indices must fit in a u8)
pub const MAX_PAYLINES: usize = 100;

/// Minor units per whole currency unit
pub const CENTS_PER_UNIT: u64 = 100;

/// A payline pattern: one row index per reel.
///
/// The position of a payline within its set is the line's identity in
/// results; two identical patterns at different positions pay
/// independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline(pub [u8; REEL_COUNT]);

impl Payline {
    /// Row selected on the given reel.
    pub fn row(&self, reel: usize) -> usize {
        self.0[reel] as usize
    }
}

/// A 5x3 arrangement of symbol table indices, reel-major.
///
/// Produced once per spin and never mutated afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReelGrid {
    cells: [[u8; ROW_COUNT]; REEL_COUNT],
}

impl ReelGrid {
    pub fn from_cells(cells: [[u8; ROW_COUNT]; REEL_COUNT]) -> Self {
        Self { cells }
    }

    /// Symbol index at (reel, row).
    pub fn cell(&self, reel: usize, row: usize) -> u8 {
        self.cells[reel][row]
    }

    /// All rows of one reel, top to bottom.
    pub fn reel(&self, reel: usize) -> &[u8; ROW_COUNT] {
        &self.cells[reel]
    }
}

/// A single paying line within a spin result.
///
/// `symbol` is an index into the symbol table that produced the grid;
/// `win` is in minor units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WinningLine {
    pub line_index: u8,
    pub count: u8,
    pub symbol: u8,
    pub win: u64,
}

/// Outcome of one spin: the grid, the total win in minor units, and the
/// paying lines in ascending line-index order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpinResult {
    pub grid: ReelGrid,
    pub total_win: u64,
    pub winning_lines: Vec<WinningLine>,
}
