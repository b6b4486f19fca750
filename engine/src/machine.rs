//! The spin engine: grid generation and payline evaluation.
//!
//! A [`SlotMachine`] is the validated pairing of a symbol table and a
//! payline set. It is immutable after construction and safe to share
//! across concurrent spins; each call owns its own grid and result, and
//! randomness enters only through the caller's generator.

use crate::config::{ConfigError, GameConfig};
use crate::lines::PaylineSet;
use crate::table::SymbolTable;
use rand::Rng;
use reelhall_types::slots::{
    ReelGrid, SpinResult, WinningLine, MIN_PAYING_RUN, REEL_COUNT, ROW_COUNT,
};

/// Immutable spin engine over a validated symbol table and payline set.
#[derive(Clone, Debug)]
pub struct SlotMachine {
    table: SymbolTable,
    lines: PaylineSet,
}

impl SlotMachine {
    /// Validate a configuration into a ready machine.
    ///
    /// Any [`ConfigError`] here is fatal at startup; a constructed machine
    /// has no failure path at spin time.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            table: SymbolTable::from_specs(&config.symbols)?,
            lines: PaylineSet::from_rows(&config.paylines)?,
        })
    }

    /// The validated symbol table.
    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// The validated payline set.
    pub fn lines(&self) -> &PaylineSet {
        &self.lines
    }

    /// Fill a fresh 5x3 grid with fifteen independent weighted draws.
    ///
    /// Every cell is sampled with the same flat per-symbol weights; there
    /// are no reel strips and no positional weighting.
    pub fn draw_grid(&self, rng: &mut impl Rng) -> ReelGrid {
        let mut cells = [[0u8; ROW_COUNT]; REEL_COUNT];
        for reel in cells.iter_mut() {
            for cell in reel.iter_mut() {
                *cell = self.table.draw(rng);
            }
        }
        ReelGrid::from_cells(cells)
    }

    /// Score a grid against every payline for the given bet in minor
    /// units.
    ///
    /// Lines are scanned in declaration order and winning entries keep
    /// that order. A run counts consecutive matches of the leftmost
    /// symbol only; it must reach [`MIN_PAYING_RUN`] and carry a nonzero
    /// multiplier to pay.
    pub fn evaluate(&self, grid: &ReelGrid, bet: u64) -> SpinResult {
        let mut total_win = 0u64;
        let mut winning_lines = Vec::new();
        for (index, line) in self.lines.iter().enumerate() {
            let first = grid.cell(0, line.row(0));
            let mut count: u8 = 1;
            for reel in 1..REEL_COUNT {
                if grid.cell(reel, line.row(reel)) != first {
                    break;
                }
                count += 1;
            }
            if count < MIN_PAYING_RUN {
                continue;
            }
            let win = bet * u64::from(self.table.multiplier(first, count));
            if win == 0 {
                continue;
            }
            winning_lines.push(WinningLine {
                line_index: index as u8,
                count,
                symbol: first,
                win,
            });
            total_win += win;
        }
        SpinResult {
            grid: *grid,
            total_win,
            winning_lines,
        }
    }

    /// Draw a grid and evaluate it in one step.
    pub fn spin(&self, rng: &mut impl Rng, bet: u64) -> SpinResult {
        let grid = self.draw_grid(rng);
        self.evaluate(&grid, bet)
    }
}
