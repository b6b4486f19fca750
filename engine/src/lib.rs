//! Reelhall outcome generation and payline evaluation.
//!
//! This crate contains the authoritative slot logic: the validated symbol
//! table, weighted symbol draws, 5x3 grid generation, and payline
//! evaluation. The transport service drives it; nothing here performs I/O,
//! blocks, or suspends.
//!
//! ## Determinism requirements
//! - Randomness enters only through the `rand::Rng` passed to a draw; the
//!   same generator state always yields the same grid.
//! - Evaluation is a pure function of grid and bet; evaluating the same
//!   grid twice yields identical results.
//! - Amounts are integer minor units end to end, so wins are exact.
//!
//! ## Configuration invariants
//! All table and payline validation happens once, in [`SlotMachine::new`]
//! (or the underlying [`SymbolTable::from_specs`] and
//! [`PaylineSet::from_rows`]). A constructed machine cannot fail at spin
//! time.

pub mod config;
pub mod lines;
pub mod machine;
pub mod table;


pub use config::{ConfigError, GameConfig, SymbolSpec};
pub use lines::PaylineSet;
pub use machine::SlotMachine;
pub use table::SymbolTable;
