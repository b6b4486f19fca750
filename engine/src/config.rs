//! Game configuration records and startup validation.
//!
//! Configuration arrives either as the built-in default table or as a YAML
//! document with the same shape:
//!
//! ```yaml
//! symbols:
//!   - id: cherry
//!     weight: 6
//!     multipliers: [0, 0, 5, 25, 200]
//! paylines:
//!   - [1, 1, 1, 1, 1]
//! ```
//!
//! Records are deliberately loose (`Vec` lengths, unchecked rows) so that a
//! malformed document is representable and rejected by validation rather
//! than by the parser. Validation runs once at startup and any failure is
//! fatal; a validated [`SymbolTable`](crate::table::SymbolTable) and
//! [`PaylineSet`](crate::lines::PaylineSet) cannot fail per spin.

use reelhall_types::slots::{
    MAX_PAYLINES, MAX_SYMBOLS, MIN_PAYING_RUN, MULTIPLIER_SLOTS, REEL_COUNT, ROW_COUNT,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a game configuration is rejected at startup.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("symbol set is empty")]
    NoSymbols,
    #[error("too many symbols: {0} (limit {MAX_SYMBOLS})")]
    TooManySymbols(usize),
    #[error("symbol at position {0} has an empty identifier")]
    EmptySymbolId(usize),
    #[error("duplicate symbol identifier {0:?}")]
    DuplicateSymbolId(String),
    #[error("symbol {id:?} has zero weight")]
    ZeroWeight { id: String },
    #[error("symbol {id:?} has {got} multipliers (expected {MULTIPLIER_SLOTS})")]
    WrongMultiplierCount { id: String, got: usize },
    #[error("symbol {id:?} pays {got} at count {count}; counts below {MIN_PAYING_RUN} never pay")]
    PayoutBelowMinimumRun { id: String, count: usize, got: u32 },
    #[error("payline set is empty")]
    NoPaylines,
    #[error("too many paylines: {0} (limit {MAX_PAYLINES})")]
    TooManyPaylines(usize),
    #[error("payline {index} has {got} rows (expected {REEL_COUNT})")]
    WrongPaylineLength { index: usize, got: usize },
    #[error("payline {index} references row {row} (valid rows are 0..{ROW_COUNT})")]
    PaylineRowOutOfRange { index: usize, row: u8 },
    #[error("could not parse game config: {0}")]
    Parse(String),
}

/// One symbol as declared in configuration.
///
/// `multipliers` is indexed by match count 1..5; the first two entries are
/// zero in any valid table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSpec {
    pub id: String,
    pub weight: u32,
    pub multipliers: Vec<u32>,
}

impl SymbolSpec {
    pub fn new(id: &str, weight: u32, multipliers: [u32; MULTIPLIER_SLOTS]) -> Self {
        Self {
            id: id.to_string(),
            weight,
            multipliers: multipliers.to_vec(),
        }
    }
}

/// A full game configuration: symbols in declaration order plus the
/// payline patterns in declaration order.
///
/// Declaration order matters twice over: weighted draws walk symbols in
/// order, and a payline's position is its identity in results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub symbols: Vec<SymbolSpec>,
    pub paylines: Vec<Vec<u8>>,
}

impl GameConfig {
    /// Parse a YAML game configuration document.
    ///
    /// Parsing only checks shape; the result still has to pass validation
    /// via [`SlotMachine::new`](crate::machine::SlotMachine::new).
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(contents).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            symbols: vec![
                SymbolSpec::new("jackpot", 1, [0, 0, 500, 2500, 10000]),
                SymbolSpec::new("bell", 2, [0, 0, 100, 500, 2500]),
                SymbolSpec::new("orange", 4, [0, 0, 20, 100, 500]),
                SymbolSpec::new("plum", 4, [0, 0, 15, 75, 400]),
                SymbolSpec::new("lemon", 5, [0, 0, 10, 50, 300]),
                SymbolSpec::new("cherry", 6, [0, 0, 5, 25, 200]),
            ],
            paylines: vec![
                vec![1, 1, 1, 1, 1], // middle
                vec![0, 0, 0, 0, 0], // top
                vec![2, 2, 2, 2, 2], // bottom
                vec![0, 1, 2, 1, 0], // v
                vec![2, 1, 0, 1, 2], // inverted v
                vec![0, 0, 1, 2, 2], // diagonal down
                vec![2, 2, 1, 0, 0], // diagonal up
                vec![1, 0, 0, 0, 1], // u top
                vec![1, 2, 2, 2, 1], // u bottom
                vec![0, 1, 1, 1, 0], // small v
                vec![2, 1, 1, 1, 2], // small inverted v
                vec![1, 1, 0, 1, 1], // top bump
                vec![1, 1, 2, 1, 1], // bottom bump
                vec![0, 1, 0, 1, 0], // w top
                vec![2, 1, 2, 1, 2], // w bottom
                vec![1, 0, 1, 0, 1], // zigzag top
                vec![1, 2, 1, 2, 1], // zigzag bottom
                vec![0, 2, 0, 2, 0], // wide zigzag top
                vec![2, 0, 2, 0, 2], // wide zigzag bottom
                vec![1, 1, 1, 1, 1], // middle, doubled
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::SlotMachine;

    #[test]
    fn default_config_validates() {
        let config = GameConfig::default();
        assert_eq!(config.symbols.len(), 6);
        assert_eq!(config.paylines.len(), 20);
        assert!(SlotMachine::new(&config).is_ok());
    }

    #[test]
    fn default_middle_line_is_doubled() {
        let config = GameConfig::default();
        assert_eq!(config.paylines[0], config.paylines[19]);
        assert_eq!(config.paylines[0], vec![1, 1, 1, 1, 1]);
    }

    #[test]
    fn default_total_weight() {
        let config = GameConfig::default();
        let total: u32 = config.symbols.iter().map(|s| s.weight).sum();
        assert_eq!(total, 22);
    }

    #[test]
    fn yaml_round_trip() {
        let yaml = r#"
symbols:
  - id: gold
    weight: 1
    multipliers: [0, 0, 10, 20, 50]
  - id: silver
    weight: 3
    multipliers: [0, 0, 2, 4, 8]
paylines:
  - [0, 0, 0, 0, 0]
  - [1, 1, 1, 1, 1]
"#;
        let config = GameConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.symbols.len(), 2);
        assert_eq!(config.symbols[0].id, "gold");
        assert_eq!(config.symbols[1].weight, 3);
        assert_eq!(config.paylines, vec![vec![0, 0, 0, 0, 0], vec![1, 1, 1, 1, 1]]);
        assert!(SlotMachine::new(&config).is_ok());
    }

    #[test]
    fn yaml_parse_failure_is_reported() {
        let err = GameConfig::from_yaml("symbols: [not a symbol").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn yaml_accepts_malformed_shapes_for_validation_to_reject() {
        // A six-entry multiplier list parses fine; construction rejects it.
        let yaml = r#"
symbols:
  - id: gold
    weight: 1
    multipliers: [0, 0, 10, 20, 50, 99]
paylines:
  - [0, 0, 0, 0, 0]
"#;
        let config = GameConfig::from_yaml(yaml).unwrap();
        let err = SlotMachine::new(&config).unwrap_err();
        assert_eq!(
            err,
            ConfigError::WrongMultiplierCount {
                id: "gold".to_string(),
                got: 6
            }
        );
    }
}
