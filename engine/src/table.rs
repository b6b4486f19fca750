//! Validated symbol table and weighted draws.
//!
//! The table is built once from configuration and never mutated. A draw
//! samples a uniform value in `[0, total_weight)` and walks the symbols in
//! declaration order, subtracting each weight until the remainder reaches
//! zero or below; the symbol whose weight causes the crossing is selected,
//! including the exact-zero boundary case.

use crate::config::{ConfigError, SymbolSpec};
use rand::Rng;
use reelhall_types::slots::{MAX_SYMBOLS, MIN_PAYING_RUN, MULTIPLIER_SLOTS};

/// Immutable catalog of symbols: identifiers, selection weights, and payout
/// multipliers, all in declaration order.
///
/// Symbols are referred to by their `u8` position in this table everywhere
/// inside the engine; identifiers only appear at the configuration and wire
/// boundaries.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    ids: Vec<String>,
    weights: Vec<u32>,
    multipliers: Vec<[u32; MULTIPLIER_SLOTS]>,
    total_weight: u64,
}

impl SymbolTable {
    /// Validate raw symbol records into a table.
    ///
    /// Rejects empty or oversized sets, empty or duplicate identifiers,
    /// zero weights, multiplier lists of the wrong length, and multipliers
    /// that pay below the minimum run.
    pub fn from_specs(specs: &[SymbolSpec]) -> Result<Self, ConfigError> {
        if specs.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        if specs.len() > MAX_SYMBOLS {
            return Err(ConfigError::TooManySymbols(specs.len()));
        }
        let mut ids: Vec<String> = Vec::with_capacity(specs.len());
        let mut weights = Vec::with_capacity(specs.len());
        let mut multipliers = Vec::with_capacity(specs.len());
        let mut total_weight = 0u64;
        for (position, spec) in specs.iter().enumerate() {
            if spec.id.is_empty() {
                return Err(ConfigError::EmptySymbolId(position));
            }
            if ids.contains(&spec.id) {
                return Err(ConfigError::DuplicateSymbolId(spec.id.clone()));
            }
            if spec.weight == 0 {
                return Err(ConfigError::ZeroWeight {
                    id: spec.id.clone(),
                });
            }
            if spec.multipliers.len() != MULTIPLIER_SLOTS {
                return Err(ConfigError::WrongMultiplierCount {
                    id: spec.id.clone(),
                    got: spec.multipliers.len(),
                });
            }
            let mut row = [0u32; MULTIPLIER_SLOTS];
            row.copy_from_slice(&spec.multipliers);
            for slot in 0..(MIN_PAYING_RUN as usize - 1) {
                if row[slot] != 0 {
                    return Err(ConfigError::PayoutBelowMinimumRun {
                        id: spec.id.clone(),
                        count: slot + 1,
                        got: row[slot],
                    });
                }
            }
            total_weight += u64::from(spec.weight);
            ids.push(spec.id.clone());
            weights.push(spec.weight);
            multipliers.push(row);
        }
        Ok(Self {
            ids,
            weights,
            multipliers,
            total_weight,
        })
    }

    /// Number of symbols in the table.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifier of the symbol at `symbol`.
    pub fn id(&self, symbol: u8) -> &str {
        &self.ids[symbol as usize]
    }

    /// Position of the symbol with the given identifier, if present.
    pub fn index_of(&self, id: &str) -> Option<u8> {
        self.ids.iter().position(|known| known == id).map(|ix| ix as u8)
    }

    /// Selection weight of the symbol at `symbol`.
    pub fn weight(&self, symbol: u8) -> u32 {
        self.weights[symbol as usize]
    }

    /// Sum of all symbol weights.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Full multiplier row of the symbol at `symbol`, indexed by match
    /// count 1..5.
    pub fn multipliers(&self, symbol: u8) -> &[u32; MULTIPLIER_SLOTS] {
        &self.multipliers[symbol as usize]
    }

    /// Multiplier paid by `symbol` for a run of `count` (1..=5).
    pub fn multiplier(&self, symbol: u8, count: u8) -> u32 {
        self.multipliers[symbol as usize][count as usize - 1]
    }

    /// Identifiers in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Draw one symbol with probability proportional to its weight.
    pub fn draw(&self, rng: &mut impl Rng) -> u8 {
        let roll = rng.gen::<f64>() * self.total_weight as f64;
        self.pick(roll)
    }

    /// Select the symbol whose cumulative weight range contains `roll`.
    ///
    /// A remainder of exactly zero selects the symbol that produced it,
    /// not the next one. Any roll inside `[0, total_weight)` crosses zero
    /// within the loop; a roll outside that range lands on the first
    /// symbol so a draw can never fail.
    fn pick(&self, roll: f64) -> u8 {
        let mut remainder = roll;
        for (ix, weight) in self.weights.iter().enumerate() {
            remainder -= f64::from(*weight);
            if remainder <= 0.0 {
                return ix as u8;
            }
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    /// Replays a fixed list of raw generator outputs.
    struct ScriptedRng {
        values: Vec<u64>,
        next: usize,
    }

    impl ScriptedRng {
        fn new(values: Vec<u64>) -> Self {
            Self { values, next: 0 }
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            self.next_u64() as u32
        }

        fn next_u64(&mut self) -> u64 {
            let value = self.values[self.next];
            self.next += 1;
            value
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn default_table() -> SymbolTable {
        SymbolTable::from_specs(&GameConfig::default().symbols).unwrap()
    }

    fn spec(id: &str, weight: u32, multipliers: [u32; 5]) -> SymbolSpec {
        SymbolSpec::new(id, weight, multipliers)
    }

    #[test]
    fn test_default_table_layout() {
        let table = default_table();
        assert_eq!(table.len(), 6);
        assert_eq!(table.total_weight(), 22);
        assert_eq!(table.id(0), "jackpot");
        assert_eq!(table.id(5), "cherry");
        assert_eq!(table.index_of("orange"), Some(2));
        assert_eq!(table.index_of("seven"), None);
        assert_eq!(table.weight(4), 5);
        assert_eq!(table.multiplier(5, 5), 200);
        assert_eq!(table.multiplier(5, 3), 5);
        assert_eq!(table.multipliers(0), &[0, 0, 500, 2500, 10000]);
        let ids: Vec<&str> = table.ids().collect();
        assert_eq!(ids, vec!["jackpot", "bell", "orange", "plum", "lemon", "cherry"]);
    }

    #[test]
    fn test_validation_rejects_empty_set() {
        let err = SymbolTable::from_specs(&[]).unwrap_err();
        assert_eq!(err, ConfigError::NoSymbols);
    }

    #[test]
    fn test_validation_rejects_oversized_set() {
        let specs: Vec<SymbolSpec> = (0..MAX_SYMBOLS + 1)
            .map(|i| spec(&format!("s{i}"), 1, [0, 0, 1, 2, 3]))
            .collect();
        let err = SymbolTable::from_specs(&specs).unwrap_err();
        assert_eq!(err, ConfigError::TooManySymbols(MAX_SYMBOLS + 1));
    }

    #[test]
    fn test_validation_rejects_empty_id() {
        let specs = vec![spec("ok", 1, [0, 0, 1, 2, 3]), spec("", 1, [0, 0, 1, 2, 3])];
        let err = SymbolTable::from_specs(&specs).unwrap_err();
        assert_eq!(err, ConfigError::EmptySymbolId(1));
    }

    #[test]
    fn test_validation_rejects_duplicate_id() {
        let specs = vec![spec("twin", 1, [0, 0, 1, 2, 3]), spec("twin", 2, [0, 0, 1, 2, 3])];
        let err = SymbolTable::from_specs(&specs).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateSymbolId("twin".to_string()));
    }

    #[test]
    fn test_validation_rejects_zero_weight() {
        let specs = vec![spec("weightless", 0, [0, 0, 1, 2, 3])];
        let err = SymbolTable::from_specs(&specs).unwrap_err();
        assert_eq!(
            err,
            ConfigError::ZeroWeight {
                id: "weightless".to_string()
            }
        );
    }

    #[test]
    fn test_validation_rejects_wrong_multiplier_count() {
        let short = SymbolSpec {
            id: "short".to_string(),
            weight: 1,
            multipliers: vec![0, 0, 1, 2],
        };
        let err = SymbolTable::from_specs(&[short]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::WrongMultiplierCount {
                id: "short".to_string(),
                got: 4
            }
        );
    }

    #[test]
    fn test_validation_rejects_payout_below_minimum_run() {
        let specs = vec![spec("eager", 1, [0, 7, 1, 2, 3])];
        let err = SymbolTable::from_specs(&specs).unwrap_err();
        assert_eq!(
            err,
            ConfigError::PayoutBelowMinimumRun {
                id: "eager".to_string(),
                count: 2,
                got: 7
            }
        );
    }

    #[test]
    fn test_draw_returns_valid_indices_and_covers_table() {
        let table = default_table();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = [false; 6];
        for _ in 0..1000 {
            let symbol = table.draw(&mut rng);
            assert!((symbol as usize) < table.len());
            seen[symbol as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "all symbols should appear in 1000 draws");
    }

    // gen::<f64>() takes the top 53 bits of next_u64, so a raw value of
    // v << 11 yields exactly v / 2^53. 2^62 therefore yields 0.25.
    const RAW_QUARTER: u64 = 1 << 62;

    #[test]
    fn test_draw_boundary_selects_crossing_symbol() {
        // Weights 1,1,2: total 4. A roll of exactly 1.0 drives the first
        // symbol's remainder to zero and must select it, not the second.
        let table = SymbolTable::from_specs(&[
            spec("a", 1, [0, 0, 1, 1, 1]),
            spec("b", 1, [0, 0, 1, 1, 1]),
            spec("c", 2, [0, 0, 1, 1, 1]),
        ])
        .unwrap();
        let mut rng = ScriptedRng::new(vec![RAW_QUARTER]);
        assert_eq!(table.draw(&mut rng), 0);
    }

    #[test]
    fn test_draw_just_past_boundary_selects_next_symbol() {
        let table = SymbolTable::from_specs(&[
            spec("a", 1, [0, 0, 1, 1, 1]),
            spec("b", 1, [0, 0, 1, 1, 1]),
            spec("c", 2, [0, 0, 1, 1, 1]),
        ])
        .unwrap();
        // One ulp above 0.25 lands the roll just past the first weight.
        let mut rng = ScriptedRng::new(vec![RAW_QUARTER + (1 << 11)]);
        assert_eq!(table.draw(&mut rng), 1);
    }

    #[test]
    fn test_draw_extremes_select_first_and_last() {
        let table = default_table();
        let mut low = ScriptedRng::new(vec![0]);
        assert_eq!(table.draw(&mut low), 0);
        let mut high = ScriptedRng::new(vec![u64::MAX]);
        assert_eq!(table.draw(&mut high), (table.len() - 1) as u8);
    }

    #[test]
    fn test_pick_out_of_range_falls_back_to_first_symbol() {
        let table = default_table();
        assert_eq!(table.pick(table.total_weight() as f64 + 1.0), 0);
    }
}
