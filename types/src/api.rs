use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::slots::CENTS_PER_UNIT;

/// Largest decimal amount accepted or emitted on the wire, in whole units
pub const MAX_WIRE_AMOUNT: f64 = 1_000_000_000.0;

/// Messages sent by a client over the spin socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "spin")]
    Spin {
        #[serde(rename = "requestId")]
        request_id: Option<String>,
        bet: f64,
    },
}

/// One paying line of a spin result as rendered on the wire.
#[derive(Clone, Debug, Serialize)]
pub struct WinningLineView {
    #[serde(rename = "lineIndex")]
    pub line_index: u8,
    pub count: u8,
    pub symbol: String,
    pub win: f64,
}

/// Messages sent by the server over the spin socket.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "welcome")]
    Welcome {
        #[serde(rename = "sessionId")]
        session_id: String,
        balance: f64,
        #[serde(rename = "minBet")]
        min_bet: f64,
        #[serde(rename = "maxBet")]
        max_bet: f64,
    },
    #[serde(rename = "spinResult")]
    SpinResult {
        #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
        reels: Vec<Vec<String>>,
        #[serde(rename = "totalWin")]
        total_win: f64,
        #[serde(rename = "winningLines")]
        winning_lines: Vec<WinningLineView>,
        balance: f64,
    },
    #[serde(rename = "error")]
    Error {
        #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
        code: String,
        message: String,
    },
}

/// Reasons a wire amount fails to normalize to minor units.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is not a finite number")]
    NotFinite,
    #[error("amount must be positive")]
    NotPositive,
    #[error("amount exceeds the wire maximum")]
    TooLarge,
    #[error("amount is not representable in minor units")]
    OffGrid,
}

/// Convert a decimal wire amount to minor units.
///
/// Rejects non-finite, non-positive, and oversized values, as well as
/// values that do not sit on the minor-unit grid (e.g. 0.005).
pub fn normalize_amount(amount: f64) -> Result<u64, AmountError> {
    if !amount.is_finite() {
        return Err(AmountError::NotFinite);
    }
    if amount <= 0.0 {
        return Err(AmountError::NotPositive);
    }
    if amount > MAX_WIRE_AMOUNT {
        return Err(AmountError::TooLarge);
    }
    let scaled = amount * CENTS_PER_UNIT as f64;
    let cents = scaled.round();
    // Tolerance covers f64 representation error at the wire maximum while
    // still rejecting anything a tenth of a cent or more off the grid.
    if (scaled - cents).abs() > 1e-3 {
        return Err(AmountError::OffGrid);
    }
    Ok(cents as u64)
}

/// Render minor units as a decimal wire amount.
pub fn cents_to_decimal(cents: u64) -> f64 {
    cents as f64 / CENTS_PER_UNIT as f64
}
