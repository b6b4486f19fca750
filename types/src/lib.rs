//! Common types used throughout reelhall.
//!
//! Shared vocabulary between the spin engine and the transport service:
//! grid geometry, payline patterns, amounts in minor units, and the JSON
//! wire messages exchanged over the spin socket.

pub mod api;
pub mod slots;

pub use api::{
    cents_to_decimal, normalize_amount, AmountError, ClientMessage, ServerMessage,
    WinningLineView, MAX_WIRE_AMOUNT,
};
pub use slots::{
    Payline, ReelGrid, SpinResult, WinningLine, CENTS_PER_UNIT, MAX_PAYLINES, MAX_SYMBOLS,
    MIN_PAYING_RUN, MULTIPLIER_SLOTS, REEL_COUNT, ROW_COUNT,
};
