//! Explicit rounding direction for integer division.

/// Specifies the rounding direction for division on domain types.
///
/// Every division in the engine names its rounding direction explicitly;
/// the rule throughout is that rounding always favours the pool, never
/// the caller (payouts round down, required inputs round up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round towards positive infinity (ceiling).
    Up,
    /// Round towards zero (floor).
    Down,
}
