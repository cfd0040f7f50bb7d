//! Observer records emitted by pools.

use core::fmt;

use super::{Address, Amount, Shares};

/// A record of a completed pool state transition, kept for observers.
///
/// Pools append one event per committed operation (plus a `Sync` for
/// every reserve reconciliation). Events are never emitted for failed
/// operations — a record exists only if the whole operation committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolEvent {
    /// Liquidity was contributed and shares were issued.
    Mint {
        /// Amount of `asset0` contributed since the last reconciliation.
        amount0: Amount,
        /// Amount of `asset1` contributed since the last reconciliation.
        amount1: Amount,
        /// Shares credited for the contribution.
        shares: Shares,
        /// Holder the shares were credited to.
        recipient: Address,
    },
    /// Shares held by the pool were burned and assets paid out.
    Burn {
        /// `asset0` paid out.
        amount0: Amount,
        /// `asset1` paid out.
        amount1: Amount,
        /// Shares burned from the pool's own custody.
        shares: Shares,
        /// Account the assets were paid to.
        recipient: Address,
    },
    /// A swap committed.
    Swap {
        /// Inferred `asset0` input.
        amount0_in: Amount,
        /// Inferred `asset1` input.
        amount1_in: Amount,
        /// `asset0` output transferred.
        amount0_out: Amount,
        /// `asset1` output transferred.
        amount1_out: Amount,
        /// Account the output was paid to.
        recipient: Address,
    },
    /// Stored reserves were reconciled to true balances.
    Sync {
        /// New `asset0` reserve.
        reserve0: Amount,
        /// New `asset1` reserve.
        reserve1: Amount,
    },
}

impl fmt::Display for PoolEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mint {
                amount0,
                amount1,
                shares,
                recipient,
            } => write!(
                f,
                "mint {amount0}/{amount1} -> {shares} shares to {recipient}"
            ),
            Self::Burn {
                amount0,
                amount1,
                shares,
                recipient,
            } => write!(f, "burn {shares} shares -> {amount0}/{amount1} to {recipient}"),
            Self::Swap {
                amount0_in,
                amount1_in,
                amount0_out,
                amount1_out,
                recipient,
            } => write!(
                f,
                "swap in {amount0_in}/{amount1_in} out {amount0_out}/{amount1_out} to {recipient}"
            ),
            Self::Sync { reserve0, reserve1 } => {
                write!(f, "sync reserves to {reserve0}/{reserve1}")
            }
        }
    }
}
