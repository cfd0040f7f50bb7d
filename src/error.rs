//! Unified error types for the Tidepool AMM engine.
//!
//! All fallible operations across the crate return [`AmmError`] as their
//! error type, ensuring a consistent error handling experience for
//! consumers.
//!
//! Errors fall into three families:
//!
//! - **Input validation** (`IdenticalAssets`, `ZeroAsset`, `PathTooShort`,
//!   `InsufficientAmount`, …) — caller errors, avoidable by construction.
//! - **Economic conditions** (`InsufficientLiquidity`, `SlippageTooLow`,
//!   `InvariantViolated`, …) — depend on pool state at call time; callers
//!   are expected to re-quote and retry with fresh parameters.
//! - **State guards** (`AlreadyInitialized`, `PairExists`, `Reentrant`) —
//!   programming or attack-surface errors that never fire under correct
//!   single-caller use.
//!
//! Every error aborts the whole operation it occurred in; nothing is
//! silently downgraded to a default value and nothing is retried
//! internally.

use thiserror::Error;

/// Unified error enum for all Tidepool operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmmError {
    /// Both assets of a prospective pair share the same address.
    #[error("identical assets: a pair requires two distinct asset addresses")]
    IdenticalAssets,

    /// One of the assets is the all-zero null address.
    #[error("zero asset: the null address cannot back a pool")]
    ZeroAsset,

    /// A pool for this asset pair already exists in the registry.
    #[error("pair exists: the registry already holds a pool for this pair")]
    PairExists,

    /// No pool exists for the requested asset pair.
    #[error("pool not found for the requested asset pair")]
    PoolNotFound,

    /// The pool has already been bound to an asset pair.
    #[error("already initialized: a pool binds its asset pair exactly once")]
    AlreadyInitialized,

    /// The pool has not been bound to an asset pair yet.
    #[error("not initialized: the pool has no asset pair bound")]
    NotInitialized,

    /// A pool operation re-entered the pool it was already executing in.
    #[error("reentrant call into a pool that is mid-operation")]
    Reentrant,

    /// The contribution was too small to mint any liquidity shares.
    #[error("insufficient liquidity minted: contribution rounds to zero shares")]
    InsufficientLiquidityMinted,

    /// The pool holds no shares in its own custody to burn.
    #[error("no liquidity to burn: the pool holds no shares of its own")]
    NoLiquidityToBurn,

    /// The burned shares entitle the holder to a zero payout in at least
    /// one asset.
    #[error("insufficient liquidity burned: pro-rata payout rounds to zero")]
    InsufficientLiquidityBurned,

    /// A swap requested output in both assets, or in neither.
    #[error("invalid output request: exactly one output amount must be positive")]
    InvalidOutputRequest,

    /// The swap recipient is one of the pool's own asset addresses.
    #[error("invalid recipient: cannot pay swap output to a pool asset")]
    InvalidRecipient,

    /// Reserves cannot cover the requested output.
    #[error("insufficient liquidity: requested output meets or exceeds the reserve")]
    InsufficientLiquidity,

    /// No input was observed on either side of a swap.
    #[error("insufficient input: no deposit was observed for this swap")]
    InsufficientInput,

    /// The fee-adjusted constant product decreased.
    #[error("invariant violated: fee-adjusted product fell below the prior product")]
    InvariantViolated,

    /// A quote was requested for a zero amount.
    #[error("insufficient amount: quoting requires a positive input amount")]
    InsufficientAmount,

    /// The realized amount fell below the caller-supplied minimum.
    #[error("slippage too low: realized amount is below the stated minimum")]
    SlippageTooLow,

    /// The required input exceeded the caller-supplied maximum.
    #[error("excessive input: required input exceeds the stated maximum")]
    ExcessiveInput,

    /// A swap path contained fewer than two assets.
    #[error("path too short: a swap path needs at least two assets")]
    PathTooShort,

    /// A share transfer exceeded the holder's share balance.
    #[error("insufficient shares for transfer")]
    InsufficientShares,

    /// The asset-transfer collaborator rejected a transfer.
    #[error("transfer failed: {0}")]
    TransferFailed(&'static str),

    /// A reserve reconciliation would exceed the fixed-width reserve range.
    #[error("reserve overflow: balance exceeds the reserve ceiling")]
    ReserveOverflow,

    /// Arithmetic overflow in an intermediate computation.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),
}

/// Convenience alias used by every fallible operation in the crate.
pub type Result<T> = core::result::Result<T, AmmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_condition() {
        let msg = AmmError::PairExists.to_string();
        assert!(msg.contains("pair exists"));
    }

    #[test]
    fn transfer_failed_carries_reason() {
        let msg = AmmError::TransferFailed("insufficient balance").to_string();
        assert!(msg.contains("insufficient balance"));
    }

    #[test]
    fn errors_are_comparable() {
        assert_eq!(AmmError::Reentrant, AmmError::Reentrant);
        assert_ne!(AmmError::Reentrant, AmmError::PairExists);
    }
}
