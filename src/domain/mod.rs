//! Fundamental domain value types used throughout the AMM engine.
//!
//! This module contains the core value types that model the exchange
//! domain: addresses, asset amounts, liquidity shares, canonical asset
//! pairs, and the event records pools emit for observers. All types use
//! newtypes with validated constructors to enforce invariants.

mod address;
mod amount;
mod asset_pair;
mod event;
mod rounding;
mod shares;

pub use address::Address;
pub use amount::Amount;
pub use asset_pair::AssetPair;
pub use event::PoolEvent;
pub use rounding::Rounding;
pub use shares::Shares;
