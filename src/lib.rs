//! # Tidepool
//!
//! Constant-product AMM engine: reserve-reconciling pools, a
//! deduplicating pair registry, and a multi-hop swap router.
//!
//! The engine never custodies asset balances itself. Balances live in
//! an external fungible-asset layer reached through the
//! [`AssetLedger`](ledger::AssetLedger) trait; pools hold only their
//! *declared* reserves and reconcile them against the ledger's *true*
//! balances on every operation. That split is what drives the whole
//! design: deposits and swap inputs are inferred from balance deltas,
//! never passed as trusted arguments.
//!
//! # Quick Start
//!
//! ```rust
//! use tidepool::domain::{Address, Amount};
//! use tidepool::ledger::InMemoryLedger;
//! use tidepool::registry::Registry;
//! use tidepool::router::Router;
//!
//! let gold = Address::from_bytes([1u8; 32]);
//! let silver = Address::from_bytes([2u8; 32]);
//! let alice = Address::from_bytes([10u8; 32]);
//!
//! let mut registry = Registry::new(Address::from_bytes([0xAA; 32]));
//! let router = Router::new(Address::from_bytes([0xBB; 32]));
//! let mut ledger = InMemoryLedger::new();
//!
//! // Fund the caller and let the router spend on their behalf.
//! ledger.mint_to(gold, alice, Amount::new(1_000));
//! ledger.mint_to(silver, alice, Amount::new(2_000));
//! ledger.approve(gold, alice, router.address(), Amount::new(u128::MAX));
//! ledger.approve(silver, alice, router.address(), Amount::new(u128::MAX));
//!
//! // First deposit creates the pool and sets the price.
//! let (.., shares) = router
//!     .add_liquidity(
//!         &mut registry,
//!         &mut ledger,
//!         gold,
//!         silver,
//!         Amount::new(1_000),
//!         Amount::new(2_000),
//!         Amount::ZERO,
//!         Amount::ZERO,
//!         alice,
//!         alice,
//!     )
//!     .expect("fresh pool");
//! assert!(!shares.is_zero());
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Consumer   │  quotes, slippage bounds, swap paths
//! └──────┬──────┘
//!        │ Router (stateless, spends under allowance)
//!        ▼
//! ┌─────────────┐
//! │   Registry   │  one pool per pair, deterministic addresses
//! └──────┬──────┘
//!        │ Pool (x·y = k, reserve reconciliation)
//!        ▼
//! ┌─────────────┐
//! │ AssetLedger  │  external balances, transfer / transfer_from
//! └─────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Newtype value types: [`Address`](domain::Address), [`Amount`](domain::Amount), [`Shares`](domain::Shares), [`AssetPair`](domain::AssetPair) |
//! | [`ledger`] | [`AssetLedger`](ledger::AssetLedger) capability trait and the [`InMemoryLedger`](ledger::InMemoryLedger) double |
//! | [`pool`] | [`Pool`](pool::Pool): mint, burn, swap, skim, sync under the constant-product invariant |
//! | [`registry`] | [`Registry`](registry::Registry) and deterministic [`pool_address_for`](registry::pool_address_for) |
//! | [`router`] | [`Router`](router::Router): quoting, liquidity management, multi-hop swaps |
//! | [`math`] | [`U256`](math::U256) intermediates, integer square root, widening mul-div |
//! | [`error`] | [`AmmError`](error::AmmError) unified error enum |
//! | [`prelude`] | Convenience re-exports for common types and traits |

pub mod domain;
pub mod error;
pub mod ledger;
pub mod math;
pub mod pool;
pub mod prelude;
pub mod registry;
pub mod router;

#[cfg(test)]
mod proptest_properties;
