//! Convenience re-exports for common types and traits.
//!
//! The prelude provides a single import to bring all commonly used items
//! into scope:
//!
//! ```rust
//! use tidepool::prelude::*;
//! ```

// Re-export domain types
pub use crate::domain::{Address, Amount, AssetPair, PoolEvent, Rounding, Shares};

// Re-export the ledger capability and its in-memory double
pub use crate::ledger::{AssetLedger, InMemoryLedger};

// Re-export the engine surface
pub use crate::pool::{Pool, RESERVE_CEILING};
pub use crate::registry::{pool_address_for, Registry};
pub use crate::router::Router;

// Re-export error types
pub use crate::error::{AmmError, Result};
