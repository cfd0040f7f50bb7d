//! Pool registry: deterministic addressing and pair deduplication.
//!
//! The registry owns every [`Pool`] in the system. Exactly one pool may
//! exist per unordered asset pair, and a pool's address is a pure
//! function of the registry address and the canonical pair, so any
//! party can compute where a pool will live before it is created.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::{Address, AssetPair};
use crate::error::{AmmError, Result};
use crate::pool::Pool;

/// Domain separator for pool address derivation.
const POOL_ADDRESS_DOMAIN: &[u8] = b"tidepool/pool/v1";

/// Derives the deterministic address of the pool for `pair` under the
/// registry at `registry`.
///
/// `SHA-256(domain ‖ registry ‖ asset0 ‖ asset1)` over the canonical
/// (sorted) pair, so both argument orders of the underlying assets map
/// to the same address.
#[must_use]
pub fn pool_address_for(registry: Address, pair: AssetPair) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(POOL_ADDRESS_DOMAIN);
    hasher.update(registry.as_bytes());
    hasher.update(pair.asset0().as_bytes());
    hasher.update(pair.asset1().as_bytes());
    Address::from_bytes(hasher.finalize().into())
}

/// Owner of all pools: an append-only list in creation order plus a
/// canonical-pair index over it.
///
/// # Examples
///
/// ```
/// use tidepool::domain::Address;
/// use tidepool::registry::Registry;
///
/// let mut registry = Registry::new(Address::from_bytes([0xAA; 32]));
/// let a = Address::from_bytes([1u8; 32]);
/// let b = Address::from_bytes([2u8; 32]);
///
/// let pool = registry.create_pool(a, b).expect("fresh pair");
/// // Either argument order resolves to the same pool.
/// assert_eq!(registry.get_pool(b, a), Some(pool));
/// ```
#[derive(Debug, Clone)]
pub struct Registry {
    address: Address,
    pools: Vec<Pool>,
    pair_index: BTreeMap<AssetPair, usize>,
}

impl Registry {
    /// Creates an empty registry at the given address.
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            pools: Vec::new(),
            pair_index: BTreeMap::new(),
        }
    }

    /// Returns the registry's own address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Creates and initializes the pool for `(asset_a, asset_b)`,
    /// returning its deterministic address.
    ///
    /// # Errors
    ///
    /// - [`AmmError::IdenticalAssets`] / [`AmmError::ZeroAsset`] for an
    ///   invalid pair.
    /// - [`AmmError::PairExists`] if the pair already has a pool, in
    ///   either argument order.
    pub fn create_pool(&mut self, asset_a: Address, asset_b: Address) -> Result<Address> {
        let pair = AssetPair::new(asset_a, asset_b)?;
        if self.pair_index.contains_key(&pair) {
            return Err(AmmError::PairExists);
        }

        let address = pool_address_for(self.address, pair);
        let mut pool = Pool::new(address);
        pool.initialize(pair)?;
        self.pair_index.insert(pair, self.pools.len());
        self.pools.push(pool);
        info!(%address, asset0 = %pair.asset0(), asset1 = %pair.asset1(), "pool created");
        Ok(address)
    }

    /// Looks up the pool address for a pair, in either argument order.
    ///
    /// Returns `None` for an invalid pair or when no pool exists.
    #[must_use]
    pub fn get_pool(&self, asset_a: Address, asset_b: Address) -> Option<Address> {
        let pair = AssetPair::new(asset_a, asset_b).ok()?;
        let index = *self.pair_index.get(&pair)?;
        self.pools.get(index).map(Pool::address)
    }

    /// Borrows the pool for a pair.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`] if no pool exists for the pair
    /// (including invalid pairs).
    pub fn pool(&self, asset_a: Address, asset_b: Address) -> Result<&Pool> {
        let pair = AssetPair::new(asset_a, asset_b).map_err(|_| AmmError::PoolNotFound)?;
        let index = *self.pair_index.get(&pair).ok_or(AmmError::PoolNotFound)?;
        self.pools.get(index).ok_or(AmmError::PoolNotFound)
    }

    /// Mutably borrows the pool for a pair.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`] if no pool exists for the pair
    /// (including invalid pairs).
    pub fn pool_mut(&mut self, asset_a: Address, asset_b: Address) -> Result<&mut Pool> {
        let pair = AssetPair::new(asset_a, asset_b).map_err(|_| AmmError::PoolNotFound)?;
        let index = *self.pair_index.get(&pair).ok_or(AmmError::PoolNotFound)?;
        self.pools.get_mut(index).ok_or(AmmError::PoolNotFound)
    }

    /// Iterates over all pools in creation order.
    pub fn all_pools(&self) -> impl Iterator<Item = &Pool> {
        self.pools.iter()
    }

    /// Returns the number of registered pools.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}
