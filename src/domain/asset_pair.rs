//! Canonically ordered pair of distinct assets.

use super::Address;
use crate::error::AmmError;

/// An unordered pair of distinct asset addresses, stored canonically
/// sorted so that `asset0() < asset1()`.
///
/// The canonical ordering is what lets the registry deduplicate pairs:
/// `(A, B)` and `(B, A)` construct the same `AssetPair`. Ordering is
/// fixed at construction and never changes.
///
/// # Examples
///
/// ```
/// use tidepool::domain::{Address, AssetPair};
///
/// let a = Address::from_bytes([1u8; 32]);
/// let b = Address::from_bytes([2u8; 32]);
///
/// // Argument order does not matter:
/// let pair = AssetPair::new(b, a).expect("distinct assets");
/// assert_eq!(pair.asset0(), a);
/// assert_eq!(pair.asset1(), b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetPair {
    asset0: Address,
    asset1: Address,
}

impl AssetPair {
    /// Creates a new canonically-ordered `AssetPair`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::IdenticalAssets`] if both addresses are equal.
    /// - [`AmmError::ZeroAsset`] if either address is the null address.
    pub fn new(asset_a: Address, asset_b: Address) -> Result<Self, AmmError> {
        if asset_a == asset_b {
            return Err(AmmError::IdenticalAssets);
        }
        let (asset0, asset1) = if asset_a < asset_b {
            (asset_a, asset_b)
        } else {
            (asset_b, asset_a)
        };
        // After sorting, asset0 is the smaller address; checking it
        // covers both (the zero address sorts first).
        if asset0.is_zero() {
            return Err(AmmError::ZeroAsset);
        }
        Ok(Self { asset0, asset1 })
    }

    /// Returns the lower-addressed asset.
    #[must_use]
    pub const fn asset0(&self) -> Address {
        self.asset0
    }

    /// Returns the higher-addressed asset.
    #[must_use]
    pub const fn asset1(&self) -> Address {
        self.asset1
    }

    /// Returns `true` if the given asset is one of the pair.
    #[must_use]
    pub fn contains(&self, asset: &Address) -> bool {
        self.asset0 == *asset || self.asset1 == *asset
    }

    /// Returns the counterpart of `asset` in this pair.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`] if `asset` is not in the pair.
    pub fn other(&self, asset: &Address) -> Result<Address, AmmError> {
        if *asset == self.asset0 {
            Ok(self.asset1)
        } else if *asset == self.asset1 {
            Ok(self.asset0)
        } else {
            Err(AmmError::PoolNotFound)
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 32])
    }

    #[test]
    fn sorts_arguments() {
        let Ok(pair) = AssetPair::new(addr(9), addr(3)) else {
            panic!("expected Ok");
        };
        assert_eq!(pair.asset0(), addr(3));
        assert_eq!(pair.asset1(), addr(9));
    }

    #[test]
    fn same_pair_either_order() {
        let (Ok(p1), Ok(p2)) = (AssetPair::new(addr(1), addr(2)), AssetPair::new(addr(2), addr(1)))
        else {
            panic!("expected Ok");
        };
        assert_eq!(p1, p2);
    }

    #[test]
    fn rejects_identical() {
        assert_eq!(
            AssetPair::new(addr(5), addr(5)),
            Err(AmmError::IdenticalAssets)
        );
    }

    #[test]
    fn rejects_zero_asset() {
        assert_eq!(
            AssetPair::new(Address::zero(), addr(5)),
            Err(AmmError::ZeroAsset)
        );
        assert_eq!(
            AssetPair::new(addr(5), Address::zero()),
            Err(AmmError::ZeroAsset)
        );
    }

    #[test]
    fn contains_and_other() {
        let Ok(pair) = AssetPair::new(addr(1), addr(2)) else {
            panic!("expected Ok");
        };
        assert!(pair.contains(&addr(1)));
        assert!(!pair.contains(&addr(3)));
        assert_eq!(pair.other(&addr(1)), Ok(addr(2)));
        assert_eq!(pair.other(&addr(3)), Err(AmmError::PoolNotFound));
    }
}
