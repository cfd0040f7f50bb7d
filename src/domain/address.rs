//! Chain-agnostic 32-byte address.

use core::fmt;

/// A generic, chain-agnostic address identifying an asset ledger, a
/// holder account, a pool, or the registry itself.
///
/// Wraps a fixed-size `[u8; 32]` byte array. All 32-byte sequences are
/// valid addresses, so construction is infallible; the all-zero address
/// is the null identifier and is rejected wherever an asset address is
/// expected (see [`AssetPair`](super::AssetPair)).
///
/// # Examples
///
/// ```
/// use tidepool::domain::Address;
///
/// let addr = Address::from_bytes([7u8; 32]);
/// assert_eq!(addr.as_bytes(), [7u8; 32]);
/// assert!(!addr.is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; 32]);

impl Address {
    /// Creates an `Address` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 32-byte representation.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Returns the all-zero null address.
    #[must_use]
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Returns `true` if this is the null address.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        let mut i = 0;
        while i < 32 {
            if self.0[i] != 0 {
                return false;
            }
            i += 1;
        }
        true
    }
}

impl fmt::Display for Address {
    /// Renders the first four bytes as hex, e.g. `0x01020304…`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:02x}{:02x}{:02x}{:02x}…",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}
