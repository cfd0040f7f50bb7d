//! Asset-transfer capability consumed by pools and the router.
//!
//! The engine never owns asset balances itself — it observes and moves
//! them through an [`AssetLedger`], the capability interface of the
//! external fungible-asset layer. Pools read their own true balances
//! through it, the router moves caller funds through it, and every
//! rejection surfaces as [`AmmError::TransferFailed`].
//!
//! [`InMemoryLedger`] is the substitutable double: a plain balance and
//! allowance table with mint/approve helpers, used by the integration
//! tests and by downstream simulation.

use std::collections::BTreeMap;

use tracing::trace;

use crate::domain::{Address, Amount};
use crate::error::{AmmError, Result};

/// Capability interface over an external fungible-asset layer.
///
/// `asset` always names the asset ledger being touched; holders are
/// identified by [`Address`]. Implementations decide their own balance
/// and allowance semantics — the engine only requires that a rejected
/// movement returns [`AmmError::TransferFailed`] and leaves balances
/// unchanged.
pub trait AssetLedger {
    /// Returns the balance of `holder` in `asset`.
    fn balance_of(&self, asset: Address, holder: Address) -> Amount;

    /// Moves `amount` of `asset` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::TransferFailed`] if `from` lacks the balance.
    fn transfer(&mut self, asset: Address, from: Address, to: Address, amount: Amount)
        -> Result<()>;

    /// Moves `amount` of `asset` from `owner` to `to` on behalf of
    /// `spender`, consuming allowance.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::TransferFailed`] if `owner` lacks the balance
    /// or `spender` lacks the allowance.
    fn transfer_from(
        &mut self,
        asset: Address,
        spender: Address,
        owner: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()>;
}

/// In-memory [`AssetLedger`] with explicit balances and allowances.
///
/// # Examples
///
/// ```
/// use tidepool::domain::{Address, Amount};
/// use tidepool::ledger::{AssetLedger, InMemoryLedger};
///
/// let asset = Address::from_bytes([1u8; 32]);
/// let alice = Address::from_bytes([10u8; 32]);
/// let bob = Address::from_bytes([11u8; 32]);
///
/// let mut ledger = InMemoryLedger::new();
/// ledger.mint_to(asset, alice, Amount::new(500));
/// ledger.transfer(asset, alice, bob, Amount::new(200)).expect("funded");
/// assert_eq!(ledger.balance_of(asset, bob), Amount::new(200));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: BTreeMap<(Address, Address), Amount>,
    allowances: BTreeMap<(Address, Address, Address), Amount>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` of `asset` to `holder` out of thin air.
    pub fn mint_to(&mut self, asset: Address, holder: Address, amount: Amount) {
        let entry = self.balances.entry((asset, holder)).or_insert(Amount::ZERO);
        *entry = entry.checked_add(&amount).unwrap_or(*entry);
    }

    /// Grants `spender` an allowance over `owner`'s balance of `asset`.
    ///
    /// Overwrites any prior allowance.
    pub fn approve(&mut self, asset: Address, owner: Address, spender: Address, amount: Amount) {
        self.allowances.insert((asset, owner, spender), amount);
    }

    /// Returns the remaining allowance of `spender` over `owner`.
    #[must_use]
    pub fn allowance(&self, asset: Address, owner: Address, spender: Address) -> Amount {
        self.allowances
            .get(&(asset, owner, spender))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Validates both legs before touching either balance, so a rejected
    /// movement leaves the ledger exactly as it was.
    fn move_balance(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        let remaining = self
            .balance_of(asset, from)
            .checked_sub(&amount)
            .ok_or(AmmError::TransferFailed("insufficient balance"))?;
        let receiving = if from == to {
            remaining
        } else {
            self.balance_of(asset, to)
        };
        let updated = receiving
            .checked_add(&amount)
            .ok_or(AmmError::TransferFailed("balance overflow"))?;
        self.balances.insert((asset, from), remaining);
        self.balances.insert((asset, to), updated);
        Ok(())
    }
}

impl AssetLedger for InMemoryLedger {
    fn balance_of(&self, asset: Address, holder: Address) -> Amount {
        self.balances
            .get(&(asset, holder))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.move_balance(asset, from, to, amount)?;
        trace!(%asset, %from, %to, %amount, "ledger transfer");
        Ok(())
    }

    fn transfer_from(
        &mut self,
        asset: Address,
        spender: Address,
        owner: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        let allowed = self.allowance(asset, owner, spender);
        let remaining = allowed
            .checked_sub(&amount)
            .ok_or(AmmError::TransferFailed("insufficient allowance"))?;
        self.move_balance(asset, owner, to, amount)?;
        self.allowances.insert((asset, owner, spender), remaining);
        trace!(%asset, %spender, %owner, %to, %amount, "ledger transfer_from");
        Ok(())
    }
}
