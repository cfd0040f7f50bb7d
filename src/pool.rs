//! The reserve/invariant accounting engine (constant-product pool).
//!
//! A [`Pool`] tracks two reserves under the `x · y = k` invariant and
//! issues liquidity shares against them. Its central mechanism is
//! **reserve reconciliation**: stored reserves are the pool's *declared*
//! state, while the asset ledger holds its *observed* state, and every
//! operation starts by computing the pending delta between the two.
//! Whatever arrived since the last reconciliation is the caller's
//! contribution (mint) or swap input (swap).
//!
//! # Swap algorithm (optimistic transfer)
//!
//! 1. Pay the requested output to the recipient *before* knowing the
//!    input.
//! 2. Read post-transfer true balances.
//! 3. Infer inputs as the balance increase beyond the expected
//!    post-output baseline.
//! 4. Check the fee-adjusted invariant:
//!    `(1000·b0 − 3·in0) × (1000·b1 − 3·in1) ≥ 1000² · r0 · r1`
//!    (a 0.3% fee on the input side; the post-fee product may only hold
//!    or grow).
//! 5. Reconcile reserves to the observed balances.
//!
//! A failed invariant check transfers the optimistic output back before
//! the error propagates, so the ledger is restored to its pre-call
//! state.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{Address, Amount, AssetPair, PoolEvent, Rounding, Shares};
use crate::error::{AmmError, Result};
use crate::ledger::AssetLedger;
use crate::math::{self, U256};

/// Exclusive upper bound on each stored reserve (2^112).
///
/// Reserves live in a fixed-width unsigned range; any reconciliation
/// that would exceed it fails with [`AmmError::ReserveOverflow`] rather
/// than truncating. The bound also guarantees every intermediate the
/// invariant check needs fits in 256 bits.
pub const RESERVE_CEILING: u128 = 1 << 112;

/// Fee charged on the input side of a swap, in thousandths (3 = 0.3%).
pub const FEE_PER_MILLE: u128 = 3;

const FEE_SCALE: u128 = 1_000;

/// A two-asset constant-product liquidity pool.
///
/// Created by the [`Registry`](crate::registry::Registry) in two phases:
/// [`Pool::new`] fixes the pool's address, and a single
/// [`initialize`](Pool::initialize) call binds the canonical asset pair.
///
/// # State
///
/// - `reserve0` / `reserve1` — declared balances, reconciled against the
///   ledger at the end of every operation, each bounded by
///   [`RESERVE_CEILING`].
/// - `total_shares` / `share_balances` — the liquidity-share ledger; the
///   balances always sum to the total.
/// - `last_update` — monotonic marker bumped on every reconciliation,
///   for downstream oracle consumers only.
/// - `entered` — single-call reentrancy guard flag.
#[derive(Debug, Clone)]
pub struct Pool {
    address: Address,
    pair: Option<AssetPair>,
    reserve0: Amount,
    reserve1: Amount,
    last_update: u64,
    total_shares: Shares,
    share_balances: BTreeMap<Address, Shares>,
    entered: bool,
    events: Vec<PoolEvent>,
}

impl Pool {
    /// Creates an uninitialized pool at the given address.
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            pair: None,
            reserve0: Amount::ZERO,
            reserve1: Amount::ZERO,
            last_update: 0,
            total_shares: Shares::ZERO,
            share_balances: BTreeMap::new(),
            entered: false,
            events: Vec::new(),
        }
    }

    /// Binds the pool to its canonical asset pair. Single-use.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::AlreadyInitialized`] on a second call.
    pub fn initialize(&mut self, pair: AssetPair) -> Result<()> {
        if self.pair.is_some() {
            return Err(AmmError::AlreadyInitialized);
        }
        self.pair = Some(pair);
        Ok(())
    }

    /// Returns the pool's own address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Returns the bound asset pair, if initialized.
    #[must_use]
    pub const fn assets(&self) -> Option<AssetPair> {
        self.pair
    }

    /// Returns the declared reserves `(reserve0, reserve1)`.
    #[must_use]
    pub const fn get_reserves(&self) -> (Amount, Amount) {
        (self.reserve0, self.reserve1)
    }

    /// Returns the monotonic reserve-update marker.
    #[must_use]
    pub const fn last_update(&self) -> u64 {
        self.last_update
    }

    /// Returns the outstanding liquidity-share supply.
    #[must_use]
    pub const fn total_shares(&self) -> Shares {
        self.total_shares
    }

    /// Returns the share balance of `holder`.
    #[must_use]
    pub fn share_balance_of(&self, holder: Address) -> Shares {
        self.share_balances
            .get(&holder)
            .copied()
            .unwrap_or(Shares::ZERO)
    }

    /// Moves `amount` shares from `from` to `to`.
    ///
    /// The router uses this to place shares into the pool's own custody
    /// before calling [`burn`](Pool::burn).
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InsufficientShares`] if `from` holds fewer
    /// than `amount` shares.
    pub fn transfer_shares(&mut self, from: Address, to: Address, amount: Shares) -> Result<()> {
        let from_balance = self.share_balance_of(from);
        let remaining = from_balance
            .checked_sub(&amount)
            .ok_or(AmmError::InsufficientShares)?;
        if remaining.is_zero() {
            self.share_balances.remove(&from);
        } else {
            self.share_balances.insert(from, remaining);
        }
        let to_balance = self.share_balance_of(to);
        let updated = to_balance
            .checked_add(&amount)
            .ok_or(AmmError::Overflow("share balance overflow"))?;
        self.share_balances.insert(to, updated);
        Ok(())
    }

    /// Returns the journal of committed operations.
    #[must_use]
    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    /// Drains and returns the event journal.
    pub fn take_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }

    /// Mints liquidity shares against assets deposited since the last
    /// reconciliation.
    ///
    /// The caller must have transferred some amount of either asset into
    /// the pool's custody before calling; the contribution is inferred
    /// as `balance − reserve` per asset. On the first liquidity event
    /// the issue is `floor(sqrt(amount0 × amount1))`; afterwards it is
    /// `min(amount0·S/r0, amount1·S/r1)` — the asset contributed in
    /// excess of the pool ratio is effectively donated, protecting
    /// existing holders from dilution.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Reentrant`] on recursive invocation.
    /// - [`AmmError::NotInitialized`] before the pair is bound.
    /// - [`AmmError::ReserveOverflow`] if a balance exceeds the ceiling.
    /// - [`AmmError::InsufficientLiquidityMinted`] if the contribution
    ///   rounds to zero shares.
    pub fn mint(&mut self, ledger: &mut dyn AssetLedger, recipient: Address) -> Result<Shares> {
        self.with_guard(|pool| pool.mint_inner(ledger, recipient))
    }

    /// Burns the shares held in the pool's own custody and pays out the
    /// pro-rata portion of *true balances* to `recipient`.
    ///
    /// Basing the payout on true balances rather than stored reserves
    /// means any un-reconciled direct transfer is distributed to the
    /// burner as well.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Reentrant`] on recursive invocation.
    /// - [`AmmError::NotInitialized`] before the pair is bound.
    /// - [`AmmError::NoLiquidityToBurn`] if the pool holds no shares.
    /// - [`AmmError::InsufficientLiquidityBurned`] if either payout
    ///   rounds to zero.
    pub fn burn(
        &mut self,
        ledger: &mut dyn AssetLedger,
        recipient: Address,
    ) -> Result<(Amount, Amount)> {
        self.with_guard(|pool| pool.burn_inner(ledger, recipient))
    }

    /// Executes a swap, paying exactly one positive output amount to
    /// `recipient` and inferring the input from the balance delta.
    ///
    /// See the module docs for the optimistic-transfer algorithm.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Reentrant`] on recursive invocation.
    /// - [`AmmError::InvalidOutputRequest`] unless exactly one output is
    ///   positive.
    /// - [`AmmError::InvalidRecipient`] if `recipient` is a pool asset.
    /// - [`AmmError::InsufficientLiquidity`] if an output meets or
    ///   exceeds its reserve.
    /// - [`AmmError::InsufficientInput`] if no input was observed.
    /// - [`AmmError::InvariantViolated`] if the fee-adjusted product
    ///   would shrink; the optimistic output is transferred back first.
    pub fn swap(
        &mut self,
        ledger: &mut dyn AssetLedger,
        amount0_out: Amount,
        amount1_out: Amount,
        recipient: Address,
    ) -> Result<()> {
        self.with_guard(|pool| pool.swap_inner(ledger, amount0_out, amount1_out, recipient))
    }

    /// Pays any balance in excess of the declared reserves to `to`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Reentrant`] on recursive invocation.
    /// - [`AmmError::NotInitialized`] before the pair is bound.
    /// - [`AmmError::TransferFailed`] if the ledger rejects a payout.
    pub fn skim(&mut self, ledger: &mut dyn AssetLedger, to: Address) -> Result<()> {
        self.with_guard(|pool| pool.skim_inner(ledger, to))
    }

    /// Force-reconciles declared reserves to the observed balances.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Reentrant`] on recursive invocation.
    /// - [`AmmError::NotInitialized`] before the pair is bound.
    /// - [`AmmError::ReserveOverflow`] if a balance exceeds the ceiling.
    pub fn sync(&mut self, ledger: &mut dyn AssetLedger) -> Result<()> {
        self.with_guard(|pool| pool.sync_inner(ledger))
    }

    // -- internals ----------------------------------------------------------

    /// Runs `op` under the single-call guard, clearing the flag on every
    /// exit path.
    fn with_guard<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.entered {
            return Err(AmmError::Reentrant);
        }
        self.entered = true;
        let outcome = op(self);
        self.entered = false;
        outcome
    }

    fn pair(&self) -> Result<AssetPair> {
        self.pair.ok_or(AmmError::NotInitialized)
    }

    fn observed_balances(&self, ledger: &dyn AssetLedger) -> Result<(Amount, Amount)> {
        let pair = self.pair()?;
        Ok((
            ledger.balance_of(pair.asset0(), self.address),
            ledger.balance_of(pair.asset1(), self.address),
        ))
    }

    fn ensure_within_ceiling(balance0: Amount, balance1: Amount) -> Result<()> {
        if balance0.get() >= RESERVE_CEILING || balance1.get() >= RESERVE_CEILING {
            return Err(AmmError::ReserveOverflow);
        }
        Ok(())
    }

    /// Commits new declared reserves. Callers must have verified the
    /// ceiling already; this path cannot fail.
    fn reconcile(&mut self, balance0: Amount, balance1: Amount) {
        debug_assert!(balance0.get() < RESERVE_CEILING);
        debug_assert!(balance1.get() < RESERVE_CEILING);
        self.reserve0 = balance0;
        self.reserve1 = balance1;
        self.last_update += 1;
        self.events.push(PoolEvent::Sync {
            reserve0: balance0,
            reserve1: balance1,
        });
        debug!(pool = %self.address, reserve0 = %balance0, reserve1 = %balance1, "sync");
    }

    fn credit_shares(&mut self, holder: Address, amount: Shares) -> Result<()> {
        let updated = self
            .share_balance_of(holder)
            .checked_add(&amount)
            .ok_or(AmmError::Overflow("share balance overflow"))?;
        self.share_balances.insert(holder, updated);
        self.total_shares = self
            .total_shares
            .checked_add(&amount)
            .ok_or(AmmError::Overflow("total share supply overflow"))?;
        Ok(())
    }

    fn mint_inner(&mut self, ledger: &mut dyn AssetLedger, recipient: Address) -> Result<Shares> {
        let (balance0, balance1) = self.observed_balances(ledger)?;
        Self::ensure_within_ceiling(balance0, balance1)?;

        // Pending deltas: whatever arrived since the last reconciliation.
        let amount0 = balance0.saturating_sub(&self.reserve0);
        let amount1 = balance1.saturating_sub(&self.reserve1);

        let issued = if self.total_shares.is_zero() {
            // Bootstrap: no prior price exists, so the geometric mean is
            // the only well-defined issue amount.
            let product = U256::from(amount0.get()) * U256::from(amount1.get());
            Shares::new(math::isqrt(product).as_u128())
        } else {
            let share0 = math::mul_div(
                amount0,
                Amount::new(self.total_shares.get()),
                self.reserve0,
                Rounding::Down,
            )?;
            let share1 = math::mul_div(
                amount1,
                Amount::new(self.total_shares.get()),
                self.reserve1,
                Rounding::Down,
            )?;
            Shares::new(share0.min(share1).get())
        };

        if issued.is_zero() {
            return Err(AmmError::InsufficientLiquidityMinted);
        }

        self.credit_shares(recipient, issued)?;
        self.reconcile(balance0, balance1);
        self.events.push(PoolEvent::Mint {
            amount0,
            amount1,
            shares: issued,
            recipient,
        });
        debug!(pool = %self.address, %amount0, %amount1, shares = %issued, %recipient, "mint");
        Ok(issued)
    }

    fn burn_inner(
        &mut self,
        ledger: &mut dyn AssetLedger,
        recipient: Address,
    ) -> Result<(Amount, Amount)> {
        let pair = self.pair()?;
        let liquidity = self.share_balance_of(self.address);
        if liquidity.is_zero() {
            return Err(AmmError::NoLiquidityToBurn);
        }

        let (balance0, balance1) = self.observed_balances(ledger)?;
        let liquidity_amount = Amount::new(liquidity.get());
        let total = Amount::new(self.total_shares.get());

        // Pro-rata share of true balances, not stored reserves: any
        // un-reconciled direct transfer is paid out here too.
        let amount0 = math::mul_div(liquidity_amount, balance0, total, Rounding::Down)?;
        let amount1 = math::mul_div(liquidity_amount, balance1, total, Rounding::Down)?;
        if amount0.is_zero() || amount1.is_zero() {
            return Err(AmmError::InsufficientLiquidityBurned);
        }

        // Pay out first; shares are only burned once both legs settled.
        ledger.transfer(pair.asset0(), self.address, recipient, amount0)?;
        if let Err(err) = ledger.transfer(pair.asset1(), self.address, recipient, amount1) {
            // Restore the first leg so the ledger matches the aborted state.
            ledger.transfer(pair.asset0(), recipient, self.address, amount0)?;
            return Err(err);
        }

        self.share_balances.remove(&self.address);
        self.total_shares = self
            .total_shares
            .checked_sub(&liquidity)
            .ok_or(AmmError::Overflow("total share supply underflow"))?;

        let (post0, post1) = self.observed_balances(ledger)?;
        self.reconcile(post0, post1);
        self.events.push(PoolEvent::Burn {
            amount0,
            amount1,
            shares: liquidity,
            recipient,
        });
        debug!(pool = %self.address, %amount0, %amount1, shares = %liquidity, %recipient, "burn");
        Ok((amount0, amount1))
    }

    fn swap_inner(
        &mut self,
        ledger: &mut dyn AssetLedger,
        amount0_out: Amount,
        amount1_out: Amount,
        recipient: Address,
    ) -> Result<()> {
        let pair = self.pair()?;
        if amount0_out.is_zero() == amount1_out.is_zero() {
            return Err(AmmError::InvalidOutputRequest);
        }
        if recipient == pair.asset0() || recipient == pair.asset1() {
            return Err(AmmError::InvalidRecipient);
        }
        if amount0_out >= self.reserve0 || amount1_out >= self.reserve1 {
            return Err(AmmError::InsufficientLiquidity);
        }

        // Optimistic transfer: pay the output before the input is known.
        if !amount0_out.is_zero() {
            ledger.transfer(pair.asset0(), self.address, recipient, amount0_out)?;
        }
        if !amount1_out.is_zero() {
            ledger.transfer(pair.asset1(), self.address, recipient, amount1_out)?;
        }

        let outcome = self.check_swap(ledger, amount0_out, amount1_out);
        match outcome {
            Ok((balance0, balance1, amount0_in, amount1_in)) => {
                self.reconcile(balance0, balance1);
                self.events.push(PoolEvent::Swap {
                    amount0_in,
                    amount1_in,
                    amount0_out,
                    amount1_out,
                    recipient,
                });
                debug!(
                    pool = %self.address,
                    %amount0_in, %amount1_in, %amount0_out, %amount1_out, %recipient,
                    "swap"
                );
                Ok(())
            }
            Err(err) => {
                // Full revert: claw the optimistic output back.
                if !amount0_out.is_zero() {
                    ledger.transfer(pair.asset0(), recipient, self.address, amount0_out)?;
                }
                if !amount1_out.is_zero() {
                    ledger.transfer(pair.asset1(), recipient, self.address, amount1_out)?;
                }
                Err(err)
            }
        }
    }

    /// Infers swap inputs from the post-transfer balances and verifies
    /// the fee-adjusted invariant. Pure with respect to pool state.
    fn check_swap(
        &self,
        ledger: &dyn AssetLedger,
        amount0_out: Amount,
        amount1_out: Amount,
    ) -> Result<(Amount, Amount, Amount, Amount)> {
        let pair = self.pair()?;
        let balance0 = ledger.balance_of(pair.asset0(), self.address);
        let balance1 = ledger.balance_of(pair.asset1(), self.address);
        Self::ensure_within_ceiling(balance0, balance1)?;

        // Expected post-output baseline is reserve − out; any balance
        // beyond it is input the caller deposited.
        let baseline0 = self.reserve0.saturating_sub(&amount0_out);
        let baseline1 = self.reserve1.saturating_sub(&amount1_out);
        let amount0_in = balance0.saturating_sub(&baseline0);
        let amount1_in = balance1.saturating_sub(&baseline1);
        if amount0_in.is_zero() && amount1_in.is_zero() {
            return Err(AmmError::InsufficientInput);
        }

        // Fee-adjusted product check, in thousandths. Inputs are capped
        // by the balances, and balances sit below 2^112, so the scaled
        // terms stay within u128 and the products within 256 bits.
        let adjusted0 = balance0.get() * FEE_SCALE - amount0_in.get() * FEE_PER_MILLE;
        let adjusted1 = balance1.get() * FEE_SCALE - amount1_in.get() * FEE_PER_MILLE;
        let lhs = U256::from(adjusted0) * U256::from(adjusted1);
        let rhs = U256::from(self.reserve0.get())
            * U256::from(self.reserve1.get())
            * U256::from(FEE_SCALE * FEE_SCALE);
        if lhs < rhs {
            return Err(AmmError::InvariantViolated);
        }

        Ok((balance0, balance1, amount0_in, amount1_in))
    }

    fn skim_inner(&mut self, ledger: &mut dyn AssetLedger, to: Address) -> Result<()> {
        let pair = self.pair()?;
        let (balance0, balance1) = self.observed_balances(ledger)?;
        let excess0 = balance0.saturating_sub(&self.reserve0);
        let excess1 = balance1.saturating_sub(&self.reserve1);
        if !excess0.is_zero() {
            ledger.transfer(pair.asset0(), self.address, to, excess0)?;
        }
        if !excess1.is_zero() {
            ledger.transfer(pair.asset1(), self.address, to, excess1)?;
        }
        debug!(pool = %self.address, %excess0, %excess1, %to, "skim");
        Ok(())
    }

    fn sync_inner(&mut self, ledger: &mut dyn AssetLedger) -> Result<()> {
        let (balance0, balance1) = self.observed_balances(ledger)?;
        Self::ensure_within_ceiling(balance0, balance1)?;
        self.reconcile(balance0, balance1);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 32])
    }

    fn asset_a() -> Address {
        addr(1)
    }

    fn asset_b() -> Address {
        addr(2)
    }

    fn provider() -> Address {
        addr(10)
    }

    fn trader() -> Address {
        addr(11)
    }

    fn make_pool() -> Pool {
        let mut pool = Pool::new(addr(100));
        let Ok(pair) = AssetPair::new(asset_a(), asset_b()) else {
            panic!("valid pair");
        };
        let Ok(()) = pool.initialize(pair) else {
            panic!("first initialize succeeds");
        };
        pool
    }

    /// Deposits into pool custody and mints, returning the issued shares.
    fn seed(pool: &mut Pool, ledger: &mut InMemoryLedger, amount0: u128, amount1: u128) -> Shares {
        ledger.mint_to(asset_a(), pool.address(), Amount::new(amount0));
        ledger.mint_to(asset_b(), pool.address(), Amount::new(amount1));
        let Ok(shares) = pool.mint(ledger, provider()) else {
            panic!("seed mint succeeds");
        };
        shares
    }

    // -- initialize -----------------------------------------------------------

    #[test]
    fn initialize_is_single_use() {
        let mut pool = make_pool();
        let Ok(pair) = AssetPair::new(asset_a(), asset_b()) else {
            panic!("valid pair");
        };
        assert_eq!(pool.initialize(pair), Err(AmmError::AlreadyInitialized));
    }

    #[test]
    fn operations_require_initialization() {
        let mut pool = Pool::new(addr(100));
        let mut ledger = InMemoryLedger::new();
        assert_eq!(pool.mint(&mut ledger, provider()), Err(AmmError::NotInitialized));
    }

    // -- mint -----------------------------------------------------------------

    #[test]
    fn bootstrap_mint_issues_geometric_mean() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        // floor(sqrt(100 * 200)) = 141
        let shares = seed(&mut pool, &mut ledger, 100, 200);
        assert_eq!(shares, Shares::new(141));
        assert_eq!(pool.get_reserves(), (Amount::new(100), Amount::new(200)));
        assert_eq!(pool.total_shares(), Shares::new(141));
        assert_eq!(pool.share_balance_of(provider()), Shares::new(141));
    }

    #[test]
    fn mint_with_no_contribution_fails() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);
        assert_eq!(
            pool.mint(&mut ledger, provider()),
            Err(AmmError::InsufficientLiquidityMinted)
        );
    }

    #[test]
    fn proportional_mint_issues_proportional_shares() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 4_000);
        // Second deposit at the pool ratio: +10%.
        ledger.mint_to(asset_a(), pool.address(), Amount::new(100));
        ledger.mint_to(asset_b(), pool.address(), Amount::new(400));
        let Ok(shares) = pool.mint(&mut ledger, trader()) else {
            panic!("expected Ok");
        };
        assert_eq!(shares, Shares::new(200)); // 10% of sqrt(1000*4000)=2000
        assert_eq!(pool.get_reserves(), (Amount::new(1_100), Amount::new(4_400)));
    }

    #[test]
    fn lopsided_mint_uses_scarcer_side() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);
        // 10% of asset0 but 50% of asset1: only the 10% side counts.
        ledger.mint_to(asset_a(), pool.address(), Amount::new(100));
        ledger.mint_to(asset_b(), pool.address(), Amount::new(500));
        let Ok(shares) = pool.mint(&mut ledger, trader()) else {
            panic!("expected Ok");
        };
        assert_eq!(shares, Shares::new(100));
    }

    #[test]
    fn mint_emits_records() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        let shares = seed(&mut pool, &mut ledger, 100, 200);
        let events = pool.take_events();
        assert!(events.contains(&PoolEvent::Mint {
            amount0: Amount::new(100),
            amount1: Amount::new(200),
            shares,
            recipient: provider(),
        }));
        assert!(events.contains(&PoolEvent::Sync {
            reserve0: Amount::new(100),
            reserve1: Amount::new(200),
        }));
    }

    #[test]
    fn mint_rejects_balances_beyond_ceiling() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        ledger.mint_to(asset_a(), pool.address(), Amount::new(RESERVE_CEILING));
        ledger.mint_to(asset_b(), pool.address(), Amount::new(1));
        assert_eq!(
            pool.mint(&mut ledger, provider()),
            Err(AmmError::ReserveOverflow)
        );
    }

    // -- burn -----------------------------------------------------------------

    #[test]
    fn burn_pays_pro_rata_and_shrinks_supply() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        let shares = seed(&mut pool, &mut ledger, 3_000, 3_000);
        assert_eq!(shares, Shares::new(3_000));

        // Move a third of the shares into pool custody and burn them.
        let Ok(()) = pool.transfer_shares(provider(), pool.address(), Shares::new(1_000)) else {
            panic!("share transfer succeeds");
        };
        let Ok((amount0, amount1)) = pool.burn(&mut ledger, trader()) else {
            panic!("expected Ok");
        };
        assert_eq!(amount0, Amount::new(1_000));
        assert_eq!(amount1, Amount::new(1_000));
        assert_eq!(pool.total_shares(), Shares::new(2_000));
        assert_eq!(pool.get_reserves(), (Amount::new(2_000), Amount::new(2_000)));
        assert_eq!(ledger.balance_of(asset_a(), trader()), Amount::new(1_000));
    }

    #[test]
    fn burn_without_custody_shares_fails() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);
        assert_eq!(
            pool.burn(&mut ledger, trader()),
            Err(AmmError::NoLiquidityToBurn)
        );
    }

    #[test]
    fn burn_distributes_unreconciled_donations() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);
        // A direct transfer outside the mint path.
        ledger.mint_to(asset_a(), pool.address(), Amount::new(500));

        let Ok(()) = pool.transfer_shares(provider(), pool.address(), Shares::new(500)) else {
            panic!("share transfer succeeds");
        };
        let Ok((amount0, amount1)) = pool.burn(&mut ledger, trader()) else {
            panic!("expected Ok");
        };
        // Half the shares claim half of the *true* balance (1500), not
        // half of the declared reserve (1000).
        assert_eq!(amount0, Amount::new(750));
        assert_eq!(amount1, Amount::new(500));
    }

    #[test]
    fn burn_rounding_favours_the_pool() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);
        let Ok(()) = pool.transfer_shares(provider(), pool.address(), Shares::new(333)) else {
            panic!("share transfer succeeds");
        };
        let Ok((amount0, amount1)) = pool.burn(&mut ledger, trader()) else {
            panic!("expected Ok");
        };
        // 333 * 1000 / 1000 = 333 exactly; payout never rounds up.
        assert_eq!(amount0, Amount::new(333));
        assert_eq!(amount1, Amount::new(333));
    }

    // -- swap -----------------------------------------------------------------

    /// Closed-form output for a 0.3% input fee; mirrors the router quote.
    fn expected_out(amount_in: u128, reserve_in: u128, reserve_out: u128) -> u128 {
        amount_in * 997 * reserve_out / (reserve_in * 1_000 + amount_in * 997)
    }

    #[test]
    fn swap_at_quoted_output_succeeds() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 100, 200_000);

        // Deposit 10 of asset0, take the quoted asset1 output.
        let out = expected_out(10, 100, 200_000);
        assert_eq!(out, 18_132);
        ledger.mint_to(asset_a(), pool.address(), Amount::new(10));
        let Ok(()) = pool.swap(&mut ledger, Amount::ZERO, Amount::new(out), trader()) else {
            panic!("expected Ok");
        };
        assert_eq!(ledger.balance_of(asset_b(), trader()), Amount::new(out));
        assert_eq!(
            pool.get_reserves(),
            (Amount::new(110), Amount::new(200_000 - out))
        );
    }

    #[test]
    fn swap_product_never_shrinks() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 5_000, 9_000);
        let (r0, r1) = pool.get_reserves();
        let k_before = U256::from(r0.get()) * U256::from(r1.get());

        let out = expected_out(250, 5_000, 9_000);
        ledger.mint_to(asset_a(), pool.address(), Amount::new(250));
        let Ok(()) = pool.swap(&mut ledger, Amount::ZERO, Amount::new(out), trader()) else {
            panic!("expected Ok");
        };

        let (r0, r1) = pool.get_reserves();
        let k_after = U256::from(r0.get()) * U256::from(r1.get());
        assert!(k_after >= k_before);
    }

    #[test]
    fn swap_rejects_zero_and_double_output() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);
        assert_eq!(
            pool.swap(&mut ledger, Amount::ZERO, Amount::ZERO, trader()),
            Err(AmmError::InvalidOutputRequest)
        );
        assert_eq!(
            pool.swap(&mut ledger, Amount::new(1), Amount::new(1), trader()),
            Err(AmmError::InvalidOutputRequest)
        );
    }

    #[test]
    fn swap_rejects_asset_recipient() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);
        assert_eq!(
            pool.swap(&mut ledger, Amount::new(1), Amount::ZERO, asset_a()),
            Err(AmmError::InvalidRecipient)
        );
    }

    #[test]
    fn swap_cannot_drain_reserve() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);
        assert_eq!(
            pool.swap(&mut ledger, Amount::new(1_000), Amount::ZERO, trader()),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn swap_without_deposit_reverts_output() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);

        let result = pool.swap(&mut ledger, Amount::ZERO, Amount::new(100), trader());
        assert_eq!(result, Err(AmmError::InsufficientInput));
        // The optimistic output was clawed back.
        assert_eq!(ledger.balance_of(asset_b(), trader()), Amount::ZERO);
        assert_eq!(
            ledger.balance_of(asset_b(), pool.address()),
            Amount::new(1_000)
        );
        assert_eq!(pool.get_reserves(), (Amount::new(1_000), Amount::new(1_000)));
    }

    #[test]
    fn swap_with_underpriced_input_fails_invariant() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);

        // Fair price for 100 out is ~112 in; deposit far less.
        ledger.mint_to(asset_a(), pool.address(), Amount::new(50));
        let result = pool.swap(&mut ledger, Amount::ZERO, Amount::new(100), trader());
        assert_eq!(result, Err(AmmError::InvariantViolated));
        assert_eq!(ledger.balance_of(asset_b(), trader()), Amount::ZERO);
        assert_eq!(pool.get_reserves(), (Amount::new(1_000), Amount::new(1_000)));
    }

    #[test]
    fn swap_just_below_fee_boundary_fails() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 100, 200_000);

        // One more unit of output than the quote supports.
        let out = expected_out(10, 100, 200_000) + 1;
        ledger.mint_to(asset_a(), pool.address(), Amount::new(10));
        let result = pool.swap(&mut ledger, Amount::ZERO, Amount::new(out), trader());
        assert_eq!(result, Err(AmmError::InvariantViolated));
    }

    #[test]
    fn swap_in_asset1_direction() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 200_000, 100);

        let out = expected_out(10, 100, 200_000);
        ledger.mint_to(asset_b(), pool.address(), Amount::new(10));
        let Ok(()) = pool.swap(&mut ledger, Amount::new(out), Amount::ZERO, trader()) else {
            panic!("expected Ok");
        };
        assert_eq!(ledger.balance_of(asset_a(), trader()), Amount::new(out));
    }

    // -- reentrancy guard -----------------------------------------------------

    #[test]
    fn guard_rejects_recursive_entry() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);

        pool.entered = true;
        assert_eq!(pool.mint(&mut ledger, provider()), Err(AmmError::Reentrant));
        assert_eq!(pool.burn(&mut ledger, provider()), Err(AmmError::Reentrant));
        assert_eq!(
            pool.swap(&mut ledger, Amount::new(1), Amount::ZERO, trader()),
            Err(AmmError::Reentrant)
        );
        assert_eq!(pool.sync(&mut ledger), Err(AmmError::Reentrant));
    }

    #[test]
    fn guard_clears_after_failure() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);

        // A failing operation must release the guard.
        assert_eq!(
            pool.swap(&mut ledger, Amount::ZERO, Amount::ZERO, trader()),
            Err(AmmError::InvalidOutputRequest)
        );
        assert_eq!(pool.sync(&mut ledger), Ok(()));
    }

    // -- skim / sync ----------------------------------------------------------

    #[test]
    fn skim_pays_out_exact_excess() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);
        ledger.mint_to(asset_a(), pool.address(), Amount::new(77));

        let Ok(()) = pool.skim(&mut ledger, trader()) else {
            panic!("expected Ok");
        };
        assert_eq!(ledger.balance_of(asset_a(), trader()), Amount::new(77));
        assert_eq!(pool.get_reserves(), (Amount::new(1_000), Amount::new(1_000)));
    }

    #[test]
    fn sync_folds_excess_into_reserves() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);
        ledger.mint_to(asset_a(), pool.address(), Amount::new(77));

        let marker_before = pool.last_update();
        let Ok(()) = pool.sync(&mut ledger) else {
            panic!("expected Ok");
        };
        assert_eq!(pool.get_reserves(), (Amount::new(1_077), Amount::new(1_000)));
        assert!(pool.last_update() > marker_before);
    }

    // -- share transfers ------------------------------------------------------

    #[test]
    fn share_transfer_conserves_supply() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);

        let Ok(()) = pool.transfer_shares(provider(), trader(), Shares::new(400)) else {
            panic!("expected Ok");
        };
        assert_eq!(pool.share_balance_of(provider()), Shares::new(600));
        assert_eq!(pool.share_balance_of(trader()), Shares::new(400));
        assert_eq!(pool.total_shares(), Shares::new(1_000));
    }

    #[test]
    fn share_transfer_beyond_balance_fails() {
        let mut pool = make_pool();
        let mut ledger = InMemoryLedger::new();
        seed(&mut pool, &mut ledger, 1_000, 1_000);
        assert_eq!(
            pool.transfer_shares(provider(), trader(), Shares::new(1_001)),
            Err(AmmError::InsufficientShares)
        );
    }
}
