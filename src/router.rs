//! User-facing orchestration over the registry and pools.
//!
//! Pools expose a deliberately raw interface: they infer contributions
//! and swap inputs from balance deltas and never touch caller funds.
//! The [`Router`] supplies the safe ergonomics on top — ratio-matched
//! liquidity provision, minimum-output and maximum-input slippage
//! bounds, and multi-hop swap paths — by moving caller funds with
//! [`AssetLedger::transfer_from`] under a prior allowance.
//!
//! Every slippage and input bound is checked *before* the first
//! transfer, so a rejected call leaves the ledger untouched. Hop
//! amounts are precomputed from the quoting formulas, which means each
//! intermediate swap satisfies the pool invariant exactly.

use tracing::info;

use crate::domain::{Address, Amount, Rounding, Shares};
use crate::error::{AmmError, Result};
use crate::ledger::AssetLedger;
use crate::math::{self, U256};
use crate::pool::Pool;
use crate::registry::Registry;

const FEE_COMPLEMENT: u64 = 997;
const FEE_SCALE: u64 = 1_000;

/// Stateless orchestrator identified by its own spender address.
///
/// Callers grant the router an allowance on the asset ledger; the
/// router pulls exactly the computed amounts into pool custody and
/// never retains funds.
#[derive(Debug, Clone, Copy)]
pub struct Router {
    address: Address,
}

impl Router {
    /// Creates a router with the given spender address.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// Returns the router's spender address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    // -- pure quoting --------------------------------------------------------

    /// Quotes the ratio-equivalent amount of asset B for `amount_a` of
    /// asset A: `amount_a × reserve_b / reserve_a`, rounded down. No fee
    /// is applied; this prices liquidity provision, not swaps.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InsufficientAmount`] if `amount_a` is zero.
    /// - [`AmmError::InsufficientLiquidity`] if either reserve is zero.
    pub fn quote(amount_a: Amount, reserve_a: Amount, reserve_b: Amount) -> Result<Amount> {
        if amount_a.is_zero() {
            return Err(AmmError::InsufficientAmount);
        }
        if reserve_a.is_zero() || reserve_b.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        math::mul_div(amount_a, reserve_b, reserve_a, Rounding::Down)
    }

    /// Maximum output for an exact input after the 0.3% fee:
    /// `floor(in·997·reserve_out / (reserve_in·1000 + in·997))`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InsufficientInput`] if `amount_in` is zero.
    /// - [`AmmError::InsufficientLiquidity`] if either reserve is zero.
    pub fn get_amount_out(
        amount_in: Amount,
        reserve_in: Amount,
        reserve_out: Amount,
    ) -> Result<Amount> {
        if amount_in.is_zero() {
            return Err(AmmError::InsufficientInput);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        let in_with_fee = U256::from(amount_in.get()) * U256::from(FEE_COMPLEMENT);
        let numerator = in_with_fee * U256::from(reserve_out.get());
        let denominator = U256::from(reserve_in.get()) * U256::from(FEE_SCALE) + in_with_fee;
        math::u256_to_amount(numerator / denominator)
    }

    /// Minimum input for an exact output after the 0.3% fee:
    /// `floor(reserve_in·out·1000 / ((reserve_out − out)·997)) + 1`.
    ///
    /// The `+ 1` makes the quote sufficient under integer truncation, so
    /// `get_amount_out(get_amount_in(x)) ≥ x` always holds.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InsufficientAmount`] if `amount_out` is zero.
    /// - [`AmmError::InsufficientLiquidity`] if either reserve is zero
    ///   or the output meets or exceeds `reserve_out`.
    pub fn get_amount_in(
        amount_out: Amount,
        reserve_in: Amount,
        reserve_out: Amount,
    ) -> Result<Amount> {
        if amount_out.is_zero() {
            return Err(AmmError::InsufficientAmount);
        }
        if reserve_in.is_zero() || amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity);
        }
        let numerator = U256::from(reserve_in.get())
            * U256::from(amount_out.get())
            * U256::from(FEE_SCALE);
        let denominator = U256::from(reserve_out.get() - amount_out.get())
            * U256::from(FEE_COMPLEMENT);
        let quoted = math::u256_to_amount(numerator / denominator)?;
        quoted
            .checked_add(&Amount::new(1))
            .ok_or(AmmError::Overflow("amount-in quote overflow"))
    }

    /// Chains [`get_amount_out`](Router::get_amount_out) along `path`,
    /// returning the amount vector `[amount_in, hop1_out, ..]`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PathTooShort`] for fewer than two path entries.
    /// - [`AmmError::PoolNotFound`] for a hop with no pool.
    /// - Any error of the per-hop quote.
    pub fn get_amounts_out(
        registry: &Registry,
        amount_in: Amount,
        path: &[Address],
    ) -> Result<Vec<Amount>> {
        if path.len() < 2 {
            return Err(AmmError::PathTooShort);
        }
        let mut amounts = Vec::with_capacity(path.len());
        amounts.push(amount_in);
        for hop in path.windows(2) {
            let pool = registry.pool(hop[0], hop[1])?;
            let (reserve_in, reserve_out) = oriented_reserves(pool, hop[0])?;
            let last = amounts[amounts.len() - 1];
            amounts.push(Self::get_amount_out(last, reserve_in, reserve_out)?);
        }
        Ok(amounts)
    }

    /// Chains [`get_amount_in`](Router::get_amount_in) backwards along
    /// `path`, returning the amount vector ending in `amount_out`.
    ///
    /// # Errors
    ///
    /// Same classes as [`get_amounts_out`](Router::get_amounts_out).
    pub fn get_amounts_in(
        registry: &Registry,
        amount_out: Amount,
        path: &[Address],
    ) -> Result<Vec<Amount>> {
        if path.len() < 2 {
            return Err(AmmError::PathTooShort);
        }
        let mut amounts = vec![Amount::ZERO; path.len()];
        amounts[path.len() - 1] = amount_out;
        for i in (0..path.len() - 1).rev() {
            let pool = registry.pool(path[i], path[i + 1])?;
            let (reserve_in, reserve_out) = oriented_reserves(pool, path[i])?;
            amounts[i] = Self::get_amount_in(amounts[i + 1], reserve_in, reserve_out)?;
        }
        Ok(amounts)
    }

    // -- liquidity -----------------------------------------------------------

    /// Adds liquidity to the pool for `(asset_a, asset_b)`, creating the
    /// pool on first use.
    ///
    /// Deposits up to the desired amounts, scaled down on one side to
    /// match the current pool ratio; the scaled amount must still meet
    /// its minimum. Pulls the settled amounts from `caller` under the
    /// router's allowance and mints shares to `to`. Returns the settled
    /// `(amount_a, amount_b, shares)`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::SlippageTooLow`] if the ratio-matched amount falls
    ///   below its minimum.
    /// - [`AmmError::TransferFailed`] if balance or allowance is short.
    /// - Any error of [`Pool::mint`].
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity(
        &self,
        registry: &mut Registry,
        ledger: &mut dyn AssetLedger,
        asset_a: Address,
        asset_b: Address,
        amount_a_desired: Amount,
        amount_b_desired: Amount,
        amount_a_min: Amount,
        amount_b_min: Amount,
        caller: Address,
        to: Address,
    ) -> Result<(Amount, Amount, Shares)> {
        if registry.get_pool(asset_a, asset_b).is_none() {
            registry.create_pool(asset_a, asset_b)?;
        }

        let (amount_a, amount_b) = {
            let pool = registry.pool(asset_a, asset_b)?;
            let (reserve_a, reserve_b) = oriented_reserves(pool, asset_a)?;
            settle_liquidity_amounts(
                amount_a_desired,
                amount_b_desired,
                amount_a_min,
                amount_b_min,
                reserve_a,
                reserve_b,
            )?
        };

        let pool_address = registry.pool(asset_a, asset_b)?.address();
        ledger.transfer_from(asset_a, self.address, caller, pool_address, amount_a)?;
        ledger.transfer_from(asset_b, self.address, caller, pool_address, amount_b)?;

        let pool = registry.pool_mut(asset_a, asset_b)?;
        let shares = pool.mint(ledger, to)?;
        info!(pool = %pool_address, %amount_a, %amount_b, %shares, "liquidity added");
        Ok((amount_a, amount_b, shares))
    }

    /// Removes `shares` of liquidity from the pool for
    /// `(asset_a, asset_b)`, paying the underlying assets to `to`.
    ///
    /// The payout is computed up front and checked against the minimums
    /// before any share moves, so a slippage rejection has no effect.
    /// Returns the paid `(amount_a, amount_b)`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PoolNotFound`] if the pair has no pool.
    /// - [`AmmError::SlippageTooLow`] if either payout is below its
    ///   minimum.
    /// - Any error of [`Pool::transfer_shares`] or [`Pool::burn`].
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity(
        &self,
        registry: &mut Registry,
        ledger: &mut dyn AssetLedger,
        asset_a: Address,
        asset_b: Address,
        shares: Shares,
        amount_a_min: Amount,
        amount_b_min: Amount,
        caller: Address,
        to: Address,
    ) -> Result<(Amount, Amount)> {
        let pool_address = registry.pool(asset_a, asset_b)?.address();

        // Predict the payout before touching shares; burn recomputes the
        // same pro-rata formula over the same balances.
        {
            let pool = registry.pool(asset_a, asset_b)?;
            let total = pool.total_shares();
            if total.is_zero() {
                return Err(AmmError::NoLiquidityToBurn);
            }
            let balance_a = ledger.balance_of(asset_a, pool_address);
            let balance_b = ledger.balance_of(asset_b, pool_address);
            let share_amount = Amount::new(shares.get());
            let total_amount = Amount::new(total.get());
            let expect_a = math::mul_div(share_amount, balance_a, total_amount, Rounding::Down)?;
            let expect_b = math::mul_div(share_amount, balance_b, total_amount, Rounding::Down)?;
            if expect_a < amount_a_min || expect_b < amount_b_min {
                return Err(AmmError::SlippageTooLow);
            }
        }

        let pool = registry.pool_mut(asset_a, asset_b)?;
        pool.transfer_shares(caller, pool_address, shares)?;
        let (amount0, amount1) = pool.burn(ledger, to)?;

        let pair = pool.assets().ok_or(AmmError::NotInitialized)?;
        let (amount_a, amount_b) = if asset_a == pair.asset0() {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };
        info!(pool = %pool_address, %amount_a, %amount_b, %shares, "liquidity removed");
        Ok((amount_a, amount_b))
    }

    // -- swaps ---------------------------------------------------------------

    /// Swaps an exact input along `path` for at least `amount_out_min`
    /// of the final asset, paid to `to`. Returns the full amount vector.
    ///
    /// The slippage bound is checked against the precomputed amounts
    /// before any funds move, so a rejection leaves the ledger intact.
    ///
    /// # Errors
    ///
    /// - [`AmmError::SlippageTooLow`] if the quoted final output is
    ///   below `amount_out_min`.
    /// - Any error of [`get_amounts_out`](Router::get_amounts_out) or
    ///   the per-hop execution.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_assets_for_assets(
        &self,
        registry: &mut Registry,
        ledger: &mut dyn AssetLedger,
        amount_in: Amount,
        amount_out_min: Amount,
        path: &[Address],
        caller: Address,
        to: Address,
    ) -> Result<Vec<Amount>> {
        let amounts = Self::get_amounts_out(registry, amount_in, path)?;
        if amounts[amounts.len() - 1] < amount_out_min {
            return Err(AmmError::SlippageTooLow);
        }
        self.execute_path(registry, ledger, &amounts, path, caller, to)?;
        Ok(amounts)
    }

    /// Swaps at most `amount_in_max` along `path` for an exact
    /// `amount_out` of the final asset, paid to `to`. Returns the full
    /// amount vector.
    ///
    /// # Errors
    ///
    /// - [`AmmError::ExcessiveInput`] if the quoted input exceeds
    ///   `amount_in_max`.
    /// - Any error of [`get_amounts_in`](Router::get_amounts_in) or the
    ///   per-hop execution.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_assets_for_exact_assets(
        &self,
        registry: &mut Registry,
        ledger: &mut dyn AssetLedger,
        amount_out: Amount,
        amount_in_max: Amount,
        path: &[Address],
        caller: Address,
        to: Address,
    ) -> Result<Vec<Amount>> {
        let amounts = Self::get_amounts_in(registry, amount_out, path)?;
        if amounts[0] > amount_in_max {
            return Err(AmmError::ExcessiveInput);
        }
        self.execute_path(registry, ledger, &amounts, path, caller, to)?;
        Ok(amounts)
    }

    /// Moves the input into the first pool, then walks the hops; each
    /// intermediate output lands directly in the next pool's custody.
    fn execute_path(
        &self,
        registry: &mut Registry,
        ledger: &mut dyn AssetLedger,
        amounts: &[Amount],
        path: &[Address],
        caller: Address,
        to: Address,
    ) -> Result<()> {
        // The final pool would reject an asset-addressed recipient only
        // after every earlier hop committed; check before any transfer.
        let final_pair = registry
            .pool(path[path.len() - 2], path[path.len() - 1])?
            .assets()
            .ok_or(AmmError::NotInitialized)?;
        if final_pair.contains(&to) {
            return Err(AmmError::InvalidRecipient);
        }

        let first_pool = registry.pool(path[0], path[1])?.address();
        ledger.transfer_from(path[0], self.address, caller, first_pool, amounts[0])?;

        for i in 0..path.len() - 1 {
            let (input, output) = (path[i], path[i + 1]);
            let recipient = if i + 2 < path.len() {
                registry.pool(output, path[i + 2])?.address()
            } else {
                to
            };
            let pool = registry.pool_mut(input, output)?;
            let pair = pool.assets().ok_or(AmmError::NotInitialized)?;
            let amount_out = amounts[i + 1];
            let (amount0_out, amount1_out) = if output == pair.asset0() {
                (amount_out, Amount::ZERO)
            } else {
                (Amount::ZERO, amount_out)
            };
            pool.swap(ledger, amount0_out, amount1_out, recipient)?;
        }
        info!(
            hops = path.len() - 1,
            amount_in = %amounts[0],
            amount_out = %amounts[amounts.len() - 1],
            %to,
            "swap executed"
        );
        Ok(())
    }
}

/// Reserves of the pool holding `input`, ordered `(input, other)`.
fn oriented_reserves(pool: &Pool, input: Address) -> Result<(Amount, Amount)> {
    let pair = pool.assets().ok_or(AmmError::NotInitialized)?;
    let (reserve0, reserve1) = pool.get_reserves();
    if input == pair.asset0() {
        Ok((reserve0, reserve1))
    } else {
        Ok((reserve1, reserve0))
    }
}

/// Scales one desired amount down to the pool ratio and enforces the
/// per-side minimums.
fn settle_liquidity_amounts(
    amount_a_desired: Amount,
    amount_b_desired: Amount,
    amount_a_min: Amount,
    amount_b_min: Amount,
    reserve_a: Amount,
    reserve_b: Amount,
) -> Result<(Amount, Amount)> {
    if reserve_a.is_zero() && reserve_b.is_zero() {
        // First deposit sets the price; both desired amounts settle.
        return Ok((amount_a_desired, amount_b_desired));
    }
    let amount_b_optimal = Router::quote(amount_a_desired, reserve_a, reserve_b)?;
    if amount_b_optimal <= amount_b_desired {
        if amount_b_optimal < amount_b_min {
            return Err(AmmError::SlippageTooLow);
        }
        return Ok((amount_a_desired, amount_b_optimal));
    }
    let amount_a_optimal = Router::quote(amount_b_desired, reserve_b, reserve_a)?;
    if amount_a_optimal > amount_a_desired || amount_a_optimal < amount_a_min {
        return Err(AmmError::SlippageTooLow);
    }
    Ok((amount_a_optimal, amount_b_desired))
}
