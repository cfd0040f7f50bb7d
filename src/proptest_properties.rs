//! Property-based tests using `proptest` for engine invariants.
//!
//! Covers the core economic properties:
//!
//! 1. **Round-trip loss** — swapping A→B→A never returns more than the
//!    original input.
//! 2. **Invariant preservation** — the reserve product never decreases
//!    across a committed swap.
//! 3. **Liquidity conservation** — minting then burning all shares
//!    never pays out more than was deposited.
//! 4. **Quote sufficiency** — `get_amount_out(get_amount_in(x)) ≥ x`.
//! 5. **Bootstrap issue** — first-mint shares are the floor square root
//!    of the deposit product.
//! 6. **Address determinism** — pool addressing is order-insensitive
//!    and collision-free across distinct pairs.

#![allow(clippy::panic)]

use proptest::prelude::*;

use crate::domain::{Address, Amount, AssetPair, Shares};
use crate::ledger::InMemoryLedger;
use crate::math::U256;
use crate::pool::Pool;
use crate::registry::pool_address_for;
use crate::router::Router;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn asset_a() -> Address {
    Address::from_bytes([1u8; 32])
}

fn asset_b() -> Address {
    Address::from_bytes([2u8; 32])
}

fn provider() -> Address {
    Address::from_bytes([10u8; 32])
}

fn trader() -> Address {
    Address::from_bytes([11u8; 32])
}

/// Creates an initialized pool seeded with the given reserves.
fn make_pool(ra: u128, rb: u128, ledger: &mut InMemoryLedger) -> Pool {
    let mut pool = Pool::new(Address::from_bytes([100u8; 32]));
    let Ok(pair) = AssetPair::new(asset_a(), asset_b()) else {
        panic!("valid pair");
    };
    let Ok(()) = pool.initialize(pair) else {
        panic!("first initialize succeeds");
    };
    ledger.mint_to(asset_a(), pool.address(), Amount::new(ra));
    ledger.mint_to(asset_b(), pool.address(), Amount::new(rb));
    let Ok(_) = pool.mint(ledger, provider()) else {
        panic!("seed mint succeeds");
    };
    pool
}

fn reserve_product(pool: &Pool) -> U256 {
    let (r0, r1) = pool.get_reserves();
    U256::from(r0.get()) * U256::from(r1.get())
}

/// Swaps an exact input of `asset_in`, taking the quoted output.
fn swap_exact_in(
    pool: &mut Pool,
    ledger: &mut InMemoryLedger,
    asset_in: Address,
    amount_in: u128,
) -> Option<u128> {
    let (r0, r1) = pool.get_reserves();
    let (reserve_in, reserve_out) = if asset_in == asset_a() {
        (r0, r1)
    } else {
        (r1, r0)
    };
    let out = Router::get_amount_out(Amount::new(amount_in), reserve_in, reserve_out).ok()?;
    if out.is_zero() {
        return None;
    }
    ledger.mint_to(asset_in, pool.address(), Amount::new(amount_in));
    let (out0, out1) = if asset_in == asset_a() {
        (Amount::ZERO, out)
    } else {
        (out, Amount::ZERO)
    };
    pool.swap(ledger, out0, out1, trader()).ok()?;
    Some(out.get())
}

// ---------------------------------------------------------------------------
// Custom strategies
// ---------------------------------------------------------------------------

/// Reserve values in range [10_000, 10_000_000] to avoid extremes.
fn reserve_strategy() -> impl Strategy<Value = u128> {
    10_000u128..=10_000_000u128
}

/// Swap inputs up to 10% of the smaller reserve bound.
fn swap_in_strategy() -> impl Strategy<Value = u128> {
    1u128..=1_000u128
}

fn address_byte_strategy() -> impl Strategy<Value = u8> {
    1u8..=255u8
}

// ---------------------------------------------------------------------------
// Property 1: Round-trip loss
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip_loses_value(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        swap_in in swap_in_strategy(),
    ) {
        let mut ledger = InMemoryLedger::new();
        let mut pool = make_pool(ra, rb, &mut ledger);

        let Some(received_b) = swap_exact_in(&mut pool, &mut ledger, asset_a(), swap_in) else {
            return Ok(());
        };
        let Some(final_a) = swap_exact_in(&mut pool, &mut ledger, asset_b(), received_b) else {
            return Ok(());
        };

        prop_assert!(
            final_a <= swap_in,
            "round-trip should lose value: final={} > original={}",
            final_a, swap_in
        );
    }

    #[test]
    fn prop_invariant_never_decreases(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        swap_in in swap_in_strategy(),
    ) {
        let mut ledger = InMemoryLedger::new();
        let mut pool = make_pool(ra, rb, &mut ledger);
        let k_before = reserve_product(&pool);

        if swap_exact_in(&mut pool, &mut ledger, asset_a(), swap_in).is_none() {
            return Ok(());
        }

        let k_after = reserve_product(&pool);
        prop_assert!(
            k_after >= k_before,
            "reserve product shrank: before={k_before} after={k_after}"
        );
    }

    #[test]
    fn prop_mint_burn_conserves_assets(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
    ) {
        let mut ledger = InMemoryLedger::new();
        let mut pool = make_pool(ra, rb, &mut ledger);

        let shares = pool.share_balance_of(provider());
        let Ok(()) = pool.transfer_shares(provider(), pool.address(), shares) else {
            panic!("share transfer succeeds");
        };
        let Ok((out_a, out_b)) = pool.burn(&mut ledger, provider()) else {
            return Ok(());
        };

        prop_assert!(out_a.get() <= ra, "paid out more asset0 than deposited");
        prop_assert!(out_b.get() <= rb, "paid out more asset1 than deposited");
        prop_assert_eq!(pool.total_shares(), Shares::ZERO);
    }

    #[test]
    fn prop_amount_in_quote_is_sufficient(
        reserve_in in reserve_strategy(),
        reserve_out in reserve_strategy(),
        want_out in 1u128..=1_000u128,
    ) {
        let Ok(amount_in) = Router::get_amount_in(
            Amount::new(want_out),
            Amount::new(reserve_in),
            Amount::new(reserve_out),
        ) else {
            return Ok(());
        };
        let Ok(got_out) = Router::get_amount_out(
            amount_in,
            Amount::new(reserve_in),
            Amount::new(reserve_out),
        ) else {
            return Ok(());
        };

        prop_assert!(
            got_out.get() >= want_out,
            "quoted input {} yields only {} of requested {}",
            amount_in, got_out, want_out
        );
    }

    #[test]
    fn prop_bootstrap_shares_are_floor_sqrt(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
    ) {
        let mut ledger = InMemoryLedger::new();
        let pool = make_pool(ra, rb, &mut ledger);

        let shares = U256::from(pool.total_shares().get());
        let product = U256::from(ra) * U256::from(rb);
        prop_assert!(shares * shares <= product);
        prop_assert!((shares + 1) * (shares + 1) > product);
    }

    #[test]
    fn prop_pool_addresses_are_order_insensitive(
        byte_a in address_byte_strategy(),
        byte_b in address_byte_strategy(),
        registry_byte in address_byte_strategy(),
    ) {
        prop_assume!(byte_a != byte_b);
        let registry = Address::from_bytes([registry_byte; 32]);
        let a = Address::from_bytes([byte_a; 32]);
        let b = Address::from_bytes([byte_b; 32]);

        let Ok(pair_ab) = AssetPair::new(a, b) else {
            panic!("valid pair");
        };
        let Ok(pair_ba) = AssetPair::new(b, a) else {
            panic!("valid pair");
        };
        prop_assert_eq!(
            pool_address_for(registry, pair_ab),
            pool_address_for(registry, pair_ba)
        );
    }
}
