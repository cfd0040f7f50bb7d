//! Full engine lifecycle demo.
//!
//! Creates a pool through the registry, provides liquidity, executes
//! single- and multi-hop swaps, and withdraws liquidity with accrued
//! fees.
//!
//! # Run
//!
//! ```bash
//! cargo run --example lifecycle
//! ```

use tidepool::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("=== Tidepool lifecycle ===\n");

    // ── 1. Actors and assets ────────────────────────────────────────────
    let gold = Address::from_bytes([1u8; 32]);
    let silver = Address::from_bytes([2u8; 32]);
    let copper = Address::from_bytes([3u8; 32]);
    let alice = Address::from_bytes([10u8; 32]);
    let bob = Address::from_bytes([11u8; 32]);

    let mut registry = Registry::new(Address::from_bytes([0xAA; 32]));
    let router = Router::new(Address::from_bytes([0xBB; 32]));
    let mut ledger = InMemoryLedger::new();

    for (holder, asset, amount) in [
        (alice, gold, 2_000_000u128),
        (alice, silver, 2_000_000),
        (alice, copper, 2_000_000),
        (bob, gold, 50_000),
    ] {
        ledger.mint_to(asset, holder, Amount::new(amount));
        ledger.approve(asset, holder, router.address(), Amount::new(u128::MAX));
    }

    // ── 2. Pool addresses are computable before creation ────────────────
    let pair = AssetPair::new(gold, silver)?;
    let predicted = pool_address_for(registry.address(), pair);
    println!("predicted gold/silver pool address: {predicted}");

    // ── 3. Provide liquidity (creates the pools) ────────────────────────
    let (used_a, used_b, shares) = router.add_liquidity(
        &mut registry,
        &mut ledger,
        gold,
        silver,
        Amount::new(1_000_000),
        Amount::new(1_000_000),
        Amount::ZERO,
        Amount::ZERO,
        alice,
        alice,
    )?;
    println!("seeded gold/silver: {used_a}/{used_b} for {shares} shares");

    router.add_liquidity(
        &mut registry,
        &mut ledger,
        silver,
        copper,
        Amount::new(1_000_000),
        Amount::new(1_000_000),
        Amount::ZERO,
        Amount::ZERO,
        alice,
        alice,
    )?;
    assert_eq!(registry.get_pool(gold, silver), Some(predicted));

    // ── 4. Single-hop swap with a slippage bound ────────────────────────
    let quoted = Router::get_amount_out(
        Amount::new(10_000),
        Amount::new(1_000_000),
        Amount::new(1_000_000),
    )?;
    let amounts = router.swap_exact_assets_for_assets(
        &mut registry,
        &mut ledger,
        Amount::new(10_000),
        quoted,
        &[gold, silver],
        bob,
        bob,
    )?;
    println!("bob swapped {} gold -> {} silver", amounts[0], amounts[1]);

    // ── 5. Multi-hop: gold -> silver -> copper ──────────────────────────
    let amounts = router.swap_exact_assets_for_assets(
        &mut registry,
        &mut ledger,
        Amount::new(10_000),
        Amount::ZERO,
        &[gold, silver, copper],
        bob,
        bob,
    )?;
    println!(
        "bob swapped {} gold -> {} silver -> {} copper",
        amounts[0], amounts[1], amounts[2]
    );

    // ── 6. Withdraw all liquidity; fees accrued to the provider ─────────
    let (out_gold, out_silver) = router.remove_liquidity(
        &mut registry,
        &mut ledger,
        gold,
        silver,
        shares,
        Amount::ZERO,
        Amount::ZERO,
        alice,
        alice,
    )?;
    println!("alice withdrew {out_gold} gold and {out_silver} silver");
    assert!(out_gold > Amount::new(1_000_000)); // swap inputs + fees landed here

    Ok(())
}
