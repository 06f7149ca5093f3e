//! Entity lifecycle: creation, removal, slot reuse, density.

use drawbench_foundation::{EntityKind, Handle};
use drawbench_store::{SchemaRegistry, SlotFlags, Store};
use proptest::prelude::*;

fn store() -> (Store, EntityKind) {
    let mut registry = SchemaRegistry::new();
    let position = registry.register_component("position", 8).unwrap();
    let symbol = registry.register_kind("symbol").unwrap();
    registry.declare(symbol, position).unwrap();
    (Store::new(registry.into_shared()), symbol)
}

// =============================================================================
// Handle Uniqueness
// =============================================================================

#[test]
fn reused_slot_never_resolves_old_handle() {
    let (mut store, symbol) = store();

    let old = store.create(symbol).unwrap();
    store.remove(old).unwrap();
    let new = store.create(symbol).unwrap();

    // Same slot, advanced generation
    assert_eq!(new.index, old.index);
    assert!(new.generation > old.generation);

    // The old handle reports dead against the new occupant
    assert!(!store.has(old));
    assert!(store.has(new));
}

#[test]
fn many_reuse_cycles_keep_generations_distinct() {
    let (mut store, symbol) = store();
    let mut seen = Vec::new();

    for _ in 0..20 {
        let h = store.create(symbol).unwrap();
        assert!(!seen.contains(&h));
        seen.push(h);
        store.remove(h).unwrap();
    }
}

// =============================================================================
// Dense Table Invariant
// =============================================================================

#[test]
fn length_tracks_live_entities_exactly() {
    let (mut store, symbol) = store();

    let a = store.create(symbol).unwrap();
    let b = store.create(symbol).unwrap();
    let c = store.create(symbol).unwrap();
    assert_eq!(store.count(symbol).unwrap(), 3);

    store.remove(b).unwrap();
    assert_eq!(store.count(symbol).unwrap(), 2);

    store.remove(a).unwrap();
    store.remove(c).unwrap();
    assert_eq!(store.count(symbol).unwrap(), 0);
}

#[test]
fn every_row_is_live_after_churn() {
    let (mut store, symbol) = store();
    let mut live = Vec::new();

    for round in 0..50 {
        live.push(store.create(symbol).unwrap());
        if round % 3 == 0 && live.len() > 1 {
            let victim = live.swap_remove(live.len() / 2);
            store.remove(victim).unwrap();
        }
    }

    // Iteration visits exactly the live set, once each
    let mut visited: Vec<Handle> = store.iterate(symbol).unwrap().collect();
    assert_eq!(visited.len(), live.len());
    visited.sort_by_key(|h| h.to_bits());
    let mut expected = live.clone();
    expected.sort_by_key(|h| h.to_bits());
    assert_eq!(visited, expected);
}

proptest! {
    #[test]
    fn density_holds_for_arbitrary_interleavings(
        ops in proptest::collection::vec(any::<u8>(), 1..150)
    ) {
        let (mut store, symbol) = store();
        let mut live: Vec<Handle> = Vec::new();

        for op in ops {
            if op % 3 != 0 || live.is_empty() {
                live.push(store.create(symbol).unwrap());
            } else {
                let victim = live.swap_remove(op as usize % live.len());
                store.remove(victim).unwrap();
            }
            prop_assert_eq!(store.count(symbol).unwrap(), live.len());
            for h in &live {
                prop_assert!(store.has(*h));
            }
        }
    }
}

// =============================================================================
// Mirrored Creation
// =============================================================================

#[test]
fn mirror_store_assigns_matching_ids() {
    let (mut primary, symbol) = store();
    let (mut mirror, mirror_symbol) = store();

    for _ in 0..5 {
        let h = primary.create(symbol).unwrap();
        mirror.create_with_handle(mirror_symbol, h).unwrap();
    }
    let victim = primary.iterate(symbol).unwrap().nth(2).unwrap();
    primary.remove(victim).unwrap();
    mirror.remove(victim).unwrap();

    let h = primary.create(symbol).unwrap();
    mirror.create_with_handle(mirror_symbol, h).unwrap();

    let mut left: Vec<Handle> = primary.iterate(symbol).unwrap().collect();
    let mut right: Vec<Handle> = mirror.iterate(mirror_symbol).unwrap().collect();
    left.sort_by_key(|h| h.to_bits());
    right.sort_by_key(|h| h.to_bits());
    assert_eq!(left, right);
}

// =============================================================================
// Transient Flags
// =============================================================================

#[test]
fn selection_flags_leave_handles_untouched() {
    let (mut store, symbol) = store();
    let h = store.create(symbol).unwrap();

    store.insert_flags(h, SlotFlags::SELECTED).unwrap();
    store.insert_flags(h, SlotFlags::HIGHLIGHTED).unwrap();
    store.remove_flags(h, SlotFlags::SELECTED).unwrap();

    // The same handle still resolves; no re-encoding ever happened
    assert!(store.has(h));
    assert_eq!(store.flags(h).unwrap(), SlotFlags::HIGHLIGHTED);
}
