//! Relation list integrity under interleaved appends and removals.

use drawbench_foundation::{ComponentKind, EntityKind, Handle};
use drawbench_store::{RelationLink, RelationList, SchemaRegistry, Store};
use proptest::prelude::*;

struct Fixture {
    store: Store,
    net: EntityKind,
    endpoint: EntityKind,
    members: ComponentKind,
    link: ComponentKind,
}

fn fixture() -> Fixture {
    let mut registry = SchemaRegistry::new();
    let members = registry
        .register_component("members", RelationList::SIZE)
        .unwrap();
    let link = registry
        .register_component("link", RelationLink::SIZE)
        .unwrap();
    let net = registry.register_kind("net").unwrap();
    let endpoint = registry.register_kind("endpoint").unwrap();
    registry.declare(net, members).unwrap();
    registry.declare(endpoint, link).unwrap();

    Fixture {
        store: Store::new(registry.into_shared()),
        net,
        endpoint,
        members,
        link,
    }
}

fn forward(f: &Fixture, owner: Handle) -> Vec<Handle> {
    f.store
        .relation_iter(owner, f.members, f.link)
        .unwrap()
        .collect()
}

fn backward(f: &Fixture, owner: Handle) -> Vec<Handle> {
    f.store
        .relation_iter_rev(owner, f.members, f.link)
        .unwrap()
        .collect()
}

// =============================================================================
// Append Order and Traversal Symmetry
// =============================================================================

#[test]
fn forward_walk_matches_append_order() {
    let mut f = fixture();
    let net = f.store.create(f.net).unwrap();
    let endpoints: Vec<_> = (0..7)
        .map(|_| f.store.create(f.endpoint).unwrap())
        .collect();
    for &e in &endpoints {
        f.store.relation_append(net, e, f.members, f.link).unwrap();
    }

    assert_eq!(forward(&f, net), endpoints);
}

#[test]
fn backward_walk_is_the_exact_reverse() {
    let mut f = fixture();
    let net = f.store.create(f.net).unwrap();
    let endpoints: Vec<_> = (0..7)
        .map(|_| f.store.create(f.endpoint).unwrap())
        .collect();
    for &e in &endpoints {
        f.store.relation_append(net, e, f.members, f.link).unwrap();
    }

    let mut reversed = endpoints.clone();
    reversed.reverse();
    assert_eq!(backward(&f, net), reversed);
}

// =============================================================================
// N Appends, M Removals
// =============================================================================

#[test]
fn survivors_stay_in_append_order_after_removals() {
    let mut f = fixture();
    let net = f.store.create(f.net).unwrap();
    let endpoints: Vec<_> = (0..10)
        .map(|_| f.store.create(f.endpoint).unwrap())
        .collect();
    for &e in &endpoints {
        f.store.relation_append(net, e, f.members, f.link).unwrap();
    }

    // Remove head, tail, and two interior members
    for &victim in &[endpoints[0], endpoints[9], endpoints[4], endpoints[5]] {
        f.store
            .relation_remove(net, victim, f.members, f.link)
            .unwrap();
    }

    let expected = vec![
        endpoints[1],
        endpoints[2],
        endpoints[3],
        endpoints[6],
        endpoints[7],
        endpoints[8],
    ];
    assert_eq!(forward(&f, net), expected);

    let mut reversed = expected;
    reversed.reverse();
    assert_eq!(backward(&f, net), reversed);
}

proptest! {
    #[test]
    fn traversals_visit_exactly_the_linked_set(
        removals in proptest::collection::vec(any::<u8>(), 0..12)
    ) {
        let mut f = fixture();
        let net = f.store.create(f.net).unwrap();
        let mut linked: Vec<Handle> = (0..12)
            .map(|_| f.store.create(f.endpoint).unwrap())
            .collect();
        for &e in &linked {
            f.store.relation_append(net, e, f.members, f.link).unwrap();
        }

        for pick in removals {
            if linked.is_empty() {
                break;
            }
            let victim = linked.remove(pick as usize % linked.len());
            f.store.relation_remove(net, victim, f.members, f.link).unwrap();
        }

        prop_assert_eq!(forward(&f, net), linked.clone());
        let mut reversed = linked;
        reversed.reverse();
        prop_assert_eq!(backward(&f, net), reversed);
    }
}

// =============================================================================
// Membership Moves Between Owners
// =============================================================================

#[test]
fn member_can_move_to_another_owner_after_unlink() {
    let mut f = fixture();
    let net_a = f.store.create(f.net).unwrap();
    let net_b = f.store.create(f.net).unwrap();
    let e = f.store.create(f.endpoint).unwrap();

    f.store.relation_append(net_a, e, f.members, f.link).unwrap();
    f.store.relation_remove(net_a, e, f.members, f.link).unwrap();
    f.store.relation_append(net_b, e, f.members, f.link).unwrap();

    assert!(forward(&f, net_a).is_empty());
    assert_eq!(forward(&f, net_b), vec![e]);
}

// =============================================================================
// Lists Survive Row Compaction
// =============================================================================

#[test]
fn links_stay_valid_when_rows_move() {
    let mut f = fixture();
    let net = f.store.create(f.net).unwrap();
    let endpoints: Vec<_> = (0..5)
        .map(|_| f.store.create(f.endpoint).unwrap())
        .collect();
    // Only link the last three; the first two exist to be removed so the
    // linked members' rows get compacted underneath the list.
    for &e in &endpoints[2..] {
        f.store.relation_append(net, e, f.members, f.link).unwrap();
    }

    f.store.remove(endpoints[0]).unwrap();
    f.store.remove(endpoints[1]).unwrap();

    assert_eq!(forward(&f, net), endpoints[2..].to_vec());
}
