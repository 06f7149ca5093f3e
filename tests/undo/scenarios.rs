//! End-to-end editing scenarios over modules, symbol kinds, and symbols.

use bytemuck::{Pod, Zeroable};
use drawbench_foundation::{ComponentKind, EntityKind, Handle};
use drawbench_runtime::Session;
use drawbench_store::{RelationLink, RelationList, SchemaRegistry};

#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Position {
    x: i32,
    y: i32,
}

struct Fixture {
    session: Session,
    module: EntityKind,
    symbol_kind: EntityKind,
    symbol: EntityKind,
    position: ComponentKind,
    /// Handle of the symbol's kind entity.
    kind_ref: ComponentKind,
    /// Module-side relation list of child symbols.
    children: ComponentKind,
    /// Symbol-side links within the module's child list.
    sibling: ComponentKind,
}

fn fixture() -> Fixture {
    let mut registry = SchemaRegistry::new();
    let position = registry.register_component("position", 8).unwrap();
    let kind_ref = registry
        .register_component("kind-ref", size_of::<Handle>())
        .unwrap();
    let children = registry
        .register_component("children", RelationList::SIZE)
        .unwrap();
    let sibling = registry
        .register_component("sibling", RelationLink::SIZE)
        .unwrap();
    let module = registry.register_kind("module").unwrap();
    let symbol_kind = registry.register_kind("symbol-kind").unwrap();
    let symbol = registry.register_kind("symbol").unwrap();
    registry.declare(module, children).unwrap();
    registry.declare(symbol, position).unwrap();
    registry.declare(symbol, kind_ref).unwrap();
    registry.declare(symbol, sibling).unwrap();

    Fixture {
        session: Session::new(registry.into_shared()),
        module,
        symbol_kind,
        symbol,
        position,
        kind_ref,
        children,
        sibling,
    }
}

impl Fixture {
    /// Creates a symbol of `kind` under `module` at a position, as the
    /// editor's place-symbol command would.
    fn place_symbol(&mut self, module: Handle, kind: Handle, at: Position) -> Handle {
        let s = self.session.create(self.symbol).unwrap();
        self.session.set(s, self.kind_ref, kind).unwrap();
        self.session.set(s, self.position, at).unwrap();
        self.session
            .relation_append(module, s, self.children, self.sibling)
            .unwrap();
        s
    }

    fn children_of(&self, module: Handle) -> Vec<Handle> {
        self.session
            .store()
            .relation_iter(module, self.children, self.sibling)
            .unwrap()
            .collect()
    }
}

// =============================================================================
// Place, Move, Undo Twice, Redo Twice
// =============================================================================

#[test]
fn move_symbol_history_walk() {
    let mut f = fixture();

    let m = f.session.create(f.module).unwrap();
    let k = f.session.create(f.symbol_kind).unwrap();
    let s1 = f.place_symbol(m, k, Position { x: 0, y: 0 });
    f.session.commit().unwrap();

    f.session
        .set(s1, f.position, Position { x: 10, y: 10 })
        .unwrap();
    f.session.commit().unwrap();

    // Undo the move
    assert!(f.session.undo().unwrap());
    let p: Position = f.session.store().get(s1, f.position).unwrap();
    assert_eq!(p, Position { x: 0, y: 0 });
    let kind: Handle = f.session.store().get(s1, f.kind_ref).unwrap();
    assert_eq!(kind, k);

    // Undo the placement
    assert!(f.session.undo().unwrap());
    assert!(!f.session.store().has(s1));
    assert!(!f.session.store().has(m));
    assert!(!f.session.store().has(k));

    // Redo both
    assert!(f.session.redo().unwrap());
    assert!(f.session.store().has(s1));
    let p: Position = f.session.store().get(s1, f.position).unwrap();
    assert_eq!(p, Position { x: 0, y: 0 });

    assert!(f.session.redo().unwrap());
    let p: Position = f.session.store().get(s1, f.position).unwrap();
    assert_eq!(p, Position { x: 10, y: 10 });
    assert_eq!(f.children_of(m), vec![s1]);
}

// =============================================================================
// One Commit Spanning Many Logical Edits
// =============================================================================

#[test]
fn batched_placements_undo_as_one_step() {
    let mut f = fixture();

    let m = f.session.create(f.module).unwrap();
    let k = f.session.create(f.symbol_kind).unwrap();
    f.session.commit().unwrap();

    // Three placements, no intermediate commits
    let s1 = f.place_symbol(m, k, Position { x: 0, y: 0 });
    let s2 = f.place_symbol(m, k, Position { x: 10, y: 0 });
    let s3 = f.place_symbol(m, k, Position { x: 20, y: 0 });
    f.session.commit().unwrap();
    assert_eq!(f.children_of(m), vec![s1, s2, s3]);

    // One undo removes all three together
    assert!(f.session.undo().unwrap());
    assert!(!f.session.store().has(s1));
    assert!(!f.session.store().has(s2));
    assert!(!f.session.store().has(s3));
    assert!(f.session.store().has(m));
    assert!(f.children_of(m).is_empty());

    // One redo brings all three back, in order
    assert!(f.session.redo().unwrap());
    assert_eq!(f.children_of(m), vec![s1, s2, s3]);
}

// =============================================================================
// Deletion With Relation Maintenance Under Undo
// =============================================================================

#[test]
fn delete_symbol_then_undo_restores_list_order() {
    let mut f = fixture();

    let m = f.session.create(f.module).unwrap();
    let k = f.session.create(f.symbol_kind).unwrap();
    let s1 = f.place_symbol(m, k, Position { x: 0, y: 0 });
    let s2 = f.place_symbol(m, k, Position { x: 5, y: 0 });
    let s3 = f.place_symbol(m, k, Position { x: 9, y: 0 });
    f.session.commit().unwrap();

    // Editor delete: unlink, then remove
    f.session
        .relation_remove(m, s2, f.children, f.sibling)
        .unwrap();
    f.session.remove(s2).unwrap();
    f.session.commit().unwrap();
    assert_eq!(f.children_of(m), vec![s1, s3]);

    assert!(f.session.undo().unwrap());
    assert!(f.session.store().has(s2));
    assert_eq!(f.children_of(m), vec![s1, s2, s3]);
    let p: Position = f.session.store().get(s2, f.position).unwrap();
    assert_eq!(p, Position { x: 5, y: 0 });

    assert!(f.session.redo().unwrap());
    assert!(!f.session.store().has(s2));
    assert_eq!(f.children_of(m), vec![s1, s3]);
}

// =============================================================================
// Compaction During a Batch Still Replays Correctly
// =============================================================================

#[test]
fn updates_after_row_moves_replay_against_the_baseline() {
    let mut f = fixture();

    let m = f.session.create(f.module).unwrap();
    let k = f.session.create(f.symbol_kind).unwrap();
    let s1 = f.place_symbol(m, k, Position { x: 1, y: 1 });
    let s2 = f.place_symbol(m, k, Position { x: 2, y: 2 });
    let s3 = f.place_symbol(m, k, Position { x: 3, y: 3 });
    f.session.commit().unwrap();

    // Removing s1 swaps s3 into its row; the subsequent update on s3 is
    // recorded against the *new* row, which only replays correctly
    // because replay always starts from the baseline.
    f.session
        .relation_remove(m, s1, f.children, f.sibling)
        .unwrap();
    f.session.remove(s1).unwrap();
    f.session
        .set(s3, f.position, Position { x: 30, y: 30 })
        .unwrap();
    f.session.commit().unwrap();

    assert!(f.session.undo().unwrap());
    let p: Position = f.session.store().get(s3, f.position).unwrap();
    assert_eq!(p, Position { x: 3, y: 3 });
    assert!(f.session.store().has(s1));

    assert!(f.session.redo().unwrap());
    let p: Position = f.session.store().get(s3, f.position).unwrap();
    assert_eq!(p, Position { x: 30, y: 30 });
    assert!(!f.session.store().has(s1));
    let p: Position = f.session.store().get(s2, f.position).unwrap();
    assert_eq!(p, Position { x: 2, y: 2 });
}
