//! Handle codec behavior: packing, portable strings, sentinels.

use drawbench_foundation::Handle;

// =============================================================================
// Packed Word Codec
// =============================================================================

#[test]
fn handle_packs_into_one_word() {
    let h = Handle::new(0x1234_5678, 0x9abc_def0);
    let bits = h.to_bits();

    assert_eq!(Handle::from_bits(bits), h);
    assert_eq!(bits & 0xffff_ffff, 0x1234_5678);
    assert_eq!(bits >> 32, 0x9abc_def0);
}

#[test]
fn none_handle_is_the_zero_word() {
    assert_eq!(Handle::NONE.to_bits(), 0);
    assert_eq!(Handle::from_bits(0), Handle::NONE);
}

// =============================================================================
// Portable String Form
// =============================================================================

#[test]
fn display_form_is_index_v_generation() {
    assert_eq!(Handle::new(0, 1).to_string(), "0v1");
    assert_eq!(Handle::new(4_000_000_000, 17).to_string(), "4000000000v17");
}

#[test]
fn parse_round_trips_display() {
    for h in [Handle::new(0, 1), Handle::new(99, 2), Handle::new(u32::MAX, u32::MAX)] {
        let parsed: Handle = h.to_string().parse().unwrap();
        assert_eq!(parsed, h);
    }
}

#[test]
fn parse_rejects_generation_zero() {
    // The store never issues generation 0; a document containing one is
    // corrupt, not merely odd.
    assert!("5v0".parse::<Handle>().is_err());
}

// =============================================================================
// Sentinel Semantics
// =============================================================================

#[test]
fn generation_zero_means_none_regardless_of_index() {
    assert!(Handle::new(0, 0).is_none());
    assert!(Handle::new(12345, 0).is_none());
    assert!(Handle::new(0, 1).is_some());
}
