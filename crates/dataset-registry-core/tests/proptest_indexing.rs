//! Owner index and paginator property-based tests.
//!
//! ## Purpose
//! Drives the owner index and both pagination strategies with random inputs to
//! check the ordering, capacity, and cursor invariants hold for all of them.
//!
//! ## What is covered
//! - Repeated adds never duplicate an id and preserve first-insertion order.
//! - Removal preserves the relative order of the remaining ids.
//! - Pages never exceed the maximum page size and cursors terminate exactly.
// crates/dataset-registry-core/tests/proptest_indexing.rs
// ============================================================================
// Module: Owner Index And Pagination Property-Based Tests
// Description: Randomized checks for owner index and cursor invariants.
// Purpose: Detect ordering or bound violations across wide input ranges.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use dataset_registry_core::DatasetId;
use dataset_registry_core::OWNER_INDEX_CAPACITY;
use dataset_registry_core::OwnerId;
use dataset_registry_core::OwnerIndex;
use dataset_registry_core::OwnerIndexError;
use dataset_registry_core::runtime::page_id_range;
use dataset_registry_core::runtime::page_sequence;
use proptest::prelude::*;

fn id(raw: u64) -> DatasetId {
    DatasetId::from_raw(raw).unwrap()
}

fn dedup_in_order(raw: &[u64]) -> Vec<DatasetId> {
    let mut out: Vec<DatasetId> = Vec::new();
    for value in raw {
        let candidate = id(*value);
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

proptest! {
    #[test]
    fn add_is_idempotent_and_order_preserving(raw in prop::collection::vec(1u64 .. 40, 0 .. 80)) {
        let owner = OwnerId::new("alice");
        let mut index = OwnerIndex::new();
        for value in &raw {
            index.add(&owner, id(*value)).unwrap();
            index.add(&owner, id(*value)).unwrap();
        }
        let expected = dedup_in_order(&raw);
        prop_assert_eq!(index.list(&owner), expected.as_slice());
    }

    #[test]
    fn remove_keeps_relative_order(
        raw in prop::collection::vec(1u64 .. 40, 1 .. 60),
        pick in any::<prop::sample::Index>(),
    ) {
        let owner = OwnerId::new("alice");
        let mut index = OwnerIndex::new();
        for value in &raw {
            index.add(&owner, id(*value)).unwrap();
        }
        let expected_all = dedup_in_order(&raw);
        let target = expected_all[pick.index(expected_all.len())];
        let position = index.remove(&owner, target);
        prop_assert_eq!(position, expected_all.iter().position(|value| *value == target));
        let expected: Vec<DatasetId> =
            expected_all.iter().copied().filter(|value| *value != target).collect();
        prop_assert_eq!(index.list(&owner), expected.as_slice());
        prop_assert_eq!(index.remove(&owner, target), None);
    }

    #[test]
    fn id_range_pages_respect_bounds(
        counter in 0u64 .. 5_000,
        offset in 0u64 .. 6_000,
        limit in 0u64 .. 2_000,
        max_page_size in 1u64 .. 1_000,
    ) {
        let page = page_id_range(counter, offset, limit, max_page_size);
        let returned = u64::try_from(page.items.len()).unwrap();
        prop_assert!(returned <= max_page_size);
        prop_assert!(returned <= limit);
        for (position, item) in page.items.iter().enumerate() {
            prop_assert_eq!(item.get(), offset + 1 + u64::try_from(position).unwrap());
        }
        if offset >= counter {
            prop_assert!(page.items.is_empty());
            prop_assert_eq!(page.next_offset, None);
        } else {
            prop_assert_eq!(page.next_offset.is_none(), offset + returned >= counter);
        }
    }

    #[test]
    fn sequence_pages_cover_sequence(
        len in 0usize .. 300,
        limit in 1u64 .. 64,
        max_page_size in 1u64 .. 64,
    ) {
        let sequence: Vec<u64> = (0 .. u64::try_from(len).unwrap()).collect();
        let mut collected = Vec::new();
        let mut offset = Some(0);
        while let Some(current) = offset {
            let page = page_sequence(&sequence, current, limit, max_page_size);
            prop_assert!(u64::try_from(page.items.len()).unwrap() <= limit.min(max_page_size));
            collected.extend(page.items);
            offset = page.next_offset;
        }
        prop_assert_eq!(collected, sequence);
    }
}

#[test]
fn index_rejects_growth_past_capacity() {
    let owner = OwnerId::new("alice");
    let mut index = OwnerIndex::new();
    for raw in 1 ..= u64::try_from(OWNER_INDEX_CAPACITY).unwrap() {
        assert!(index.add(&owner, id(raw)).unwrap());
    }
    let next = u64::try_from(OWNER_INDEX_CAPACITY).unwrap() + 1;
    assert!(matches!(
        index.add(&owner, id(next)),
        Err(OwnerIndexError::CapacityExceeded { capacity: OWNER_INDEX_CAPACITY, .. })
    ));
    assert!(!index.add(&owner, id(1)).unwrap());
    assert_eq!(index.count(&owner), OWNER_INDEX_CAPACITY);
}

#[test]
fn unknown_owner_lists_empty() {
    let index = OwnerIndex::new();
    assert!(index.list(&OwnerId::new("nobody")).is_empty());
    assert_eq!(index.count(&OwnerId::new("nobody")), 0);
}
