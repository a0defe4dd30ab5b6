//! End-to-end ledger behaviour over the in-memory store.
//!
//! Exercises the allocation engine through its driving ports with the
//! `test-support` store standing in for PostgreSQL: the literal distribution
//! scenarios, the conservation and consistency invariants, and the
//! rejection paths that must leave state untouched.

use std::sync::Arc;

use backend::domain::ports::{
    AllocationCommand, AllocationQuery, ListAllocationsRequest, ReallocatePointsRequest,
};
use backend::domain::{
    AllocationCommandService, AllocationQueryService, ErrorCode, Grocer, GrocerId, Points, User,
    UserId,
};
use backend::test_support::MemoryLedgerStore;
use rstest::rstest;

fn points(value: i64) -> Points {
    Points::new(value).expect("valid points")
}

fn seeded_user(store: &MemoryLedgerStore, grant: i64) -> UserId {
    let user =
        User::new(UserId::random(), "Ada Lovelace", points(grant)).expect("valid user");
    store.seed_user(&user);
    *user.id()
}

fn seeded_grocer(store: &MemoryLedgerStore, name: &str) -> GrocerId {
    let grocer = Grocer::new(GrocerId::random(), name, "12 Market Row", Points::ZERO)
        .expect("valid grocer");
    store.seed_grocer(&grocer);
    *grocer.id()
}

fn request(user_id: UserId, grocer_id: GrocerId, requested_points: i64) -> ReallocatePointsRequest {
    ReallocatePointsRequest {
        user_id,
        grocer_id,
        requested_points,
    }
}

#[rstest]
#[tokio::test]
async fn allocate_reduce_and_zero_walk_the_full_lifecycle() {
    let store = Arc::new(MemoryLedgerStore::new());
    let user_id = seeded_user(&store, 100);
    let grocer_id = seeded_grocer(&store, "Corner Greens");
    let service = AllocationCommandService::new(Arc::clone(&store));

    // First nonzero allocation creates the record.
    let response = service
        .reallocate(request(user_id, grocer_id, 30))
        .await
        .expect("first allocation succeeds");
    assert_eq!(response.new_available, 70);
    let allocation = response.allocation.expect("record created");
    assert_eq!(allocation.points, 30);
    assert_eq!(allocation.grocer_name, "Corner Greens");
    assert_eq!(store.received_points(&grocer_id), Some(30));
    assert_eq!(store.allocated_points(&user_id, &grocer_id), Some(30));

    // Reducing returns the difference to the available pool.
    let response = service
        .reallocate(request(user_id, grocer_id, 10))
        .await
        .expect("reduction succeeds");
    assert_eq!(response.new_available, 90);
    assert_eq!(store.received_points(&grocer_id), Some(10));
    assert_eq!(store.allocated_points(&user_id, &grocer_id), Some(10));

    // Zeroing deletes the record entirely.
    let response = service
        .reallocate(request(user_id, grocer_id, 0))
        .await
        .expect("zeroing succeeds");
    assert_eq!(response.new_available, 100);
    assert!(response.allocation.is_none());
    assert_eq!(store.received_points(&grocer_id), Some(0));
    assert_eq!(store.allocated_points(&user_id, &grocer_id), None);
    assert_eq!(store.allocation_count(), 0);
}

#[rstest]
#[tokio::test]
async fn insufficient_balance_cites_amounts_and_changes_nothing() {
    let store = Arc::new(MemoryLedgerStore::new());
    let user_id = seeded_user(&store, 5);
    let grocer_id = seeded_grocer(&store, "Corner Greens");
    let service = AllocationCommandService::new(Arc::clone(&store));

    let error = service
        .reallocate(request(user_id, grocer_id, 20))
        .await
        .expect_err("increase exceeds balance");

    assert_eq!(error.code(), ErrorCode::InsufficientBalance);
    assert!(error.message().contains("available 5"));
    assert!(error.message().contains("required 20"));

    assert_eq!(store.available_points(&user_id), Some(5));
    assert_eq!(store.received_points(&grocer_id), Some(0));
    assert_eq!(store.allocation_count(), 0);
}

#[rstest]
#[tokio::test]
async fn unknown_grocer_is_rejected_without_writes() {
    let store = Arc::new(MemoryLedgerStore::new());
    let user_id = seeded_user(&store, 100);
    let service = AllocationCommandService::new(Arc::clone(&store));

    let error = service
        .reallocate(request(user_id, GrocerId::random(), 10))
        .await
        .expect_err("grocer does not exist");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(store.available_points(&user_id), Some(100));
    assert_eq!(store.allocation_count(), 0);
}

#[rstest]
#[tokio::test]
async fn unknown_user_is_rejected_without_writes() {
    let store = Arc::new(MemoryLedgerStore::new());
    let grocer_id = seeded_grocer(&store, "Corner Greens");
    let service = AllocationCommandService::new(Arc::clone(&store));

    let error = service
        .reallocate(request(UserId::random(), grocer_id, 10))
        .await
        .expect_err("user does not exist");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(store.received_points(&grocer_id), Some(0));
}

#[rstest]
#[tokio::test]
async fn negative_request_is_rejected_as_invalid_argument() {
    let store = Arc::new(MemoryLedgerStore::new());
    let user_id = seeded_user(&store, 100);
    let grocer_id = seeded_grocer(&store, "Corner Greens");
    let service = AllocationCommandService::new(Arc::clone(&store));

    let error = service
        .reallocate(request(user_id, grocer_id, -3))
        .await
        .expect_err("negative points are malformed");

    assert_eq!(error.code(), ErrorCode::InvalidArgument);
    assert_eq!(store.available_points(&user_id), Some(100));
}

#[rstest]
#[tokio::test]
async fn repeating_the_same_request_is_idempotent() {
    let store = Arc::new(MemoryLedgerStore::new());
    let user_id = seeded_user(&store, 100);
    let grocer_id = seeded_grocer(&store, "Corner Greens");
    let service = AllocationCommandService::new(Arc::clone(&store));

    let first = service
        .reallocate(request(user_id, grocer_id, 25))
        .await
        .expect("first call succeeds");
    let second = service
        .reallocate(request(user_id, grocer_id, 25))
        .await
        .expect("repeat succeeds");

    assert_eq!(first.new_available, 75);
    assert_eq!(second.new_available, 75);
    assert_eq!(store.available_points(&user_id), Some(75));
    assert_eq!(store.received_points(&grocer_id), Some(25));
    assert_eq!(store.allocated_points(&user_id, &grocer_id), Some(25));
}

#[rstest]
#[tokio::test]
async fn points_are_conserved_across_a_reallocation_sequence() {
    const GRANT: i64 = 100;

    let store = Arc::new(MemoryLedgerStore::new());
    let user_id = seeded_user(&store, GRANT);
    let greens = seeded_grocer(&store, "Corner Greens");
    let mill = seeded_grocer(&store, "Mill Lane Dairy");
    let service = AllocationCommandService::new(Arc::clone(&store));

    let steps = [
        (greens, 30, 70),
        (mill, 50, 20),
        (greens, 10, 40),
        (mill, 0, 90),
        (greens, 60, 40),
    ];

    for (grocer_id, requested, expected_available) in steps {
        let response = service
            .reallocate(request(user_id, grocer_id, requested))
            .await
            .expect("step succeeds");
        assert_eq!(response.new_available, expected_available);

        // Conservation: available plus everything allocated equals the grant.
        let available = store.available_points(&user_id).expect("user exists");
        let allocated: i64 = [greens, mill]
            .iter()
            .filter_map(|id| store.allocated_points(&user_id, id))
            .sum();
        assert_eq!(available + allocated, GRANT);

        // Consistency: each grocer's total equals its allocation records.
        for id in [greens, mill] {
            let received = store.received_points(&id).expect("grocer exists");
            assert_eq!(received, store.allocated_points(&user_id, &id).unwrap_or(0));
        }
    }

    assert_eq!(store.allocated_points(&user_id, &greens), Some(60));
    assert_eq!(store.allocated_points(&user_id, &mill), None);
}

#[rstest]
#[tokio::test]
async fn listing_returns_each_allocation_with_its_grocer_name() {
    let store = Arc::new(MemoryLedgerStore::new());
    let user_id = seeded_user(&store, 100);
    let greens = seeded_grocer(&store, "Corner Greens");
    let mill = seeded_grocer(&store, "Mill Lane Dairy");
    let command = AllocationCommandService::new(Arc::clone(&store));
    let query = AllocationQueryService::new(Arc::clone(&store));

    command
        .reallocate(request(user_id, greens, 30))
        .await
        .expect("first allocation succeeds");
    command
        .reallocate(request(user_id, mill, 50))
        .await
        .expect("second allocation succeeds");

    let response = query
        .list_allocations(ListAllocationsRequest { user_id })
        .await
        .expect("listing succeeds");

    let mut listed: Vec<(String, i64)> = response
        .allocations
        .into_iter()
        .map(|payload| (payload.grocer_name, payload.points))
        .collect();
    listed.sort();

    assert_eq!(
        listed,
        vec![
            ("Corner Greens".to_owned(), 30),
            ("Mill Lane Dairy".to_owned(), 50),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn listing_only_covers_the_acting_user() {
    let store = Arc::new(MemoryLedgerStore::new());
    let first_user = seeded_user(&store, 100);
    let second_user = seeded_user(&store, 100);
    let grocer_id = seeded_grocer(&store, "Corner Greens");
    let command = AllocationCommandService::new(Arc::clone(&store));
    let query = AllocationQueryService::new(Arc::clone(&store));

    command
        .reallocate(request(first_user, grocer_id, 30))
        .await
        .expect("first user's allocation succeeds");
    command
        .reallocate(request(second_user, grocer_id, 40))
        .await
        .expect("second user's allocation succeeds");

    let response = query
        .list_allocations(ListAllocationsRequest {
            user_id: first_user,
        })
        .await
        .expect("listing succeeds");

    assert_eq!(response.allocations.len(), 1);
    let payload = response.allocations.first().expect("one record");
    assert_eq!(payload.points, 30);

    // Both users' allocations land on the same grocer total.
    assert_eq!(store.received_points(&grocer_id), Some(70));
}
