use std::sync::atomic::Ordering;
use std::time::Duration;

use super::{setup_with_threshold, wait_for_recomputes};

#[tokio::test]
async fn duplicate_enqueues_coalesce_into_one_recompute() {
    let service = setup_with_threshold(100);
    let alice = service
        .create_entry("Alice", "alice@example.com", None)
        .unwrap();

    service.drain_delay_ms.store(20, Ordering::Relaxed);
    service.award_points(alice.id, 10, None).unwrap();
    service.award_points(alice.id, 10, None).unwrap();
    service.award_points(alice.id, 10, None).unwrap();
    wait_for_recomputes(&service, 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(service.metrics.recomputes.load(Ordering::Relaxed), 1);
    assert_eq!(service.metrics.recompute_batches.load(Ordering::Relaxed), 1);
    // All three point grants landed even though only one recompute ran.
    let entry = service.entry_by_email("alice@example.com").unwrap();
    assert_eq!(entry.points_earned, 30);
}

#[tokio::test]
async fn distinct_entries_share_a_batch() {
    let service = setup_with_threshold(100);
    let alice = service
        .create_entry("Alice", "alice@example.com", None)
        .unwrap();
    let bob = service.create_entry("Bob", "bob@example.com", None).unwrap();

    service.drain_delay_ms.store(20, Ordering::Relaxed);
    service.award_points(alice.id, 10, None).unwrap();
    service.award_points(bob.id, 10, None).unwrap();
    wait_for_recomputes(&service, 2).await;

    assert_eq!(service.metrics.recomputes.load(Ordering::Relaxed), 2);
    assert_eq!(service.metrics.recompute_batches.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn enqueue_during_a_drain_is_processed_by_the_next_cycle() {
    let service = setup_with_threshold(100);
    let alice = service
        .create_entry("Alice", "alice@example.com", None)
        .unwrap();
    let bob = service.create_entry("Bob", "bob@example.com", None).unwrap();

    service.drain_delay_ms.store(50, Ordering::Relaxed);
    service.award_points(alice.id, 10, None).unwrap();
    // Let the drain snapshot its batch and park in the delay, then slip a
    // second id in behind the snapshot.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(service.draining.load(Ordering::Acquire));
    service.award_points(bob.id, 10, None).unwrap();

    wait_for_recomputes(&service, 2).await;

    // The late id was not dropped: the drain released the flag, saw the
    // refilled set and ran a second batch for it.
    assert_eq!(service.metrics.recomputes.load(Ordering::Relaxed), 2);
    assert_eq!(service.metrics.recompute_batches.load(Ordering::Relaxed), 2);
    assert!(service.pending.lock().is_empty());
}

#[tokio::test]
async fn queue_rearms_after_an_idle_drain() {
    let service = setup_with_threshold(100);
    let alice = service
        .create_entry("Alice", "alice@example.com", None)
        .unwrap();

    service.award_points(alice.id, 10, None).unwrap();
    wait_for_recomputes(&service, 1).await;
    // Let the first drain fully release the flag.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!service.draining.load(Ordering::Acquire));
    assert!(service.pending.lock().is_empty());

    service.award_points(alice.id, 10, None).unwrap();
    wait_for_recomputes(&service, 2).await;

    assert_eq!(service.metrics.recompute_batches.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn points_move_an_entry_up_the_list() {
    let service = setup_with_threshold(3);
    service
        .create_entry("Alice", "alice@example.com", None)
        .unwrap();
    service.create_entry("Bob", "bob@example.com", None).unwrap();
    let carol = service
        .create_entry("Carol", "carol@example.com", None)
        .unwrap();
    assert_eq!(carol.position, Some(3));

    // 100 points outweighs any creation-time gap in this test.
    service.award_points(carol.id, 100, None).unwrap();
    wait_for_recomputes(&service, 1).await;

    let carol = service.entry_by_email("carol@example.com").unwrap();
    assert_eq!(carol.position, Some(1));
    assert!(carol.last_position_update.is_some());
}

#[tokio::test]
async fn recompute_all_restores_sequential_positions() {
    let service = setup_with_threshold(3);
    service
        .create_entry("Alice", "alice@example.com", None)
        .unwrap();
    service.create_entry("Bob", "bob@example.com", None).unwrap();
    let carol = service
        .create_entry("Carol", "carol@example.com", None)
        .unwrap();

    service.award_points(carol.id, 100, None).unwrap();
    wait_for_recomputes(&service, 1).await;

    let updated = service.recompute_all().unwrap();
    assert_eq!(updated, 3);

    let expected = [
        ("carol@example.com", 1),
        ("alice@example.com", 2),
        ("bob@example.com", 3),
    ];
    for (email, position) in expected {
        let entry = service.entry_by_email(email).unwrap();
        assert_eq!(entry.position, Some(position), "{email}");
    }

    // A second pass with no intervening changes is a fixed point.
    service.recompute_all().unwrap();
    for (email, position) in expected {
        let entry = service.entry_by_email(email).unwrap();
        assert_eq!(entry.position, Some(position), "{email}");
    }
}

#[tokio::test]
async fn recompute_all_noop_below_threshold() {
    let service = setup_with_threshold(5);
    service
        .create_entry("Alice", "alice@example.com", None)
        .unwrap();

    assert_eq!(service.recompute_all().unwrap(), 0);
    let entry = service.entry_by_email("alice@example.com").unwrap();
    assert_eq!(entry.position, None);
}
