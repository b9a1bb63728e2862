use super::setup;
use crate::waitlist::WaitlistError;

#[tokio::test]
async fn signup_returns_referral_code_and_total() {
    let service = setup();

    let created = service
        .create_entry("Alice", "alice@example.com", None)
        .unwrap();

    assert_eq!(created.id, 1);
    assert_eq!(created.total, 1);
    assert_eq!(created.referral_code.len(), 8);
    assert!(created
        .referral_code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    // Below the threshold nobody has a position yet.
    assert_eq!(created.position, None);
}

#[tokio::test]
async fn signup_trims_name() {
    let service = setup();

    service
        .create_entry("  Alice  ", "alice@example.com", None)
        .unwrap();

    let entry = service.entry_by_email("alice@example.com").unwrap();
    assert_eq!(entry.name, "Alice");
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let service = setup();

    service
        .create_entry("Alice", "alice@example.com", None)
        .unwrap();
    let err = service
        .create_entry("Alice Again", "alice@example.com", None)
        .unwrap_err();

    assert!(matches!(err, WaitlistError::DuplicateEmail));
    assert_eq!(service.store.count().unwrap(), 1);
}

#[tokio::test]
async fn invalid_input_rejected() {
    let service = setup();

    assert!(matches!(
        service.create_entry("A", "alice@example.com", None),
        Err(WaitlistError::Validation(_))
    ));
    assert!(matches!(
        service.create_entry("Alice", "not-an-email", None),
        Err(WaitlistError::Validation(_))
    ));
    assert!(matches!(
        service.create_entry("Alice", "alice@localhost", None),
        Err(WaitlistError::Validation(_))
    ));
    assert_eq!(service.store.count().unwrap(), 0);
}

#[tokio::test]
async fn position_lookup_reports_counts() {
    let service = setup();

    let alice = service
        .create_entry("Alice", "alice@example.com", None)
        .unwrap();
    service
        .create_entry("Bob", "bob@example.com", Some(&alice.referral_code))
        .unwrap();

    let info = service.get_position("alice@example.com").unwrap();
    assert_eq!(info.total, 2);
    assert_eq!(info.referral_count, 1);
    assert_eq!(info.referral_code, alice.referral_code);

    let err = service.get_position("nobody@example.com").unwrap_err();
    assert!(matches!(err, WaitlistError::NotFound));
}

#[tokio::test]
async fn list_entries_newest_first_with_computed_counts() {
    let service = setup();

    let alice = service
        .create_entry("Alice", "alice@example.com", None)
        .unwrap();
    service
        .create_entry("Bob", "bob@example.com", Some(&alice.referral_code))
        .unwrap();
    service
        .create_entry("Carol", "carol@example.com", Some(&alice.referral_code))
        .unwrap();

    let entries = service.list_entries().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries.last().unwrap().email, "alice@example.com");
    assert_eq!(entries.last().unwrap().referral_count, 2);
}

#[tokio::test]
async fn stats_track_signups_and_referrals() {
    let service = setup();

    let alice = service
        .create_entry("Alice", "alice@example.com", None)
        .unwrap();
    service
        .create_entry("Bob", "bob@example.com", Some(&alice.referral_code))
        .unwrap();
    service
        .create_entry("Carol", "carol@example.com", Some("UNKNOWN1"))
        .unwrap();

    let stats = service.stats().unwrap();
    assert_eq!(stats.total_entries, 3);
    assert_eq!(stats.signups, 3);
    // The unknown code is ignored, not counted.
    assert_eq!(stats.referrals, 1);
    assert_eq!(stats.notifications_sent, 0);
}
