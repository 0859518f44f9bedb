//! Session activity: validation at the boundary and the balance invariants.

use customer_dna_core::{
    config::RiskConfig,
    error::DnaError,
    profile::{CustomerProfile, ProfileRegistry},
    session::SessionActivity,
    types::Location,
};
use proptest::prelude::*;

fn make_profile() -> CustomerProfile {
    ProfileRegistry::builtin()
        .get("Sarah Martinez - Primary School Teacher")
        .unwrap()
        .clone()
}

fn make_session() -> (CustomerProfile, SessionActivity, RiskConfig) {
    let profile = make_profile();
    let session = SessionActivity::new(&profile);
    (profile, session, RiskConfig::default())
}

/// A new session starts empty, at home, with the profile's baseline length.
#[test]
fn new_session_starts_from_baseline() {
    let (profile, session, _) = make_session();
    assert_eq!(session.customer, profile.name);
    assert!(session.deposits.is_empty());
    assert!(session.wagers.is_empty());
    assert_eq!(session.balance, 0.0);
    assert_eq!(session.wagered, 0.0);
    assert_eq!(session.session_minutes, profile.avg_session_minutes);
    assert_eq!(session.location, Location::Home);
    assert_eq!(session.support_calls, 0);
    assert!(session.location_history.is_empty());
}

/// Deposits raise the balance; wagers draw it down.
#[test]
fn deposits_and_wagers_move_the_balance() {
    let (_, mut session, config) = make_session();
    let limits = &config.validation;

    session.deposit(500.0, limits).unwrap();
    session.deposit(400.0, limits).unwrap();
    session.wager(300.0, limits).unwrap();

    assert_eq!(session.total_deposits(), 900.0);
    assert_eq!(session.wagered, 300.0);
    assert_eq!(session.balance, 600.0);
    assert_eq!(session.largest_deposit(), 500.0);
}

/// A wager larger than the balance is refused and nothing changes.
#[test]
fn wager_above_balance_is_rejected() {
    let (_, mut session, config) = make_session();
    session.deposit(100.0, &config.validation).unwrap();
    let before = session.clone();

    let err = session.wager(150.0, &config.validation).unwrap_err();
    assert!(
        matches!(err, DnaError::InsufficientBalance { .. }),
        "Expected InsufficientBalance, got {err:?}"
    );
    assert_eq!(session, before, "Rejected wager must leave the session unchanged");
}

/// Amounts over the configured ceilings are refused.
#[test]
fn out_of_bounds_inputs_are_rejected() {
    let (_, mut session, config) = make_session();
    let limits = &config.validation;
    let before = session.clone();

    let err = session.deposit(50_000.01, limits).unwrap_err();
    assert!(matches!(err, DnaError::InputOutOfBounds { field: "deposit", .. }));

    let err = session.set_session_minutes(1_441, limits).unwrap_err();
    assert!(matches!(err, DnaError::InputOutOfBounds { field: "session time", .. }));

    assert_eq!(session, before);

    // The ceiling itself is accepted.
    session.deposit(50_000.0, limits).unwrap();
    session.wager(25_000.0, limits).unwrap();
    let err = session.wager(25_000.5, limits).unwrap_err();
    assert!(matches!(err, DnaError::InputOutOfBounds { field: "wager", .. }));
}

/// Zero, negative and non-finite amounts are refused.
#[test]
fn non_positive_amounts_are_rejected() {
    let (_, mut session, config) = make_session();
    for amount in [0.0, -10.0, f64::NAN, f64::INFINITY] {
        assert!(
            session.deposit(amount, &config.validation).is_err(),
            "deposit of {amount} should be rejected"
        );
    }
    assert!(session.deposits.is_empty());
}

/// Live support contacts stop at the configured maximum.
#[test]
fn support_contacts_are_capped() {
    let (_, mut session, config) = make_session();
    let max = config.validation.max_support_calls;
    for i in 1..=max {
        assert_eq!(session.contact_support(&config.validation).unwrap(), i);
    }
    let err = session.contact_support(&config.validation).unwrap_err();
    assert!(matches!(err, DnaError::SupportLimitReached { max: 20 }));
    assert_eq!(session.support_calls, max);
}

/// Only real moves are recorded, and the history keeps the newest 50.
#[test]
fn location_history_is_bounded() {
    let (_, mut session, config) = make_session();
    let limits = &config.validation;

    assert_eq!(session.move_to(Location::Home, limits), None, "Staying put is not a move");
    assert!(session.location_history.is_empty());

    for i in 0..60 {
        let to = if i % 2 == 0 { Location::Casino } else { Location::Work };
        session.move_to(to, limits);
    }
    assert_eq!(session.location_history.len(), limits.max_location_history);
    assert_eq!(session.location_history.last(), Some(&Location::Work));
    assert_eq!(session.high_risk_visits(), 25);
}

/// Reset returns to a fresh session but keeps the id.
#[test]
fn reset_keeps_session_id() {
    let (profile, mut session, config) = make_session();
    session.deposit(200.0, &config.validation).unwrap();
    session.move_to(Location::Casino, &config.validation);
    let id = session.session_id;

    session.reset(&profile);
    assert_eq!(session.session_id, id);
    assert!(session.deposits.is_empty());
    assert_eq!(session.location, Location::Home);
}

/// Corrupted totals are repaired, not reported.
#[test]
fn reconcile_clamps_wagered_and_recomputes_balance() {
    let (_, mut session, _) = make_session();
    session.deposits = vec![100.0, 50.0];
    session.wagered = 400.0;
    session.balance = 12.0;

    assert!(session.reconcile());
    assert_eq!(session.wagered, 150.0);
    assert_eq!(session.balance, 0.0);
    assert!(!session.reconcile(), "A consistent session needs no correction");
}

proptest! {
    /// Whatever state the session is left in, reconcile restores both invariants.
    #[test]
    fn reconcile_always_restores_invariants(
        deposits in prop::collection::vec(0.01f64..50_000.0, 0..20),
        wagered in 0.0f64..2_000_000.0,
        balance in -1_000_000.0f64..1_000_000.0,
    ) {
        let (_, mut session, _) = make_session();
        session.deposits = deposits;
        session.wagered = wagered;
        session.balance = balance;

        session.reconcile();

        let total = session.total_deposits();
        prop_assert!(session.wagered <= total);
        prop_assert!((session.balance - (total - session.wagered)).abs() < 1e-9);
    }

    /// Any sequence of accepted deposits and wagers keeps the balance consistent.
    #[test]
    fn accepted_operations_keep_balance_consistent(
        ops in prop::collection::vec((any::<bool>(), 1.0f64..5_000.0), 1..40),
    ) {
        let (_, mut session, config) = make_session();
        for (is_deposit, amount) in ops {
            let _ = if is_deposit {
                session.deposit(amount, &config.validation)
            } else {
                session.wager(amount, &config.validation)
            };
            let total = session.total_deposits();
            prop_assert!(session.wagered <= total + 1e-6);
            prop_assert!((session.balance - (total - session.wagered)).abs() < 1e-6);
        }
    }
}
