//! Rule-based scoring: factor caps, multipliers, levels and the reference scenarios.

use customer_dna_core::{
    config::RiskConfig,
    profile::{CustomerProfile, ProfileRegistry},
    rule_scorer::RuleScorer,
    session::SessionActivity,
    types::{Location, RiskCategory, RiskFactor, RiskLevel},
};
use proptest::prelude::*;

const DAVID: &str = "David Chen - Restaurant Owner";
const SARAH: &str = "Sarah Martinez - Primary School Teacher";

fn make_scorer() -> (RuleScorer, RiskConfig) {
    let config = RiskConfig::default();
    (RuleScorer::new(&config), config)
}

fn make_profile(name: &str) -> CustomerProfile {
    ProfileRegistry::builtin().get(name).unwrap().clone()
}

/// Critical category on a low income, so the same deposits saturate the deposit factor.
fn make_low_income_critical() -> CustomerProfile {
    CustomerProfile {
        name: "Low Income Critical".into(),
        annual_income: 6_000.0,
        monthly_limit: 500.0,
        avg_session_minutes: 120,
        ..make_profile(DAVID)
    }
}

/// Deposits [500, 400], wagered 800 over two wagers, at the casino, two live support calls.
fn make_casino_session(profile: &CustomerProfile, config: &RiskConfig) -> SessionActivity {
    let limits = &config.validation;
    let mut session = SessionActivity::new(profile);
    session.deposit(500.0, limits).unwrap();
    session.deposit(400.0, limits).unwrap();
    session.wager(300.0, limits).unwrap();
    session.wager(500.0, limits).unwrap();
    session.move_to(Location::Casino, limits);
    session.contact_support(limits).unwrap();
    session.contact_support(limits).unwrap();
    session
}

/// A quiet session scores only baseline factors and lands in LOW.
#[test]
fn empty_session_scores_low() {
    let (scorer, _) = make_scorer();
    let profile = make_profile(DAVID);
    let session = SessionActivity::new(&profile);

    let result = scorer.score(&profile, &session);
    assert_eq!(result.factors.deposit, 0, "No deposits means no deposit risk");
    assert_eq!(result.factors.spending, 0, "No wagers means no spending risk");
    assert_eq!(result.factors.session, 8);
    assert_eq!(result.factors.location, 5);
    assert_eq!(result.factors.support, 15);
    assert_eq!(result.score, 33);
    assert_eq!(result.level, RiskLevel::Low);
}

/// The critical casino scenario: venue saturates, overall HIGH.
#[test]
fn critical_profile_at_casino_scores_high() {
    let (scorer, config) = make_scorer();
    let profile = make_profile(DAVID);
    let session = make_casino_session(&profile, &config);

    let result = scorer.score(&profile, &session);
    assert_eq!(result.factors.location, 15, "Critical customer at a casino maxes location");
    assert_eq!(result.factors.deposit, 14);
    assert_eq!(result.factors.spending, 13);
    assert_eq!(result.factors.support, 15);
    assert_eq!(result.score, 78);
    assert_eq!(result.level, RiskLevel::High);
}

/// The same activity against a low income saturates deposits and goes CRITICAL.
#[test]
fn low_income_critical_profile_saturates() {
    let (scorer, config) = make_scorer();
    let profile = make_low_income_critical();
    let session = make_casino_session(&profile, &config);

    let result = scorer.score(&profile, &session);
    assert_eq!(result.factors.deposit, 25);
    assert_eq!(result.factors.spending, 25);
    assert_eq!(result.factors.location, 15);
    assert_eq!(result.score, 100, "Overall score is clamped to 100");
    assert_eq!(result.level, RiskLevel::Critical);
}

/// High category gets +2 at a high-risk venue on top of the venue base.
#[test]
fn high_category_venue_bonus_is_capped() {
    let (scorer, config) = make_scorer();
    let profile = make_profile(SARAH);
    let mut session = SessionActivity::new(&profile);
    session.move_to(Location::BettingShop, &config.validation);

    let factors = scorer.factors(&profile, &session);
    assert_eq!(factors.location, 15, "15 + 2 is capped at 15");

    session.move_to(Location::Public, &config.validation);
    assert_eq!(scorer.factors(&profile, &session).location, 8);
}

/// Long sessions relative to the baseline escalate the session factor.
#[test]
fn session_length_tiers() {
    let (scorer, config) = make_scorer();
    let profile = make_profile(SARAH);
    let mut session = SessionActivity::new(&profile);

    for (minutes, expected) in [(180, 8), (271, 15), (361, 20), (1_440, 20)] {
        session.set_session_minutes(minutes, &config.validation).unwrap();
        assert_eq!(
            scorer.factors(&profile, &session).session,
            expected,
            "{minutes} minutes against a 180 minute baseline"
        );
    }
}

/// A zero baseline treats the session as ordinary length.
#[test]
fn zero_baseline_session_is_neutral() {
    let (scorer, _) = make_scorer();
    let profile = CustomerProfile {
        avg_session_minutes: 0,
        ..make_profile(SARAH)
    };
    let mut session = SessionActivity::new(&profile);
    session.session_minutes = 600;
    assert_eq!(scorer.factors(&profile, &session).session, 8);
}

/// Medium and low categories apply no multipliers.
#[test]
fn neutral_multipliers_for_medium_category() {
    let (scorer, config) = make_scorer();
    let profile = CustomerProfile {
        risk_category: RiskCategory::Medium,
        ..make_profile(DAVID)
    };
    let session = make_casino_session(&profile, &config);

    let result = scorer.score(&profile, &session);
    assert_eq!(result.factors.deposit, 10);
    assert_eq!(result.factors.spending, 10);
    assert_eq!(result.factors.location, 15);
    assert_eq!(result.score as u32, result.factors.total());
}

/// An absurd baseline support count saturates instead of overflowing.
#[test]
fn huge_support_baseline_saturates() {
    let (scorer, config) = make_scorer();
    let profile = CustomerProfile {
        support_contacts: u32::MAX,
        ..make_profile(SARAH)
    };
    let mut session = SessionActivity::new(&profile);
    session.contact_support(&config.validation).unwrap();

    let result = scorer.score(&profile, &session);
    assert_eq!(result.factors.support, 15, "Support is pinned at its cap");
    assert!(result.score <= 100);
}

/// Identical inputs always produce identical outputs.
#[test]
fn scoring_is_idempotent() {
    let (scorer, config) = make_scorer();
    for profile in ProfileRegistry::builtin().iter() {
        let session = make_casino_session(profile, &config);
        let first = scorer.score(profile, &session);
        let second = scorer.score(profile, &session);
        assert_eq!(first, second, "Scoring {} twice differed", profile.name);
    }
}

fn arb_location() -> impl Strategy<Value = Location> {
    prop::sample::select(Location::ALL.to_vec())
}

proptest! {
    /// Every factor stays within its cap and the total within 0..=100.
    #[test]
    fn factors_respect_caps(
        deposits in prop::collection::vec(1.0f64..50_000.0, 0..15),
        wager_share in 0.0f64..=1.0,
        wagers in 0usize..15,
        minutes in 0u32..=1_440,
        location in arb_location(),
        calls in 0u32..=20,
        profile_idx in 0usize..3,
    ) {
        let (scorer, _) = make_scorer();
        let registry = ProfileRegistry::builtin();
        let profile = registry.iter().nth(profile_idx).unwrap();

        let mut session = SessionActivity::new(profile);
        session.deposits = deposits;
        session.wagered = session.total_deposits() * wager_share;
        session.wagers = vec![1.0; wagers];
        session.session_minutes = minutes;
        session.location = location;
        session.support_calls = calls;
        session.reconcile();

        let result = scorer.score(profile, &session);
        for (factor, value) in result.factors.iter() {
            prop_assert!(value <= factor.cap(), "{factor:?} = {value} over cap {}", factor.cap());
        }
        prop_assert!(result.score <= 100);
        prop_assert_eq!(result.level, RiskConfig::default().level_for(result.score));
    }

    /// More wagered, all else fixed, never lowers the spending factor.
    #[test]
    fn spending_is_monotonic_in_wagered(
        low in 0.0f64..20_000.0,
        extra in 0.0f64..20_000.0,
        profile_idx in 0usize..3,
    ) {
        let (scorer, _) = make_scorer();
        let registry = ProfileRegistry::builtin();
        let profile = registry.iter().nth(profile_idx).unwrap();

        let mut session = SessionActivity::new(profile);
        session.deposits = vec![50_000.0];
        session.wagers = vec![1.0; 3];

        session.wagered = low;
        let before = scorer.factors(profile, &session).get(RiskFactor::Spending);
        session.wagered = low + extra;
        let after = scorer.factors(profile, &session).get(RiskFactor::Spending);

        prop_assert!(after >= before, "spending fell from {before} to {after}");
    }
}
