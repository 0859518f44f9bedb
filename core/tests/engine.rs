//! Risk engine: command application, monitoring alerts and full evaluations.

use customer_dna_core::{
    blender::ScoringMethod,
    command::SessionCommand,
    config::RiskConfig,
    engine::RiskEngine,
    error::DnaError,
    event::{AlertRule, AlertSeverity, SessionEvent},
    profile::{CustomerProfile, ProfileRegistry},
    regressor::PredictionMethod,
    types::{FactorBreakdown, Location, RiskLevel},
};

const DAVID: &str = "David Chen - Restaurant Owner";
const SARAH: &str = "Sarah Martinez - Primary School Teacher";
const MICHAEL: &str = "Michael Thompson - Marketing Executive";

fn make_engine() -> RiskEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    RiskEngine::new(RiskConfig::default()).unwrap()
}

fn make_profile(name: &str) -> CustomerProfile {
    ProfileRegistry::builtin().get(name).unwrap().clone()
}

fn alert_rules(events: &[SessionEvent]) -> Vec<(AlertRule, AlertSeverity)> {
    events
        .iter()
        .filter_map(SessionEvent::as_alert)
        .map(|a| (a.rule, a.severity))
        .collect()
}

/// A deposit emits a record of the change with the new balance.
#[test]
fn deposit_command_records_the_change() {
    let engine = make_engine();
    let profile = make_profile(MICHAEL);
    let mut session = engine.start_session(&profile);

    let events = engine
        .apply(&profile, &mut session, SessionCommand::Deposit { amount: 250.0 })
        .unwrap();
    assert_eq!(
        events[0],
        SessionEvent::DepositRecorded {
            session_id: session.session_id,
            amount:     250.0,
            balance:    250.0,
        }
    );
    assert!(alert_rules(&events).is_empty(), "A small deposit raises no alerts");
}

/// Large deposits by a critical customer raise critical alerts.
#[test]
fn critical_customer_large_deposit_alerts() {
    let engine = make_engine();
    let profile = make_profile(DAVID);
    let mut session = engine.start_session(&profile);

    // Monthly income 3500: 2000 is over half of it.
    let events = engine
        .apply(&profile, &mut session, SessionCommand::Deposit { amount: 2_000.0 })
        .unwrap();
    assert_eq!(
        alert_rules(&events),
        vec![(AlertRule::LargeDeposit, AlertSeverity::Critical)]
    );

    // Total 7100 crosses twice the monthly income.
    let events = engine
        .apply(&profile, &mut session, SessionCommand::Deposit { amount: 5_100.0 })
        .unwrap();
    assert!(alert_rules(&events).contains(&(AlertRule::DepositEscalation, AlertSeverity::Critical)));
}

/// Wagering past the monthly limit is a critical breach.
#[test]
fn wager_over_monthly_limit_alerts() {
    let engine = make_engine();
    let profile = make_profile(SARAH);
    let mut session = engine.start_session(&profile);

    engine
        .apply(&profile, &mut session, SessionCommand::Deposit { amount: 800.0 })
        .unwrap();
    let events = engine
        .apply(&profile, &mut session, SessionCommand::Wager { amount: 600.0 })
        .unwrap();
    assert!(matches!(events[0], SessionEvent::WagerPlaced { balance, .. } if balance == 200.0));
    assert_eq!(
        alert_rules(&events),
        vec![(AlertRule::LimitBreach, AlertSeverity::Critical)]
    );
}

/// Moving to a venue raises an alert; staying put emits nothing.
#[test]
fn location_changes_and_alerts() {
    let engine = make_engine();
    let profile = make_profile(DAVID);
    let mut session = engine.start_session(&profile);

    let events = engine
        .apply(
            &profile,
            &mut session,
            SessionCommand::SetLocation { location: Location::Casino },
        )
        .unwrap();
    assert!(matches!(
        events[0],
        SessionEvent::LocationChanged { from: Location::Home, to: Location::Casino, .. }
    ));
    assert_eq!(
        alert_rules(&events),
        vec![(AlertRule::HighRiskVenue, AlertSeverity::Critical)]
    );

    let events = engine
        .apply(
            &profile,
            &mut session,
            SessionCommand::SetLocation { location: Location::Casino },
        )
        .unwrap();
    assert!(events.is_empty(), "No move, no events");

    let events = engine
        .apply(
            &profile,
            &mut session,
            SessionCommand::SetLocation { location: Location::Work },
        )
        .unwrap();
    assert_eq!(
        alert_rules(&events),
        vec![(AlertRule::WorkplaceGambling, AlertSeverity::Info)]
    );
}

/// Support alerts escalate with live contacts and flag the ceiling.
#[test]
fn support_contacts_alert_and_stop_at_limit() {
    let engine = make_engine();
    let profile = make_profile(MICHAEL);
    let mut session = engine.start_session(&profile);

    let mut last = Vec::new();
    for _ in 0..4 {
        last = engine
            .apply(&profile, &mut session, SessionCommand::ContactSupport)
            .unwrap();
    }
    assert_eq!(
        alert_rules(&last),
        vec![(AlertRule::SupportFrequency, AlertSeverity::Critical)]
    );

    for _ in 4..20 {
        last = engine
            .apply(&profile, &mut session, SessionCommand::ContactSupport)
            .unwrap();
    }
    assert!(alert_rules(&last).contains(&(AlertRule::SupportLimitReached, AlertSeverity::Warning)));

    let err = engine
        .apply(&profile, &mut session, SessionCommand::ContactSupport)
        .unwrap_err();
    assert!(matches!(err, DnaError::SupportLimitReached { .. }));
}

/// A rejected command leaves the session exactly as it was.
#[test]
fn rejected_command_leaves_session_unchanged() {
    let engine = make_engine();
    let profile = make_profile(SARAH);
    let mut session = engine.start_session(&profile);
    engine
        .apply(&profile, &mut session, SessionCommand::Deposit { amount: 100.0 })
        .unwrap();
    let before = session.clone();

    for command in [
        SessionCommand::Deposit { amount: 60_000.0 },
        SessionCommand::Wager { amount: 150.0 },
        SessionCommand::Wager { amount: -5.0 },
        SessionCommand::SetSessionTime { minutes: 2_000 },
    ] {
        let name = command.name();
        assert!(
            engine.apply(&profile, &mut session, command).is_err(),
            "{name} should be rejected"
        );
        assert_eq!(session, before, "{name} changed the session");
    }
}

/// Reset brings the session back to a fresh state.
#[test]
fn reset_command_starts_over() {
    let engine = make_engine();
    let profile = make_profile(SARAH);
    let mut session = engine.start_session(&profile);
    engine
        .apply(&profile, &mut session, SessionCommand::Deposit { amount: 100.0 })
        .unwrap();

    let events = engine.apply(&profile, &mut session, SessionCommand::Reset).unwrap();
    assert!(matches!(events[0], SessionEvent::SessionReset { .. }));
    assert!(session.deposits.is_empty());
    assert_eq!(session.balance, 0.0);
}

/// Commands deserialize from their tagged JSON form.
#[test]
fn commands_parse_from_json() {
    let command: SessionCommand =
        serde_json::from_str(r#"{"cmd":"set_location","location":"Betting Shop"}"#).unwrap();
    assert_eq!(command, SessionCommand::SetLocation { location: Location::BettingShop });

    let command: SessionCommand = serde_json::from_str(r#"{"cmd":"contact_support"}"#).unwrap();
    assert_eq!(command, SessionCommand::ContactSupport);
}

/// A full evaluation reconciles, scores, learns and recommends.
#[test]
fn evaluate_produces_a_complete_assessment() {
    let mut engine = make_engine();
    let profile = make_profile(DAVID);
    let mut session = engine.start_session(&profile);
    for command in [
        SessionCommand::Deposit { amount: 500.0 },
        SessionCommand::Deposit { amount: 400.0 },
        SessionCommand::Wager { amount: 300.0 },
        SessionCommand::Wager { amount: 500.0 },
        SessionCommand::SetLocation { location: Location::Casino },
        SessionCommand::ContactSupport,
        SessionCommand::ContactSupport,
    ] {
        engine.apply(&profile, &mut session, command).unwrap();
    }
    let seen_before = engine.regressor().samples_seen();

    let assessment = engine.evaluate(&profile, &mut session);

    assert_eq!(assessment.rule.score, 78);
    assert_eq!(assessment.rule.level, RiskLevel::High);
    assert_eq!(assessment.prediction.method, PredictionMethod::Model);
    assert_eq!(assessment.result.method, ScoringMethod::Model, "0.95 confidence beats 0.7");
    assert_eq!(assessment.result.score, assessment.prediction.score);
    assert_eq!(assessment.result.level, RiskConfig::default().level_for(assessment.result.score));
    assert_eq!(assessment.result.rule_score, 78);
    assert_eq!(assessment.days_to_crisis, assessment.result.days_to_crisis());
    assert_eq!(engine.regressor().samples_seen(), seen_before + 1);
    assert!(!assessment.interventions.is_empty());
    for pair in assessment.interventions.windows(2) {
        assert!(pair[0].urgency <= pair[1].urgency, "Interventions out of order");
    }
}

/// The casino session: rules say HIGH with the venue at its cap, but the
/// bootstrapped model is confident enough to override with its own lower score.
#[test]
fn casino_session_final_level_follows_the_model() {
    let mut engine = make_engine();
    let profile = make_profile(DAVID);
    let mut session = engine.start_session(&profile);
    for command in [
        SessionCommand::Deposit { amount: 500.0 },
        SessionCommand::Deposit { amount: 400.0 },
        SessionCommand::Wager { amount: 300.0 },
        SessionCommand::Wager { amount: 500.0 },
        SessionCommand::SetLocation { location: Location::Casino },
        SessionCommand::ContactSupport,
        SessionCommand::ContactSupport,
    ] {
        engine.apply(&profile, &mut session, command).unwrap();
    }

    let assessment = engine.evaluate(&profile, &mut session);

    assert_eq!(assessment.rule.level, RiskLevel::High);
    assert_eq!(assessment.rule.factors.location, 15);
    assert_eq!(assessment.result.method, ScoringMethod::Model);
    assert_eq!(assessment.result.score, 56);
    assert_eq!(assessment.result.level, RiskLevel::Medium, "Model score 56 maps to MEDIUM");
    assert_eq!(
        assessment.result.factors,
        FactorBreakdown {
            deposit:  10,
            spending: 9,
            session:  5,
            location: 10,
            support:  10,
        },
        "Rule factors are scaled by 56/78"
    );
}

/// The quiet session: rules say LOW, the model override lands just inside MEDIUM.
#[test]
fn quiet_session_final_level_follows_the_model() {
    let mut engine = make_engine();
    let profile = make_profile(DAVID);
    let mut session = engine.start_session(&profile);

    let assessment = engine.evaluate(&profile, &mut session);

    assert_eq!(assessment.rule.score, 33);
    assert_eq!(assessment.rule.level, RiskLevel::Low);
    assert_eq!(assessment.result.method, ScoringMethod::Model);
    assert_eq!(assessment.result.score, 41);
    assert_eq!(assessment.result.level, RiskLevel::Medium);
    assert_eq!(
        assessment.result.factors,
        FactorBreakdown {
            deposit:  0,
            spending: 0,
            session:  9,
            location: 6,
            support:  15,
        },
        "Zero factors stay zero; support is capped"
    );
}

/// Corrupted session totals are repaired before scoring.
#[test]
fn evaluate_reconciles_the_session() {
    let mut engine = make_engine();
    let profile = make_profile(SARAH);
    let mut session = engine.start_session(&profile);
    session.deposits = vec![100.0];
    session.wagered = 500.0;
    session.balance = -400.0;

    engine.evaluate(&profile, &mut session);
    assert_eq!(session.wagered, 100.0);
    assert_eq!(session.balance, 0.0);
}

/// An untrained engine falls back to the rules.
#[test]
fn untrained_regressor_defers_to_rules() {
    let mut engine = make_engine();
    engine.regressor_mut().reset();
    let profile = make_profile(DAVID);
    let mut session = engine.start_session(&profile);

    let assessment = engine.evaluate(&profile, &mut session);
    assert_eq!(assessment.prediction.method, PredictionMethod::Default);
    assert_eq!(assessment.result.method, ScoringMethod::Rules);
    assert_eq!(assessment.result.score, 33);
    assert_eq!(assessment.result.level, RiskLevel::Low);
}

/// Preview scores without adding a training sample.
#[test]
fn preview_does_not_learn() {
    let engine = make_engine();
    let profile = make_profile(MICHAEL);
    let session = engine.start_session(&profile);
    let seen = engine.regressor().samples_seen();

    let a = engine.preview(&profile, &session);
    let b = engine.preview(&profile, &session);
    assert_eq!(a, b);
    assert_eq!(engine.regressor().samples_seen(), seen);
}

/// Engines built from the same seed score identically.
#[test]
fn same_seed_same_scores() {
    let mut a = make_engine();
    let mut b = make_engine();
    for profile in ProfileRegistry::builtin().iter() {
        let mut sa = a.start_session(profile);
        let mut sb = b.start_session(profile);
        for _ in 0..6 {
            let ra = a.evaluate(profile, &mut sa);
            let rb = b.evaluate(profile, &mut sb);
            assert_eq!(ra.result.score, rb.result.score, "{}", profile.name);
        }
    }
}
