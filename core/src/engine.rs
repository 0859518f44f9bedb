//! The risk engine: owns the regressor and wires the scorers together.
//!
//! EVALUATION ORDER (fixed, never reordered):
//!   1. Reconcile the session (balance / wagered invariants)
//!   2. Regressor predicts on the reconciled session
//!   3. The evaluation is appended as a training sample (may retrain inline)
//!   4. Rule scorer scores
//!   5. Blender picks the final score
//!   6. Recommender derives interventions
//!   7. If the model was refit and a store is attached, the state is saved
//!
//! RULES:
//!   - The engine is an owned service object. There is no global regressor.
//!   - Session changes go through `apply()`, which validates before mutating.
//!   - Persistence failures are logged. They never fail an evaluation.

use crate::{
    blender::{RiskBlender, RiskResult},
    command::SessionCommand,
    config::RiskConfig,
    error::DnaResult,
    event::SessionEvent,
    monitoring,
    profile::CustomerProfile,
    recommender::{Intervention, InterventionRecommender},
    regressor::{OnlineRiskRegressor, Prediction},
    rule_scorer::{RuleScore, RuleScorer},
    session::SessionActivity,
    store::ModelStore,
};
use serde::Serialize;

/// Everything one evaluation produced.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub result:         RiskResult,
    pub rule:           RuleScore,
    pub prediction:     Prediction,
    pub interventions:  Vec<Intervention>,
    pub days_to_crisis: u32,
    /// True when this evaluation's sample triggered a refit.
    pub retrained:      bool,
}

pub struct RiskEngine {
    config:      RiskConfig,
    regressor:   OnlineRiskRegressor,
    scorer:      RuleScorer,
    blender:     RiskBlender,
    recommender: InterventionRecommender,
    store:       Option<ModelStore>,
}

impl RiskEngine {
    /// Engine with a freshly bootstrapped regressor and no persistence.
    pub fn new(config: RiskConfig) -> DnaResult<Self> {
        let regressor = OnlineRiskRegressor::new(config.regressor.clone())?;
        Ok(Self::assemble(config, regressor, None))
    }

    /// Engine backed by `store`. Restores the saved regressor when there is
    /// one; otherwise bootstraps and saves the bootstrap state.
    pub fn with_store(config: RiskConfig, store: ModelStore) -> DnaResult<Self> {
        store.migrate()?;

        let restored = match store.load_snapshot() {
            Ok(Some(snapshot)) => {
                match OnlineRiskRegressor::restore(config.regressor.clone(), snapshot) {
                    Ok(regressor) => Some(regressor),
                    Err(e) => {
                        log::warn!("Stored regressor state unusable, bootstrapping: {e}");
                        None
                    }
                }
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("Cannot read stored regressor state, bootstrapping: {e}");
                None
            }
        };

        let engine = match restored {
            Some(regressor) => {
                log::info!(
                    "Restored regressor with {} samples ({} seen)",
                    regressor.buffer_len(),
                    regressor.samples_seen()
                );
                Self::assemble(config, regressor, Some(store))
            }
            None => {
                let regressor = OnlineRiskRegressor::new(config.regressor.clone())?;
                let mut engine = Self::assemble(config, regressor, Some(store));
                engine.persist();
                engine
            }
        };
        engine.log_ready();
        Ok(engine)
    }

    fn assemble(
        config: RiskConfig,
        regressor: OnlineRiskRegressor,
        store: Option<ModelStore>,
    ) -> Self {
        Self {
            scorer:      RuleScorer::new(&config),
            blender:     RiskBlender::new(&config),
            recommender: InterventionRecommender::new(&config),
            regressor,
            store,
            config,
        }
    }

    fn log_ready(&self) {
        log::debug!(
            "Risk engine ready (model trained: {}, persistence: {})",
            self.regressor.is_trained(),
            self.store.is_some()
        );
    }

    // ── Sessions ───────────────────────────────────────────────

    /// Selecting a customer starts a fresh session for that profile.
    pub fn start_session(&self, profile: &CustomerProfile) -> SessionActivity {
        SessionActivity::new(profile)
    }

    /// Validate and apply one command. On error the session is unchanged.
    pub fn apply(
        &self,
        profile: &CustomerProfile,
        session: &mut SessionActivity,
        command: SessionCommand,
    ) -> DnaResult<Vec<SessionEvent>> {
        let limits = &self.config.validation;
        let session_id = session.session_id;
        let name = command.name();
        let mut events = Vec::new();

        match command {
            SessionCommand::Deposit { amount } => {
                session.deposit(amount, limits)?;
                events.push(SessionEvent::DepositRecorded {
                    session_id,
                    amount,
                    balance: session.balance,
                });
                events.extend(
                    monitoring::deposit_alerts(profile, session, amount)
                        .into_iter()
                        .map(SessionEvent::from),
                );
            }
            SessionCommand::Wager { amount } => {
                session.wager(amount, limits)?;
                events.push(SessionEvent::WagerPlaced {
                    session_id,
                    amount,
                    balance: session.balance,
                });
                events.extend(
                    monitoring::wager_alerts(profile, session, amount)
                        .into_iter()
                        .map(SessionEvent::from),
                );
            }
            SessionCommand::SetSessionTime { minutes } => {
                session.set_session_minutes(minutes, limits)?;
                events.push(SessionEvent::SessionTimeSet { session_id, minutes });
            }
            SessionCommand::SetLocation { location } => {
                if let Some(from) = session.move_to(location, limits) {
                    events.push(SessionEvent::LocationChanged {
                        session_id,
                        from,
                        to: location,
                    });
                    events.extend(
                        monitoring::location_alerts(profile, location)
                            .into_iter()
                            .map(SessionEvent::from),
                    );
                }
            }
            SessionCommand::ContactSupport => {
                let live_calls = session.contact_support(limits)?;
                events.push(SessionEvent::SupportContacted { session_id, live_calls });
                events.extend(
                    monitoring::support_alerts(profile, session, limits.max_support_calls)
                        .into_iter()
                        .map(SessionEvent::from),
                );
            }
            SessionCommand::Reset => {
                session.reset(profile);
                events.push(SessionEvent::SessionReset {
                    session_id,
                    customer: profile.name.clone(),
                });
            }
        }

        log::debug!("Applied {name} to session {session_id}");
        for alert in events.iter().filter_map(SessionEvent::as_alert) {
            log::info!("[{:?}] {}", alert.severity, alert.message);
        }
        Ok(events)
    }

    // ── Evaluation ─────────────────────────────────────────────

    /// Full evaluation. Learns from the session with a pseudo-label.
    pub fn evaluate(
        &mut self,
        profile: &CustomerProfile,
        session: &mut SessionActivity,
    ) -> Assessment {
        self.evaluate_labelled(profile, session, None)
    }

    /// Full evaluation with an optional ground-truth label for the sample.
    pub fn evaluate_labelled(
        &mut self,
        profile: &CustomerProfile,
        session: &mut SessionActivity,
        label: Option<f64>,
    ) -> Assessment {
        session.reconcile();

        let prediction = self.regressor.predict(profile, session);
        let retrained = self.regressor.add_sample(profile, session, label);
        let rule = self.scorer.score(profile, session);
        let result = self.blender.blend(&prediction, &rule);
        let interventions = self.recommender.recommend(&result);

        if retrained {
            self.persist();
        }

        log::debug!(
            "{}: {} ({}) via {:?}, {} interventions",
            profile.name,
            result.score,
            result.level,
            result.method,
            interventions.len()
        );

        Assessment {
            days_to_crisis: result.days_to_crisis(),
            result,
            rule,
            prediction,
            interventions,
            retrained,
        }
    }

    /// Score without learning. The session is reconciled on a copy.
    pub fn preview(&self, profile: &CustomerProfile, session: &SessionActivity) -> RiskResult {
        let mut session = session.clone();
        session.reconcile();
        let prediction = self.regressor.predict(profile, &session);
        let rule = self.scorer.score(profile, &session);
        self.blender.blend(&prediction, &rule)
    }

    // ── Model management ───────────────────────────────────────

    /// Drop everything the model learned and start again from the bootstrap set.
    pub fn reset_model(&mut self) -> DnaResult<()> {
        self.regressor.bootstrap()?;
        if let Some(store) = self.store.as_mut() {
            store.clear()?;
        }
        self.persist();
        Ok(())
    }

    /// Save the regressor now. No-op without a store.
    pub fn save(&mut self) -> DnaResult<()> {
        if let Some(store) = self.store.as_mut() {
            store.save_snapshot(&self.regressor.snapshot())?;
        }
        Ok(())
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            log::warn!("Failed to persist regressor state: {e}");
        }
    }

    pub fn regressor(&self) -> &OnlineRiskRegressor {
        &self.regressor
    }

    pub fn regressor_mut(&mut self) -> &mut OnlineRiskRegressor {
        &mut self.regressor
    }

    pub fn scorer(&self) -> &RuleScorer {
        &self.scorer
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn store(&self) -> Option<&ModelStore> {
        self.store.as_ref()
    }
}
