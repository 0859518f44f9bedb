//! SQLite persistence for the online regressor.
//!
//! RULE: Only store.rs talks to the database.
//! The engine hands over snapshots; it never executes SQL directly.

use crate::{
    error::{DnaError, DnaResult},
    features::FeatureVector,
    regressor::TrainingSample,
    ridge::RidgeParams,
    scaler::ScalerParams,
    snapshot::RegressorSnapshot,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

pub struct ModelStore {
    conn: Connection,
}

impl ModelStore {
    /// Open (or create) the model database at `path`.
    pub fn open(path: &str) -> DnaResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DnaResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DnaResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_model_store.sql"))?;
        Ok(())
    }

    // ── Snapshot ───────────────────────────────────────────────

    /// Replace the stored state with `snapshot`.
    pub fn save_snapshot(&mut self, snapshot: &RegressorSnapshot) -> DnaResult<()> {
        let scaler_json = snapshot
            .scaler
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let model_json = snapshot
            .model
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM training_sample", [])?;
        tx.execute(
            "INSERT OR REPLACE INTO model_state
                 (id, samples_seen, scaler_json, model_json, trained_at, saved_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5)",
            params![
                snapshot.samples_seen as i64,
                scaler_json,
                model_json,
                snapshot.trained_at.map(|t| t.to_rfc3339()),
                Utc::now().to_rfc3339(),
            ],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO training_sample (position, features_json, target, recorded_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, sample) in snapshot.samples.iter().enumerate() {
                stmt.execute(params![
                    position as i64,
                    serde_json::to_string(sample.features.values())?,
                    sample.target,
                    sample.recorded_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;

        log::info!(
            "Saved regressor state: {} samples, {} seen",
            snapshot.samples.len(),
            snapshot.samples_seen
        );
        Ok(())
    }

    /// The stored state, or None when nothing has been saved yet.
    pub fn load_snapshot(&self) -> DnaResult<Option<RegressorSnapshot>> {
        let state = self
            .conn
            .query_row(
                "SELECT samples_seen, scaler_json, model_json, trained_at
                 FROM model_state WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((samples_seen, scaler_json, model_json, trained_at)) = state else {
            return Ok(None);
        };

        let scaler: Option<ScalerParams> = scaler_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let model: Option<RidgeParams> = model_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let trained_at = trained_at.as_deref().map(parse_timestamp).transpose()?;

        let mut stmt = self.conn.prepare(
            "SELECT features_json, target, recorded_at
             FROM training_sample ORDER BY position ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut samples = Vec::with_capacity(rows.len());
        for (features_json, target, recorded_at) in rows {
            let values: Vec<f64> = serde_json::from_str(&features_json)?;
            samples.push(TrainingSample {
                features:    FeatureVector::from_values(values)?,
                target,
                recorded_at: parse_timestamp(&recorded_at)?,
            });
        }

        Ok(Some(RegressorSnapshot {
            samples,
            scaler,
            model,
            samples_seen: samples_seen.max(0) as u64,
            trained_at,
        }))
    }

    /// Forget all stored state.
    pub fn clear(&mut self) -> DnaResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM training_sample", [])?;
        tx.execute("DELETE FROM model_state", [])?;
        tx.commit()?;
        Ok(())
    }

    pub fn sample_count(&self) -> DnaResult<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM training_sample", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

fn parse_timestamp(raw: &str) -> DnaResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DnaError::Model(format!("bad stored timestamp '{raw}': {e}")))
}
