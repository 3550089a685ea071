//! Prediction record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Row};

/// One persisted prediction. Rows are append-only; the service never
/// updates or deletes them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PredictionRecord {
    pub id: i64,
    pub letter: String,
    pub confidence: f32,
    /// The 25 extracted features, not the raw samples
    pub sensor_data: Vec<f32>,
    pub device_id: String,
    pub processing_time_ms: f64,
    pub predicted_at: DateTime<Utc>,
}

/// Row data for a new prediction; `predicted_at` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPrediction {
    pub letter: String,
    pub confidence: f32,
    pub sensor_data: Vec<f32>,
    pub device_id: String,
    pub processing_time_ms: f64,
}

impl NewPrediction {
    pub async fn insert(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO predictions
            (letter, confidence, sensor_data, device_id, processing_time_ms, predicted_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            "#,
        )
        .bind(&self.letter)
        .bind(self.confidence)
        .bind(&self.sensor_data)
        .bind(&self.device_id)
        .bind(self.processing_time_ms)
        .execute(pool)
        .await?;

        Ok(())
    }
}

impl PredictionRecord {
    pub async fn total_count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM predictions")
            .fetch_one(pool)
            .await
    }

    pub async fn avg_confidence_24h(pool: &PgPool) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COALESCE(AVG(confidence), 0)::DOUBLE PRECISION
            FROM predictions
            WHERE predicted_at > NOW() - INTERVAL '24 hours'
            "#,
        )
        .fetch_one(pool)
        .await
    }

    pub async fn avg_processing_ms_1h(pool: &PgPool) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COALESCE(AVG(processing_time_ms), 0)::DOUBLE PRECISION
            FROM predictions
            WHERE predicted_at > NOW() - INTERVAL '1 hour'
            "#,
        )
        .fetch_one(pool)
        .await
    }

    pub async fn top_letters_24h(pool: &PgPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT letter, COUNT(*) as count
            FROM predictions
            WHERE predicted_at > NOW() - INTERVAL '24 hours'
            GROUP BY letter
            ORDER BY count DESC, letter
            LIMIT 10
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| (r.get::<String, _>("letter"), r.get::<i64, _>("count")))
            .collect())
    }
}
