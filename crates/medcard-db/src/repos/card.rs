use crate::error::Result;
use chrono::{DateTime, Utc};
use medcard_common::models::{Card, CardDetails, Consultation};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

const CARD_COLUMNS: &str = "id, patient_id, chronic_diseases, disability_group, blood_type, rh_factor, consultations, created_at, updated_at";

/// Card row from database. Chronic diseases and consultations live in JSONB
/// columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CardRow {
    pub id: i64,
    pub patient_id: i64,
    pub chronic_diseases: Json<Vec<String>>,
    pub disability_group: Option<i16>,
    pub blood_type: i16,
    pub rh_factor: bool,
    pub consultations: Json<Vec<Consultation>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CardRow> for Card {
    fn from(row: CardRow) -> Self {
        Card {
            id: row.id,
            patient_id: row.patient_id,
            details: CardDetails {
                chronic_diseases: row.chronic_diseases.0,
                disability_group: row.disability_group,
                blood_type: row.blood_type,
                rh_factor: row.rh_factor,
                consultations: row.consultations.0,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for the `cards` table
pub struct CardRepo;

impl CardRepo {
    pub async fn create(pool: &PgPool, card: &Card) -> Result<CardRow> {
        let row = sqlx::query_as::<_, CardRow>(&format!(
            r#"INSERT INTO cards (patient_id, chronic_diseases, disability_group, blood_type, rh_factor, consultations, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {CARD_COLUMNS}"#
        ))
        .bind(card.patient_id)
        .bind(Json(&card.details.chronic_diseases))
        .bind(card.details.disability_group)
        .bind(card.details.blood_type)
        .bind(card.details.rh_factor)
        .bind(Json(&card.details.consultations))
        .bind(card.created_at)
        .bind(card.updated_at)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_id(pool: &PgPool, id: i64) -> Result<Option<CardRow>> {
        let row = sqlx::query_as::<_, CardRow>(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_patient(pool: &PgPool, patient_id: i64) -> Result<Option<CardRow>> {
        let row = sqlx::query_as::<_, CardRow>(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE patient_id = $1"
        ))
        .bind(patient_id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<CardRow>> {
        let rows = sqlx::query_as::<_, CardRow>(&format!(
            "SELECT {CARD_COLUMNS} FROM cards ORDER BY id"
        ))
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Batch-load the cards for a set of patients
    pub async fn list_by_patient_ids(pool: &PgPool, patient_ids: &[i64]) -> Result<Vec<CardRow>> {
        let rows = sqlx::query_as::<_, CardRow>(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE patient_id = ANY($1)"
        ))
        .bind(patient_ids)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Overwrite the medical fields of a card. The owning patient and
    /// `created_at` are never changed. Returns `None` for an unknown id.
    pub async fn update(pool: &PgPool, id: i64, card: &Card) -> Result<Option<CardRow>> {
        let row = sqlx::query_as::<_, CardRow>(&format!(
            r#"UPDATE cards
               SET chronic_diseases = $1, disability_group = $2, blood_type = $3,
                   rh_factor = $4, consultations = $5, updated_at = $6
               WHERE id = $7
               RETURNING {CARD_COLUMNS}"#
        ))
        .bind(Json(&card.details.chronic_diseases))
        .bind(card.details.disability_group)
        .bind(card.details.blood_type)
        .bind(card.details.rh_factor)
        .bind(Json(&card.details.consultations))
        .bind(card.updated_at)
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    pub async fn delete_by_patient<'e>(executor: impl PgExecutor<'e>, patient_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cards WHERE patient_id = $1")
            .bind(patient_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
