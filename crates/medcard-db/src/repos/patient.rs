use crate::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use medcard_common::models::{Address, Card, Patient};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

const PATIENT_COLUMNS: &str = "id, full_name, date_of_birth, address, phone_number, passport_number, login, password_hash, created_at, updated_at";

/// Patient row from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PatientRow {
    pub id: i64,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub address: Json<Address>,
    pub phone_number: String,
    pub passport_number: String,
    pub login: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PatientRow {
    pub fn into_patient(self, card: Option<Card>) -> Patient {
        Patient {
            id: self.id,
            full_name: self.full_name,
            date_of_birth: self.date_of_birth,
            address: self.address.0,
            phone_number: self.phone_number,
            passport_number: self.passport_number,
            login: self.login,
            password_hash: self.password_hash,
            card,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for the `patients` table
pub struct PatientRepo;

impl PatientRepo {
    /// Insert a patient and return the stored row with its assigned id
    pub async fn create(pool: &PgPool, patient: &Patient) -> Result<PatientRow> {
        let row = sqlx::query_as::<_, PatientRow>(&format!(
            r#"INSERT INTO patients (full_name, date_of_birth, address, phone_number, passport_number, login, password_hash, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING {PATIENT_COLUMNS}"#
        ))
        .bind(&patient.full_name)
        .bind(patient.date_of_birth)
        .bind(Json(&patient.address))
        .bind(&patient.phone_number)
        .bind(&patient.passport_number)
        .bind(&patient.login)
        .bind(&patient.password_hash)
        .bind(patient.created_at)
        .bind(patient.updated_at)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_id(pool: &PgPool, id: i64) -> Result<Option<PatientRow>> {
        let row = sqlx::query_as::<_, PatientRow>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_passport_number(
        pool: &PgPool,
        passport_number: &str,
    ) -> Result<Option<PatientRow>> {
        let row = sqlx::query_as::<_, PatientRow>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE passport_number = $1"
        ))
        .bind(passport_number)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_login(pool: &PgPool, login: &str) -> Result<Option<PatientRow>> {
        let row = sqlx::query_as::<_, PatientRow>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE login = $1"
        ))
        .bind(login)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<PatientRow>> {
        let rows = sqlx::query_as::<_, PatientRow>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY id"
        ))
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Overwrite the mutable fields of a patient. Returns `None` when no row
    /// has the given id. `created_at` is never touched.
    pub async fn update(pool: &PgPool, id: i64, patient: &Patient) -> Result<Option<PatientRow>> {
        let row = sqlx::query_as::<_, PatientRow>(&format!(
            r#"UPDATE patients
               SET full_name = $1, date_of_birth = $2, address = $3, phone_number = $4,
                   passport_number = $5, login = $6, password_hash = $7, updated_at = $8
               WHERE id = $9
               RETURNING {PATIENT_COLUMNS}"#
        ))
        .bind(&patient.full_name)
        .bind(patient.date_of_birth)
        .bind(Json(&patient.address))
        .bind(&patient.phone_number)
        .bind(&patient.passport_number)
        .bind(&patient.login)
        .bind(&patient.password_hash)
        .bind(patient.updated_at)
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    /// Delete a patient row. Returns whether a row was removed.
    pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
