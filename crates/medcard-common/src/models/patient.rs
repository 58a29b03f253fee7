use crate::models::card::Card;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Postal address, stored as a single JSON document on the patient row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub country: String,
    pub city: String,
    pub street: String,
    pub building: String,
    pub apartment: String,
}

/// A registered patient.
///
/// `password_hash` never leaves the process: it is skipped on serialization
/// and is only populated when the record is read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub address: Address,
    pub phone_number: String,
    pub passport_number: String,
    pub login: String,
    #[serde(skip)]
    pub password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub card: Option<Card>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating a patient
#[derive(Debug, Clone, Deserialize)]
pub struct PatientInput {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub phone_number: String,
    pub passport_number: String,
    pub login: String,
    /// Plain-text password, write-only
    #[serde(default)]
    pub password: Option<String>,
}

impl Patient {
    /// Build an unsaved patient from validated input. `id` stays zero until
    /// the repository assigns one.
    pub fn from_input(
        input: PatientInput,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            full_name: input.full_name,
            date_of_birth: input.date_of_birth,
            address: input.address,
            phone_number: input.phone_number,
            passport_number: input.passport_number,
            login: input.login,
            password_hash,
            card: None,
            created_at: now,
            updated_at: now,
        }
    }
}
