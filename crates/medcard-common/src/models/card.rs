use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single visit recorded on a card.
///
/// A consultation submitted with a nil `id` is treated as new and gets an id
/// and timestamps assigned on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consultation {
    #[serde(default = "Uuid::nil")]
    pub id: Uuid,
    pub doctor_id: String,
    #[serde(default)]
    pub doctor_name: String,
    #[serde(default)]
    pub complaints: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Consultation {
    pub fn is_new(&self) -> bool {
        self.id.is_nil()
    }
}

/// The medical part of a card, shared by requests and responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDetails {
    #[serde(default)]
    pub chronic_diseases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disability_group: Option<i16>,
    pub blood_type: i16,
    #[serde(default)]
    pub rh_factor: bool,
    #[serde(default)]
    pub consultations: Vec<Consultation>,
}

/// Medical card owned by exactly one patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub patient_id: i64,
    #[serde(flatten)]
    pub details: CardDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for attaching a card to a patient
#[derive(Debug, Clone, Deserialize)]
pub struct NewCard {
    pub patient_id: i64,
    #[serde(flatten)]
    pub details: CardDetails,
}
