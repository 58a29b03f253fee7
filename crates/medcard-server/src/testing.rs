//! In-memory [`Repository`] and fixtures for unit tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use medcard_common::models::{
    Address, Card, CardDetails, Consultation, Patient, PatientInput, Session,
};
use medcard_db::{RepoError, Repository, Result};
use std::collections::BTreeMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    next_patient_id: i64,
    next_card_id: i64,
    patients: BTreeMap<i64, Patient>,
    cards: BTreeMap<i64, Card>,
    sessions: BTreeMap<Uuid, Session>,
}

impl Tables {
    fn attach_card(&self, mut patient: Patient) -> Patient {
        patient.card = self
            .cards
            .values()
            .find(|c| c.patient_id == patient.id)
            .cloned();
        patient
    }

    fn find_patient(&self, what: String, pred: impl Fn(&Patient) -> bool) -> Result<Patient> {
        self.patients
            .values()
            .find(|p| pred(p))
            .cloned()
            .map(|p| self.attach_card(p))
            .ok_or(RepoError::NotFound(what))
    }

    /// Mirrors the unique constraints on `patients`
    fn check_unique(&self, patient: &Patient, skip_id: i64) -> Result<()> {
        for other in self.patients.values().filter(|p| p.id != skip_id) {
            if other.passport_number == patient.passport_number {
                return Err(RepoError::AlreadyExists(
                    "patients_passport_number_key".to_string(),
                ));
            }
            if other.login == patient.login {
                return Err(RepoError::AlreadyExists("patients_login_key".to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_patient(&self, patient: &Patient) -> Result<Patient> {
        let mut t = self.tables();
        t.check_unique(patient, 0)?;
        t.next_patient_id += 1;
        let mut stored = patient.clone();
        stored.id = t.next_patient_id;
        stored.card = None;
        t.patients.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn patient_by_id(&self, id: i64) -> Result<Patient> {
        self.tables()
            .find_patient(format!("patient with id {}", id), |p| p.id == id)
    }

    async fn patient_by_passport_number(&self, passport_number: &str) -> Result<Patient> {
        self.tables().find_patient(
            format!("patient with passport '{}'", passport_number),
            |p| p.passport_number == passport_number,
        )
    }

    async fn patient_by_login(&self, login: &str) -> Result<Patient> {
        self.tables()
            .find_patient(format!("patient with login '{}'", login), |p| {
                p.login == login
            })
    }

    async fn patients(&self) -> Result<Vec<Patient>> {
        let t = self.tables();
        Ok(t.patients
            .values()
            .cloned()
            .map(|p| t.attach_card(p))
            .collect())
    }

    async fn update_patient(&self, id: i64, patient: &Patient) -> Result<Patient> {
        let mut t = self.tables();
        t.check_unique(patient, id)?;
        let existing = t
            .patients
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(format!("patient with id {}", id)))?;
        let mut stored = patient.clone();
        stored.id = id;
        stored.created_at = existing.created_at;
        stored.card = None;
        t.patients.insert(id, stored.clone());
        Ok(t.attach_card(stored))
    }

    async fn delete_patient(&self, id: i64) -> Result<()> {
        let mut t = self.tables();
        if t.patients.remove(&id).is_none() {
            return Err(RepoError::NotFound(format!("patient with id {}", id)));
        }
        t.cards.retain(|_, c| c.patient_id != id);
        t.sessions.retain(|_, s| s.patient_id != id);
        Ok(())
    }

    async fn create_card(&self, card: &Card) -> Result<Card> {
        let mut t = self.tables();
        if t.cards.values().any(|c| c.patient_id == card.patient_id) {
            return Err(RepoError::AlreadyExists("cards_patient_id_key".to_string()));
        }
        t.next_card_id += 1;
        let mut stored = card.clone();
        stored.id = t.next_card_id;
        t.cards.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn card_by_id(&self, id: i64) -> Result<Card> {
        self.tables()
            .cards
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(format!("card with id {}", id)))
    }

    async fn card_by_patient(&self, patient_id: i64) -> Result<Card> {
        self.tables()
            .cards
            .values()
            .find(|c| c.patient_id == patient_id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(format!("card of patient {}", patient_id)))
    }

    async fn cards(&self) -> Result<Vec<Card>> {
        Ok(self.tables().cards.values().cloned().collect())
    }

    async fn update_card(&self, id: i64, card: &Card) -> Result<Card> {
        let mut t = self.tables();
        let existing = t
            .cards
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(format!("card with id {}", id)))?;
        existing.details = card.details.clone();
        existing.updated_at = card.updated_at;
        Ok(existing.clone())
    }

    async fn create_session(&self, session: &Session) -> Result<()> {
        self.tables().sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn session_by_id(&self, id: Uuid) -> Result<Session> {
        self.tables()
            .sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(format!("session {}", id)))
    }

    async fn delete_session(&self, id: Uuid) -> Result<()> {
        self.tables()
            .sessions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("session {}", id)))
    }
}

pub fn patient_input(passport_number: &str, login: &str) -> PatientInput {
    PatientInput {
        full_name: "Test Test".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1994, 3, 12).unwrap(),
        address: Address {
            country: "Belarus".to_string(),
            city: "Vitebsk".to_string(),
            street: "Smolenskaya".to_string(),
            building: "11".to_string(),
            apartment: "158".to_string(),
        },
        phone_number: "1234567890".to_string(),
        passport_number: passport_number.to_string(),
        login: login.to_string(),
        password: Some("secret-password".to_string()),
    }
}

pub fn card_details() -> CardDetails {
    CardDetails {
        chronic_diseases: vec!["asthma".to_string()],
        disability_group: None,
        blood_type: 2,
        rh_factor: true,
        consultations: vec![Consultation {
            id: Uuid::nil(),
            doctor_id: "therapist-1".to_string(),
            doctor_name: "Dr. Petrova".to_string(),
            complaints: "cough".to_string(),
            description: "mild wheezing".to_string(),
            recommendation: "inhaler".to_string(),
            created_at: Default::default(),
            updated_at: Default::default(),
        }],
    }
}
