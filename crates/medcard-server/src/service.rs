//! Business rules for patients, cards and sessions.
//!
//! The service owns uniqueness pre-checks, password hashing, timestamps and
//! session issuance. It talks to storage only through [`Repository`].

use crate::auth::{hash_password, reject_unknown_login, verify_password};
use crate::error::ServiceError;
use chrono::{DateTime, Duration, Utc};
use medcard_common::models::{
    Card, CardDetails, Consultation, Credentials, NewCard, Patient, PatientInput, Session,
};
use medcard_common::validation::{validate_card, validate_patient};
use medcard_db::{RepoError, Repository};
use std::sync::Arc;
use uuid::Uuid;

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

/// Default lifetime of a login session
pub const DEFAULT_SESSION_TTL_SECS: i64 = 60;

pub struct PatientService {
    repo: Arc<dyn Repository>,
    session_ttl: Duration,
}

impl PatientService {
    pub fn new(repo: Arc<dyn Repository>, session_ttl: Duration) -> Self {
        Self { repo, session_ttl }
    }

    // Patients

    /// Register a new patient.
    ///
    /// Passport number and login are checked up front for a fast conflict
    /// answer; the storage unique constraints remain the final word when two
    /// registrations race.
    pub async fn add_patient(&self, input: PatientInput) -> Result<Patient> {
        validate_patient(&input, true).map_err(invalid)?;

        self.ensure_absent(
            self.repo
                .patient_by_passport_number(&input.passport_number)
                .await,
            format!("patient with passport '{}'", input.passport_number),
        )?;
        self.ensure_absent(
            self.repo.patient_by_login(&input.login).await,
            format!("patient with login '{}'", input.login),
        )?;

        let password_hash = hash_password(input.password.as_deref().unwrap_or_default())?;
        let patient = Patient::from_input(input, password_hash, Utc::now());

        self.repo
            .create_patient(&patient)
            .await
            .map_err(|e| ServiceError::from_repo(e, "create patient"))
    }

    pub async fn patients(&self) -> Result<Vec<Patient>> {
        self.repo
            .patients()
            .await
            .map_err(|e| ServiceError::from_repo(e, "list patients"))
    }

    pub async fn patient(&self, id: i64) -> Result<Patient> {
        self.repo
            .patient_by_id(id)
            .await
            .map_err(|e| ServiceError::from_repo(e, format!("get patient {}", id)))
    }

    pub async fn patient_by_passport_number(&self, passport_number: &str) -> Result<Patient> {
        self.repo
            .patient_by_passport_number(passport_number)
            .await
            .map_err(|e| ServiceError::from_repo(e, "get patient by passport number"))
    }

    pub async fn patient_by_login(&self, login: &str) -> Result<Patient> {
        self.repo
            .patient_by_login(login)
            .await
            .map_err(|e| ServiceError::from_repo(e, "get patient by login"))
    }

    /// Replace a patient's identity fields. The stored password hash is kept
    /// unless the input carries a new password.
    pub async fn update_patient(&self, id: i64, input: PatientInput) -> Result<Patient> {
        validate_patient(&input, false).map_err(invalid)?;

        let existing = self.patient(id).await?;
        let password_hash = match input.password.as_deref() {
            Some(password) => hash_password(password)?,
            None => existing.password_hash,
        };

        let patient = Patient {
            id,
            full_name: input.full_name,
            date_of_birth: input.date_of_birth,
            address: input.address,
            phone_number: input.phone_number,
            passport_number: input.passport_number,
            login: input.login,
            password_hash,
            card: existing.card,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        self.repo
            .update_patient(id, &patient)
            .await
            .map_err(|e| ServiceError::from_repo(e, format!("update patient {}", id)))
    }

    /// Delete a patient and its card
    pub async fn delete_patient(&self, id: i64) -> Result<()> {
        self.patient(id).await?;
        self.repo
            .delete_patient(id)
            .await
            .map_err(|e| ServiceError::from_repo(e, format!("delete patient {}", id)))?;
        tracing::info!(patient_id = id, "Deleted patient");
        Ok(())
    }

    // Cards

    /// Attach a card to an existing patient that has none yet
    pub async fn add_card(&self, new_card: NewCard) -> Result<Card> {
        validate_card(&new_card.details).map_err(invalid)?;

        let owner = self.patient(new_card.patient_id).await?;
        match self.repo.card_by_patient(owner.id).await {
            Ok(_) => {
                return Err(ServiceError::AlreadyExists(format!(
                    "card for patient {}",
                    owner.id
                )))
            }
            Err(RepoError::NotFound(_)) => {}
            Err(e) => return Err(ServiceError::from_repo(e, "check existing card")),
        }

        let now = Utc::now();
        let mut details = new_card.details;
        details.consultations = merge_consultations(details.consultations, &[], now);

        let card = Card {
            id: 0,
            patient_id: owner.id,
            details,
            created_at: now,
            updated_at: now,
        };

        self.repo
            .create_card(&card)
            .await
            .map_err(|e| ServiceError::from_repo(e, "create card"))
    }

    pub async fn cards(&self) -> Result<Vec<Card>> {
        self.repo
            .cards()
            .await
            .map_err(|e| ServiceError::from_repo(e, "list cards"))
    }

    /// Replace the medical fields of a card. Owner and creation time stay.
    pub async fn update_card(&self, id: i64, mut details: CardDetails) -> Result<Card> {
        validate_card(&details).map_err(invalid)?;

        let existing = self
            .repo
            .card_by_id(id)
            .await
            .map_err(|e| ServiceError::from_repo(e, format!("get card {}", id)))?;

        let now = Utc::now();
        details.consultations =
            merge_consultations(details.consultations, &existing.details.consultations, now);

        let card = Card {
            id,
            patient_id: existing.patient_id,
            details,
            created_at: existing.created_at,
            updated_at: now,
        };

        self.repo
            .update_card(id, &card)
            .await
            .map_err(|e| ServiceError::from_repo(e, format!("update card {}", id)))
    }

    // Sessions

    /// Check credentials and issue a new session.
    ///
    /// An unknown login and a wrong password produce the same error.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let patient = match self.repo.patient_by_login(&credentials.login).await {
            Ok(p) => p,
            Err(RepoError::NotFound(_)) => {
                reject_unknown_login(&credentials.password);
                return Err(invalid_credentials());
            }
            Err(e) => return Err(ServiceError::from_repo(e, "login")),
        };

        if !verify_password(&credentials.password, &patient.password_hash)? {
            return Err(invalid_credentials());
        }

        let session = Session::issue(patient.id, Utc::now(), self.session_ttl);
        self.repo
            .create_session(&session)
            .await
            .map_err(|e| ServiceError::from_repo(e, "create session"))?;

        tracing::info!(patient_id = patient.id, "Session issued");
        Ok(session)
    }

    /// Resolve a session id to its patient. Unknown, malformed and expired
    /// sessions are all `Unauthorized`.
    pub async fn patient_by_session_id(&self, ssid: &str) -> Result<Patient> {
        let id = Uuid::parse_str(ssid)
            .map_err(|_| ServiceError::Unauthorized("malformed session id".to_string()))?;

        let session = match self.repo.session_by_id(id).await {
            Ok(s) => s,
            Err(RepoError::NotFound(_)) => {
                return Err(ServiceError::Unauthorized("unknown session".to_string()))
            }
            Err(e) => return Err(ServiceError::from_repo(e, "get session")),
        };

        if session.is_expired_at(Utc::now()) {
            if let Err(e) = self.repo.delete_session(id).await {
                tracing::debug!("Failed to delete expired session {}: {}", id, e);
            }
            return Err(ServiceError::Unauthorized("session expired".to_string()));
        }

        match self.repo.patient_by_id(session.patient_id).await {
            Ok(p) => Ok(p),
            Err(RepoError::NotFound(_)) => Err(ServiceError::Unauthorized(
                "session owner no longer exists".to_string(),
            )),
            Err(e) => Err(ServiceError::from_repo(e, "get session owner")),
        }
    }

    fn ensure_absent(&self, lookup: medcard_db::Result<Patient>, what: String) -> Result<()> {
        match lookup {
            Ok(_) => Err(ServiceError::AlreadyExists(what)),
            Err(RepoError::NotFound(_)) => Ok(()),
            Err(e) => Err(ServiceError::from_repo(e, what)),
        }
    }
}

fn invalid(err: anyhow::Error) -> ServiceError {
    ServiceError::InvalidInput(err.to_string())
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthorized("invalid login or password".to_string())
}

/// Assign ids and timestamps to consultations. New entries (nil id) get a
/// fresh id and `now` for both timestamps; entries already on the card keep
/// their creation time and only get `updated_at` bumped when they changed.
fn merge_consultations(
    incoming: Vec<Consultation>,
    previous: &[Consultation],
    now: DateTime<Utc>,
) -> Vec<Consultation> {
    incoming
        .into_iter()
        .map(|mut c| {
            if c.is_new() {
                c.id = Uuid::new_v4();
                c.created_at = now;
                c.updated_at = now;
                return c;
            }
            match previous.iter().find(|p| p.id == c.id) {
                Some(prev) => {
                    c.created_at = prev.created_at;
                    c.updated_at = if same_content(prev, &c) {
                        prev.updated_at
                    } else {
                        now
                    };
                }
                None => {
                    c.created_at = now;
                    c.updated_at = now;
                }
            }
            c
        })
        .collect()
}

fn same_content(a: &Consultation, b: &Consultation) -> bool {
    a.doctor_id == b.doctor_id
        && a.doctor_name == b.doctor_name
        && a.complaints == b.complaints
        && a.description == b.description
        && a.recommendation == b.recommendation
}
