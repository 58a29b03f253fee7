use crate::error::{RepoError, Result};
use crate::repos::card::{CardRepo, CardRow};
use crate::repos::patient::{PatientRepo, PatientRow};
use crate::repos::session::SessionRepo;
use async_trait::async_trait;
use medcard_common::models::{Card, Patient, Session};
use sqlx::PgPool;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

/// Persistence contract consumed by the service layer.
///
/// Lookups that miss return [`RepoError::NotFound`]. Writes that collide with
/// a uniqueness constraint return [`RepoError::AlreadyExists`]. Patients are
/// returned with their card attached when one exists.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn create_patient(&self, patient: &Patient) -> Result<Patient>;
    async fn patient_by_id(&self, id: i64) -> Result<Patient>;
    async fn patient_by_passport_number(&self, passport_number: &str) -> Result<Patient>;
    async fn patient_by_login(&self, login: &str) -> Result<Patient>;
    async fn patients(&self) -> Result<Vec<Patient>>;
    async fn update_patient(&self, id: i64, patient: &Patient) -> Result<Patient>;
    /// Delete a patient together with its card
    async fn delete_patient(&self, id: i64) -> Result<()>;

    async fn create_card(&self, card: &Card) -> Result<Card>;
    async fn card_by_id(&self, id: i64) -> Result<Card>;
    async fn card_by_patient(&self, patient_id: i64) -> Result<Card>;
    async fn cards(&self) -> Result<Vec<Card>>;
    async fn update_card(&self, id: i64, card: &Card) -> Result<Card>;

    async fn create_session(&self, session: &Session) -> Result<()>;
    async fn session_by_id(&self, id: Uuid) -> Result<Session>;
    async fn delete_session(&self, id: Uuid) -> Result<()>;
}

/// PostgreSQL-backed [`Repository`]. Every call is bounded by `query_timeout`.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgRepository {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Query exceeded timeout of {:?}", self.query_timeout);
                Err(RepoError::Timeout(self.query_timeout))
            }
        }
    }

    async fn with_card(&self, row: PatientRow) -> Result<Patient> {
        let card = CardRepo::get_by_patient(&self.pool, row.id)
            .await?
            .map(Card::from);
        Ok(row.into_patient(card))
    }

    async fn found_patient(&self, row: Option<PatientRow>, what: String) -> Result<Patient> {
        match row {
            Some(row) => self.with_card(row).await,
            None => Err(RepoError::NotFound(what)),
        }
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn create_patient(&self, patient: &Patient) -> Result<Patient> {
        self.bounded(async {
            let row = PatientRepo::create(&self.pool, patient).await?;
            Ok(row.into_patient(None))
        })
        .await
    }

    async fn patient_by_id(&self, id: i64) -> Result<Patient> {
        self.bounded(async {
            let row = PatientRepo::get_by_id(&self.pool, id).await?;
            self.found_patient(row, format!("patient with id {}", id))
                .await
        })
        .await
    }

    async fn patient_by_passport_number(&self, passport_number: &str) -> Result<Patient> {
        self.bounded(async {
            let row = PatientRepo::get_by_passport_number(&self.pool, passport_number).await?;
            self.found_patient(row, format!("patient with passport '{}'", passport_number))
                .await
        })
        .await
    }

    async fn patient_by_login(&self, login: &str) -> Result<Patient> {
        self.bounded(async {
            let row = PatientRepo::get_by_login(&self.pool, login).await?;
            self.found_patient(row, format!("patient with login '{}'", login))
                .await
        })
        .await
    }

    async fn patients(&self) -> Result<Vec<Patient>> {
        self.bounded(async {
            let rows = PatientRepo::list(&self.pool).await?;
            let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
            let mut cards: HashMap<i64, Card> = CardRepo::list_by_patient_ids(&self.pool, &ids)
                .await?
                .into_iter()
                .map(|row| (row.patient_id, Card::from(row)))
                .collect();

            Ok(rows
                .into_iter()
                .map(|row| {
                    let card = cards.remove(&row.id);
                    row.into_patient(card)
                })
                .collect())
        })
        .await
    }

    async fn update_patient(&self, id: i64, patient: &Patient) -> Result<Patient> {
        self.bounded(async {
            let row = PatientRepo::update(&self.pool, id, patient).await?;
            self.found_patient(row, format!("patient with id {}", id))
                .await
        })
        .await
    }

    async fn delete_patient(&self, id: i64) -> Result<()> {
        self.bounded(async {
            let mut tx = self.pool.begin().await?;
            CardRepo::delete_by_patient(&mut *tx, id).await?;
            let deleted = PatientRepo::delete(&mut *tx, id).await?;
            if !deleted {
                // Dropping the transaction rolls it back
                return Err(RepoError::NotFound(format!("patient with id {}", id)));
            }
            tx.commit().await?;
            Ok(())
        })
        .await
    }

    async fn create_card(&self, card: &Card) -> Result<Card> {
        self.bounded(async {
            let row = CardRepo::create(&self.pool, card).await?;
            Ok(Card::from(row))
        })
        .await
    }

    async fn card_by_id(&self, id: i64) -> Result<Card> {
        self.bounded(async {
            CardRepo::get_by_id(&self.pool, id)
                .await?
                .map(Card::from)
                .ok_or_else(|| RepoError::NotFound(format!("card with id {}", id)))
        })
        .await
    }

    async fn card_by_patient(&self, patient_id: i64) -> Result<Card> {
        self.bounded(async {
            CardRepo::get_by_patient(&self.pool, patient_id)
                .await?
                .map(Card::from)
                .ok_or_else(|| RepoError::NotFound(format!("card of patient {}", patient_id)))
        })
        .await
    }

    async fn cards(&self) -> Result<Vec<Card>> {
        self.bounded(async {
            let rows: Vec<CardRow> = CardRepo::list(&self.pool).await?;
            Ok(rows.into_iter().map(Card::from).collect())
        })
        .await
    }

    async fn update_card(&self, id: i64, card: &Card) -> Result<Card> {
        self.bounded(async {
            CardRepo::update(&self.pool, id, card)
                .await?
                .map(Card::from)
                .ok_or_else(|| RepoError::NotFound(format!("card with id {}", id)))
        })
        .await
    }

    async fn create_session(&self, session: &Session) -> Result<()> {
        self.bounded(SessionRepo::create(&self.pool, session)).await
    }

    async fn session_by_id(&self, id: Uuid) -> Result<Session> {
        self.bounded(async {
            SessionRepo::get(&self.pool, id)
                .await?
                .map(Session::from)
                .ok_or_else(|| RepoError::NotFound(format!("session {}", id)))
        })
        .await
    }

    async fn delete_session(&self, id: Uuid) -> Result<()> {
        self.bounded(async {
            if SessionRepo::delete(&self.pool, id).await? {
                Ok(())
            } else {
                Err(RepoError::NotFound(format!("session {}", id)))
            }
        })
        .await
    }
}
