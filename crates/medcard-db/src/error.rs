use std::time::Duration;

pub type Result<T, E = RepoError> = std::result::Result<T, E>;

/// Errors surfaced by the repository layer.
///
/// `NotFound` and `AlreadyExists` are the two kinds callers are expected to
/// branch on; everything else is an unclassified storage failure.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(String),

    /// A unique constraint rejected the write. Holds the constraint name.
    #[error("unique constraint '{0}' violated")]
    AlreadyExists(String),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("database error")]
    Database(#[source] sqlx::Error),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound(_))
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return RepoError::AlreadyExists(constraint);
            }
        }
        RepoError::Database(err)
    }
}
