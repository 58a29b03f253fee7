use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medcard_db::RepoError;
use serde::Serialize;

/// Errors produced by the service layer. The variant is the classification
/// handlers map to a status code; the message carries the context.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    /// Convert a repository error, keeping its kind and attaching `context`
    /// to anything unclassified.
    pub fn from_repo(err: RepoError, context: impl Into<String>) -> Self {
        match err {
            RepoError::NotFound(what) => ServiceError::NotFound(what),
            RepoError::AlreadyExists(constraint) => {
                ServiceError::AlreadyExists(describe_constraint(&constraint).to_string())
            }
            other => ServiceError::Internal(anyhow::Error::new(other).context(context.into())),
        }
    }
}

fn describe_constraint(constraint: &str) -> &str {
    match constraint {
        "patients_passport_number_key" => "patient with this passport number",
        "patients_login_key" => "patient with this login",
        "cards_patient_id_key" => "card for this patient",
        other => other,
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error type returned by HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request itself could not be understood (malformed JSON, bad id)
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(e) => match e {
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::AlreadyExists(_) => StatusCode::CONFLICT,
                ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Service(ServiceError::Internal(e)) => {
                tracing::error!("Internal error: {:#}", e);
                "Internal server error".to_string()
            }
            ApiError::Service(ServiceError::Unauthorized(_)) => "Unauthorized".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
