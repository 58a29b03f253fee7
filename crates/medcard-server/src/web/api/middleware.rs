use crate::error::{ApiError, ServiceError};
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use medcard_common::models::Patient;
use std::sync::Arc;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "ssid";

/// The patient behind the current session, attached to the request by
/// [`require_session`].
#[derive(Debug, Clone)]
pub struct CurrentPatient(pub Patient);

impl<S> FromRequestParts<S> for CurrentPatient
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentPatient>()
            .cloned()
            .ok_or_else(|| ServiceError::Unauthorized("no active session".to_string()).into())
    }
}

/// Reject requests without a live session with 401; otherwise resolve the
/// session to its patient and hand it to the handler through request
/// extensions.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let ssid = match jar.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            return ApiError::from(ServiceError::Unauthorized(
                "missing session cookie".to_string(),
            ))
            .into_response()
        }
    };

    match state.service.patient_by_session_id(&ssid).await {
        Ok(patient) => {
            req.extensions_mut().insert(CurrentPatient(patient));
            next.run(req).await
        }
        Err(e) => {
            if let ServiceError::Unauthorized(reason) = &e {
                tracing::debug!("Rejected session: {}", reason);
            }
            ApiError::from(e).into_response()
        }
    }
}
