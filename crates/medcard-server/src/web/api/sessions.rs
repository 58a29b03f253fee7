use crate::error::{ApiError, ServiceError};
use crate::state::AppState;
use crate::web::api::middleware::SESSION_COOKIE;
use crate::web::extract::JsonBody;
use axum::{extract::State, Json};
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::CookieJar;
use medcard_common::models::{Credentials, Session};
use serde_json::{json, Value};
use std::sync::Arc;

/// Build the `Set-Cookie` value for a freshly issued session
pub fn session_cookie(session: &Session) -> Result<Cookie<'static>, ApiError> {
    let max_age = (session.expires_at - session.created_at).num_seconds().max(0);
    let raw = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}; Expires={}",
        SESSION_COOKIE,
        session.id,
        max_age,
        session.expires_at.format("%a, %d %b %Y %H:%M:%S GMT"),
    );
    Cookie::parse(raw).map_err(|e| {
        ApiError::from(ServiceError::Internal(anyhow::anyhow!(
            "Failed to build session cookie: {}",
            e
        )))
    })
}

/// POST /sessions
#[tracing::instrument(skip(state, jar, credentials))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let session = state.service.login(&credentials).await?;
    let cookie = session_cookie(&session)?;

    Ok((
        jar.add(cookie),
        Json(json!({
            "message": "session created",
            "expires_at": session.expires_at,
        })),
    ))
}
