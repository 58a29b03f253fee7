pub mod cards;
pub mod middleware;
pub mod patients;
pub mod sessions;

use crate::state::AppState;
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;

pub fn build_api_routes(state: Arc<AppState>) -> Router {
    // Everything here sits behind the session cookie
    let protected = Router::new()
        .route("/patients", get(patients::list_patients))
        .route("/patients/me", get(patients::me))
        .route(
            "/patients/cards",
            get(cards::list_cards).post(cards::create_card),
        )
        .route("/patients/cards/{id}", put(cards::update_card))
        .route(
            "/patients/{key}",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_session,
        ));

    Router::new()
        // Registration and login stay public
        .route("/patients", post(patients::create_patient))
        .route("/sessions", post(sessions::login))
        .merge(protected)
        .with_state(state)
}
