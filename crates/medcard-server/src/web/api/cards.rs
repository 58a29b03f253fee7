use crate::error::ApiError;
use crate::state::AppState;
use crate::web::extract::{parse_id, JsonBody};
use axum::{
    extract::{Path, State},
    Json,
};
use medcard_common::models::{Card, CardDetails, NewCard};
use std::sync::Arc;

/// GET /patients/cards
#[tracing::instrument(skip(state))]
pub async fn list_cards(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Card>>, ApiError> {
    Ok(Json(state.service.cards().await?))
}

/// POST /patients/cards
#[tracing::instrument(skip(state, new_card))]
pub async fn create_card(
    State(state): State<Arc<AppState>>,
    JsonBody(new_card): JsonBody<NewCard>,
) -> Result<Json<Card>, ApiError> {
    let card = state.service.add_card(new_card).await?;
    tracing::info!(card_id = card.id, patient_id = card.patient_id, "Created card");
    Ok(Json(card))
}

/// PUT /patients/cards/{id}
#[tracing::instrument(skip(state, details))]
pub async fn update_card(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(details): JsonBody<CardDetails>,
) -> Result<Json<Card>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.service.update_card(id, details).await?))
}
