//! Saga audit endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use common::SagaId;
use serde::Serialize;

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Serialize)]
pub struct SagaStatusResponse {
    pub saga_id: String,
    pub user_id: String,
    pub status: String,
    pub current_step: String,
    pub steps: Vec<StepResponse>,
    pub payment_amount_cents: i64,
    pub payment_processed: bool,
    pub error: Option<String>,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub compensated_at: Option<String>,
}

#[derive(Serialize)]
pub struct StepResponse {
    pub step: String,
    pub status: String,
    pub timestamp: String,
    pub error: Option<String>,
}

/// GET /sagas/:id — inspect one checkout saga record.
///
/// A saga is only visible to the user who ran it; anyone else sees 404.
#[tracing::instrument(skip(state, headers))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SagaStatusResponse>, ApiError> {
    let user_id = authenticate(state.verifier.as_ref(), &headers).await?;

    let uuid = uuid::Uuid::parse_str(&id)
        .map_err(|e| ApiError::BadRequest(format!("invalid saga ID: {e}")))?;
    let saga_id = SagaId::from_uuid(uuid);

    let saga = state
        .orchestrator
        .saga_status(saga_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .filter(|saga| saga.user_id == user_id)
        .ok_or_else(|| ApiError::NotFound(format!("saga {id} not found")))?;

    Ok(Json(SagaStatusResponse {
        saga_id: saga.saga_id.to_string(),
        user_id: saga.user_id.to_string(),
        status: saga.status.to_string(),
        current_step: saga.current_step.clone(),
        steps: saga
            .steps_completed
            .iter()
            .map(|record| StepResponse {
                step: record.step.clone(),
                status: record.status.to_string(),
                timestamp: record.timestamp.to_rfc3339(),
                error: record.error.clone(),
            })
            .collect(),
        payment_amount_cents: saga.payment_amount.cents(),
        payment_processed: saga.payment_processed,
        error: saga.error.clone(),
        started_at: saga.started_at.to_rfc3339(),
        completed_at: saga.completed_at.map(|t| t.to_rfc3339()),
        compensated_at: saga.compensated_at.map(|t| t.to_rfc3339()),
    }))
}
