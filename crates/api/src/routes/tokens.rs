//! Purchase token listing endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Serialize;

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub tour_id: String,
    pub created_at: String,
}

/// GET /tokens — list the caller's purchase tokens, oldest first.
#[tracing::instrument(skip(state, headers))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<TokenResponse>>, ApiError> {
    let user_id = authenticate(state.verifier.as_ref(), &headers).await?;

    let tokens = state
        .purchases
        .tokens_for_user(&user_id)
        .into_iter()
        .map(|token| TokenResponse {
            token: token.token,
            tour_id: token.tour_id.to_string(),
            created_at: token.created_at.to_rfc3339(),
        })
        .collect();

    Ok(Json(tokens))
}
