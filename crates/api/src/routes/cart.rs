//! Cart management and checkout endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use domain::{Cart, CartItem, Money};
use saga::CartProvider;
use serde::{Deserialize, Serialize};

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::routes::AppState;

/// Upper bound on a single line-item price: $1,000,000.00.
const MAX_PRICE_CENTS: i64 = 100_000_000;

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub tour_id: String,
    pub name: String,
    pub price_cents: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartResponse {
    pub user_id: String,
    pub items: Vec<CartItemResponse>,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct CartItemResponse {
    pub id: String,
    pub tour_id: String,
    pub name: String,
    pub price_cents: i64,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub saga_id: String,
    pub status: String,
    pub purchases: Vec<PurchaseResponse>,
}

#[derive(Serialize)]
pub struct PurchaseResponse {
    pub tour_id: String,
    pub token: String,
    pub created_at: String,
}

impl CartResponse {
    fn from_cart(cart: &Cart) -> Self {
        Self {
            user_id: cart.user_id.to_string(),
            items: cart
                .items
                .iter()
                .map(|item| CartItemResponse {
                    id: item.id.clone(),
                    tour_id: item.tour_id.to_string(),
                    name: item.name.clone(),
                    price_cents: item.price.cents(),
                })
                .collect(),
            total_cents: cart.total().cents(),
        }
    }
}

// -- Handlers --

/// POST /cart/items — add a line item to the caller's cart.
#[tracing::instrument(skip(state, headers, req))]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AddItemRequest>,
) -> Result<(axum::http::StatusCode, Json<CartResponse>), ApiError> {
    let user_id = authenticate(state.verifier.as_ref(), &headers).await?;

    if req.price_cents < 0 {
        return Err(ApiError::BadRequest("price must not be negative".to_string()));
    }
    if req.price_cents > MAX_PRICE_CENTS {
        return Err(ApiError::BadRequest(format!(
            "price must not exceed {MAX_PRICE_CENTS} cents"
        )));
    }

    let item = CartItem::new(
        req.tour_id.as_str(),
        req.name.as_str(),
        Money::from_cents(req.price_cents),
    );
    let cart = state.carts.add_item(&user_id, item);

    Ok((
        axum::http::StatusCode::CREATED,
        Json(CartResponse::from_cart(&cart)),
    ))
}

/// DELETE /cart/items/:item_id — remove a line item from the caller's cart.
#[tracing::instrument(skip(state, headers))]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(item_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let user_id = authenticate(state.verifier.as_ref(), &headers).await?;

    let cart = state
        .carts
        .remove_item(&user_id, &item_id)
        .ok_or_else(|| ApiError::NotFound("cart not found".to_string()))?;

    Ok(Json(CartResponse::from_cart(&cart)))
}

/// GET /cart — view the caller's cart. A user with no cart sees an empty one.
#[tracing::instrument(skip(state, headers))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CartResponse>, ApiError> {
    let user_id = authenticate(state.verifier.as_ref(), &headers).await?;

    let cart = state
        .carts
        .get_cart(&user_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .unwrap_or_else(|| Cart::new(user_id));

    Ok(Json(CartResponse::from_cart(&cart)))
}

/// POST /cart/checkout — run the checkout saga for the caller's cart.
#[tracing::instrument(skip(state, headers))]
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let user_id = authenticate(state.verifier.as_ref(), &headers).await?;

    let result = state.orchestrator.checkout(user_id).await?;

    Ok(Json(CheckoutResponse {
        saga_id: result.saga_id.to_string(),
        status: "COMPLETED".to_string(),
        purchases: result
            .purchased
            .iter()
            .map(|record| PurchaseResponse {
                tour_id: record.tour_id.to_string(),
                token: record.token.clone(),
                created_at: record.created_at.to_rfc3339(),
            })
            .collect(),
    }))
}
