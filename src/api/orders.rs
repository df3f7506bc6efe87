//! Order listing endpoint, projected from the provider's recent sessions.

use crate::api::AppState;
use crate::error::AppError;
use crate::orders::view::OrderView;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

/// Sessions fetched per listing request. The provider caps list pages at 100.
const LISTING_LIMIT: u32 = 100;

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<OrderView>,
}

/// GET /api/get-orders
///
/// There is no order database; the provider's session list is the source of
/// truth and every request re-projects it.
pub async fn list_orders(
    State(state): State<AppState>,
) -> Result<Json<OrdersResponse>, AppError> {
    let sessions = state.gateway.list_sessions(LISTING_LIMIT).await?;

    let orders: Vec<OrderView> = sessions.iter().map(OrderView::from_session).collect();

    info!(count = orders.len(), "Listed orders from provider sessions");

    Ok(Json(OrdersResponse { orders }))
}
