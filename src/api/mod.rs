//! HTTP surface: route table and shared handler state.

pub mod labels;
pub mod orders;
pub mod payments;

use crate::config::AppConfig;
use crate::payments::gateway::CheckoutGateway;
use crate::services::notification::NotificationService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn CheckoutGateway>,
    pub notifier: Arc<NotificationService>,
    pub config: Arc<AppConfig>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/create-payment", post(payments::create_payment))
        .route(
            "/api/check-payment-status",
            get(payments::check_payment_status),
        )
        .route(
            "/api/get-session-details",
            get(payments::get_session_details),
        )
        .route("/api/orders", get(orders::list_orders))
        .route(
            "/api/generate-shipping-label",
            get(labels::generate_shipping_label),
        )
        .route("/health", get(crate::health::health))
        .with_state(state)
}
