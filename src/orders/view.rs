//! Read-only projections of provider sessions into order-shaped records.

use crate::orders::shipping::ShippingMethod;
use crate::payments::types::{CheckoutSession, PaymentStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order status derived from the provider's payment state.
///
/// Fulfillment tracking (preparing/shipped/delivered) is a separate concern
/// no subsystem feeds yet, so only the states actually produced exist here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
}

impl OrderStatus {
    pub fn from_payment_status(status: PaymentStatus) -> Self {
        if status.is_paid() {
            OrderStatus::Paid
        } else {
            OrderStatus::Pending
        }
    }
}

/// Dashboard projection of one checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: String,
    pub reference: String,
    /// Major currency units (euros).
    pub amount: f64,
    pub tiktok_pseudo: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub shipping_method: String,
    pub status: OrderStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
}

impl OrderView {
    pub fn from_session(session: &CheckoutSession) -> Self {
        let created_at = timestamp_to_rfc3339(session.created);
        let status = OrderStatus::from_payment_status(session.payment_status);

        let reference = session
            .metadata
            .get("reference")
            .filter(|v| !v.is_empty())
            .cloned()
            .or_else(|| session.client_reference_id.clone())
            .unwrap_or_else(|| "N/A".to_string());

        let customer_name = {
            let full = format!(
                "{} {}",
                session.metadata_or_empty("firstName"),
                session.metadata_or_empty("lastName")
            );
            let full = full.trim().to_string();
            if full.is_empty() {
                "N/A".to_string()
            } else {
                full
            }
        };

        let email = session
            .customer_email
            .clone()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| session.metadata_or_na("email"));

        OrderView {
            id: session.id.clone(),
            reference,
            amount: session.amount_total.unwrap_or(0) as f64 / 100.0,
            tiktok_pseudo: session.metadata_or_na("tiktokPseudo"),
            customer_name,
            email,
            phone: session.metadata_or_na("phone"),
            address: session.metadata_or_na("address"),
            city: session.metadata_or_na("city"),
            postal_code: session.metadata_or_na("postalCode"),
            shipping_method: session.metadata_or_na("shippingMethod"),
            status,
            // The provider does not expose a paid timestamp on the session
            // itself, so creation time stands in for it.
            paid_at: matches!(status, OrderStatus::Paid).then(|| created_at.clone()),
            created_at,
        }
    }
}

/// Fulfillment-facing snapshot of one order, used by the confirmation emails
/// and the shipping label. Absent metadata defaults to empty strings here,
/// not `"N/A"`: these values end up in front of customers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub reference: String,
    /// Total in euros, as a display string.
    pub amount: String,
    pub shipping_method: String,
    pub tiktok_pseudo: String,
}

impl CustomerInfo {
    pub fn from_session(session: &CheckoutSession) -> Self {
        let amount = session
            .amount_total
            .map(|cents| Decimal::new(cents, 2).normalize().to_string())
            .unwrap_or_else(|| "0".to_string());

        CustomerInfo {
            first_name: session.metadata_or_empty("firstName"),
            last_name: session.metadata_or_empty("lastName"),
            email: session
                .customer_email
                .clone()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| session.metadata_or_empty("email")),
            phone: session.metadata_or_empty("phone"),
            address: session.metadata_or_empty("address"),
            city: session.metadata_or_empty("city"),
            postal_code: session.metadata_or_empty("postalCode"),
            reference: session.metadata_or_empty("reference"),
            amount,
            shipping_method: session.metadata_or_empty("shippingMethod"),
            tiktok_pseudo: session.metadata_or_empty("tiktokPseudo"),
        }
    }

    pub fn shipping_label(&self) -> &'static str {
        ShippingMethod::label_for(&self.shipping_method)
    }
}

fn timestamp_to_rfc3339(unix_seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(unix_seconds, 0)
        .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH)
        .to_rfc3339()
}
