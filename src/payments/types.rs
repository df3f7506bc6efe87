use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Checkout currency. The storefront sells in euros only.
pub const CURRENCY: &str = "eur";

/// Coarse payment state reported by the provider on a checkout session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

/// A provider-hosted checkout session.
///
/// The metadata bag is the sole persistence layer for order attributes:
/// anything not copied in at creation time is unrecoverable later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Short-lived token authorizing the browser to render the embedded
    /// widget. Present on freshly created sessions only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub payment_status: PaymentStatus,
    /// Total in minor currency units (cents).
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    /// Unix timestamp (seconds).
    pub created: i64,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl CheckoutSession {
    /// Metadata lookup with the listing fallback.
    pub fn metadata_or_na(&self, key: &str) -> String {
        self.metadata
            .get(key)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// Metadata lookup defaulting to the empty string (email/label path).
    pub fn metadata_or_empty(&self, key: &str) -> String {
        self.metadata.get(key).cloned().unwrap_or_default()
    }
}

/// Paginated session list envelope returned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionList {
    pub data: Vec<CheckoutSession>,
    #[serde(default)]
    pub has_more: bool,
}

/// One line item on the hosted payment page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub name: String,
    pub description: Option<String>,
    /// Minor currency units.
    pub unit_amount: i64,
    pub quantity: u32,
}

/// Request to create one embedded checkout session.
#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    pub line_items: Vec<LineItem>,
    pub customer_email: String,
    pub client_reference_id: String,
    /// Must carry the provider's literal `{CHECKOUT_SESSION_ID}` template
    /// token so the return page can identify the session.
    pub return_url: String,
    pub metadata: BTreeMap<String, String>,
}

impl CreateSessionRequest {
    /// Flatten into the provider's form-encoded parameter list.
    pub fn to_form_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("ui_mode".to_string(), "embedded".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("customer_email".to_string(), self.customer_email.clone()),
            (
                "client_reference_id".to_string(),
                self.client_reference_id.clone(),
            ),
            ("return_url".to_string(), self.return_url.clone()),
        ];

        for (i, item) in self.line_items.iter().enumerate() {
            let prefix = format!("line_items[{}]", i);
            params.push((
                format!("{}[price_data][currency]", prefix),
                CURRENCY.to_string(),
            ));
            params.push((
                format!("{}[price_data][product_data][name]", prefix),
                item.name.clone(),
            ));
            if let Some(ref description) = item.description {
                params.push((
                    format!("{}[price_data][product_data][description]", prefix),
                    description.clone(),
                ));
            }
            params.push((
                format!("{}[price_data][unit_amount]", prefix),
                item.unit_amount.to_string(),
            ));
            params.push((format!("{}[quantity]", prefix), item.quantity.to_string()));
        }

        for (key, value) in &self.metadata {
            params.push((format!("metadata[{}]", key), value.clone()));
        }

        params
    }
}
