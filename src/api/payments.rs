//! Payment session endpoints: creation, status polling, session lookup.

use crate::api::AppState;
use crate::error::{AppError, FieldError};
use crate::orders::draft::{amount_to_cents, OrderDraft};
use crate::orders::view::CustomerInfo;
use crate::payments::types::{CheckoutSession, CreateSessionRequest, LineItem};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Token the provider substitutes with the real session id on redirect.
const SESSION_ID_TOKEN: &str = "{CHECKOUT_SESSION_ID}";

const EMAIL_SENT_KEY: &str = "emailSent";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SessionDetailsResponse {
    pub session: CheckoutSession,
}

/// POST /api/create-payment
///
/// The body is taken raw so a malformed payload can still be logged before
/// rejection, then re-validated server-side before any provider call.
pub async fn create_payment(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<CreatePaymentResponse>, AppError> {
    let draft: OrderDraft = match serde_json::from_str(&body) {
        Ok(draft) => draft,
        Err(e) => {
            warn!(
                body = %if body.is_empty() { "undefined" } else { body.as_str() },
                error = %e,
                "Rejected unparseable payment request"
            );
            return Err(AppError::validation(vec![FieldError::new(
                "body",
                "request body must be a JSON order",
            )]));
        }
    };

    let failures = draft.validate_for_gateway();
    if !failures.is_empty() {
        warn!(
            reference = %draft.reference,
            failing_fields = failures.len(),
            "Rejected invalid order draft"
        );
        return Err(AppError::validation(failures));
    }

    // validate_for_gateway guarantees both of these.
    let amount_cents = amount_to_cents(&draft.amount)
        .ok_or_else(|| AppError::validation(vec![FieldError::new("amount", "invalid amount")]))?;
    let shipping = draft.shipping_method.ok_or_else(|| {
        AppError::validation(vec![FieldError::new("shippingMethod", "missing method")])
    })?;

    let request = CreateSessionRequest {
        line_items: vec![
            LineItem {
                name: format!("Commande {}", draft.reference),
                description: Some("L'avenue 120 - Commande TikTok".to_string()),
                unit_amount: amount_cents,
                quantity: 1,
            },
            LineItem {
                name: shipping.label().to_string(),
                description: Some(shipping.description().to_string()),
                unit_amount: shipping.price_cents(),
                quantity: 1,
            },
        ],
        customer_email: draft.email.clone(),
        client_reference_id: draft.reference.clone(),
        return_url: format!(
            "{}/return?session_id={}",
            state.config.checkout.public_base_url.trim_end_matches('/'),
            SESSION_ID_TOKEN
        ),
        metadata: [
            ("firstName", draft.first_name.as_str()),
            ("lastName", draft.last_name.as_str()),
            ("reference", draft.reference.as_str()),
            ("shippingMethod", shipping.as_str()),
            ("phone", draft.phone.as_str()),
            ("address", draft.address.as_str()),
            ("city", draft.city.as_str()),
            ("postalCode", draft.postal_code.as_str()),
            ("tiktokPseudo", draft.tiktok_pseudo.as_str()),
            ("email", draft.email.as_str()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
    };

    let session = match state.gateway.create_session(request).await {
        Ok(session) => session,
        Err(e) => {
            error!(
                body = %body,
                error = %e,
                "Checkout session creation failed"
            );
            return Err(e.into());
        }
    };

    info!(
        session_id = %session.id,
        reference = %draft.reference,
        amount_cents,
        shipping = %shipping,
        "Created checkout session"
    );

    let client_secret = session.client_secret.ok_or_else(|| {
        AppError::upstream("Payment", "session created without a client secret")
    })?;

    Ok(Json(CreatePaymentResponse { client_secret }))
}

/// GET /api/check-payment-status?session_id=...
///
/// Reports `complete`/`incomplete`, and on the first poll that observes a
/// paid session, dispatches the confirmation emails exactly once per order.
pub async fn check_payment_status(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<PaymentStatusResponse>, AppError> {
    let session_id = query
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::missing_param("session_id"))?;

    let session = state.gateway.retrieve_session(&session_id).await?;

    if !session.payment_status.is_paid() {
        return Ok(Json(PaymentStatusResponse {
            status: "incomplete",
        }));
    }

    let already_sent = session
        .metadata
        .get(EMAIL_SENT_KEY)
        .map(|v| v == "true")
        .unwrap_or(false);

    if !already_sent {
        confirm_order(&state, &session).await;
    }

    Ok(Json(PaymentStatusResponse { status: "complete" }))
}

/// Email dispatch and the sent-marker update are best-effort: a failure here
/// must never turn a completed payment into an error response.
async fn confirm_order(state: &AppState, session: &CheckoutSession) {
    let info = CustomerInfo::from_session(session);

    let all_sent = match state.notifier.send_order_confirmation(&info).await {
        Ok(report) => report.all_sent(),
        Err(e) => {
            error!(
                session_id = %session.id,
                error = %e,
                "Could not dispatch confirmation emails"
            );
            false
        }
    };

    if !all_sent {
        return;
    }

    let marker = [(EMAIL_SENT_KEY.to_string(), "true".to_string())];
    if let Err(e) = state
        .gateway
        .update_session_metadata(&session.id, &marker)
        .await
    {
        error!(
            session_id = %session.id,
            error = %e,
            "Emails sent but the sent-marker update failed; a later poll may resend"
        );
    }
}

/// GET /api/get-session-details?session_id=...
pub async fn get_session_details(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<SessionDetailsResponse>, AppError> {
    let session_id = query
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::missing_param("session_id"))?;

    let session = state.gateway.retrieve_session(&session_id).await?;
    Ok(Json(SessionDetailsResponse { session }))
}
