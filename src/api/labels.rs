//! Shipping label endpoint: renders the delivery note PDF for one session.

use crate::api::AppState;
use crate::error::{AppError, FieldError};
use crate::orders::view::CustomerInfo;
use crate::services::labels::render_delivery_note;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct LabelQuery {
    pub session_id: Option<String>,
}

/// GET /api/generate-shipping-label?session_id=...
pub async fn generate_shipping_label(
    State(state): State<AppState>,
    Query(query): Query<LabelQuery>,
) -> Result<Response, AppError> {
    let session_id = query
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::missing_param("session_id"))?;

    let session = state.gateway.retrieve_session(&session_id).await?;

    if session.metadata.is_empty() {
        return Err(AppError::validation(vec![FieldError::new(
            "session_id",
            "session carries no order metadata",
        )]));
    }

    let info = CustomerInfo::from_session(&session);
    let pdf = render_delivery_note(&info)?;

    info!(
        session_id = %session.id,
        reference = %info.reference,
        bytes = pdf.len(),
        "Rendered shipping label"
    );

    let filename = format!("bon-livraison-{}.pdf", info.reference);
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/pdf"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}
