use crate::config::StripeConfig;
use crate::payments::error::{PaymentError, PaymentResult};
use crate::payments::gateway::CheckoutGateway;
use crate::payments::types::{CheckoutSession, CreateSessionRequest, SessionList};
use crate::payments::utils::PaymentHttpClient;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Stripe Checkout Sessions client.
///
/// The session store behind this client is the system's only database; every
/// call here is a read or write against it.
pub struct StripeClient {
    config: StripeConfig,
    http: PaymentHttpClient,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        if config.secret_key.trim().is_empty() {
            return Err(PaymentError::ValidationError {
                message: "STRIPE_SECRET_KEY is required".to_string(),
                field: Some("STRIPE_SECRET_KEY".to_string()),
            });
        }
        let http =
            PaymentHttpClient::new(Duration::from_secs(config.timeout_secs), config.max_retries)?;
        Ok(Self { config, http })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }
}

#[async_trait]
impl CheckoutGateway for StripeClient {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> PaymentResult<CheckoutSession> {
        let params = request.to_form_params();
        let session: CheckoutSession = self
            .http
            .request_form(
                reqwest::Method::POST,
                &self.endpoint("/v1/checkout/sessions"),
                &self.config.secret_key,
                Some(&params),
            )
            .await?;

        info!(
            session_id = %session.id,
            reference = %request.client_reference_id,
            "checkout session created"
        );
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> PaymentResult<CheckoutSession> {
        if session_id.trim().is_empty() {
            return Err(PaymentError::ValidationError {
                message: "session id is required".to_string(),
                field: Some("session_id".to_string()),
            });
        }

        self.http
            .request_form(
                reqwest::Method::GET,
                &self.endpoint(&format!("/v1/checkout/sessions/{}", session_id)),
                &self.config.secret_key,
                None,
            )
            .await
    }

    async fn update_session_metadata(
        &self,
        session_id: &str,
        entries: &[(String, String)],
    ) -> PaymentResult<CheckoutSession> {
        let params: Vec<(String, String)> = entries
            .iter()
            .map(|(key, value)| (format!("metadata[{}]", key), value.clone()))
            .collect();

        self.http
            .request_form(
                reqwest::Method::POST,
                &self.endpoint(&format!("/v1/checkout/sessions/{}", session_id)),
                &self.config.secret_key,
                Some(&params),
            )
            .await
    }

    async fn list_sessions(&self, limit: u32) -> PaymentResult<Vec<CheckoutSession>> {
        let list: SessionList = self
            .http
            .request_form(
                reqwest::Method::GET,
                &self.endpoint(&format!("/v1/checkout/sessions?limit={}", limit)),
                &self.config.secret_key,
                None,
            )
            .await?;
        Ok(list.data)
    }
}
