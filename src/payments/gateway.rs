use crate::payments::error::PaymentResult;
use crate::payments::types::{CheckoutSession, CreateSessionRequest};
use async_trait::async_trait;

/// Abstraction over the hosted checkout provider.
///
/// Handlers receive this behind an `Arc` so tests can substitute an in-memory
/// double instead of a process-wide provider client.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> PaymentResult<CheckoutSession>;

    /// Fetch current session state, metadata included.
    async fn retrieve_session(&self, session_id: &str) -> PaymentResult<CheckoutSession>;

    /// Merge the given entries into the session's metadata bag.
    async fn update_session_metadata(
        &self,
        session_id: &str,
        entries: &[(String, String)],
    ) -> PaymentResult<CheckoutSession>;

    /// Most recent sessions, provider-side ordering.
    async fn list_sessions(&self, limit: u32) -> PaymentResult<Vec<CheckoutSession>>;
}
