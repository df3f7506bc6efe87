//! End-to-end tests for the checkout HTTP surface, driven through the axum
//! router with an in-memory payment gateway and a capturing mailer.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use lavenue_backend::api::{router, AppState};
use lavenue_backend::config::{
    AppConfig, CheckoutConfig, EmailConfig, LogFormat, LoggingConfig, ServerConfig, StripeConfig,
};
use lavenue_backend::payments::error::{PaymentError, PaymentResult};
use lavenue_backend::payments::gateway::CheckoutGateway;
use lavenue_backend::payments::types::{CheckoutSession, CreateSessionRequest, PaymentStatus};
use lavenue_backend::services::mailer::{MailResult, Mailer, OutboundEmail, SendReceipt};
use lavenue_backend::services::notification::NotificationService;

/// In-memory session store standing in for the payment provider.
#[derive(Default)]
struct InMemoryGateway {
    sessions: Mutex<BTreeMap<String, CheckoutSession>>,
    counter: AtomicU64,
    captured_requests: Mutex<Vec<CreateSessionRequest>>,
    fail_create: AtomicBool,
}

impl InMemoryGateway {
    fn mark_paid(&self, session_id: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(session) = sessions.get_mut(session_id) {
            session.payment_status = PaymentStatus::Paid;
        }
    }

    fn session(&self, session_id: &str) -> Option<CheckoutSession> {
        self.sessions.lock().unwrap().get(session_id).cloned()
    }

    fn last_session_id(&self) -> Option<String> {
        self.sessions.lock().unwrap().keys().next_back().cloned()
    }

    fn insert(&self, session: CheckoutSession) {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session);
    }
}

#[async_trait]
impl CheckoutGateway for InMemoryGateway {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> PaymentResult<CheckoutSession> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(PaymentError::ProviderError {
                provider: "stripe".to_string(),
                message: "HTTP 500: internal error".to_string(),
                provider_code: Some("500".to_string()),
                retryable: true,
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("cs_test_{:04}", n);
        let amount_total = request
            .line_items
            .iter()
            .map(|item| item.unit_amount * i64::from(item.quantity))
            .sum();

        let session = CheckoutSession {
            id: id.clone(),
            client_secret: Some(format!("{}_secret", id)),
            payment_status: PaymentStatus::Unpaid,
            amount_total: Some(amount_total),
            customer_email: Some(request.customer_email.clone()),
            client_reference_id: Some(request.client_reference_id.clone()),
            created: 1735689600,
            metadata: request.metadata.clone(),
        };

        self.captured_requests.lock().unwrap().push(request);
        self.insert(session.clone());
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> PaymentResult<CheckoutSession> {
        self.session(session_id).ok_or(PaymentError::ProviderError {
            provider: "stripe".to_string(),
            message: format!("No such checkout.session: {}", session_id),
            provider_code: Some("resource_missing".to_string()),
            retryable: false,
        })
    }

    async fn update_session_metadata(
        &self,
        session_id: &str,
        entries: &[(String, String)],
    ) -> PaymentResult<CheckoutSession> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(session_id)
            .ok_or(PaymentError::ProviderError {
                provider: "stripe".to_string(),
                message: format!("No such checkout.session: {}", session_id),
                provider_code: Some("resource_missing".to_string()),
                retryable: false,
            })?;
        for (key, value) in entries {
            session.metadata.insert(key.clone(), value.clone());
        }
        Ok(session.clone())
    }

    async fn list_sessions(&self, limit: u32) -> PaymentResult<Vec<CheckoutSession>> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .values()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

struct CapturingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl CapturingMailer {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send(&self, email: OutboundEmail) -> MailResult<SendReceipt> {
        self.sent.lock().unwrap().push(email);
        Ok(SendReceipt {
            message_id: Some("250 2.0.0 OK".to_string()),
        })
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_allowed_origins: vec!["http://localhost".to_string()],
        },
        logging: LoggingConfig {
            level: "INFO".to_string(),
            format: LogFormat::Plain,
        },
        stripe: StripeConfig {
            secret_key: "sk_test".to_string(),
            publishable_key: Some("pk_test".to_string()),
            base_url: "https://api.stripe.com".to_string(),
            timeout_secs: 5,
            max_retries: 1,
        },
        email: EmailConfig {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            user: Some("shop@example.com".to_string()),
            password: Some("app-password".to_string()),
            operator_email: "lavenue120@gmail.com".to_string(),
        },
        checkout: CheckoutConfig {
            public_base_url: "https://shop.example".to_string(),
        },
    }
}

struct TestApp {
    router: axum::Router,
    gateway: Arc<InMemoryGateway>,
    mailer: Arc<CapturingMailer>,
}

fn test_app() -> TestApp {
    let gateway = Arc::new(InMemoryGateway::default());
    let mailer = Arc::new(CapturingMailer::new());
    let notifier = Arc::new(NotificationService::new(
        mailer.clone(),
        "lavenue120@gmail.com",
    ));

    let state = AppState {
        gateway: gateway.clone(),
        notifier,
        config: Arc::new(test_config()),
    };

    TestApp {
        router: router(state),
        gateway,
        mailer,
    }
}

fn valid_order_body() -> serde_json::Value {
    serde_json::json!({
        "reference": "REF-123",
        "amount": "19.9",
        "tiktokPseudo": "@acheteuse",
        "firstName": "Anna",
        "lastName": "Bauer",
        "email": "anna@example.com",
        "phone": "0612345678",
        "address": "12 Rue de la Paix",
        "city": "Paris",
        "postalCode": "75001",
        "shippingMethod": "chronopost"
    })
}

async fn send_json(
    app: &TestApp,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn create_payment_returns_client_secret() {
    let app = test_app();

    let (status, json) = send_json(
        &app,
        "POST",
        "/api/create-payment",
        Some(valid_order_body()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let secret = json["clientSecret"].as_str().unwrap();
    assert!(secret.ends_with("_secret"));
}

#[tokio::test]
async fn create_payment_builds_rounded_line_items_and_metadata() {
    let app = test_app();

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/create-payment",
        Some(valid_order_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let requests = app.gateway.captured_requests.lock().unwrap();
    let request = &requests[0];

    // 19.9 EUR rounds to exactly 1990 cents, never 1989.
    assert_eq!(request.line_items[0].unit_amount, 1990);
    assert_eq!(request.line_items[0].name, "Commande REF-123");
    assert_eq!(request.line_items[1].unit_amount, 990);
    assert_eq!(request.line_items[1].name, "Chronopost Express");

    assert_eq!(
        request.return_url,
        "https://shop.example/return?session_id={CHECKOUT_SESSION_ID}"
    );
    assert_eq!(request.client_reference_id, "REF-123");
    assert_eq!(request.customer_email, "anna@example.com");

    for (key, value) in [
        ("firstName", "Anna"),
        ("lastName", "Bauer"),
        ("reference", "REF-123"),
        ("shippingMethod", "chronopost"),
        ("phone", "0612345678"),
        ("address", "12 Rue de la Paix"),
        ("city", "Paris"),
        ("postalCode", "75001"),
        ("tiktokPseudo", "@acheteuse"),
        ("email", "anna@example.com"),
    ] {
        assert_eq!(
            request.metadata.get(key).map(String::as_str),
            Some(value),
            "metadata key {}",
            key
        );
    }
}

#[tokio::test]
async fn create_payment_lists_every_failing_field() {
    let app = test_app();

    let mut body = valid_order_body();
    body["firstName"] = serde_json::json!("A");
    body["email"] = serde_json::json!("not-an-email");
    body["amount"] = serde_json::json!("0");
    body["shippingMethod"] = serde_json::Value::Null;

    let (status, json) = send_json(&app, "POST", "/api/create-payment", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let details = json["details"].as_array().unwrap();
    let fields: Vec<&str> = details
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();

    for expected in ["firstName", "email", "amount", "shippingMethod"] {
        assert!(fields.contains(&expected), "missing field {}", expected);
    }
    assert!(app.gateway.captured_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_payment_rejects_unparseable_body() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/create-payment")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json at all"))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn check_payment_status_requires_session_id() {
    let app = test_app();

    let (status, json) = send_json(&app, "GET", "/api/check-payment-status", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("session_id"));
}

#[tokio::test]
async fn paid_order_sends_two_emails_exactly_once() {
    let app = test_app();

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/create-payment",
        Some(valid_order_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session_id = app.gateway.last_session_id().unwrap();

    // Unpaid session polls as incomplete and sends nothing.
    let uri = format!("/api/check-payment-status?session_id={}", session_id);
    let (status, json) = send_json(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "incomplete");
    assert_eq!(app.mailer.sent_count(), 0);

    // First poll after payment sends operator + customer emails.
    app.gateway.mark_paid(&session_id);
    let (status, json) = send_json(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "complete");
    assert_eq!(app.mailer.sent_count(), 2);

    let session = app.gateway.session(&session_id).unwrap();
    assert_eq!(
        session.metadata.get("emailSent").map(String::as_str),
        Some("true")
    );

    // Subsequent polls stay complete without resending.
    let (status, json) = send_json(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "complete");
    assert_eq!(app.mailer.sent_count(), 2);
}

#[tokio::test]
async fn confirmation_emails_target_operator_and_customer() {
    let app = test_app();

    send_json(
        &app,
        "POST",
        "/api/create-payment",
        Some(valid_order_body()),
    )
    .await;
    let session_id = app.gateway.last_session_id().unwrap();
    app.gateway.mark_paid(&session_id);

    let uri = format!("/api/check-payment-status?session_id={}", session_id);
    send_json(&app, "GET", &uri, None).await;

    let sent = app.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, "lavenue120@gmail.com");
    assert!(sent[0].subject.contains("REF-123"));
    assert_eq!(sent[1].to, "anna@example.com");
    assert_eq!(sent[1].reply_to, "lavenue120@gmail.com");
}

#[tokio::test]
async fn get_session_details_returns_the_session() {
    let app = test_app();

    send_json(
        &app,
        "POST",
        "/api/create-payment",
        Some(valid_order_body()),
    )
    .await;
    let session_id = app.gateway.last_session_id().unwrap();

    let uri = format!("/api/get-session-details?session_id={}", session_id);
    let (status, json) = send_json(&app, "GET", &uri, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["session"]["id"], session_id);
    assert_eq!(json["session"]["payment_status"], "unpaid");
    assert_eq!(json["session"]["metadata"]["reference"], "REF-123");
}

#[tokio::test]
async fn create_payment_reports_provider_failure_without_leaking_detail() {
    let app = test_app();
    app.gateway.fail_create.store(true, Ordering::SeqCst);

    let (status, json) = send_json(
        &app,
        "POST",
        "/api/create-payment",
        Some(valid_order_body()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("Payment"));
    assert!(!error.contains("HTTP 500"));
    assert_eq!(app.mailer.sent_count(), 0);
}

#[tokio::test]
async fn order_listing_lives_at_api_orders() {
    let app = test_app();

    let (status, json) = send_json(&app, "GET", "/api/orders", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn get_orders_projects_sessions_with_fallbacks() {
    let app = test_app();

    send_json(
        &app,
        "POST",
        "/api/create-payment",
        Some(valid_order_body()),
    )
    .await;
    let session_id = app.gateway.last_session_id().unwrap();
    app.gateway.mark_paid(&session_id);

    // A sparse session missing most metadata still lists, with fallbacks.
    app.gateway.insert(CheckoutSession {
        id: "cs_test_sparse".to_string(),
        client_secret: None,
        payment_status: PaymentStatus::Unpaid,
        amount_total: Some(500),
        customer_email: None,
        client_reference_id: Some("REF-SPARSE".to_string()),
        created: 1735689600,
        metadata: BTreeMap::new(),
    });

    let (status, json) = send_json(&app, "GET", "/api/orders", None).await;
    assert_eq!(status, StatusCode::OK);

    let orders = json["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);

    let full = orders
        .iter()
        .find(|o| o["reference"] == "REF-123")
        .unwrap();
    assert_eq!(full["status"], "paid");
    assert_eq!(full["customerName"], "Anna Bauer");
    assert_eq!(full["amount"].as_f64().unwrap(), 29.8);

    let sparse = orders
        .iter()
        .find(|o| o["reference"] == "REF-SPARSE")
        .unwrap();
    assert_eq!(sparse["status"], "pending");
    assert_eq!(sparse["city"], "N/A");
    assert_eq!(sparse["customerName"], "N/A");
}

#[tokio::test]
async fn shipping_label_is_a_pdf_attachment() {
    let app = test_app();

    send_json(
        &app,
        "POST",
        "/api/create-payment",
        Some(valid_order_body()),
    )
    .await;
    let session_id = app.gateway.last_session_id().unwrap();

    let uri = format!("/api/generate-shipping-label?session_id={}", session_id);
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap(),
        "attachment; filename=\"bon-livraison-REF-123.pdf\""
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn shipping_label_rejects_sessions_without_metadata() {
    let app = test_app();

    app.gateway.insert(CheckoutSession {
        id: "cs_test_bare".to_string(),
        client_secret: None,
        payment_status: PaymentStatus::Paid,
        amount_total: Some(500),
        customer_email: None,
        client_reference_id: None,
        created: 1735689600,
        metadata: BTreeMap::new(),
    });

    let (status, _) = send_json(
        &app,
        "GET",
        "/api/generate-shipping-label?session_id=cs_test_bare",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(&app, "GET", "/api/generate-shipping-label", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = test_app();

    let (status, json) = send_json(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}
