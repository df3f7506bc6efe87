use lavenue_backend::api::{self, AppState};
use lavenue_backend::config::AppConfig;
use lavenue_backend::logging::init_tracing;
use lavenue_backend::payments::stripe::StripeClient;
use lavenue_backend::services::mailer::{Mailer, SmtpMailer, UnconfiguredMailer};
use lavenue_backend::services::notification::NotificationService;

use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("{}", e))?;
    init_tracing(&config.logging);

    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        anyhow::anyhow!("{}", e)
    })?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting L'Avenue 120 checkout backend"
    );

    if config.stripe.publishable_key.is_none() {
        warn!("STRIPE_PUBLISHABLE_KEY is not set; the embedded payment widget cannot render");
    }

    let gateway = Arc::new(StripeClient::new(config.stripe.clone()).map_err(|e| {
        error!("Failed to initialize payment client: {}", e);
        anyhow::anyhow!("{}", e)
    })?);

    let mailer: Arc<dyn Mailer> = if config.email.is_configured() {
        let smtp = SmtpMailer::from_config(&config.email).map_err(|e| {
            error!("Failed to initialize SMTP transport: {}", e);
            anyhow::anyhow!("{}", e)
        })?;
        info!(
            smtp_host = %config.email.smtp_host,
            smtp_port = config.email.smtp_port,
            "SMTP transport initialized"
        );
        Arc::new(smtp)
    } else {
        warn!("EMAIL_USER/EMAIL_PASSWORD not set; confirmation emails will fail until configured");
        Arc::new(UnconfiguredMailer)
    };

    let notifier = Arc::new(NotificationService::new(
        mailer,
        config.email.operator_email.clone(),
    ));

    let cors = cors_layer(&config.server.cors_allowed_origins);

    let state = AppState {
        gateway,
        notifier,
        config: Arc::new(config.clone()),
    };

    let app = api::router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(cors),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to address {}: {}", addr, e);
        e
    })?;

    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
