//! Policy Tracker - API Server Binary
//!
//! This binary wires the policy store to its JSON file, the SMS gateway and
//! the reminder scheduler, then serves the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration (log-only SMS)
//! cargo run --bin policy-tracker
//!
//! # Run with environment variables
//! POLICY_PORT=9000 POLICY_STORAGE_PATH=/var/lib/policies.json cargo run --bin policy-tracker
//! ```
//!
//! # Environment Variables
//!
//! * `POLICY_HOST` - Server host (default: 0.0.0.0)
//! * `POLICY_PORT` - Server port (default: 8080)
//! * `POLICY_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `POLICY_STORAGE_PATH` - Policy list file (default: data/policies.json)
//! * `POLICY_TIMEZONE` - IANA timezone of the agent (default: UTC)
//! * `POLICY_DUE_SOON_DAYS` - Renewal alert window (default: 30)
//! * `POLICY_SMS_BASE_URL` / `POLICY_SMS_API_KEY` - SMS provider; messages are
//!   only logged unless both are set
//! * `POLICY_SMS_SENDER` - Sender id (default: POLICY)
//! * `POLICY_AGENT_PHONE` - Recipient of every message
//! * `POLICY_SMS_TIMEOUT_SECS` / `POLICY_SMS_RETRY_ATTEMPTS` - Provider timeout and retries
//! * `POLICY_REMINDER_LEAD_DAYS` - Days before renewal to remind (default: 7)
//! * `POLICY_REMINDER_SEND_HOUR` - Local hour reminders are sent (default: 9)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::{Clock, SystemClock};
use domain_notification::{
    HttpSmsGateway, LogSmsGateway, ReminderScheduler, SmsGateway, SmsNotificationService,
};
use domain_policy::{NotificationDispatcher, PolicyStore};
use infra_storage::JsonFileRepository;
use interface_api::{config::AppConfig, create_router, shutdown::drain_notifications, AppState};

/// How long shutdown waits for queued notifications
const NOTIFICATION_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        storage = %config.storage_path.display(),
        timezone = %config.timezone,
        "Starting Policy Tracker"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.timezone));
    let repository = Arc::new(JsonFileRepository::new(&config.storage_path));

    let gateway: Arc<dyn SmsGateway> = match config.sms_gateway_config() {
        Some(sms) => Arc::new(HttpSmsGateway::new(sms).context("Failed to configure SMS gateway")?),
        None => {
            tracing::warn!("SMS provider not configured, messages will only be logged");
            Arc::new(LogSmsGateway)
        }
    };
    if config.agent_phone.trim().is_empty() {
        tracing::warn!("POLICY_AGENT_PHONE not set, notifications are disabled");
    }

    let scheduler = Arc::new(ReminderScheduler::new(
        gateway.clone(),
        clock.clone(),
        config.agent_phone.clone(),
        config.reminder_settings(),
    ));
    let notifier = Arc::new(SmsNotificationService::new(
        gateway,
        scheduler.clone(),
        config.agent_phone.clone(),
    ));
    let (dispatcher, notification_worker) = NotificationDispatcher::spawn(notifier);

    let store = Arc::new(PolicyStore::new(
        repository.clone(),
        dispatcher,
        clock,
        config.store_settings(),
    ));
    store.load().await;

    let app = create_router(AppState::new(store, repository));

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("Invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router owned the last store handle; once it is gone the worker
    // drains its queue and exits.
    drain_notifications(notification_worker, &scheduler, NOTIFICATION_DRAIN_TIMEOUT).await;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %error, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
