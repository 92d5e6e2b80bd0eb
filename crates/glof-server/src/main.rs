mod api;
mod catalog;
mod config;
mod error;
mod notify;
mod weather;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use glof_core::ContactDirectory;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::catalog::LakeCatalog;
use crate::config::{mask_secret, AppConfig};
use crate::notify::email::SmtpMailer;
use crate::notify::sms::Fast2SmsClient;
use crate::notify::{AlertDispatcher, AlertLog, EmailSender, HttpProbe, OfflineManager};
use crate::weather::WeatherClient;

#[derive(Clone)]
pub struct AppState {
    pub catalog: LakeCatalog,
    pub weather: WeatherClient,
    pub dispatcher: AlertDispatcher,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glof=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();

    println!("================================================");
    println!("        GLOF WATCH - Starting Up                ");
    println!("================================================");

    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    println!("[CONFIG] Server: {}:{}", config.server.host, config.server.port);
    println!("[CONFIG] OpenWeather API Key: {}", mask_secret(&config.openweather.api_key));
    println!("[CONFIG] Fast2SMS API Key: {}", mask_secret(&config.fast2sms.api_key));
    if config.fast2sms.api_key.is_empty() {
        println!("[CONFIG] *** SMS disabled in practice - PLEASE SET GLOF__FAST2SMS__API_KEY ***");
    }
    println!(
        "[CONFIG] Email: {}",
        if config.email.enabled { "enabled" } else { "disabled" }
    );

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        contacts = %config.contacts.len(),
        "Starting GLOF Watch"
    );

    let contacts = ContactDirectory::new(config.contacts.clone())
        .map_err(|e| anyhow::anyhow!("Invalid contact list: {}", e))?;
    if contacts.is_empty() {
        println!("[CONTACTS] WARNING: no contacts configured, alerts will have no recipients");
        tracing::warn!("No contacts configured");
    } else {
        println!("[CONTACTS] Loaded {} predefined contacts", contacts.len());
    }

    let sms = Arc::new(Fast2SmsClient::new(&config.fast2sms)?);
    let email: Option<Arc<dyn EmailSender>> = if config.email.enabled {
        Some(Arc::new(SmtpMailer::new(&config.email)?))
    } else {
        None
    };
    let offline = Arc::new(OfflineManager::new(Arc::new(HttpProbe::new(&config.offline)?)));
    let history = Arc::new(AlertLog::new(config.alerts.history_capacity));

    let dispatcher = AlertDispatcher::new(
        Arc::new(contacts),
        sms,
        email,
        offline,
        history,
        config.offline.max_retries,
    );

    let cancel = CancellationToken::new();
    let flusher = dispatcher.spawn_offline_flusher(
        Duration::from_secs(config.offline.flush_interval_seconds.max(1)),
        cancel.clone(),
    );
    println!(
        "[OFFLINE] Queue flusher running every {}s",
        config.offline.flush_interval_seconds
    );

    let state = AppState {
        catalog: LakeCatalog::new(&config.data),
        weather: WeatherClient::new(&config.openweather)?,
        dispatcher,
    };

    println!("[ROUTER] Setting up API routes...");
    let app = Router::new()
        .merge(api::create_router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    println!("[ROUTER] Routes configured: /health, /alert, /api/lakes, /api/weather, /api/alerts/*, /api/contacts");

    let addr: SocketAddr = config.server_addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("================================================");
    println!("  Server listening on http://{}", addr);
    println!("================================================");
    println!();

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    cancel.cancel();
    flusher.await?;
    tracing::info!("GLOF Watch stopped");

    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    println!("[SHUTDOWN] Signal received, stopping...");
    cancel.cancel();
}
