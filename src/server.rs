//! # HTTP Server Module
//!
//! Hosts the health endpoints and the Telegram webhook. The Telegram part is
//! optional: without a bot token the service still starts and answers health
//! checks. Webhook updates are handed to the teloxide dispatcher through its
//! axum update listener.

use anyhow::{bail, Result};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::bot;
use crate::config::{BotConfig, TelegramConfig, WEBHOOK_PATH};
use crate::session::{InMemorySessionStore, SessionStore};

pub const SERVICE_NAME: &str = "autochehol-bot";

/// Telegram client plus the webhook it should register
pub struct TelegramBridge {
    bot: Bot,
    webhook_url: Option<reqwest::Url>,
    delete_webhook_on_shutdown: bool,
}

impl TelegramBridge {
    /// Build the Telegram integration, or `None` when no bot token is configured
    pub fn from_config(config: &TelegramConfig) -> Option<Self> {
        let Some(token) = config.token.as_deref() else {
            warn!("TELEGRAM_BOT_TOKEN missing, telegram routes not mounted");
            return None;
        };

        let webhook_url = config
            .resolved_webhook_url()
            .and_then(|raw| match reqwest::Url::parse(&raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(url = %raw, error = %e, "Invalid webhook URL, webhook not configured");
                    None
                }
            });

        Some(Self {
            bot: Bot::new(token),
            webhook_url,
            delete_webhook_on_shutdown: config.delete_webhook_on_shutdown,
        })
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn webhook_url(&self) -> Option<&reqwest::Url> {
        self.webhook_url.as_ref()
    }

    /// Options for the webhook listener serving on `address`
    ///
    /// The route is mounted at the path of the webhook URL. Without a public
    /// URL it falls back to the local address and the default path.
    pub fn webhook_options(&self, address: SocketAddr) -> Result<webhooks::Options> {
        let url = match &self.webhook_url {
            Some(url) => url.clone(),
            None => reqwest::Url::parse(&format!("http://{address}{WEBHOOK_PATH}"))?,
        };
        if url.path() == "/" {
            bail!("Webhook URL {url} needs a path other than /");
        }
        Ok(webhooks::Options::new(address, url))
    }

    /// Register the webhook with Telegram; failures are logged, not fatal
    pub async fn startup(&self) {
        let Some(url) = &self.webhook_url else {
            warn!("PUBLIC_URL/TELEGRAM_WEBHOOK_URL not set, webhook not configured");
            return;
        };

        match self.bot.set_webhook(url.clone()).await {
            Ok(_) => info!(url = %url, "Webhook set"),
            Err(e) => error!(url = %url, error = %e, "Telegram startup failed"),
        }
    }

    pub async fn shutdown(&self) {
        if self.delete_webhook_on_shutdown && self.webhook_url.is_some() {
            match self.bot.delete_webhook().await {
                Ok(_) => info!("Webhook deleted"),
                Err(e) => error!(error = %e, "Telegram shutdown failed"),
            }
        }
        info!("Telegram shutdown complete");
    }
}

#[derive(Serialize)]
struct Health {
    ok: bool,
}

#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    service: &'static str,
}

/// Build the HTTP router; the webhook routes exist only with a Telegram bridge
pub fn app(webhook: Option<Router>) -> Router {
    let mut router = Router::new()
        .route("/__health", get(handle_health))
        .route("/", get(handle_root));

    if let Some(webhook) = webhook {
        router = router.merge(webhook);
        info!("Telegram routes mounted");
    }

    router.layer(TraceLayer::new_for_http())
}

/// GET /__health
async fn handle_health() -> Json<Health> {
    Json(Health { ok: true })
}

/// GET|HEAD /
async fn handle_root() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "ok",
        service: SERVICE_NAME,
    })
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Received shutdown signal");
}

/// Start the service and serve until a shutdown signal arrives
pub async fn run(config: BotConfig) -> Result<()> {
    let address: SocketAddr = format!("{}:{}", config.bind_address, config.port).parse()?;
    let tcp = tokio::net::TcpListener::bind(address).await?;
    info!(address = %address, "HTTP server listening");

    let Some(telegram) = TelegramBridge::from_config(&config.telegram) else {
        axum::serve(tcp, app(None))
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Server shut down");
        return Ok(());
    };

    let sessions: Arc<dyn SessionStore> =
        Arc::new(InMemorySessionStore::new(config.session.clone()));

    let (listener, stop_flag, webhook) =
        webhooks::axum_no_setup(telegram.webhook_options(address)?);
    telegram.startup().await;

    // The listener stops once the dispatcher shuts down, which ends the server
    let server = tokio::spawn(async move {
        axum::serve(tcp, app(Some(webhook)))
            .with_graceful_shutdown(stop_flag)
            .await
    });

    let mut dispatcher = bot::dispatcher(telegram.bot().clone(), sessions);
    let shutdown = dispatcher.shutdown_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        match shutdown.shutdown() {
            Ok(done) => done.await,
            Err(e) => warn!(error = ?e, "Dispatcher was not running"),
        }
    });

    dispatcher
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("Webhook listener failed"),
        )
        .await;

    server.await??;
    telegram.shutdown().await;

    info!("Server shut down");
    Ok(())
}
