//! Webhook HTTP server.

mod handlers;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info};

use crate::completion::CompletionClient;
use crate::config::ResolvedConfig;
use crate::line::ReplyClient;
use crate::relay::Relay;
use crate::session::SessionRegistry;
use crate::translation::TranslationClient;

pub use handlers::{callback, health};

/// Everything a request handler needs, shared across requests.
pub struct AppState {
    pub relay: Relay,
    pub reply: ReplyClient,
    pub channel_secret: String,
}

impl AppState {
    /// Builds the clients and session registry described by `config`.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let sessions = SessionRegistry::new(
            config.model.clone(),
            config.max_history_messages,
            config.idle_ttl,
        );
        let completion = CompletionClient::new(
            http.clone(),
            config.completion_endpoint.clone(),
            config.completion_api_key.clone(),
        );
        let translation = TranslationClient::new(
            http.clone(),
            config.translation_endpoint.clone(),
            config.secrets.deepl_api_key.clone(),
            config.target_language.clone(),
        );
        let reply = ReplyClient::new(
            http,
            config.reply_endpoint.clone(),
            config.secrets.channel_access_token.clone(),
        );

        Ok(Self {
            relay: Relay::new(sessions, completion, translation),
            reply,
            channel_secret: config.secrets.channel_secret.clone(),
        })
    }
}

/// Creates the application router.
pub fn create_app(state: Arc<AppState>, callback_path: &str) -> Router {
    Router::new()
        .route(callback_path, post(callback))
        .route("/health", get(health))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Binds the listener and serves until Ctrl+C or SIGTERM.
pub async fn run_server(config: ResolvedConfig) -> Result<()> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = create_app(Arc::clone(&state), &config.callback_path);

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| {
            format!(
                "Failed to bind TCP listener to {}:{}",
                config.host, config.port
            )
        })?;
    let addr = listener
        .local_addr()
        .context("Failed to read listener address")?;

    info!(
        %addr,
        callback_path = %config.callback_path,
        model = %config.model,
        target_language = %config.target_language,
        "Webhook server listening"
    );

    let sweeper = tokio::spawn(sweep_idle_sessions(
        Arc::clone(&state),
        config.sweep_interval,
    ));

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed");

    sweeper.abort();
    served?;

    info!("Server shutdown complete");
    Ok(())
}

async fn sweep_idle_sessions(state: Arc<AppState>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    // The first tick completes immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        state.relay.sessions().evict_idle(Instant::now());
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown..."),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
