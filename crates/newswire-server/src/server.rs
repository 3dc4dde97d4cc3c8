//! `NewsServer` — Axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use newswire_core::news::DEFAULT_CATEGORY;
use newswire_core::{HistoryBuffer, NewsItem};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::broadcast::BroadcastHub;
use crate::websocket::session::run_ws_session;

/// Items included in the `/stats` response.
const RECENT_NEWS_LIMIT: usize = 5;

/// Errors surfaced while starting the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}")]
    Bind {
        /// Address that failed to bind.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Any other I/O failure during startup.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Published news history.
    pub history: Arc<HistoryBuffer>,
    /// Subscriber registry and fan-out.
    pub hub: Arc<BroadcastHub>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// Server configuration.
    pub config: ServerConfig,
}

/// The news fan-out server.
pub struct NewsServer {
    config: ServerConfig,
    history: Arc<HistoryBuffer>,
    hub: Arc<BroadcastHub>,
    shutdown: Arc<ShutdownCoordinator>,
}

impl NewsServer {
    /// Create a new server.
    pub fn new(config: ServerConfig) -> Self {
        let history = Arc::new(HistoryBuffer::new(config.max_history));
        Self {
            config,
            history,
            hub: Arc::new(BroadcastHub::new()),
            shutdown: Arc::new(ShutdownCoordinator::new()),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            history: self.history.clone(),
            hub: self.hub.clone(),
            shutdown: self.shutdown.clone(),
            config: self.config.clone(),
        };

        let index = self.config.static_dir.join("index.html");

        Router::new()
            .route("/ws", get(ws_handler))
            .route("/news", post(news_handler))
            .route("/health", get(health_handler))
            .route("/stats", get(stats_handler))
            .route_service("/", ServeFile::new(index))
            .nest_service("/static", ServeDir::new(&self.config.static_dir))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Bind the configured address and start serving.
    ///
    /// Returns the bound address (port `0` auto-assigns) and the serve task
    /// handle. The task completes after the shutdown token fires.
    pub async fn listen(&self) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        let app = self.router();
        let token = self.shutdown.token();
        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, app)
                .with_graceful_shutdown(async move { token.cancelled().await });
            if let Err(e) = serve.await {
                error!(error = %e, "server error");
            }
        });

        info!(addr = %local_addr, "news server listening");
        Ok((local_addr, handle))
    }

    /// Get the news history.
    pub fn history(&self) -> &Arc<HistoryBuffer> {
        &self.history
    }

    /// Get the broadcast hub.
    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Response body for a successful `POST /news`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    /// Always `"success"`.
    pub status: String,
    /// Id assigned to the published item.
    pub news_id: u64,
    /// Number of subscribers connected when the item was published.
    pub clients_notified: usize,
}

/// Response body for `GET /stats`.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Current WebSocket subscriber count.
    pub connected_clients: usize,
    /// Number of news items in the history buffer.
    pub total_news: usize,
    /// The most recent items, newest last.
    pub recent_news: Vec<NewsItem>,
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

/// GET /ws — upgrade into a subscriber session.
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    if state.hub.count().await >= state.config.max_connections {
        warn!(
            max_connections = state.config.max_connections,
            "connection limit reached, rejecting upgrade"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "connection limit reached").into_response();
    }

    let client_id = format!("client_{}", uuid::Uuid::now_v7());
    let history = state.history.clone();
    let hub = state.hub.clone();
    let token = state.shutdown.token();
    let heartbeat_interval = Duration::from_secs(state.config.heartbeat_interval_secs);
    let heartbeat_timeout = Duration::from_secs(state.config.heartbeat_timeout_secs);

    ws.max_message_size(state.config.max_message_size)
        .on_upgrade(move |socket| {
            run_ws_session(
                socket,
                client_id,
                history,
                hub,
                token,
                heartbeat_interval,
                heartbeat_timeout,
            )
        })
}

/// POST /news — producer submission.
///
/// The body is parsed by hand so malformed JSON yields a structured
/// `{"error": ...}` rather than a plain-text rejection.
async fn news_handler(State(state): State<AppState>, body: String) -> Response {
    let value: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(_) => {
            warn!("rejected news submission with malformed body");
            return bad_request("Invalid JSON");
        }
    };

    let title = value.get("title").and_then(Value::as_str).unwrap_or("");
    let content = value.get("content").and_then(Value::as_str).unwrap_or("");
    if title.is_empty() || content.is_empty() {
        warn!("rejected news submission without title or content");
        return bad_request("Title and content are required");
    }
    let category = value
        .get("category")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_CATEGORY);

    let item = state.history.append(title, content, category);
    let clients_notified = state.hub.broadcast_news(&item).await;
    info!(
        news_id = item.id,
        category = %item.category,
        clients_notified,
        "news published"
    );

    Json(SubmitResponse {
        status: "success".into(),
        news_id: item.id,
        clients_notified,
    })
    .into_response()
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = state.hub.count().await;
    Json(health::health_check(connected, state.history.len()))
}

/// GET /stats
async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        connected_clients: state.hub.count().await,
        total_news: state.history.len(),
        recent_news: state.history.recent(RECENT_NEWS_LIMIT),
    })
}
