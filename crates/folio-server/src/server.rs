//! Development server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;

use folio_static::{BuildConfig, StaticBuilder};

use crate::watcher::FileWatcher;
use crate::websocket::{hmr_client_script, HmrHub, HmrMessage};

const HMR_PATH: &str = "/__hmr";
const HMR_SCRIPT_PATH: &str = "/__hmr.js";

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Site build settings; drafts and the reload script are added on top
    pub build: BuildConfig,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// Shared server state.
struct ServerState {
    build: BuildConfig,
    hmr: HmrHub,
    /// Error of the most recent build, shown to clients that connect later
    last_error: Option<String>,
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Build settings used by the dev server.
    fn build_config(&self) -> BuildConfig {
        BuildConfig {
            include_drafts: true,
            minify: false,
            dev_script: Some(HMR_SCRIPT_PATH.to_string()),
            ..self.config.build.clone()
        }
    }

    /// Start the development server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| {
                ServerError::InvalidAddress(format!(
                    "{}:{}: {}",
                    self.config.host, self.config.port, e
                ))
            })?;

        let build = self.build_config();
        let state = Arc::new(RwLock::new(ServerState {
            build: build.clone(),
            hmr: HmrHub::new(),
            last_error: None,
        }));

        rebuild(&state).await;

        // Set up file watcher
        let mut watch_paths = vec![build.docs_dir.clone()];
        if let Some(static_dir) = &build.static_dir {
            watch_paths.push(static_dir.clone());
        }

        let (watcher, mut rx) =
            FileWatcher::new(&watch_paths).map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                tracing::info!("Changed: {}", event.path().display());
                // One rebuild covers everything queued so far
                while rx.try_recv().is_ok() {}
                rebuild(&state_clone).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let base = build.site.site.base_url.trim_matches('/');
        let serve = ServeDir::new(&build.output_dir);
        let app = Router::new()
            .route(HMR_PATH, get(ws_handler))
            .route(HMR_SCRIPT_PATH, get(hmr_script_handler));
        let app = if base.is_empty() {
            app.fallback_service(serve)
        } else {
            app.nest_service(&format!("/{base}"), serve)
        };
        let app = app.with_state(state);

        let url = if base.is_empty() {
            format!("http://{}/", addr)
        } else {
            format!("http://{}/{}/", addr, base)
        };
        tracing::info!("Starting dev server at {}", url);

        if self.config.open {
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Rebuild the site and tell connected clients how it went.
async fn rebuild(state: &Arc<RwLock<ServerState>>) {
    let build = state.read().await.build.clone();

    let last_error = match StaticBuilder::new(build).build().await {
        Ok(result) => {
            tracing::info!("Built {} pages in {}ms", result.pages, result.duration_ms);
            None
        }
        Err(e) => {
            tracing::error!("Build failed: {}", e);
            Some(e.to_string())
        }
    };

    let mut state = state.write().await;
    state.last_error = last_error.clone();
    state.hmr.send(match last_error {
        Some(message) => HmrMessage::BuildFailed { message },
        None => HmrMessage::Reload,
    });
}

/// Handler for the HMR WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RwLock<ServerState>>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<RwLock<ServerState>>) {
    let (mut rx, last_error) = {
        let state = state.read().await;
        (state.hmr.subscribe(), state.last_error.clone())
    };

    let mut greeting = vec![HmrMessage::Connected];
    if let Some(message) = last_error {
        greeting.push(HmrMessage::BuildFailed { message });
    }
    for msg in greeting {
        if !send_message(&mut socket, &msg).await {
            return;
        }
    }

    // Forward HMR messages to the client
    while let Ok(msg) = rx.recv().await {
        if !send_message(&mut socket, &msg).await {
            break;
        }
    }
}

/// Send one message; false once the client is gone.
async fn send_message(socket: &mut WebSocket, msg: &HmrMessage) -> bool {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("Failed to encode HMR message: {}", e);
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

/// Handler for the HMR client script.
async fn hmr_script_handler() -> impl IntoResponse {
    let script = hmr_client_script(HMR_PATH);
    ([("content-type", "application/javascript")], script)
}
