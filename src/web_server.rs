use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    serve, Json, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::sync::mpsc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use crate::assistant::{Assistant, Reply};
use crate::catalog::Catalog;
use crate::conversation::PendingReply;
use crate::session::{ClientEvent, ServerEvent, Session};
use crate::view::{format_timestamp, ViewModel};

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

// Shared application state. Only immutable data lives here; each visitor's
// session is owned by its WebSocket task.
#[derive(Clone)]
pub struct AppState {
    templates: Arc<AutoReloader>,
    catalog: Arc<Catalog>,
    assistant: Arc<Assistant>,
    static_dir: PathBuf,
}

impl AppState {
    pub fn new(
        catalog: Arc<Catalog>,
        assistant: Arc<Assistant>,
        template_dir: Option<PathBuf>,
        static_dir: PathBuf,
    ) -> Self {
        Self {
            templates: Arc::new(create_minijinja_env(template_dir)),
            catalog,
            assistant,
            static_dir,
        }
    }
}

// With a template directory the environment is rebuilt whenever a file in it
// changes; otherwise the page compiled into the binary is used.
fn create_minijinja_env(template_dir: Option<PathBuf>) -> AutoReloader {
    AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        env.add_filter("playback_time", format_timestamp);
        match &template_dir {
            Some(dir) => {
                env.set_loader(path_loader(dir.clone()));
                notifier.watch_path(dir, true);
            }
            None => {
                env.add_template("index.html", INDEX_TEMPLATE)?;
            }
        }
        Ok(env)
    })
}

async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let first = &state.catalog.items()[0];
    let view = ViewModel::build(first, 0, state.catalog.len(), Default::default());

    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template("index.html").and_then(|tmpl| {
                let context = minijinja::context! {
                    owner => state.catalog.owner(),
                    owner_first_name => state.catalog.owner_first_name(),
                    items => state.catalog.items(),
                    view => view,
                    remote_enabled => state.assistant.remote_enabled(),
                };
                tmpl.render(context)
            })
        })
        .map(Html)
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Internal Server Error: {}", e)),
            )
        })
}

async fn catalog_handler(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.catalog.as_ref().clone())
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    info!("WebSocket connection upgrade requested");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(json) => socket.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            error!("Failed to serialize server event: {}", e);
            true
        }
    }
}

// Each connection is one visitor session. The page forwards arrow keys,
// clicks, swipes and chat input; every change is answered with a full state
// snapshot. The arrow-key binding ends when the socket closes.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    info!("New portfolio session connected");
    let mut session = Session::new(state.catalog.clone());
    let (reply_tx, mut reply_rx) = mpsc::channel::<(PendingReply, Reply)>(4);

    if !send_event(&mut socket, &ServerEvent::State(session.snapshot())).await {
        warn!("Failed to send initial state to new WebSocket client");
        return;
    }

    loop {
        tokio::select! {
            // A reply finished, possibly after the visitor moved on; it still lands
            Some((pending, reply)) = reply_rx.recv() => {
                debug!(origin = ?reply.origin, "Assistant reply ready");
                session.finish_reply(pending, reply);
                if !send_event(&mut socket, &ServerEvent::State(session.snapshot())).await {
                    warn!("WebSocket client disconnected or send error. Closing connection.");
                    break;
                }
            }

            frame = socket.recv() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) => {
                        info!("Client requested WebSocket close");
                        break;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        warn!("Received unexpected binary message from client");
                        continue;
                    }
                    // Axum answers pings itself
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!("WebSocket receive error: {}", e);
                        break;
                    }
                    None => {
                        info!("WebSocket client disconnected");
                        break;
                    }
                };

                let outgoing = match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => match session.apply(event) {
                        Ok(pending) => {
                            if let Some(pending) = pending {
                                let assistant = state.assistant.clone();
                                let item = session.current_item().clone();
                                let tx = reply_tx.clone();
                                tokio::spawn(async move {
                                    let reply = assistant.respond(&pending.user_text, &item, &pending.context).await;
                                    if tx.send((pending, reply)).await.is_err() {
                                        debug!("Session closed before reply arrived");
                                    }
                                });
                            }
                            ServerEvent::State(session.snapshot())
                        }
                        Err(e) => ServerEvent::Error { message: e.to_string() },
                    },
                    Err(e) => {
                        warn!("Malformed client event: {}", e);
                        ServerEvent::Error { message: format!("malformed event: {}", e) }
                    }
                };

                if !send_event(&mut socket, &outgoing).await {
                    warn!("WebSocket client disconnected or send error. Closing connection.");
                    break;
                }
            }
        }
    }
    info!("Portfolio session closed");
}

pub fn router(state: AppState) -> Router {
    // Serve video assets and other static files
    let static_files_service = ServeDir::new(&state.static_dir).not_found_service(
        tower::service_fn(|_req: axum::extract::Request| async {
            Ok::<_, std::convert::Infallible>((StatusCode::NOT_FOUND, "Not Found").into_response())
        }),
    );

    Router::new()
        .route("/", get(index_handler))
        .route("/api/catalog", get(catalog_handler))
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .nest_service("/static", static_files_service)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_web_server(port: u16, state: AppState) -> Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
