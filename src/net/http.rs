use axum::{
    Router,
    extract::State,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};

use crate::error::{AppResult, InfraError};
use crate::net::proto::{ClientFrame, ServerFrame};
use crate::state::registry::{Registry, is_silent_rejection};
use crate::state::session::SessionId;

#[derive(Clone)]
struct HttpAppCtx {
    registry: Arc<Registry>,
}

/// Run the HTTP server with WebSocket endpoint
pub async fn serve(addr: std::net::SocketAddr, registry: Arc<Registry>) -> AppResult<()> {
    let app = Router::new()
        .route("/ws", get(ws_upgrade))
        .with_state(HttpAppCtx { registry })
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| InfraError::Bind { addr, source })?;
    axum::serve(listener, app).await.map_err(InfraError::from)?;
    Ok(())
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<HttpAppCtx>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_handler(socket, state.registry.clone()))
}

/// One loop per connection: intents are processed strictly in arrival order,
/// and every outbound frame goes through a single writer task so the delayed
/// opponent broadcast never interleaves a partial write.
async fn ws_handler(socket: WebSocket, registry: Arc<Registry>) {
    let (ws_write, mut ws_read) = socket.split();

    let (tx, rx) = mpsc::channel::<ServerFrame>(16);
    let writer = tokio::spawn(write_frames(rx, ws_write));

    let (id, initial) = registry.connect();
    tracing::info!(%id, "client connected");
    let _ = tx.send(ServerFrame::State(initial)).await;

    while let Some(Ok(msg)) = ws_read.next().await {
        let text = match msg {
            Message::Text(t) => t.to_string(),
            Message::Binary(b) => String::from_utf8_lossy(&b).to_string(),
            Message::Ping(_) => {
                // Axum already handles Pong responses automatically
                continue;
            }
            Message::Pong(_) => continue,
            Message::Close(_) => break,
        };

        let frame = match serde_json::from_str::<ClientFrame>(text.trim()) {
            Ok(frame) => frame,
            Err(err) => {
                // Bad input never kills the connection, let alone the server.
                tracing::debug!(%id, error = %err, "dropping unparseable frame");
                continue;
            }
        };

        match frame {
            ClientFrame::Move { index } => handle_move(&registry, id, index, &tx).await,
            ClientFrame::Reset => match registry.reset(id) {
                Ok(snapshot) => {
                    tracing::info!(%id, "game reset");
                    let _ = tx.send(ServerFrame::State(snapshot)).await;
                }
                Err(err) => tracing::debug!(%id, error = %err, "reset rejected"),
            },
        }
    }

    registry.disconnect(id);
    tracing::info!(%id, "client disconnected");

    // Writer drains once every sender (this one and any pending delayed
    // broadcast, now aborted) is gone.
    drop(tx);
    let _ = writer.await;
}

async fn handle_move(
    registry: &Arc<Registry>,
    id: SessionId,
    index: usize,
    tx: &mpsc::Sender<ServerFrame>,
) {
    let outcome = match registry.apply_move(id, index) {
        Ok(outcome) => outcome,
        Err(err) if is_silent_rejection(&err) => {
            tracing::debug!(%id, index, error = %err, "move rejected");
            return;
        }
        Err(err) => {
            tracing::warn!(%id, index, error = %err, "move failed");
            return;
        }
    };

    tracing::info!(%id, index, "move applied");
    let _ = tx.send(ServerFrame::State(outcome.snapshot)).await;

    // The opponent already moved on the authoritative board; only the
    // broadcast of that state is paced. The task is keyed to the session and
    // aborted on disconnect, so it can never outlive the match it reads.
    if outcome.reply.is_some() {
        let delay = registry.config.move_delay();
        let reg = registry.clone();
        let tx = tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(snapshot) = reg.snapshot(id) {
                let _ = tx.send(ServerFrame::State(snapshot)).await;
            }
        });
        registry.set_pending_reply(id, task.abort_handle());
    }
}

async fn write_frames(mut rx: mpsc::Receiver<ServerFrame>, mut ws_write: SplitSink<WebSocket, Message>) {
    while let Some(frame) = rx.recv().await {
        let json = match serde_json::to_string(&frame) {
            Ok(json) => json,
            Err(err) => {
                tracing::error!(error = %err, "failed to encode outbound frame");
                continue;
            }
        };
        if ws_write.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}
