//! WebSocket handler for live reload.
//!
//! Each connection registers with the [`ClientRegistry`](super::ClientRegistry)
//! and forwards its queued messages to the socket in order.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use tokio::sync::mpsc;

use super::registry::ClientId;
use crate::state::AppState;

/// Messages buffered per client before it counts as stalled.
const CLIENT_QUEUE_CAPACITY: usize = 16;

/// Query parameters of the live reload endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct LiveReloadQuery {
    /// URL the client watches.
    #[serde(default = "default_url")]
    url: String,
}

fn default_url() -> String {
    "/".to_owned()
}

/// Handle WebSocket upgrade for live reload.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<LiveReloadQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.url))
}

/// Handle an established WebSocket connection.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, url: String) {
    let Some(ref live_reload) = state.live_reload else {
        // Live reload not enabled, close connection
        return;
    };
    let registry = Arc::clone(live_reload.registry());

    let id = ClientId::new();
    let (tx, mut rx) = mpsc::channel(CLIENT_QUEUE_CAPACITY);
    if let Err(err) = registry.register(id, url, tx) {
        tracing::warn!(client = %id, error = %err, "Rejected live reload client");
        return;
    }

    loop {
        tokio::select! {
            // Forward queued messages to the client
            message = rx.recv() => {
                // The registry dropped this client's queue.
                let Some(message) = message else { break };
                let text = match message.to_json() {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::warn!(client = %id, error = %err, "Failed to encode live reload message");
                        break;
                    }
                };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            // Client frames only matter for detecting close
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    registry.unregister(id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite;

    use crate::app::create_router;
    use crate::live_reload::{ClientRegistry, LiveReloadManager};

    type Client =
        tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

    async fn spawn_server() -> (SocketAddr, Arc<ClientRegistry>) {
        let registry = Arc::new(ClientRegistry::new());
        let state = Arc::new(AppState {
            source_dir: PathBuf::from("/docs"),
            gather_headings_level: None,
            live_reload: Some(LiveReloadManager::new(
                PathBuf::from("/docs"),
                None,
                Arc::clone(&registry),
            )),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });
        (addr, registry)
    }

    async fn next_text(client: &mut Client) -> String {
        let message = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("frame within timeout")
            .unwrap()
            .unwrap();
        assert!(message.is_text(), "expected text frame, got {message:?}");
        message.to_text().unwrap().to_owned()
    }

    async fn wait_until_empty(registry: &ClientRegistry) {
        for _ in 0..100 {
            if registry.is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("client still registered");
    }

    #[test]
    fn test_query_defaults_to_root() {
        let query: Query<LiveReloadQuery> =
            Query::try_from_uri(&"/ws/live-reload".parse().unwrap()).unwrap();
        assert_eq!(query.url, "/");
    }

    #[test]
    fn test_query_url() {
        let query: Query<LiveReloadQuery> =
            Query::try_from_uri(&"/ws/live-reload?url=%2Fguide%2Fsetup".parse().unwrap()).unwrap();
        assert_eq!(query.url, "/guide/setup");
    }

    #[tokio::test]
    async fn test_connection_receives_info_then_reload() {
        let (addr, registry) = spawn_server().await;
        let (mut client, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}/ws/live-reload?url=/guide"))
                .await
                .unwrap();

        assert_eq!(
            next_text(&mut client).await,
            r#"{"command":"info","url":"/guide"}"#
        );
        assert_eq!(registry.len(), 1);

        let report = registry.notify_changed(Path::new("/docs/guide.md"));
        assert_eq!(report.delivered, 1);
        assert_eq!(next_text(&mut client).await, r#"{"command":"reload"}"#);

        client.close(None).await.unwrap();
        wait_until_empty(&registry).await;
    }

    #[tokio::test]
    async fn test_connection_without_url_watches_root() {
        let (addr, registry) = spawn_server().await;
        let (mut client, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}/ws/live-reload"))
                .await
                .unwrap();

        assert_eq!(
            next_text(&mut client).await,
            r#"{"command":"info","url":"/"}"#
        );

        drop(client);
        wait_until_empty(&registry).await;
    }

    #[tokio::test]
    async fn test_client_frames_are_ignored() {
        let (addr, registry) = spawn_server().await;
        let (mut client, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}/ws/live-reload?url=/a"))
                .await
                .unwrap();
        next_text(&mut client).await;

        client
            .send(tungstenite::Message::Text("hello".into()))
            .await
            .unwrap();
        registry.notify_changed(Path::new("/docs/a.md"));

        assert_eq!(next_text(&mut client).await, r#"{"command":"reload"}"#);
        assert_eq!(registry.len(), 1);
    }
}
