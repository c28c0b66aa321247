use std::net::SocketAddr;

use axum::{
    extract::{
        ConnectInfo, Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::{Receiver, error};

use crate::{
    AppState,
    ws::types::{ClientMessage, RoomCanvasUpdate, WsQuery},
};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<WsQuery>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query, addr))
}

async fn handle_socket(socket: WebSocket, state: AppState, query: WsQuery, addr: SocketAddr) {
    let room = state.ws_rooms.get_or_create_room(query.canvas_id).await;
    let canvas_id = room.canvas_id();

    let receiver = match room.subscribe() {
        Some(value) => value,
        None => {
            tracing::warn!(canvas_id, "Room full");
            return;
        }
    };

    tracing::info!(canvas_id, client = %addr, "WebSocket connected");

    room.broadcast(RoomCanvasUpdate::ConnectionCount {
        count: room.connection_count(),
    });
    handle_connection(socket, receiver).await;

    room.unsubscribe();
    room.broadcast(RoomCanvasUpdate::ConnectionCount {
        count: room.connection_count(),
    });
    state.ws_rooms.remove_room_if_empty(canvas_id).await;

    tracing::info!(canvas_id, client = %addr, "WebSocket disconnected");
}

async fn handle_connection(socket: WebSocket, mut ws_receiver: Receiver<RoomCanvasUpdate>) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(ClientMessage::Ping) = serde_json::from_str::<ClientMessage>(&text)
                            && sender.send(Message::Text("pong".into())).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }

            update = ws_receiver.recv() => {
                match update {
                    Ok(update) => {
                        match serde_json::to_string(&update) {
                            Ok(json) => {
                                if sender.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to serialize update");
                            }
                        }
                    }
                    Err(error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "WebSocket client lagged");
                    }
                    Err(_) => break,
                }
            }
        }
    }
}
