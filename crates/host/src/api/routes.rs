//! Viewer WebSocket handler.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use shared::{ws_types, RouteKey, WsEnvelope, WsHelloPayload, WsLogPayload, WsSendCommandPayload};

use crate::api::AppState;
use crate::relay::{LogStream, Published, Subscription};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

fn timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn envelope_json(r#type: &str, payload: serde_json::Value) -> Option<String> {
    let envelope = WsEnvelope {
        version: 1,
        r#type: r#type.to_string(),
        payload,
        ts: Some(timestamp()),
    };
    serde_json::to_string(&envelope).ok()
}

fn log_json(event: &Published) -> Option<String> {
    let payload = serde_json::to_value(WsLogPayload {
        data: event.text.clone(),
    })
    .ok()?;
    envelope_json(event.stream.event_name(), payload)
}

/// Assign an identity, open the viewer's game connection, then pump events both ways
/// until the socket closes.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let viewer_id = shared::new_viewer_id();
    let route = RouteKey::viewer(viewer_id.as_str());

    // subscribe first so the welcome banner is not missed
    let mut subscription = state.transport.subscribe(route.clone());
    let port = match state.viewers.connect(&viewer_id).await {
        Ok(port) => port,
        Err(e) => {
            tracing::warn!(viewer = %viewer_id, err = %e, "game connection failed");
            let payload = serde_json::json!({ "data": format!("Error: {}", e) });
            if let Some(j) = envelope_json(ws_types::CLIENT_LOG, payload) {
                let _ = ws_tx.send(Message::Text(j.into())).await;
            }
            return;
        }
    };

    let hello = serde_json::to_value(WsHelloPayload {
        viewer_id: viewer_id.clone(),
        port,
    })
    .ok()
    .and_then(|p| envelope_json(ws_types::HELLO, p));
    if let Some(j) = hello {
        if ws_tx.send(Message::Text(j.into())).await.is_err() {
            state.viewers.disconnect(&viewer_id);
            return;
        }
    }

    subscription.add_route(RouteKey::Port(port));
    let forward = tokio::spawn(forward_events(ws_tx, subscription));

    while let Some(msg) = ws_rx.next().await {
        let text = match msg {
            Ok(Message::Text(t)) => t,
            Ok(Message::Close(_)) | Err(_) => break,
            _ => continue,
        };
        let Ok(envelope) = serde_json::from_str::<WsEnvelope>(&text) else {
            continue;
        };
        if envelope.r#type != ws_types::SEND_COMMAND {
            continue;
        }
        let Ok(command) = serde_json::from_value::<WsSendCommandPayload>(envelope.payload) else {
            continue;
        };
        if let Err(e) = state.viewers.send_command(&viewer_id, &command.data).await {
            tracing::warn!(viewer = %viewer_id, err = %e, "send failed");
            state
                .transport
                .publish(LogStream::Client, route.clone(), format!("Send error: {}", e));
        }
    }

    forward.abort();
    state.viewers.disconnect(&viewer_id);
}

/// Forward every event routed to this viewer or its connection's port.
async fn forward_events(
    mut ws_tx: futures_util::stream::SplitSink<WebSocket, Message>,
    mut subscription: Subscription,
) {
    let mut ping_interval = tokio::time::interval(tokio::time::Duration::from_secs(30));
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else { break };
                if let Some(j) = log_json(&event) {
                    if ws_tx.send(Message::Text(j.into())).await.is_err() {
                        break;
                    }
                }
            }
            _ = ping_interval.tick() => {
                if ws_tx.send(Message::Ping(axum::body::Bytes::new())).await.is_err() {
                    break;
                }
            }
        }
    }
}
