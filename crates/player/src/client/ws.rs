//! WebSocket viewer: sends stdin lines as commands, prints the events routed to us.

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use shared::{ws_types, WsEnvelope, WsHelloPayload, WsLogPayload, WsSendCommandPayload};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Connect (retrying while the host is down) and run until the socket closes.
pub async fn run_viewer(ws_url: &str) -> Result<()> {
    loop {
        match connect_async(ws_url).await {
            Ok((ws, _)) => {
                tracing::info!("Connected to host");
                let stdin = BufReader::new(tokio::io::stdin());
                return handle_connection(ws, stdin, tokio::io::stdout()).await;
            }
            Err(e) => {
                tracing::warn!("Connect failed: {}, retrying in 5s", e);
            }
        }
        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
    }
}

/// Text to print for an incoming envelope, `None` for types we do not show.
pub fn render(envelope: &WsEnvelope) -> Option<String> {
    match envelope.r#type.as_str() {
        ws_types::HELLO => {
            let hello: WsHelloPayload = serde_json::from_value(envelope.payload.clone()).ok()?;
            Some(format!(
                "Connected as viewer {} (game port {})\n",
                hello.viewer_id, hello.port
            ))
        }
        ws_types::CLIENT_LOG | ws_types::SERVER_LOG | ws_types::WIRE_LOG => {
            let log: WsLogPayload = serde_json::from_value(envelope.payload.clone()).ok()?;
            Some(match envelope.r#type.as_str() {
                ws_types::SERVER_LOG => format!("[server] {}\n", log.data),
                ws_types::WIRE_LOG => format!("[wire] {}\n", log.data),
                _ => log.data,
            })
        }
        _ => None,
    }
}

/// JSON `send_command` envelope for one input line.
pub fn command_message(line: &str) -> Result<String> {
    let payload = serde_json::to_value(WsSendCommandPayload {
        data: line.to_string(),
    })?;
    Ok(serde_json::to_string(&WsEnvelope::new(
        ws_types::SEND_COMMAND,
        payload,
    ))?)
}

async fn handle_connection<I, O>(
    ws: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    input: I,
    mut output: O,
) -> Result<()>
where
    I: AsyncBufRead + Unpin + Send + 'static,
    O: AsyncWrite + Unpin,
{
    let (mut ws_tx, mut ws_rx) = ws.split();

    let sender = tokio::spawn(async move {
        let mut lines = input.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let Ok(json) = command_message(&line) else {
                continue;
            };
            if ws_tx.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let result = async {
        while let Some(msg) = ws_rx.next().await {
            let text = match msg? {
                Message::Text(t) => t,
                Message::Close(_) => break,
                _ => continue,
            };
            let Ok(envelope) = serde_json::from_str::<WsEnvelope>(&text) else {
                continue;
            };
            if let Some(out) = render(&envelope) {
                output.write_all(out.as_bytes()).await?;
                output.flush().await?;
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    sender.abort();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(r#type: &str, data: &str) -> WsEnvelope {
        WsEnvelope::new(r#type, serde_json::json!({ "data": data }))
    }

    fn text(envelope: &WsEnvelope) -> Message {
        Message::Text(serde_json::to_string(envelope).unwrap())
    }

    #[tokio::test]
    async fn stdin_lines_become_commands_and_events_are_printed() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let host = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            let hello = WsEnvelope::new(
                ws_types::HELLO,
                serde_json::json!({ "viewer_id": "v9", "port": 41000 }),
            );
            ws.send(text(&hello)).await.unwrap();

            let command = loop {
                if let Message::Text(t) = ws.next().await.unwrap().unwrap() {
                    break serde_json::from_str::<WsEnvelope>(&t).unwrap();
                }
            };
            ws.send(text(&log(ws_types::CLIENT_LOG, "Dice: [1, 1, 2, 3, 4], Rolls Left: 2\n\n")))
                .await
                .unwrap();
            ws.send(text(&log(ws_types::SERVER_LOG, "Received from client: [\"roll\"]")))
                .await
                .unwrap();
            ws.send(Message::Text("not json".to_string())).await.unwrap();
            ws.close(None).await.unwrap();
            command
        });

        let (ws, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
        let mut output = Vec::new();
        tokio::time::timeout(
            std::time::Duration::from_secs(3),
            handle_connection(ws, &b"roll\n"[..], &mut output),
        )
        .await
        .unwrap()
        .unwrap();

        let command = host.await.unwrap();
        assert_eq!(command.r#type, ws_types::SEND_COMMAND);
        assert_eq!(command.payload["data"], "roll");
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Connected as viewer v9 (game port 41000)\n\
             Dice: [1, 1, 2, 3, 4], Rolls Left: 2\n\n\
             [server] Received from client: [\"roll\"]\n"
        );
    }

    #[test]
    fn client_output_is_printed_verbatim() {
        assert_eq!(
            render(&log(ws_types::CLIENT_LOG, "Dice: [1, 2, 3, 4, 5], Rolls Left: 2\n\n")),
            Some("Dice: [1, 2, 3, 4, 5], Rolls Left: 2\n\n".to_string())
        );
    }

    #[test]
    fn relayed_logs_are_tagged() {
        assert_eq!(
            render(&log(ws_types::SERVER_LOG, "Closed connection to 127.0.0.1:5")),
            Some("[server] Closed connection to 127.0.0.1:5\n".to_string())
        );
        assert_eq!(
            render(&log(ws_types::WIRE_LOG, "| 1 | ...")),
            Some("[wire] | 1 | ...\n".to_string())
        );
    }

    #[test]
    fn hello_and_unknown_types() {
        let hello = WsEnvelope::new(
            ws_types::HELLO,
            serde_json::json!({ "viewer_id": "abc", "port": 50000 }),
        );
        assert_eq!(
            render(&hello),
            Some("Connected as viewer abc (game port 50000)\n".to_string())
        );
        assert_eq!(render(&log("pong", "x")), None);
        assert_eq!(
            render(&WsEnvelope::new(ws_types::SERVER_LOG, serde_json::json!({}))),
            None
        );
    }

    #[test]
    fn command_message_wraps_the_line() {
        let json = command_message("roll 1 2").unwrap();
        let parsed: WsEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.r#type, ws_types::SEND_COMMAND);
        assert_eq!(parsed.payload["data"], "roll 1 2");
    }
}
